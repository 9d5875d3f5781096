use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::fetch::Fetch;
use crate::model::{JobSpec, JobStatus, WorkbookModel};
use crate::resolver::Resolver;

/// Resolve jobs strictly one at a time, in input order.
///
/// `delay` is slept between consecutive jobs (not after the last one). Job
/// failures are recorded in the model; nothing here aborts the batch.
pub async fn run_batch<F: Fetch>(
    resolver: &Resolver<F>,
    jobs: &[JobSpec],
    delay: Duration,
) -> WorkbookModel {
    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut model = WorkbookModel::default();

    for (i, job) in jobs.iter().enumerate() {
        pb.set_message(job.complex_id.clone());
        let result = resolver.resolve(job).await;

        match &result.status {
            JobStatus::Success { source } => info!(
                "[{}/{}] {}: ok ({} rows via {:?})",
                i + 1,
                jobs.len(),
                job.complex_id,
                result.rows.len(),
                source
            ),
            JobStatus::Failure { reason } => warn!(
                "[{}/{}] {}: failed ({}): {}",
                i + 1,
                jobs.len(),
                job.complex_id,
                reason.kind(),
                reason
            ),
        }

        model.push(result);
        pb.inc(1);

        if i + 1 < jobs.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    pb.finish_and_clear();
    info!(
        "{} jobs: {} succeeded, {} failed",
        model.jobs.len(),
        model.succeeded(),
        model.failed()
    );
    model
}
