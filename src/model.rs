use serde::Serialize;

use crate::error::ExtractError;

/// One line of the job list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSpec {
    pub complex_id: String,
    /// Absolute URL with any trailing slash removed.
    pub base_url: String,
}

impl JobSpec {
    pub fn new(complex_id: impl Into<String>, base_url: &str) -> Self {
        Self {
            complex_id: complex_id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// One ranked model from the Top-10 table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub rank: u32,
    pub docking_score: f64,
    pub confidence_score: f64,
    pub ligand_rmsd: f64,
    pub interface_residues: String,
}

/// Which extraction strategy produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Plaintext,
    Html,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Success { source: Source },
    Failure { reason: ExtractError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobResult {
    pub spec: JobSpec,
    pub rows: Vec<RankedRow>,
    pub archive_link: Option<String>,
    pub status: JobStatus,
}

impl JobResult {
    pub fn success(
        spec: JobSpec,
        rows: Vec<RankedRow>,
        archive_link: String,
        source: Source,
    ) -> Self {
        Self {
            spec,
            rows,
            archive_link: Some(archive_link),
            status: JobStatus::Success { source },
        }
    }

    pub fn failure(spec: JobSpec, reason: ExtractError) -> Self {
        Self {
            spec,
            rows: Vec::new(),
            archive_link: None,
            status: JobStatus::Failure { reason },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, JobStatus::Success { .. })
    }
}

/// All job results of a run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkbookModel {
    pub jobs: Vec<JobResult>,
}

impl WorkbookModel {
    pub fn push(&mut self, result: JobResult) {
        self.jobs.push(result);
    }

    pub fn succeeded(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.jobs.len() - self.succeeded()
    }
}
