use tracing::info;

use crate::config::{archive_url, endpoint, Endpoints};
use crate::error::ExtractError;
use crate::fetch::Fetch;
use crate::model::{JobResult, JobSpec, RankedRow, Source};
use crate::parser::{html, normalize::normalize, plaintext};

/// Extraction strategies, tried in `PRIORITY` order until one yields a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Plaintext,
    Html,
}

/// What a successful strategy hands back to the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub rows: Vec<RankedRow>,
    pub archive_link: Option<String>,
}

impl Strategy {
    pub const PRIORITY: [Strategy; 2] = [Strategy::Plaintext, Strategy::Html];

    fn names(self, endpoints: &Endpoints) -> &[String] {
        match self {
            Strategy::Plaintext => &endpoints.plaintext,
            Strategy::Html => &endpoints.html,
        }
    }

    pub fn source(self) -> Source {
        match self {
            Strategy::Plaintext => Source::Plaintext,
            Strategy::Html => Source::Html,
        }
    }

    /// Body in, normalized rows out.
    pub fn extract(self, body: &str, url: &str) -> Result<Extracted, ExtractError> {
        match self {
            Strategy::Plaintext => {
                let table = plaintext::extract(body)?;
                Ok(Extracted {
                    rows: normalize(&table)?,
                    archive_link: None,
                })
            }
            Strategy::Html => {
                let page = html::extract(body, url)?;
                Ok(Extracted {
                    rows: normalize(&page.table)?,
                    archive_link: page.archive_link,
                })
            }
        }
    }
}

pub struct Resolver<F> {
    fetcher: F,
    endpoints: Endpoints,
}

impl<F: Fetch> Resolver<F> {
    pub fn new(fetcher: F, endpoints: Endpoints) -> Self {
        Self { fetcher, endpoints }
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Try each strategy's endpoints once, in order. Never fails: the last
    /// error becomes the job's failure reason.
    pub async fn resolve(&self, job: &JobSpec) -> JobResult {
        let mut last_error = None;

        for strategy in Strategy::PRIORITY {
            for name in strategy.names(&self.endpoints) {
                let url = endpoint(&job.base_url, name);
                match self.attempt(strategy, &url).await {
                    Ok(found) => {
                        info!(
                            "{}: {:?} {} -> {} rows",
                            job.complex_id,
                            strategy,
                            url,
                            found.rows.len()
                        );
                        let link = found
                            .archive_link
                            .unwrap_or_else(|| archive_url(&job.base_url));
                        return JobResult::success(job.clone(), found.rows, link, strategy.source());
                    }
                    Err(e) => {
                        info!("{}: {:?} {} -> {}", job.complex_id, strategy, url, e);
                        last_error = Some(e);
                    }
                }
            }
        }

        let reason = last_error
            .unwrap_or_else(|| ExtractError::TableNotFound("no endpoints configured".into()));
        JobResult::failure(job.clone(), reason)
    }

    async fn attempt(&self, strategy: Strategy, url: &str) -> Result<Extracted, ExtractError> {
        let body = self.fetcher.fetch(url).await?;
        strategy.extract(&body, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use crate::model::JobStatus;

    const BASE: &str = "https://hdock.example.org/data/5a1f";

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
    }

    fn job() -> JobSpec {
        JobSpec::new("5A1F", &format!("{}/", BASE))
    }

    #[tokio::test]
    async fn plaintext_wins_with_conventional_link() {
        let fetcher = StaticFetcher::default()
            .with_page(&format!("{}/ranked_poses.txt", BASE), &fixture("ranked_poses.txt"));
        let resolver = Resolver::new(fetcher, Endpoints::default());

        let result = resolver.resolve(&job()).await;
        assert_eq!(result.status, JobStatus::Success { source: Source::Plaintext });
        assert_eq!(result.rows.len(), 10);
        assert_eq!(
            result.archive_link.as_deref(),
            Some("https://hdock.example.org/data/5a1f/all_results.tar.gz")
        );
        assert_eq!(resolver.fetcher().requests().len(), 1);
    }

    #[tokio::test]
    async fn falls_back_to_html_once() {
        let fetcher = StaticFetcher::default()
            .with_page(&format!("{}/", BASE), &fixture("top10_columns.html"));
        let resolver = Resolver::new(fetcher, Endpoints::default());

        let result = resolver.resolve(&job()).await;
        assert_eq!(result.status, JobStatus::Success { source: Source::Html });
        assert_eq!(result.rows.len(), 8);
        assert_eq!(
            resolver.fetcher().requests(),
            vec![format!("{}/ranked_poses.txt", BASE), format!("{}/", BASE)]
        );
    }

    #[tokio::test]
    async fn unparseable_plaintext_falls_back() {
        let fetcher = StaticFetcher::default()
            .with_page(&format!("{}/ranked_poses.txt", BASE), "1 -200 0.9 10\n")
            .with_page(&format!("{}/", BASE), &fixture("top10_rows.html"));
        let resolver = Resolver::new(fetcher, Endpoints::default());

        let result = resolver.resolve(&job()).await;
        assert!(result.is_success());
        assert_eq!(result.rows.len(), 8);
        // No link on the row-oriented page, so the conventional one is used.
        assert_eq!(
            result.archive_link.as_deref(),
            Some("https://hdock.example.org/data/5a1f/all_results.tar.gz")
        );
    }

    #[tokio::test]
    async fn both_unavailable_fails_with_last_error() {
        let resolver = Resolver::new(StaticFetcher::default(), Endpoints::default());

        let result = resolver.resolve(&job()).await;
        assert!(result.rows.is_empty());
        assert_eq!(result.archive_link, None);
        match result.status {
            JobStatus::Failure {
                reason: ExtractError::SourceUnavailable { url, .. },
            } => assert_eq!(url, format!("{}/", BASE)),
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(resolver.fetcher().requests().len(), 2);
    }

    #[tokio::test]
    async fn html_extraction_error_is_reason() {
        let fetcher =
            StaticFetcher::default().with_page(&format!("{}/", BASE), "<html><body><p>Queued</p></body></html>");
        let resolver = Resolver::new(fetcher, Endpoints::default());

        let result = resolver.resolve(&job()).await;
        assert!(matches!(
            result.status,
            JobStatus::Failure { reason: ExtractError::TableNotFound(_) }
        ));
    }

    #[tokio::test]
    async fn alternate_names_each_tried_once() {
        let endpoints = Endpoints::default().with_extra(&["ranked.txt".into()], &["result.html".into()]);
        let fetcher = StaticFetcher::default()
            .with_page(&format!("{}/result.html", BASE), &fixture("top10_rows.html"));
        let resolver = Resolver::new(fetcher, endpoints);

        let result = resolver.resolve(&job()).await;
        assert!(result.is_success());
        assert_eq!(
            resolver.fetcher().requests(),
            vec![
                format!("{}/ranked_poses.txt", BASE),
                format!("{}/ranked.txt", BASE),
                format!("{}/", BASE),
                format!("{}/result.html", BASE),
            ]
        );
    }
}
