use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::ExtractError;

/// One-shot GET returning the response body as text.
///
/// Any transport error, timeout or non-2xx status is `SourceUnavailable`.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        let unavailable = |e: reqwest::Error| ExtractError::SourceUnavailable {
            url: url.to_string(),
            reason: e.without_url().to_string(),
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(unavailable)?;
        let body = response.text().await.map_err(unavailable)?;
        debug!("GET {} -> {} bytes", url, body.len());
        Ok(body)
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::Fetch;
    use crate::error::ExtractError;

    /// Serves canned bodies; every other URL is unavailable. Records each request.
    #[derive(Default)]
    pub struct StaticFetcher {
        pages: HashMap<String, String>,
        requests: RefCell<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl Fetch for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
            self.requests.borrow_mut().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ExtractError::SourceUnavailable {
                    url: url.to_string(),
                    reason: "HTTP status client error (404 Not Found)".into(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn fetcher(timeout: Duration) -> HttpFetcher {
        HttpFetcher::new("dock_summary-test", timeout).unwrap()
    }

    #[tokio::test]
    async fn ok_body_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/job/ranked_poses.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Rank Score\n"))
            .mount(&server)
            .await;

        let url = format!("{}/job/ranked_poses.txt", server.uri());
        let body = fetcher(Duration::from_secs(5)).fetch(&url).await.unwrap();
        assert_eq!(body, "Rank Score\n");
    }

    #[tokio::test]
    async fn not_found_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/job/ranked_poses.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/job/ranked_poses.txt", server.uri());
        match fetcher(Duration::from_secs(5)).fetch(&url).await {
            Err(ExtractError::SourceUnavailable { url: failed, reason }) => {
                assert_eq!(failed, url);
                assert!(reason.contains("404"), "reason was {:?}", reason);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/job/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let url = format!("{}/job/", server.uri());
        let result = fetcher(Duration::from_millis(200)).fetch(&url).await;
        assert!(matches!(result, Err(ExtractError::SourceUnavailable { .. })));
    }
}
