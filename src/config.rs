use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INPUT: &str = "hdock_urls.txt";
pub const DEFAULT_OUTPUT: &str = "compiled_hdock_results.xlsx";

pub const PLAINTEXT_NAME: &str = "ranked_poses.txt";
pub const ARCHIVE_NAME: &str = "all_results.tar.gz";
pub const SHEET_NAME: &str = "Summary";

pub const USER_AGENT: &str = "Mozilla/5.0 Chrome/126";
pub const DELAY_MS: u64 = 1000;
pub const TIMEOUT_SECS: u64 = 20;

/// Upper bound on ranked models kept per job.
pub const MAX_ROWS: usize = 10;

/// Runtime settings for a batch run, assembled from CLI flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub json: Option<PathBuf>,
    pub delay: Duration,
    pub fetch: FetchSettings,
}

/// How a single job is fetched; shared by `compile` and `inspect`.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub user_agent: String,
    pub endpoints: Endpoints,
}

/// File names tried under a job's base URL, in priority order.
///
/// An empty name means the base URL itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub plaintext: Vec<String>,
    pub html: Vec<String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            plaintext: vec![PLAINTEXT_NAME.to_string()],
            html: vec![String::new()],
        }
    }
}

impl Endpoints {
    /// Append operator-supplied alternates, skipping names already present.
    pub fn with_extra(mut self, plaintext: &[String], html: &[String]) -> Self {
        for name in plaintext {
            if !self.plaintext.contains(name) {
                self.plaintext.push(name.clone());
            }
        }
        for name in html {
            if !self.html.contains(name) {
                self.html.push(name.clone());
            }
        }
        self
    }
}

/// Join a file name onto a normalized base URL (no trailing slash).
pub fn endpoint(base_url: &str, name: &str) -> String {
    if name.is_empty() {
        format!("{}/", base_url)
    } else {
        format!("{}/{}", base_url, name)
    }
}

pub fn archive_url(base_url: &str) -> String {
    endpoint(base_url, ARCHIVE_NAME)
}
