use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use reqwest::Url;
use tracing::warn;

use crate::model::JobSpec;

/// Read the job list. An unreadable file is fatal; bad lines are skipped.
pub fn load_jobs(path: &Path) -> Result<Vec<JobSpec>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job list {}", path.display()))?;
    Ok(parse_jobs(&text))
}

/// Parse `<complex_id> <base_url>` lines, ignoring blanks and `#` comments.
pub fn parse_jobs(text: &str) -> Vec<JobSpec> {
    let mut seen = HashSet::new();
    let mut jobs = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let lineno = i + 1;

        let mut parts = line.split_whitespace();
        let (Some(id), Some(url), None) = (parts.next(), parts.next(), parts.next()) else {
            warn!("line {}: expected `<complex_id> <base_url>`; skipped", lineno);
            continue;
        };

        match Url::parse(url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => {
                warn!("line {}: {:?} is not an absolute http(s) URL; skipped", lineno, url);
                continue;
            }
        }

        if !seen.insert(id.to_string()) {
            warn!("line {}: duplicate complex id {}; skipped", lineno, id);
            continue;
        }

        jobs.push(JobSpec::new(id, url));
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes() {
        let text = "# complexes for run 3\n\
                    \n\
                    1ABC https://hdock.example.org/data/1abc/\n\
                    2XYZ\thttps://hdock.example.org/data/2xyz\n";
        let jobs = parse_jobs(text);
        assert_eq!(
            jobs,
            vec![
                JobSpec::new("1ABC", "https://hdock.example.org/data/1abc"),
                JobSpec::new("2XYZ", "https://hdock.example.org/data/2xyz"),
            ]
        );
        assert_eq!(jobs[0].base_url, "https://hdock.example.org/data/1abc");
    }

    #[test]
    fn bad_lines_skipped() {
        let text = "lonely\n\
                    3DEF not-a-url\n\
                    4GHI https://a.example/x extra\n\
                    5JKL ftp://a.example/x\n\
                    6MNO https://a.example/6mno\n\
                    6MNO https://a.example/other\n";
        let jobs = parse_jobs(text);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].complex_id, "6MNO");
        assert_eq!(jobs[0].base_url, "https://a.example/6mno");
    }

    #[test]
    fn empty_list() {
        assert!(parse_jobs("").is_empty());
        assert!(parse_jobs("# nothing\n\n").is_empty());
    }

    #[test]
    fn missing_file_is_error() {
        assert!(load_jobs(Path::new("tests/fixtures/does_not_exist.txt")).is_err());
    }
}
