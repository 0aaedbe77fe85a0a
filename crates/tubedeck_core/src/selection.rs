use std::fmt;
use std::str::FromStr;

use crate::{Downloads, JobKey, JobMap, JobStatus};

/// Which URLs an export or copy draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlFilter {
    /// Every job in the queue.
    Pending,
    /// Finished jobs in done.
    Completed,
    /// Errored jobs in done.
    Failed,
    /// Queue followed by done, regardless of status.
    All,
}

impl UrlFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::All => "all",
        }
    }
}

impl fmt::Display for UrlFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrlFilter {
    type Err = SelectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "all" => Ok(Self::All),
            other => Err(SelectionError::UnknownFilter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("No URLs found for the selected filter.")]
    NoUrlsFound,
    #[error("unknown filter {0:?} (expected pending, completed, failed or all)")]
    UnknownFilter(String),
}

/// Ordered URL list for `filter`. An empty selection is an error.
pub fn select_urls(downloads: &Downloads, filter: UrlFilter) -> Result<Vec<String>, SelectionError> {
    let urls: Vec<String> = match filter {
        UrlFilter::Pending => urls_of(downloads.queue.values()),
        UrlFilter::Completed => urls_of(
            downloads
                .done
                .values()
                .filter(|job| job.has_status(JobStatus::Finished)),
        ),
        UrlFilter::Failed => urls_of(
            downloads
                .done
                .values()
                .filter(|job| job.has_status(JobStatus::Error)),
        ),
        UrlFilter::All => urls_of(downloads.queue.values().chain(downloads.done.values())),
    };

    if urls.is_empty() {
        return Err(SelectionError::NoUrlsFound);
    }
    Ok(urls)
}

pub fn url_list_text(urls: &[String]) -> String {
    urls.join("\n")
}

pub fn checked_keys(jobs: &JobMap) -> Vec<JobKey> {
    jobs.iter()
        .filter(|(_, job)| job.checked)
        .map(|(key, _)| key.clone())
        .collect()
}

pub fn keys_with_status(jobs: &JobMap, status: JobStatus) -> Vec<JobKey> {
    jobs.iter()
        .filter(|(_, job)| job.has_status(status))
        .map(|(key, _)| key.clone())
        .collect()
}

fn urls_of<'a>(jobs: impl Iterator<Item = &'a crate::Job>) -> Vec<String> {
    jobs.map(|job| job.url.clone()).collect()
}
