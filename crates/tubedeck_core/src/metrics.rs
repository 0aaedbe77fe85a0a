use crate::{Downloads, JobMap, JobStatus};

/// Aggregate counters derived from the registry collections.
///
/// Always recomputed from scratch; nothing is carried over between snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DownloadMetrics {
    /// Queue jobs that are `downloading` or `preparing`.
    pub active: usize,
    /// Queue jobs that are `pending`.
    pub queued: usize,
    /// Done jobs that are `finished`.
    pub completed: usize,
    /// Done jobs that are `error`.
    pub failed: usize,
    /// Sum of `speed` over `downloading` queue jobs, in bytes per second.
    pub total_speed: f64,
}

impl DownloadMetrics {
    pub fn from_downloads(downloads: &Downloads) -> Self {
        recompute(&downloads.queue, &downloads.done)
    }
}

/// Classifies every job of both collections by status.
///
/// Jobs with an absent or unknown status count toward no bucket.
pub fn recompute(queue: &JobMap, done: &JobMap) -> DownloadMetrics {
    let mut metrics = DownloadMetrics::default();

    for job in queue.values() {
        match job.status {
            Some(JobStatus::Downloading) => {
                metrics.active += 1;
                metrics.total_speed += job.speed.unwrap_or(0.0);
            }
            Some(JobStatus::Preparing) => metrics.active += 1,
            Some(JobStatus::Pending) => metrics.queued += 1,
            _ => {}
        }
    }

    for job in done.values() {
        match job.status {
            Some(JobStatus::Finished) => metrics.completed += 1,
            Some(JobStatus::Error) => metrics.failed += 1,
            _ => {}
        }
    }

    metrics
}
