use crate::{DownloadMetrics, ImportPhase};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportView {
    pub open: bool,
    pub text: String,
    pub status: String,
    pub phase: ImportPhase,
    pub in_progress: bool,
    pub cursor: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub metrics: DownloadMetrics,
    pub queue_len: usize,
    pub done_len: usize,
    pub import: ImportView,
    pub add_url: String,
    pub add_in_progress: bool,
    pub queue_selected: usize,
    pub done_selected: usize,
    pub can_clear_completed: bool,
    pub can_clear_failed: bool,
    pub can_retry_failed: bool,
    pub dirty: bool,
}
