use std::time::Duration;

use crate::{AddOrigin, AddRequest, JobKey, ListKind, RunId, UrlFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand one import URL to the registry; answer with `Msg::ImportSubmissionCompleted`.
    SubmitImportUrl { run_id: RunId, request: AddRequest },
    /// Wait `delay`, then answer with `Msg::ImportDelayElapsed`.
    ScheduleImportStep { run_id: RunId, delay: Duration },
    /// Single add outside an import; answer with `Msg::AddCompleted`.
    AddDownload { origin: AddOrigin, request: AddRequest },
    DeleteByKeys { list: ListKind, keys: Vec<JobKey> },
    StartByKeys { keys: Vec<JobKey> },
    ExportUrls { filter: UrlFilter, content: String },
    CopyUrls { filter: UrlFilter, content: String },
    /// Blocking, user-visible notification.
    Alert(String),
}
