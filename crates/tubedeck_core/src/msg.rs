use crate::{Downloads, DownloadSettings, JobKey, ListKind, RunId, UrlFilter};

/// Which registry notification prompted a re-read of the collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryChange {
    QueueChanged,
    DoneChanged,
    /// A job's fields changed in place without a membership change.
    Updated,
}

/// Result of one registry `add` call as seen by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted,
    /// The registry answered with an error status.
    Rejected { msg: String },
    /// No structured answer arrived.
    TransportFailed { error: String },
}

/// Who asked for a single `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOrigin {
    /// The main URL input.
    Input,
    /// Re-submission of a job from the done list.
    Retry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The registry collections were re-read after a change notification.
    DownloadsChanged {
        change: RegistryChange,
        downloads: Downloads,
    },
    /// User changed quality, format, folder or other submission settings.
    SettingsChanged(DownloadSettings),
    /// User opened the batch import dialog.
    ImportOpened,
    /// User closed the batch import dialog. A running import keeps going.
    ImportClosed,
    /// User edited the batch import text.
    ImportTextChanged(String),
    ImportStartClicked,
    ImportCancelClicked,
    /// Registry answered (or failed to answer) an import submission.
    ImportSubmissionCompleted {
        run_id: RunId,
        url: String,
        outcome: SubmissionOutcome,
    },
    /// The pause after a submission has elapsed.
    ImportDelayElapsed { run_id: RunId },
    /// User edited the single URL input.
    AddUrlChanged(String),
    AddUrlSubmitted,
    AddCompleted {
        origin: AddOrigin,
        url: String,
        outcome: SubmissionOutcome,
    },
    ExportClicked(UrlFilter),
    CopyClicked(UrlFilter),
    StartClicked { key: JobKey },
    DeleteClicked { list: ListKind, key: JobKey },
    RetryClicked { key: JobKey },
    /// Start every checked job in the queue.
    StartSelectedClicked,
    DeleteSelectedClicked(ListKind),
    ClearCompletedClicked,
    ClearFailedClicked,
    RetryFailedClicked,
    NoOp,
}
