//! Tubedeck core: pure state machine, download metrics and batch import sequencing.
mod effect;
mod import;
mod job;
mod metrics;
mod msg;
mod selection;
mod settings;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use import::{
    parse_import_urls, ImportError, ImportPhase, ImportRun, ImportStep, RunId, IMPORT_STEP_DELAY,
};
pub use job::{Downloads, Job, JobKey, JobMap, JobStatus, ListKind};
pub use metrics::{recompute, DownloadMetrics};
pub use msg::{AddOrigin, Msg, RegistryChange, SubmissionOutcome};
pub use selection::{
    checked_keys, keys_with_status, select_urls, url_list_text, SelectionError, UrlFilter,
};
pub use settings::{AddRequest, DownloadSettings};
pub use state::AppState;
pub use update::update;
pub use view_model::{AppViewModel, ImportView};
