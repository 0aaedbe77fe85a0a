use std::time::Duration;

use crate::import::IMPORT_STEP_DELAY;
use crate::view_model::{AppViewModel, ImportView};
use crate::{DownloadMetrics, DownloadSettings, Downloads, ImportRun, RunId};

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    settings: DownloadSettings,
    downloads: Downloads,
    metrics: DownloadMetrics,
    import_open: bool,
    import_text: String,
    import_run: ImportRun,
    last_run_id: RunId,
    import_delay: Duration,
    add_url: String,
    add_in_progress: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            settings: DownloadSettings::default(),
            downloads: Downloads::default(),
            metrics: DownloadMetrics::default(),
            import_open: false,
            import_text: String::new(),
            import_run: ImportRun::idle(0),
            last_run_id: 0,
            import_delay: IMPORT_STEP_DELAY,
            add_url: String::new(),
            add_in_progress: false,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: DownloadSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_import_delay(mut self, delay: Duration) -> Self {
        self.import_delay = delay;
        self
    }

    pub fn view(&self) -> AppViewModel {
        let queue = &self.downloads.queue;
        let done = &self.downloads.done;
        AppViewModel {
            metrics: self.metrics,
            queue_len: queue.len(),
            done_len: done.len(),
            import: ImportView {
                open: self.import_open,
                text: self.import_text.clone(),
                status: self.import_run.status().to_string(),
                phase: self.import_run.phase(),
                in_progress: self.import_run.in_progress(),
                cursor: self.import_run.cursor(),
                total: self.import_run.total(),
            },
            add_url: self.add_url.clone(),
            add_in_progress: self.add_in_progress,
            queue_selected: queue.values().filter(|job| job.checked).count(),
            done_selected: done.values().filter(|job| job.checked).count(),
            can_clear_completed: self.metrics.completed > 0,
            can_clear_failed: self.metrics.failed > 0,
            can_retry_failed: self.metrics.failed > 0,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    pub fn downloads(&self) -> &Downloads {
        &self.downloads
    }

    pub fn metrics(&self) -> DownloadMetrics {
        self.metrics
    }

    pub fn import_run(&self) -> &ImportRun {
        &self.import_run
    }

    pub fn import_delay(&self) -> Duration {
        self.import_delay
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn replace_downloads(&mut self, downloads: Downloads) {
        self.metrics = DownloadMetrics::from_downloads(&downloads);
        self.downloads = downloads;
        self.mark_dirty();
    }

    pub(crate) fn set_settings(&mut self, settings: DownloadSettings) {
        self.settings = settings;
    }

    /// Shows the dialog. A run still in progress keeps going and keeps its text;
    /// otherwise the dialog starts over with a fresh idle run.
    pub(crate) fn open_import(&mut self) {
        self.import_open = true;
        self.mark_dirty();
        if self.import_run.in_progress() {
            return;
        }
        let run_id = self.allocate_run_id();
        self.import_open = true;
        self.import_text.clear();
        self.import_run = ImportRun::idle(run_id);
        self.mark_dirty();
    }

    pub(crate) fn close_import(&mut self) {
        self.import_open = false;
        self.mark_dirty();
    }

    pub(crate) fn set_import_text(&mut self, text: String) {
        self.import_text = text;
        self.mark_dirty();
    }

    pub(crate) fn import_text(&self) -> &str {
        &self.import_text
    }

    pub(crate) fn import_run_mut(&mut self) -> &mut ImportRun {
        &mut self.import_run
    }

    pub(crate) fn allocate_run_id(&mut self) -> RunId {
        self.last_run_id += 1;
        self.last_run_id
    }

    pub(crate) fn begin_import(&mut self, run: ImportRun) {
        self.import_run = run;
        self.mark_dirty();
    }

    pub(crate) fn add_url(&self) -> &str {
        &self.add_url
    }

    pub(crate) fn set_add_url(&mut self, url: String) {
        self.add_url = url;
        self.mark_dirty();
    }

    pub(crate) fn add_in_progress(&self) -> bool {
        self.add_in_progress
    }

    pub(crate) fn set_add_in_progress(&mut self, in_progress: bool) {
        self.add_in_progress = in_progress;
        self.mark_dirty();
    }
}
