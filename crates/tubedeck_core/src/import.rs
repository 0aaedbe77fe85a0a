use std::time::Duration;

/// Pause between the completion of one submission and the next step.
pub const IMPORT_STEP_DELAY: Duration = Duration::from_millis(1000);

/// Generation number of an import run. Events tagged with an older id are stale.
pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportPhase {
    /// No run has been started since the dialog was opened.
    #[default]
    Idle,
    /// One URL has been handed to the registry and its result is outstanding.
    Submitting,
    /// The next scheduling step is pending.
    AwaitingDelay,
    Cancelled,
    Finished,
}

impl ImportPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Finished)
    }
}

/// What the caller must do after a scheduling step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStep {
    Submit { url: String },
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("No valid URLs found.")]
    EmptyInput,
    #[error("An import is already in progress.")]
    AlreadyRunning,
}

/// One batch import, from `start` to its terminal phase.
///
/// Invariant: `in_progress()` holds exactly while a submission is outstanding
/// or the next step is pending; both terminal phases clear it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportRun {
    run_id: RunId,
    urls: Vec<String>,
    cursor: usize,
    cancel_requested: bool,
    phase: ImportPhase,
    status: String,
}

impl ImportRun {
    pub fn idle(run_id: RunId) -> Self {
        Self {
            run_id,
            ..Self::default()
        }
    }

    /// Parses `raw` and arms a run whose first step is pending.
    pub fn start(run_id: RunId, raw: &str) -> Result<Self, ImportError> {
        let urls = parse_import_urls(raw);
        if urls.is_empty() {
            return Err(ImportError::EmptyInput);
        }
        let status = format!("Starting to import {} URLs...", urls.len());
        Ok(Self {
            run_id,
            urls,
            cursor: 0,
            cancel_requested: false,
            phase: ImportPhase::AwaitingDelay,
            status,
        })
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.urls.len()
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    pub fn in_progress(&self) -> bool {
        matches!(
            self.phase,
            ImportPhase::Submitting | ImportPhase::AwaitingDelay
        )
    }

    /// Flags the run for cancellation. Returns false when nothing is running.
    ///
    /// An outstanding submission is not interrupted; the flag is only
    /// consulted by the next `step`.
    pub fn request_cancel(&mut self) -> bool {
        if !self.in_progress() {
            return false;
        }
        if !self.cancel_requested {
            self.cancel_requested = true;
            self.status.push_str(" Cancelling...");
        }
        true
    }

    /// One scheduling step. Cancellation is checked before the cursor bound.
    pub fn step(&mut self) -> ImportStep {
        if self.phase != ImportPhase::AwaitingDelay {
            return ImportStep::Stopped;
        }
        let total = self.urls.len();

        if self.cancel_requested {
            self.status = format!(
                "Import cancelled after {} of {} URLs.",
                self.cursor, total
            );
            self.phase = ImportPhase::Cancelled;
            return ImportStep::Stopped;
        }

        if self.cursor >= total {
            self.status = format!("Finished importing {total} URLs.");
            self.phase = ImportPhase::Finished;
            return ImportStep::Stopped;
        }

        let url = self.urls[self.cursor].clone();
        self.status = format!("Importing URL {} of {}: {}", self.cursor + 1, total, url);
        self.phase = ImportPhase::Submitting;
        ImportStep::Submit { url }
    }

    /// Records the end of the outstanding submission, whatever its outcome.
    ///
    /// Returns false when no submission was outstanding.
    pub fn complete_submission(&mut self) -> bool {
        if self.phase != ImportPhase::Submitting {
            return false;
        }
        self.cursor += 1;
        self.phase = ImportPhase::AwaitingDelay;
        true
    }
}

/// Splits on line boundaries (`\n` or `\r\n`), trims, drops blank lines.
pub fn parse_import_urls(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_handles_crlf_and_blank_lines() {
        let urls = parse_import_urls("https://a.test\r\n\r\n  https://b.test  \r\n   \n");
        assert_eq!(urls, vec!["https://a.test", "https://b.test"]);
    }

    #[test]
    fn start_rejects_blank_input() {
        assert_eq!(ImportRun::start(1, " \n\r\n\t"), Err(ImportError::EmptyInput));
    }

    #[test]
    fn cancel_is_ignored_when_idle() {
        let mut run = ImportRun::idle(3);
        assert!(!run.request_cancel());
        assert_eq!(run.status(), "");
        assert!(!run.cancel_requested());
    }

    #[test]
    fn step_walks_every_url_then_finishes() {
        let mut run = ImportRun::start(1, "a\nb\n").unwrap();
        assert_eq!(run.status(), "Starting to import 2 URLs...");

        assert_eq!(run.step(), ImportStep::Submit { url: "a".into() });
        assert_eq!(run.status(), "Importing URL 1 of 2: a");
        // A second step while submitting is refused.
        assert_eq!(run.step(), ImportStep::Stopped);
        assert!(run.complete_submission());

        assert_eq!(run.step(), ImportStep::Submit { url: "b".into() });
        assert!(run.complete_submission());
        assert!(!run.complete_submission());

        assert_eq!(run.step(), ImportStep::Stopped);
        assert_eq!(run.phase(), ImportPhase::Finished);
        assert_eq!(run.status(), "Finished importing 2 URLs.");
        assert!(!run.in_progress());
    }

    #[test]
    fn cancel_after_last_submission_still_reports_cancelled() {
        let mut run = ImportRun::start(1, "only").unwrap();
        run.step();
        run.complete_submission();
        assert!(run.request_cancel());

        assert_eq!(run.step(), ImportStep::Stopped);
        assert_eq!(run.phase(), ImportPhase::Cancelled);
        assert_eq!(run.status(), "Import cancelled after 1 of 1 URLs.");
    }

    #[test]
    fn repeated_cancel_appends_marker_once() {
        let mut run = ImportRun::start(1, "a\nb").unwrap();
        run.step();
        assert!(run.request_cancel());
        assert!(run.request_cancel());
        assert_eq!(run.status(), "Importing URL 1 of 2: a Cancelling...");
    }
}
