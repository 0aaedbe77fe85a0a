use crate::selection::{checked_keys, keys_with_status, select_urls, url_list_text};
use crate::{
    AddOrigin, AddRequest, AppState, Effect, ImportError, ImportRun, ImportStep, JobStatus,
    ListKind, Msg, SubmissionOutcome,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::DownloadsChanged { change: _, downloads } => {
            state.replace_downloads(downloads);
            Vec::new()
        }
        Msg::SettingsChanged(settings) => {
            state.set_settings(settings);
            Vec::new()
        }
        Msg::ImportOpened => {
            state.open_import();
            Vec::new()
        }
        Msg::ImportClosed => {
            state.close_import();
            Vec::new()
        }
        Msg::ImportTextChanged(text) => {
            state.set_import_text(text);
            Vec::new()
        }
        Msg::ImportStartClicked => start_import(&mut state),
        Msg::ImportCancelClicked => {
            if state.import_run_mut().request_cancel() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ImportSubmissionCompleted {
            run_id,
            url,
            outcome,
        } => {
            if run_id != state.import_run().run_id() || !state.import_run_mut().complete_submission()
            {
                return (state, Vec::new());
            }
            state.mark_dirty();

            let mut effects = Vec::with_capacity(2);
            // Transport failures are only logged by the shell; the run continues either way.
            if let SubmissionOutcome::Rejected { msg } = outcome {
                effects.push(Effect::Alert(format!("Error adding URL {url}: {msg}")));
            }
            effects.push(Effect::ScheduleImportStep {
                run_id,
                delay: state.import_delay(),
            });
            effects
        }
        Msg::ImportDelayElapsed { run_id } => {
            if run_id != state.import_run().run_id() {
                return (state, Vec::new());
            }
            import_step(&mut state)
        }
        Msg::AddUrlChanged(url) => {
            state.set_add_url(url);
            Vec::new()
        }
        Msg::AddUrlSubmitted => {
            let url = state.add_url().trim().to_string();
            if url.is_empty() || state.add_in_progress() {
                return (state, Vec::new());
            }
            state.set_add_in_progress(true);
            vec![Effect::AddDownload {
                origin: AddOrigin::Input,
                request: AddRequest::new(url, state.settings()),
            }]
        }
        Msg::AddCompleted {
            origin,
            url: _,
            outcome,
        } => {
            if origin == AddOrigin::Input {
                state.set_add_in_progress(false);
                if outcome == SubmissionOutcome::Accepted {
                    state.set_add_url(String::new());
                }
            }
            match outcome {
                SubmissionOutcome::Rejected { msg } => {
                    vec![Effect::Alert(format!("Error adding URL: {msg}"))]
                }
                SubmissionOutcome::Accepted | SubmissionOutcome::TransportFailed { .. } => {
                    Vec::new()
                }
            }
        }
        Msg::ExportClicked(filter) => match select_urls(state.downloads(), filter) {
            Ok(urls) => vec![Effect::ExportUrls {
                filter,
                content: url_list_text(&urls),
            }],
            Err(err) => vec![Effect::Alert(err.to_string())],
        },
        Msg::CopyClicked(filter) => match select_urls(state.downloads(), filter) {
            Ok(urls) => vec![Effect::CopyUrls {
                filter,
                content: url_list_text(&urls),
            }],
            Err(err) => vec![Effect::Alert(err.to_string())],
        },
        Msg::StartClicked { key } => vec![Effect::StartByKeys { keys: vec![key] }],
        Msg::DeleteClicked { list, key } => vec![Effect::DeleteByKeys {
            list,
            keys: vec![key],
        }],
        Msg::RetryClicked { key } => retry(&state, vec![key]),
        Msg::StartSelectedClicked => {
            let keys = checked_keys(&state.downloads().queue);
            non_empty(keys, |keys| Effect::StartByKeys { keys })
        }
        Msg::DeleteSelectedClicked(list) => {
            let keys = checked_keys(state.downloads().list(list));
            non_empty(keys, |keys| Effect::DeleteByKeys { list, keys })
        }
        Msg::ClearCompletedClicked => {
            let keys = keys_with_status(&state.downloads().done, JobStatus::Finished);
            non_empty(keys, |keys| Effect::DeleteByKeys {
                list: ListKind::Done,
                keys,
            })
        }
        Msg::ClearFailedClicked => {
            let keys = keys_with_status(&state.downloads().done, JobStatus::Error);
            non_empty(keys, |keys| Effect::DeleteByKeys {
                list: ListKind::Done,
                keys,
            })
        }
        Msg::RetryFailedClicked => {
            let keys = keys_with_status(&state.downloads().done, JobStatus::Error);
            retry(&state, keys)
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_import(state: &mut AppState) -> Vec<Effect> {
    if state.import_run().in_progress() {
        return vec![Effect::Alert(ImportError::AlreadyRunning.to_string())];
    }
    let run_id = state.allocate_run_id();
    match ImportRun::start(run_id, state.import_text()) {
        Ok(run) => {
            state.begin_import(run);
            import_step(state)
        }
        Err(err) => vec![Effect::Alert(err.to_string())],
    }
}

/// Runs one scheduling step and turns a submission into an effect.
///
/// Settings are read here, so changes made mid-run apply to later URLs.
fn import_step(state: &mut AppState) -> Vec<Effect> {
    let before = state.import_run().phase();
    let step = state.import_run_mut().step();
    if state.import_run().phase() != before {
        state.mark_dirty();
    }
    match step {
        ImportStep::Submit { url } => vec![Effect::SubmitImportUrl {
            run_id: state.import_run().run_id(),
            request: AddRequest::new(url, state.settings()),
        }],
        ImportStep::Stopped => Vec::new(),
    }
}

/// Re-adds each done job with its own parameters, then removes the old entries.
fn retry(state: &AppState, keys: Vec<String>) -> Vec<Effect> {
    let done = &state.downloads().done;
    let mut retried = Vec::with_capacity(keys.len());
    let mut effects = Vec::with_capacity(keys.len() + 1);
    for key in keys {
        if let Some(job) = done.get(&key) {
            effects.push(Effect::AddDownload {
                origin: AddOrigin::Retry,
                request: AddRequest::retry_of(job),
            });
            retried.push(key);
        }
    }
    if !retried.is_empty() {
        effects.push(Effect::DeleteByKeys {
            list: ListKind::Done,
            keys: retried,
        });
    }
    effects
}

fn non_empty(keys: Vec<String>, effect: impl FnOnce(Vec<String>) -> Effect) -> Vec<Effect> {
    if keys.is_empty() {
        Vec::new()
    } else {
        vec![effect(keys)]
    }
}
