use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};
use std::path::PathBuf;

use deck_logging::{deck_debug, deck_info, deck_warn};
use tubedeck_core::{
    AddOrigin, Downloads, Effect, Job, JobMap, JobStatus, ListKind, Msg, RegistryChange,
    SubmissionOutcome,
};
use tubedeck_engine::{
    Collection, DownloadInfo, EngineEvent, EngineHandle, History, RegistryError, RegistryReply,
};

/// Runs core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    export_dir: PathBuf,
    export_filename: String,
    /// Origins of single adds still in flight, per URL.
    add_origins: HashMap<String, VecDeque<AddOrigin>>,
    pending_adds: usize,
    pending_commands: usize,
    refresh_pending: bool,
    /// A refresh was requested while another one was in flight.
    refresh_stale: bool,
    last_refresh_error: Option<RegistryError>,
    alerts: Vec<String>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, export_dir: PathBuf, export_filename: String) -> Self {
        Self {
            engine,
            export_dir,
            export_filename,
            add_origins: HashMap::new(),
            pending_adds: 0,
            pending_commands: 0,
            refresh_pending: false,
            refresh_stale: false,
            last_refresh_error: None,
            alerts: Vec::new(),
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitImportUrl { run_id, request } => {
                    deck_info!("Import run {} submitting {}", run_id, request.url);
                    self.engine.submit_import(run_id, to_engine_request(request));
                }
                Effect::ScheduleImportStep { run_id, delay } => {
                    self.engine.schedule_import_step(run_id, delay);
                }
                Effect::AddDownload { origin, request } => {
                    deck_info!("Adding {} ({:?})", request.url, origin);
                    self.add_origins
                        .entry(request.url.clone())
                        .or_default()
                        .push_back(origin);
                    self.pending_adds += 1;
                    self.engine.add(to_engine_request(request));
                }
                Effect::DeleteByKeys { list, keys } => {
                    deck_info!("Deleting {} job(s) from {}", keys.len(), list.as_str());
                    self.pending_commands += 1;
                    self.engine.delete(to_collection(list), keys);
                }
                Effect::StartByKeys { keys } => {
                    deck_info!("Starting {} job(s)", keys.len());
                    self.pending_commands += 1;
                    self.engine.start(keys);
                }
                Effect::ExportUrls { filter, content } => {
                    match tubedeck_engine::export_url_list(
                        &self.export_dir,
                        &self.export_filename,
                        &content,
                    ) {
                        Ok(path) => println!(
                            "Exported {} {} URL(s) to {}",
                            content.lines().count(),
                            filter,
                            path.display()
                        ),
                        Err(err) => self.alert(format!("Error exporting URLs: {err}")),
                    }
                }
                Effect::CopyUrls { filter, content } => {
                    deck_debug!("Copying {} URL list", filter);
                    match copy_url_list(&mut io::stdout().lock(), &content) {
                        Ok(()) => eprintln!("URLs copied to clipboard."),
                        Err(err) => {
                            deck_warn!("Writing the URL list failed: {}", err);
                            self.alert("Failed to copy URLs.".to_string());
                        }
                    }
                }
                Effect::Alert(message) => self.alert(message),
            }
        }
    }

    /// Asks the engine for a fresh history snapshot unless one is already on its way.
    pub fn request_refresh(&mut self) {
        if self.refresh_pending {
            self.refresh_stale = true;
            return;
        }
        self.refresh_pending = true;
        self.engine.refresh();
    }

    /// Nothing issued by this runner is still waiting for an answer.
    pub fn is_idle(&self) -> bool {
        self.pending_adds == 0 && self.pending_commands == 0 && !self.refresh_pending
    }

    pub fn take_refresh_error(&mut self) -> Option<RegistryError> {
        self.last_refresh_error.take()
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Maps an engine event to the message the core expects. `current` is the
    /// mirror the core holds right now.
    pub fn translate(&mut self, event: EngineEvent, current: &Downloads) -> Option<Msg> {
        match event {
            EngineEvent::ImportSubmitted {
                run_id,
                url,
                result,
            } => {
                let outcome = to_outcome(result);
                if let SubmissionOutcome::TransportFailed { error } = &outcome {
                    deck_warn!("Import submission of {} failed: {}", url, error);
                }
                Some(Msg::ImportSubmissionCompleted {
                    run_id,
                    url,
                    outcome,
                })
            }
            EngineEvent::ImportDelayElapsed { run_id } => Some(Msg::ImportDelayElapsed { run_id }),
            EngineEvent::AddFinished { url, result } => {
                self.pending_adds = self.pending_adds.saturating_sub(1);
                let origin = self
                    .add_origins
                    .get_mut(&url)
                    .and_then(VecDeque::pop_front)
                    .unwrap_or(AddOrigin::Input);
                if self.add_origins.get(&url).is_some_and(VecDeque::is_empty) {
                    self.add_origins.remove(&url);
                }
                let outcome = to_outcome(result);
                match &outcome {
                    SubmissionOutcome::Accepted => self.request_refresh(),
                    SubmissionOutcome::TransportFailed { error } => {
                        deck_warn!("Adding {} failed: {}", url, error);
                    }
                    SubmissionOutcome::Rejected { .. } => {}
                }
                Some(Msg::AddCompleted {
                    origin,
                    url,
                    outcome,
                })
            }
            EngineEvent::CommandFinished { kind, result } => {
                self.pending_commands = self.pending_commands.saturating_sub(1);
                match result {
                    Ok(RegistryReply::Ok { .. }) => deck_debug!("Registry {} accepted", kind),
                    Ok(RegistryReply::Error { msg }) => {
                        self.alert(format!("Registry refused {kind}: {msg}"));
                    }
                    Err(err) => deck_warn!("Registry {} failed: {}", kind, err),
                }
                self.request_refresh();
                None
            }
            EngineEvent::HistoryLoaded(result) => {
                self.refresh_pending = false;
                if std::mem::take(&mut self.refresh_stale) {
                    self.request_refresh();
                }
                match result {
                    Ok(history) => {
                        let downloads = downloads_from_history(&history, current);
                        let change = classify_change(current, &downloads);
                        Some(Msg::DownloadsChanged { change, downloads })
                    }
                    Err(err) => {
                        deck_warn!("Reading registry history failed: {}", err);
                        self.last_refresh_error = Some(err);
                        None
                    }
                }
            }
        }
    }

    fn alert(&mut self, message: String) {
        eprintln!("tubedeck: {message}");
        self.alerts.push(message);
    }
}

/// Stdout stands in for the clipboard in the CLI.
fn copy_url_list(out: &mut impl Write, content: &str) -> io::Result<()> {
    writeln!(out, "{content}")?;
    out.flush()
}

fn to_engine_request(request: tubedeck_core::AddRequest) -> tubedeck_engine::AddRequest {
    let settings = request.settings;
    tubedeck_engine::AddRequest {
        url: request.url,
        quality: settings.quality,
        format: settings.format,
        folder: settings.folder,
        custom_name_prefix: settings.custom_name_prefix,
        playlist_strict_mode: settings.playlist_strict_mode,
        playlist_item_limit: settings.playlist_item_limit,
        auto_start: settings.auto_start,
    }
}

fn to_collection(list: ListKind) -> Collection {
    match list {
        ListKind::Queue => Collection::Queue,
        ListKind::Done => Collection::Done,
    }
}

fn to_outcome(result: Result<RegistryReply, RegistryError>) -> SubmissionOutcome {
    match result {
        Ok(RegistryReply::Ok { .. }) => SubmissionOutcome::Accepted,
        Ok(RegistryReply::Error { msg }) => SubmissionOutcome::Rejected { msg },
        Err(err) => SubmissionOutcome::TransportFailed {
            error: err.to_string(),
        },
    }
}

/// Builds the core mirror from a history snapshot. The `checked` flag only
/// lives on the client and is carried over from `previous`.
fn downloads_from_history(history: &History, previous: &Downloads) -> Downloads {
    let map = |collection: Collection, previous: &JobMap| -> JobMap {
        history
            .entries(collection)
            .map(|info| {
                let checked = previous
                    .get(info.key())
                    .is_some_and(|job| job.checked);
                (info.key().to_string(), to_job(info, checked))
            })
            .collect()
    };
    Downloads::new(
        map(Collection::Queue, &previous.queue),
        map(Collection::Done, &previous.done),
    )
}

fn to_job(info: &DownloadInfo, checked: bool) -> Job {
    Job {
        url: info.url.clone(),
        quality: info.quality.clone(),
        format: info.format.clone(),
        folder: info.folder.clone(),
        custom_name_prefix: info.custom_name_prefix.clone(),
        playlist_strict_mode: info.playlist_strict_mode,
        playlist_item_limit: info.playlist_item_limit,
        status: JobStatus::parse(&info.status),
        speed: info.speed,
        checked,
        filename: info.filename.clone(),
    }
}

fn classify_change(previous: &Downloads, next: &Downloads) -> RegistryChange {
    let same_keys = |a: &JobMap, b: &JobMap| a.keys().eq(b.keys());
    if !same_keys(&previous.queue, &next.queue) {
        RegistryChange::QueueChanged
    } else if !same_keys(&previous.done, &next.done) {
        RegistryChange::DoneChanged
    } else {
        RegistryChange::Updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(url: &str, status: &str) -> DownloadInfo {
        DownloadInfo {
            url: url.to_string(),
            status: status.to_string(),
            quality: "720".to_string(),
            format: "mp4".to_string(),
            ..DownloadInfo::default()
        }
    }

    #[test]
    fn history_maps_pending_into_queue_and_keeps_checks() {
        let history = History {
            queue: vec![info("https://a", "downloading")],
            done: vec![info("https://c", "error")],
            pending: vec![info("https://b", "pending")],
        };
        let previous = Downloads::new(
            JobMap::new(),
            [("https://c".to_string(), Job::new("https://c", JobStatus::Error).with_checked(true))]
                .into_iter()
                .collect(),
        );

        let downloads = downloads_from_history(&history, &previous);
        let queue: Vec<&String> = downloads.queue.keys().collect();
        assert_eq!(queue, ["https://a", "https://b"]);
        let failed = downloads.done.get("https://c").unwrap();
        assert!(failed.checked);
        assert_eq!(failed.status, Some(JobStatus::Error));
        assert_eq!(failed.quality, "720");
    }

    #[test]
    fn unknown_status_is_unclassified() {
        let job = to_job(&info("https://a", "paused"), false);
        assert_eq!(job.status, None);
    }

    #[test]
    fn change_kind_follows_membership() {
        let one: JobMap = [("a".to_string(), Job::new("a", JobStatus::Pending))]
            .into_iter()
            .collect();
        let moved = Downloads::new(JobMap::new(), one.clone());
        let queued = Downloads::new(one.clone(), JobMap::new());

        assert_eq!(
            classify_change(&Downloads::default(), &queued),
            RegistryChange::QueueChanged
        );
        assert_eq!(
            classify_change(&Downloads::default(), &moved),
            RegistryChange::DoneChanged
        );
        assert_eq!(classify_change(&queued, &queued), RegistryChange::Updated);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn copied_list_ends_with_a_newline() {
        let mut out = Vec::new();
        copy_url_list(&mut out, "https://a\nhttps://b").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "https://a\nhttps://b\n");
    }

    #[test]
    fn copy_reports_write_failures() {
        let err = copy_url_list(&mut ClosedPipe, "https://a").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn replies_map_to_outcomes() {
        assert_eq!(to_outcome(Ok(RegistryReply::ok())), SubmissionOutcome::Accepted);
        assert_eq!(
            to_outcome(Ok(RegistryReply::error("bad url"))),
            SubmissionOutcome::Rejected {
                msg: "bad url".to_string()
            }
        );
        assert!(matches!(
            to_outcome(Err(RegistryError::HttpStatus(502))),
            SubmissionOutcome::TransportFailed { .. }
        ));
    }
}
