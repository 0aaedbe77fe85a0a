use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tubedeck_engine::{
    AddRequest, Collection, EngineEvent, EngineEvents, EngineHandle, History, Registry,
    RegistryError, RegistryReply,
};

const WAIT: Duration = Duration::from_secs(5);

/// Registry double: answers after a short latency and records what it saw.
#[derive(Default)]
struct FakeRegistry {
    submitted: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[async_trait::async_trait]
impl Registry for FakeRegistry {
    async fn add(&self, request: &AddRequest) -> Result<RegistryReply, RegistryError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.submitted.lock().unwrap().push(request.url.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if request.url.contains("refused") {
            Err(RegistryError::Transport("connection refused".to_string()))
        } else if request.url.contains("bad") {
            Ok(RegistryReply::error("Unsupported resource"))
        } else {
            Ok(RegistryReply::ok())
        }
    }

    async fn delete_by_id(
        &self,
        _collection: Collection,
        _ids: &[String],
    ) -> Result<RegistryReply, RegistryError> {
        Ok(RegistryReply::ok())
    }

    async fn start_by_id(&self, _ids: &[String]) -> Result<RegistryReply, RegistryError> {
        Ok(RegistryReply::ok())
    }

    async fn history(&self) -> Result<History, RegistryError> {
        Ok(History::default())
    }
}

fn request(url: &str) -> AddRequest {
    AddRequest {
        url: url.to_string(),
        quality: "best".to_string(),
        format: "any".to_string(),
        folder: String::new(),
        custom_name_prefix: String::new(),
        playlist_strict_mode: false,
        playlist_item_limit: 0,
        auto_start: true,
    }
}

fn next_event(events: &EngineEvents) -> EngineEvent {
    events.recv_timeout(WAIT).expect("engine event")
}

#[test]
fn import_lane_never_overlaps_submissions() {
    deck_logging::initialize_for_tests();
    let registry = Arc::new(FakeRegistry::default());
    let (engine, events) = EngineHandle::new(registry.clone());

    for url in ["https://1.test", "https://bad.test", "https://refused.test"] {
        engine.submit_import(7, request(url));
    }

    let mut results = Vec::new();
    for _ in 0..3 {
        match next_event(&events) {
            EngineEvent::ImportSubmitted { run_id, url, result } => {
                assert_eq!(run_id, 7);
                results.push((url, result));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    engine.shutdown();

    assert_eq!(registry.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(
        *registry.submitted.lock().unwrap(),
        vec!["https://1.test", "https://bad.test", "https://refused.test"]
    );
    assert_eq!(results[0].1, Ok(RegistryReply::ok()));
    assert_eq!(results[1].1, Ok(RegistryReply::error("Unsupported resource")));
    assert_eq!(
        results[2].1,
        Err(RegistryError::Transport("connection refused".to_string()))
    );
}

#[test]
fn delay_is_measured_from_the_previous_completion() {
    deck_logging::initialize_for_tests();
    let (engine, events) = EngineHandle::new(Arc::new(FakeRegistry::default()));

    engine.submit_import(1, request("https://1.test"));
    engine.schedule_import_step(1, Duration::from_millis(80));
    assert!(matches!(
        next_event(&events),
        EngineEvent::ImportSubmitted { .. }
    ));
    let completed_at = Instant::now();
    match next_event(&events) {
        EngineEvent::ImportDelayElapsed { run_id } => assert_eq!(run_id, 1),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(completed_at.elapsed() >= Duration::from_millis(60));
    engine.shutdown();
}

#[test]
fn other_commands_report_back() {
    deck_logging::initialize_for_tests();
    let (engine, events) = EngineHandle::new(Arc::new(FakeRegistry::default()));

    engine.refresh();
    assert_eq!(
        next_event(&events),
        EngineEvent::HistoryLoaded(Ok(History::default()))
    );

    engine.add(request("https://bad.test"));
    assert_eq!(
        next_event(&events),
        EngineEvent::AddFinished {
            url: "https://bad.test".to_string(),
            result: Ok(RegistryReply::error("Unsupported resource")),
        }
    );
    engine.shutdown();
}
