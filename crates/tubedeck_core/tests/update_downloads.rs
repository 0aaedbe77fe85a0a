use pretty_assertions::assert_eq;
use tubedeck_core::{
    recompute, update, AppState, DownloadMetrics, Downloads, Job, JobMap, JobStatus, Msg,
    RegistryChange,
};

fn map(jobs: Vec<(&str, Job)>) -> JobMap {
    jobs.into_iter()
        .map(|(key, job)| (key.to_string(), job))
        .collect()
}

fn sample_downloads() -> Downloads {
    Downloads::new(
        map(vec![
            ("A", Job::new("https://a.test", JobStatus::Pending)),
            (
                "B",
                Job::new("https://b.test", JobStatus::Downloading).with_speed(100.0),
            ),
        ]),
        map(vec![
            ("C", Job::new("https://c.test", JobStatus::Finished)),
            ("D", Job::new("https://d.test", JobStatus::Error)),
        ]),
    )
}

fn changed(state: AppState, change: RegistryChange, downloads: Downloads) -> AppState {
    update(state, Msg::DownloadsChanged { change, downloads }).0
}

#[test]
fn one_job_per_bucket() {
    let downloads = sample_downloads();
    assert_eq!(
        recompute(&downloads.queue, &downloads.done),
        DownloadMetrics {
            active: 1,
            queued: 1,
            completed: 1,
            failed: 1,
            total_speed: 100.0,
        }
    );
}

#[test]
fn preparing_counts_active_but_adds_no_speed() {
    let queue = map(vec![
        (
            "p",
            Job::new("https://p.test", JobStatus::Preparing).with_speed(999.0),
        ),
        (
            "d1",
            Job::new("https://d1.test", JobStatus::Downloading).with_speed(250.5),
        ),
        ("d2", Job::new("https://d2.test", JobStatus::Downloading)),
    ]);
    let metrics = recompute(&queue, &JobMap::new());

    assert_eq!(metrics.active, 3);
    assert_eq!(metrics.queued, 0);
    assert_eq!(metrics.total_speed, 250.5);
}

#[test]
fn unclassified_jobs_count_toward_nothing() {
    let mut unknown = Job::new("https://u.test", JobStatus::Pending);
    unknown.status = None;
    let queue = map(vec![
        ("u", unknown.clone()),
        // A terminal status that has not moved to done yet.
        ("f", Job::new("https://f.test", JobStatus::Finished)),
        ("q", Job::new("https://q.test", JobStatus::Pending)),
    ]);
    let done = map(vec![
        ("u", unknown),
        ("x", Job::new("https://x.test", JobStatus::Downloading)),
    ]);
    let metrics = recompute(&queue, &done);

    assert!(metrics.active + metrics.queued <= queue.len());
    assert!(metrics.completed + metrics.failed <= done.len());
    assert_eq!(metrics.queued, 1);
    assert_eq!(metrics.active, 0);
    assert_eq!(metrics.completed + metrics.failed, 0);
}

#[test]
fn every_notification_recomputes_from_scratch() {
    let state = changed(AppState::new(), RegistryChange::QueueChanged, sample_downloads());
    assert_eq!(state.view().metrics.total_speed, 100.0);

    // In-place speed update of the downloading job.
    let mut downloads = sample_downloads();
    downloads.queue.get_mut("B").unwrap().speed = Some(40.0);
    let state = changed(state, RegistryChange::Updated, downloads.clone());
    assert_eq!(state.view().metrics.total_speed, 40.0);

    // Speed on a non-downloading job is ignored.
    downloads.queue.get_mut("A").unwrap().speed = Some(1_000.0);
    let state = changed(state, RegistryChange::Updated, downloads.clone());
    assert_eq!(state.view().metrics.total_speed, 40.0);

    // B finishes and moves to done.
    let mut finished = downloads.queue.remove("B").unwrap();
    finished.status = Some(JobStatus::Finished);
    downloads.done.insert("B", finished);
    let state = changed(state, RegistryChange::DoneChanged, downloads);
    let view = state.view();
    assert_eq!(view.metrics.active, 0);
    assert_eq!(view.metrics.completed, 2);
    assert_eq!(view.metrics.total_speed, 0.0);
    assert_eq!(view.queue_len, 1);
    assert_eq!(view.done_len, 3);
}

#[test]
fn done_panel_buttons_follow_counts() {
    let mut state = changed(AppState::new(), RegistryChange::DoneChanged, Downloads::default());
    assert!(state.consume_dirty());
    let view = state.view();
    assert!(!view.can_clear_completed);
    assert!(!view.can_clear_failed);
    assert!(!view.can_retry_failed);

    let state = changed(state, RegistryChange::DoneChanged, sample_downloads());
    let view = state.view();
    assert!(view.can_clear_completed);
    assert!(view.can_clear_failed);
    assert!(view.can_retry_failed);
}
