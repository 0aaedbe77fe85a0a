use std::collections::HashMap;
use std::fmt;

/// Registry key of a job. The registry keys jobs by their resolved URL.
pub type JobKey = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Preparing,
    Downloading,
    Finished,
    Error,
}

impl JobStatus {
    /// Maps a registry status string. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "preparing" => Some(Self::Preparing),
            "downloading" => Some(Self::Downloading),
            "finished" => Some(Self::Finished),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Downloading => "downloading",
            Self::Finished => "finished",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One download job as mirrored from the registry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Job {
    pub url: String,
    pub quality: String,
    pub format: String,
    pub folder: String,
    pub custom_name_prefix: String,
    pub playlist_strict_mode: bool,
    pub playlist_item_limit: u32,
    pub status: Option<JobStatus>,
    /// Bytes per second; only meaningful while downloading.
    pub speed: Option<f64>,
    pub checked: bool,
    pub filename: Option<String>,
}

impl Job {
    pub fn new(url: impl Into<String>, status: JobStatus) -> Self {
        Self {
            url: url.into(),
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn has_status(&self, status: JobStatus) -> bool {
        self.status == Some(status)
    }
}

/// Insertion-ordered key to job map.
///
/// Re-inserting an existing key replaces the job but keeps its position.
/// Lookups go through a key to position index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobMap {
    entries: Vec<(JobKey, Job)>,
    index: HashMap<JobKey, usize>,
}

impl JobMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<JobKey>, job: Job) -> Option<Job> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&idx) => Some(std::mem::replace(&mut self.entries[idx].1, job)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, job));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Job> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Job> {
        let idx = *self.index.get(key)?;
        Some(&mut self.entries[idx].1)
    }

    pub fn remove(&mut self, key: &str) -> Option<Job> {
        let idx = self.index.remove(key)?;
        let (_, job) = self.entries.remove(idx);
        for (later, _) in &self.entries[idx..] {
            if let Some(pos) = self.index.get_mut(later) {
                *pos -= 1;
            }
        }
        Some(job)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JobKey, &Job)> {
        self.entries.iter().map(|(key, job)| (key, job))
    }

    pub fn keys(&self) -> impl Iterator<Item = &JobKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Job> {
        self.entries.iter().map(|(_, job)| job)
    }
}

impl FromIterator<(JobKey, Job)> for JobMap {
    fn from_iter<I: IntoIterator<Item = (JobKey, Job)>>(iter: I) -> Self {
        let mut map = JobMap::new();
        for (key, job) in iter {
            map.insert(key, job);
        }
        map
    }
}

/// Names one of the two registry collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Queue,
    Done,
}

impl ListKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queue => "queue",
            Self::Done => "done",
        }
    }
}

/// Mirror of the registry's two collections.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Downloads {
    pub queue: JobMap,
    pub done: JobMap,
}

impl Downloads {
    pub fn new(queue: JobMap, done: JobMap) -> Self {
        Self { queue, done }
    }

    pub fn list(&self, kind: ListKind) -> &JobMap {
        match kind {
            ListKind::Queue => &self.queue,
            ListKind::Done => &self.done,
        }
    }
}
