use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// One of the registry's job collections, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Queue,
    Done,
}

/// Body of an `add` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddRequest {
    pub url: String,
    pub quality: String,
    pub format: String,
    pub folder: String,
    pub custom_name_prefix: String,
    pub playlist_strict_mode: bool,
    pub playlist_item_limit: u32,
    pub auto_start: bool,
}

/// Structured answer of `add`, `delete` and `start`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RegistryReply {
    Ok {
        #[serde(default)]
        msg: Option<String>,
    },
    Error {
        #[serde(default)]
        msg: String,
    },
}

impl RegistryReply {
    pub fn ok() -> Self {
        Self::Ok { msg: None }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error { msg: msg.into() }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// A job as reported by the registry's history endpoint.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DownloadInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub quality: String,
    #[serde(deserialize_with = "null_as_default")]
    pub format: String,
    #[serde(deserialize_with = "null_as_default")]
    pub folder: String,
    #[serde(deserialize_with = "null_as_default")]
    pub custom_name_prefix: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    pub msg: Option<String>,
    pub percent: Option<f64>,
    pub speed: Option<f64>,
    pub eta: Option<f64>,
    pub filename: Option<String>,
    pub error: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub playlist_strict_mode: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub playlist_item_limit: u32,
}

impl DownloadInfo {
    /// Registry key of the entry. Entries are keyed by their URL.
    pub fn key(&self) -> &str {
        &self.url
    }
}

/// Snapshot of every registry collection.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct History {
    #[serde(deserialize_with = "null_as_default")]
    pub queue: Vec<DownloadInfo>,
    #[serde(deserialize_with = "null_as_default")]
    pub done: Vec<DownloadInfo>,
    /// Added without auto start; part of the queue from the client's point of view.
    #[serde(deserialize_with = "null_as_default")]
    pub pending: Vec<DownloadInfo>,
}

impl History {
    pub fn entries(&self, collection: Collection) -> Box<dyn Iterator<Item = &DownloadInfo> + '_> {
        match collection {
            Collection::Queue => Box::new(self.queue.iter().chain(self.pending.iter())),
            Collection::Done => Box::new(self.done.iter()),
        }
    }
}

/// The registry stores unset fields as `null`; read those as the default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid registry url: {0}")]
    InvalidBaseUrl(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("malformed registry response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Delete,
    Start,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Delete => write!(f, "delete"),
            CommandKind::Start => write!(f, "start"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// An import submission came back (or failed at the transport level).
    ImportSubmitted {
        run_id: u64,
        url: String,
        result: Result<RegistryReply, RegistryError>,
    },
    ImportDelayElapsed {
        run_id: u64,
    },
    AddFinished {
        url: String,
        result: Result<RegistryReply, RegistryError>,
    },
    CommandFinished {
        kind: CommandKind,
        result: Result<RegistryReply, RegistryError>,
    },
    HistoryLoaded(Result<History, RegistryError>),
}

#[cfg(test)]
mod tests {
    use super::{History, RegistryReply};

    #[test]
    fn reply_decodes_both_shapes() {
        let ok: RegistryReply = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(ok, RegistryReply::ok());
        let err: RegistryReply =
            serde_json::from_str(r#"{"status":"error","msg":"Unsupported resource \"x\""}"#)
                .unwrap();
        assert_eq!(err, RegistryReply::error("Unsupported resource \"x\""));
        assert!(serde_json::from_str::<RegistryReply>(r#"{"status":"maybe"}"#).is_err());
    }

    #[test]
    fn history_tolerates_missing_fields() {
        let history: History = serde_json::from_str(
            r#"{"queue":[{"url":"https://a.test","status":"downloading","speed":12.5,"size":null}]}"#,
        )
        .unwrap();
        assert_eq!(history.queue.len(), 1);
        assert_eq!(history.queue[0].speed, Some(12.5));
        assert!(history.done.is_empty());
        assert!(history.pending.is_empty());
    }

    #[test]
    fn history_reads_null_fields_as_defaults() {
        let history: History = serde_json::from_str(
            r#"{"queue":[],"pending":null,"done":[{"id":null,"title":null,"url":"https://a.test","quality":"best","format":"any","folder":null,"custom_name_prefix":null,"status":"error","playlist_strict_mode":null,"playlist_item_limit":null,"msg":null}]}"#,
        )
        .unwrap();
        assert!(history.pending.is_empty());
        let entry = &history.done[0];
        assert_eq!(entry.key(), "https://a.test");
        assert_eq!(entry.status, "error");
        assert_eq!(entry.folder, "");
        assert_eq!(entry.custom_name_prefix, "");
        assert_eq!(entry.title, "");
        assert_eq!(entry.id, "");
        assert_eq!(entry.playlist_item_limit, 0);
        assert!(!entry.playlist_strict_mode);
        assert_eq!(entry.msg, None);
    }
}
