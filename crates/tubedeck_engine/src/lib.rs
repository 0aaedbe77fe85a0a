//! Tubedeck engine: registry IO, the serialized import lane and URL list export.
mod engine;
mod export;
mod http;
mod registry;
mod types;

pub use engine::{EngineEvents, EngineHandle};
pub use export::{export_url_list, ExportError};
pub use http::{HttpRegistry, RegistrySettings};
pub use registry::{EntryFilter, Registry};
pub use types::{
    AddRequest, Collection, CommandKind, DownloadInfo, EngineEvent, History, RegistryError,
    RegistryReply,
};
