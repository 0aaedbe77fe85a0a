use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use deck_logging::deck_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tubedeck_core::DownloadSettings;
use tubedeck_engine::RegistrySettings;

use crate::cli::Cli;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Submission parameters used when nothing else is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadDefaults {
    pub quality: String,
    pub format: String,
    pub folder: String,
    pub custom_name_prefix: String,
    pub playlist_strict_mode: bool,
    pub playlist_item_limit: u32,
    pub auto_start: bool,
}

impl Default for DownloadDefaults {
    fn default() -> Self {
        let settings = DownloadSettings::default();
        Self {
            quality: settings.quality,
            format: settings.format,
            folder: settings.folder,
            custom_name_prefix: settings.custom_name_prefix,
            playlist_strict_mode: settings.playlist_strict_mode,
            playlist_item_limit: settings.playlist_item_limit,
            auto_start: settings.auto_start,
        }
    }
}

impl DownloadDefaults {
    pub fn to_settings(&self) -> DownloadSettings {
        DownloadSettings {
            quality: self.quality.clone(),
            format: self.format.clone(),
            folder: self.folder.clone(),
            custom_name_prefix: self.custom_name_prefix.clone(),
            playlist_strict_mode: self.playlist_strict_mode,
            playlist_item_limit: self.playlist_item_limit,
            auto_start: self.auto_start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub request_timeout_secs: u64,
    pub import_delay_ms: u64,
    pub refresh_interval_ms: u64,
    pub export_dir: PathBuf,
    pub export_filename: String,
    pub defaults: DownloadDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8081/".to_string(),
            request_timeout_secs: 10,
            import_delay_ms: 1000,
            refresh_interval_ms: 1000,
            export_dir: PathBuf::from("."),
            export_filename: "tubedeck_urls.txt".to_string(),
            defaults: DownloadDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Command line flags win over the file.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(server) = &cli.server {
            self.server_url = server.clone();
        }
        if let Some(quality) = &cli.quality {
            self.defaults.quality = quality.clone();
        }
        if let Some(format) = &cli.format {
            self.defaults.format = format.clone();
        }
        if let Some(folder) = &cli.folder {
            self.defaults.folder = folder.clone();
        }
        if let Some(prefix) = &cli.prefix {
            self.defaults.custom_name_prefix = prefix.clone();
        }
        if cli.no_auto_start {
            self.defaults.auto_start = false;
        }
    }

    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            base_url: self.server_url.clone(),
            request_timeout: self.request_timeout(),
            ..RegistrySettings::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn import_delay(&self) -> Duration {
        Duration::from_millis(self.import_delay_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// Loads the RON config at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            deck_info!("No config at {:?}; using defaults", path);
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
