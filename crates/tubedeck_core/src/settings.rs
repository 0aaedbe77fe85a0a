use crate::Job;

/// Submission parameters the user currently has selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub quality: String,
    pub format: String,
    pub folder: String,
    pub custom_name_prefix: String,
    pub playlist_strict_mode: bool,
    /// 0 means no limit.
    pub playlist_item_limit: u32,
    pub auto_start: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            quality: "best".to_string(),
            format: "any".to_string(),
            folder: String::new(),
            custom_name_prefix: String::new(),
            playlist_strict_mode: false,
            playlist_item_limit: 0,
            auto_start: true,
        }
    }
}

/// Arguments of one registry `add` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    pub url: String,
    pub settings: DownloadSettings,
}

impl AddRequest {
    pub fn new(url: impl Into<String>, settings: &DownloadSettings) -> Self {
        Self {
            url: url.into(),
            settings: settings.clone(),
        }
    }

    /// Re-submission of a finished or failed job with its original parameters.
    pub fn retry_of(job: &Job) -> Self {
        Self {
            url: job.url.clone(),
            settings: DownloadSettings {
                quality: job.quality.clone(),
                format: job.format.clone(),
                folder: job.folder.clone(),
                custom_name_prefix: job.custom_name_prefix.clone(),
                playlist_strict_mode: job.playlist_strict_mode,
                playlist_item_limit: job.playlist_item_limit,
                auto_start: true,
            },
        }
    }
}
