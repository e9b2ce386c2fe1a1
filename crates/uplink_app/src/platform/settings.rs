use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use uplink_engine::ClientSettings;
use uplink_logging::uplink_info;

/// Settings file contents. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct AppSettings {
    pub server: String,
    pub upload_path: String,
    pub status_path: String,
    pub file_field: String,
    pub connect_timeout_secs: u64,
    pub upload_timeout_secs: Option<u64>,
    pub chunk_size: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            server: client.base_url,
            upload_path: client.upload_path,
            status_path: client.status_path,
            file_field: client.file_field,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            upload_timeout_secs: client.upload_timeout.map(|timeout| timeout.as_secs()),
            chunk_size: client.chunk_size,
        }
    }
}

impl AppSettings {
    pub fn into_client_settings(self) -> ClientSettings {
        ClientSettings {
            base_url: self.server,
            upload_path: self.upload_path,
            status_path: self.status_path,
            file_field: self.file_field,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            upload_timeout: self.upload_timeout_secs.map(Duration::from_secs),
            chunk_size: self.chunk_size,
        }
    }
}

/// Loads settings from `path`, or defaults when no file was given.
pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<AppSettings> {
    let Some(path) = path else {
        return Ok(AppSettings::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    let settings: AppSettings = ron::from_str(&content)
        .with_context(|| format!("failed to parse settings from {}", path.display()))?;
    uplink_info!("Loaded settings from {:?}", path);
    Ok(settings)
}
