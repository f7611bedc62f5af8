//! Client settings stored as `config.toml` inside the app directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::app_dirs;

/// File name of the settings file inside the app directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable that overrides the configured backend URL.
pub const BACKEND_URL_ENV: &str = "BRAINSCAN_BACKEND_URL";
/// Backend used when nothing is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Errors that may occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The app directory could not be resolved or created.
    #[error("Unable to prepare config directory: {0}")]
    AppDir(#[from] app_dirs::AppDirError),
    /// Failed to read the settings file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write the settings file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML settings.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize settings to TOML.
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    /// The backend URL is not an absolute http(s) URL.
    #[error("Invalid backend URL {url:?}: {reason}")]
    InvalidBackendUrl { url: String, reason: String },
}

/// User-editable client settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Root URL of the inference service.
    pub backend_url: String,
    /// Seconds to wait for a TCP connection.
    pub connect_timeout_secs: u64,
    /// Seconds to wait for a response body; inference can be slow.
    pub request_timeout_secs: u64,
    /// Directory for run logs; defaults to `<app dir>/logs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
            log_dir: None,
        }
    }
}

impl ClientSettings {
    /// Parsed backend root URL.
    pub fn backend_url(&self) -> Result<Url, ConfigError> {
        parse_backend_url(&self.backend_url)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Resolve the settings file path inside the app directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load settings from disk, returning defaults if missing, then apply env overrides.
pub fn load_or_default() -> Result<ClientSettings, ConfigError> {
    let path = config_path()?;
    let mut settings = load_settings_from(&path)?;
    if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
        settings.backend_url = url;
    }
    settings.backend_url()?;
    Ok(settings)
}

/// Write a default `config.toml` on first run so there is a file to edit.
///
/// Returns the path when a file was created.
pub fn write_defaults_if_missing() -> Result<Option<PathBuf>, ConfigError> {
    write_defaults_at(&config_path()?)
}

fn write_defaults_at(path: &Path) -> Result<Option<PathBuf>, ConfigError> {
    if path.exists() {
        return Ok(None);
    }
    save_settings_to_path(&ClientSettings::default(), path)?;
    Ok(Some(path.to_path_buf()))
}

fn load_settings_from(path: &Path) -> Result<ClientSettings, ConfigError> {
    if !path.exists() {
        return Ok(ClientSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

fn save_settings_to_path(
    settings: &ClientSettings,
    path: &Path,
) -> Result<(), ConfigError> {
    let data = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBackendUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other}"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}
