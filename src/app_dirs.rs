//! Where brainscan keeps its settings and run logs.
//!
//! Everything lives in one `.brainscan` folder under the OS config directory,
//! or under `BRAINSCAN_CONFIG_HOME` when that is set.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory that lives under the config base.
pub const APP_DIR_NAME: &str = ".brainscan";
/// Environment variable that replaces the OS config directory as the base.
pub const CONFIG_HOME_ENV: &str = "BRAINSCAN_CONFIG_HOME";
const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No config directory found for brainscan settings and logs")]
    NoBaseDir,
    #[error("Failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The `.brainscan` directory, created on first use.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = config_base_dir().ok_or(AppDirError::NoBaseDir)?;
    root_under(&base)
}

/// Default directory for run logs, created on first use.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    logs_under(&app_root_dir()?)
}

/// Create `path` and its parents when missing.
pub fn ensure_dir(path: &Path) -> Result<(), AppDirError> {
    std::fs::create_dir_all(path).map_err(|source| AppDirError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn root_under(base: &Path) -> Result<PathBuf, AppDirError> {
    let root = base.join(APP_DIR_NAME);
    ensure_dir(&root)?;
    Ok(root)
}

fn logs_under(root: &Path) -> Result<PathBuf, AppDirError> {
    let logs = root.join(LOGS_DIR_NAME);
    ensure_dir(&logs)?;
    Ok(logs)
}

fn config_base_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_HOME_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    }
}
