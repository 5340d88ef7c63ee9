use crate::config::ConfigError;
use std::path::{Path, PathBuf};

pub const GLOBAL_STATE_DIR: &str = ".opsdesk";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "settings.yaml";
pub const REQUEST_DATABASE_FILE_NAME: &str = "requests.sqlite3";

pub fn default_state_root() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    Ok(default_state_root()?.join(GLOBAL_SETTINGS_FILE_NAME))
}

pub fn request_database_path(state_root: &Path) -> PathBuf {
    state_root.join(REQUEST_DATABASE_FILE_NAME)
}
