//! Filesystem locations

use std::path::PathBuf;

use crate::constants;

/// Root configuration directory (`~/.perspicacity`)
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(constants::ui::CONFIG_DIR_NAME)
}

/// Directory for log files
pub fn logs_dir() -> PathBuf {
    config_dir().join(constants::ui::LOGS_DIR_NAME)
}

/// Location of `config.toml`
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Location of the credential store
pub fn credentials_file() -> PathBuf {
    config_dir().join("credentials.json")
}
