mod config;
pub mod database;
pub mod migrations;

pub use config::{BreathConfig, Config, FontSize, NewsConfig, VocabConfig};
pub use database::{Database, SessionStats};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the pocketkit data directory.
///
/// `POCKETKIT_HOME` overrides the location outright. Otherwise this is
/// `~/.config/pocketkit[-dev]/`, with `POCKETKIT_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("POCKETKIT_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("POCKETKIT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pocketkit-dev")
            } else {
                base_dir.join("pocketkit")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
