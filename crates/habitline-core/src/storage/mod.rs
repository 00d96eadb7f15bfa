mod config;
pub mod database;
pub mod migrations;

pub use config::{AccountConfig, CalendarConfig, Config, DisplayConfig};
pub use database::HabitDb;

use std::path::PathBuf;

use crate::error::Result;

/// Returns the directory holding `habitline.db` and `config.toml`.
///
/// `HABITLINE_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/habitline[-dev]/`, with `HABITLINE_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("HABITLINE_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HABITLINE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitline-dev")
            } else {
                base_dir.join("habitline")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
