//! Per-user storage locations.
//!
//! The store reads no config files, flags or environment variables; the
//! only input is the platform's application-data directory.

use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "ChecklistNotes";
pub const DB_FILE_NAME: &str = "app.db";
pub const LOG_DIR_NAME: &str = "logs";

/// Application data directory, e.g. `~/.local/share/ChecklistNotes` on
/// Linux or `%APPDATA%\ChecklistNotes` on Windows.
///
/// Returns `None` when the home directory cannot be resolved.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .map(|dir| dir.join(APP_DIR_NAME))
}

/// Database file used by `Store::open_default`.
pub fn default_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(DB_FILE_NAME))
}

/// Directory for rolling log files.
pub fn default_log_dir() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(LOG_DIR_NAME))
}
