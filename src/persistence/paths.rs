//! Filesystem locations for persisted data

use std::path::PathBuf;

use directories::ProjectDirs;

/// Default data directory (~/.local/share/atg-workout on Linux).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "atg-workout").map(|dirs| dirs.data_dir().to_path_buf())
}
