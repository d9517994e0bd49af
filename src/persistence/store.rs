//! Snapshot stores: where session progress lives between restarts

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tracing::debug;

use super::{SessionSnapshot, STATE_KEY};
use crate::error::{Result, WorkoutError};

/// Key-value persistence for the single session snapshot
///
/// `load` returns `Ok(None)` when nothing is stored and a JSON error when the
/// stored value is malformed. I/O failures surface as errors on every path.
pub trait SnapshotStore: Send {
    fn load(&self) -> Result<Option<SessionSnapshot>>;
    fn save(&self, snapshot: &SessionSnapshot) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON file store under a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(format!("{}.json", STATE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<SessionSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let snapshot = serde_json::from_str(&contents)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;

        debug!("Saved session snapshot to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            debug!("Removed session snapshot {}", self.path.display());
        }
        Ok(())
    }
}

/// In-memory store holding the serialized snapshot
///
/// Clones share the same slot, so a caller can keep a handle and inspect
/// what the session wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding the given raw value
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    /// The raw stored value, if any
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.slot
            .lock()
            .map_err(|e| WorkoutError::Lock(format!("Failed to lock memory store: {}", e)))
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<SessionSnapshot>> {
        match self.lock()?.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        *self.lock()? = Some(json);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}
