//! Durable whole-store snapshots.
//!
//! One file mirrors the entire story mapping in the same representation a
//! full export uses; every write replaces the previous snapshot outright.
//! The adapter reports failures as values; deciding that a failed restore
//! means "start empty" is the vault's call, not this module's.

use crate::store::StoryMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from snapshot IO.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed persistence adapter for the story vault.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Adapter reading and writing the given file.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the stored snapshot.
    ///
    /// `Ok(None)` means no snapshot has been written yet.
    pub fn load(&self) -> Result<Option<StoryMap>, SnapshotError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let stories: StoryMap = serde_json::from_str(&content)?;
        tracing::debug!(
            "restored {} stories from {}",
            stories.len(),
            self.path.display()
        );
        Ok(Some(stories))
    }

    /// Serialize the whole mapping and replace the previous snapshot.
    pub fn save(&self, stories: &StoryMap) -> Result<(), SnapshotError> {
        let content = serde_json::to_string_pretty(stories)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, content)?;
        tracing::debug!("wrote snapshot to {}", self.path.display());
        Ok(())
    }
}

/// Conventional snapshot file name inside a data directory.
pub fn default_snapshot_path(base_dir: impl AsRef<Path>) -> PathBuf {
    base_dir.as_ref().join("stories.json")
}
