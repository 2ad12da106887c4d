//! Most-recently-used file list.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::IoError;

/// Default number of remembered files.
pub const DEFAULT_RECENT_FILES: usize = 5;

/// Recently opened or saved files, newest first, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentFiles {
    files: Vec<PathBuf>,
    capacity: usize,
}

impl Default for RecentFiles {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_FILES)
    }
}

impl RecentFiles {
    /// Empty list holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            files: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Move `path` to the front, dropping the oldest entry beyond capacity.
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.files.retain(|p| p != &path);
        self.files.insert(0, path);
        self.files.truncate(self.capacity);
    }

    /// Forget `path`. Returns `true` if it was listed.
    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.files.len();
        self.files.retain(|p| p != path);
        self.files.len() != before
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Entries, newest first.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing is listed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check that a listed file still exists before opening it.
    ///
    /// A missing file is dropped from the list and reported as [`IoError::Missing`]; an
    /// existing one moves to the front.
    pub fn touch(&mut self, path: &Path) -> Result<(), IoError> {
        if !path.exists() {
            self.remove(path);
            debug!(path = %path.display(), "recent file missing");
            return Err(IoError::Missing(path.to_path_buf()));
        }
        self.push(path);
        Ok(())
    }

    /// Read a persisted list. A missing file yields an empty list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
        let mut list: Self = serde_json::from_str(&json)?;
        list.capacity = list.capacity.max(1);
        list.files.truncate(list.capacity);
        Ok(list)
    }

    /// Persist the list as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| IoError::io(path, e))
    }
}
