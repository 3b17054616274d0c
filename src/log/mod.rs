//! JSON commit log.
//!
//! The log is a single JSON array on disk. Every append rewrites the whole
//! file: read, push, write. Elements this crate does not understand are
//! carried through untouched, and an unreadable file is treated as empty.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::grid::{format_timestamp, CommitRequest};
use crate::ports::FileSystem;

/// One logged commit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitLogEntry {
    /// `YYYY-MM-DD HH:MM:SS`.
    pub date: String,
    /// Week column, when the request came from the grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<u32>,
    /// Day row, when the request came from the grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<u32>,
}

impl CommitLogEntry {
    /// Entry describing `request`.
    #[must_use]
    pub fn for_request(request: &CommitRequest) -> Self {
        Self {
            date: format_timestamp(request.timestamp),
            x: request.coordinate.map(|c| c.week),
            y: request.coordinate.map(|c| c.day),
        }
    }
}

/// Errors writing the log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The updated array could not be written.
    #[error("failed to write commit log {path}: {source}")]
    Write {
        /// Log file path.
        path: PathBuf,
        /// Underlying filesystem error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The updated array could not be serialized.
    #[error("failed to serialize commit log: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read-modify-write access to the log file through the `FileSystem` port.
pub struct CommitLog<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> CommitLog<'a> {
    /// Opens the log at `path`. Nothing is read until first use.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, path: &Path) -> Self {
        Self {
            fs,
            path: path.to_path_buf(),
        }
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Vec<Value> {
        if !self.fs.exists(&self.path) {
            return Vec::new();
        }
        let path = self.path.display();
        let contents = match self.fs.read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(%path, error = %e, "commit log unreadable, starting empty");
                return Vec::new();
            }
        };
        if contents.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<Vec<Value>>(&contents) {
            Ok(items) => items,
            Err(e) => {
                warn!(%path, error = %e, "commit log is not a JSON array, starting empty");
                Vec::new()
            }
        }
    }

    /// Every well-formed entry in file order.
    ///
    /// Elements that do not look like entries are skipped.
    #[must_use]
    pub fn read_all(&self) -> Vec<CommitLogEntry> {
        self.read_raw()
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect()
    }

    /// Appends `entry` and rewrites the file.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] if the file cannot be written.
    pub fn append(&self, entry: &CommitLogEntry) -> Result<(), LogError> {
        let mut items = self.read_raw();
        items.push(serde_json::to_value(entry)?);
        let mut text = serde_json::to_string_pretty(&items)?;
        text.push('\n');
        self.fs
            .write(&self.path, &text)
            .map_err(|source| LogError::Write {
                path: self.path.clone(),
                source,
            })?;
        let path = self.path.display();
        debug!(%path, date = %entry.date, total = items.len(), "commit logged");
        Ok(())
    }
}
