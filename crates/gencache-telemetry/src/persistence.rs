//! Snapshot persistence layer
//!
//! Provides file-based persistence for learned state with:
//! - Whole-document JSON snapshots, overwritten on every save
//! - Atomic replacement (temp file + rename) so readers never see half a write
//! - Tolerant reads: a missing or unreadable file is reported, not raised

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for snapshot persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path of the snapshot document
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Pretty-print the JSON document
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            pretty: true,
        }
    }
}

impl PersistenceConfig {
    /// Config writing to `path` with default formatting
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: path.into(),
            ..Default::default()
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("./gencache-memory.json")
}

fn default_true() -> bool {
    true
}

/// Result of reading a snapshot document
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotRead {
    /// No file at the configured path
    Missing,

    /// Parsed JSON document
    Loaded(Value),

    /// File exists but could not be read or parsed
    Corrupt(String),
}

/// Snapshot document on disk
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    config: PersistenceConfig,
}

impl SnapshotFile {
    /// Create a handle for the configured snapshot path
    pub fn new(config: PersistenceConfig) -> Self {
        Self { config }
    }

    /// Path of the snapshot document
    pub fn path(&self) -> &Path {
        &self.config.snapshot_path
    }

    /// Read and parse the snapshot document
    pub fn read(&self) -> SnapshotRead {
        let content = match std::fs::read_to_string(self.path()) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return SnapshotRead::Missing,
            Err(e) => return SnapshotRead::Corrupt(e.to_string()),
        };

        match serde_json::from_str(&content) {
            Ok(value) => SnapshotRead::Loaded(value),
            Err(e) => SnapshotRead::Corrupt(e.to_string()),
        }
    }

    /// Atomically replace the snapshot document with `value`
    pub fn write(&self, value: &Value) -> std::io::Result<()> {
        let path = self.path();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot.json".to_string());
        let tmp_path = dir.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        let result = self.write_to(&tmp_path, value);
        if let Err(e) = result {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }

        std::fs::rename(&tmp_path, path)?;
        debug!("Snapshot written to {:?}", path);
        Ok(())
    }

    fn write_to(&self, tmp_path: &Path, value: &Value) -> std::io::Result<()> {
        let file = File::create(tmp_path)?;
        let mut writer = BufWriter::new(file);

        if self.config.pretty {
            serde_json::to_writer_pretty(&mut writer, value)?;
        } else {
            serde_json::to_writer(&mut writer, value)?;
        }

        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}
