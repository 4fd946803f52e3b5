//! Value table persistence
//!
//! Tables are stored as a JSON document holding metadata plus a list of
//! `{state, values}` entries (state keys are structs, so they cannot be JSON
//! object keys). Drivers only see the [`TableStore`] trait.
//!
//! A missing file means "no table yet". A file that cannot be parsed is
//! logged and treated the same way, so training starts over from a fresh
//! table rather than aborting.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::encoder::StateKey;
use super::q_table::{ActionValues, QTable};
use crate::error::SnakeError;

/// Metadata saved with the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Grid side length the state keys refer to
    pub grid_size: usize,

    /// Number of training episodes that shaped this table
    pub episodes_trained: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl TableMetadata {
    pub fn new(grid_size: usize, episodes_trained: usize) -> Self {
        Self {
            grid_size,
            episodes_trained,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Fail unless the table was built for `grid_size`
    pub fn ensure_grid(&self, grid_size: usize) -> Result<(), SnakeError> {
        if self.grid_size != grid_size {
            return Err(SnakeError::GridSizeMismatch {
                expected: grid_size,
                found: self.grid_size,
            });
        }
        Ok(())
    }
}

/// A table together with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTable {
    pub table: QTable,
    pub metadata: TableMetadata,
}

/// Where a driver reads and writes its value table
pub trait TableStore {
    /// Load the stored table, or `None` when there is nothing usable
    fn load(&self) -> Result<Option<StoredTable>>;

    fn save(&self, table: &QTable, metadata: &TableMetadata) -> Result<()>;

    /// Snapshot taken during a long run. Defaults to a regular save.
    fn checkpoint(&self, table: &QTable, metadata: &TableMetadata) -> Result<()> {
        self.save(table, metadata)
    }
}

#[derive(Serialize, Deserialize)]
struct TableEntry {
    state: StateKey,
    values: ActionValues,
}

#[derive(Serialize, Deserialize)]
struct TableDocument {
    metadata: TableMetadata,
    entries: Vec<TableEntry>,
}

/// Table store backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonTableStore {
    path: PathBuf,
}

impl JsonTableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Same store format at another path, e.g. for checkpoints
    pub fn sibling(&self, file_name: &str) -> Self {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        Self::new(dir.join(file_name))
    }
}

impl TableStore for JsonTableStore {
    fn load(&self) -> Result<Option<StoredTable>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read value table from {:?}", self.path))
            }
        };

        let document: TableDocument = match serde_json::from_str(&json) {
            Ok(document) => document,
            Err(err) => {
                warn!(path = ?self.path, error = %err, "value table is unreadable, ignoring it");
                return Ok(None);
            }
        };

        let table: QTable = document
            .entries
            .into_iter()
            .map(|entry| (entry.state, entry.values))
            .collect();

        info!(
            path = ?self.path,
            states = table.len(),
            episodes_trained = document.metadata.episodes_trained,
            "loaded value table"
        );

        Ok(Some(StoredTable {
            table,
            metadata: document.metadata,
        }))
    }

    fn save(&self, table: &QTable, metadata: &TableMetadata) -> Result<()> {
        // Create parent directories if needed
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let mut entries: Vec<TableEntry> = table
            .iter()
            .map(|(state, values)| TableEntry {
                state: state.clone(),
                values: *values,
            })
            .collect();
        // Stable file contents for identical tables
        entries.sort_by(|a, b| a.state.cmp(&b.state));

        let document = TableDocument {
            metadata: metadata.clone(),
            entries,
        };
        let json = serde_json::to_string(&document).context("Failed to serialize value table")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write value table to {:?}", self.path))?;

        Ok(())
    }

    /// Writes `checkpoint_ep{N}.json` next to the main file
    fn checkpoint(&self, table: &QTable, metadata: &TableMetadata) -> Result<()> {
        let checkpoint = self.sibling(&format!("checkpoint_ep{}.json", metadata.episodes_trained));
        checkpoint.save(table, metadata)?;
        info!(path = ?checkpoint.path(), "checkpoint saved");
        Ok(())
    }
}
