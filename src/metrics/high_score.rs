//! Persisted best score
//!
//! Stored as a single decimal integer in a text file. A missing or unreadable
//! file counts as 0, and a recorded score only replaces a strictly lower one.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where drivers keep the all-time best score
pub trait HighScoreStore {
    /// Current best, 0 when nothing usable is stored
    fn load(&self) -> u32;

    /// Store `score` if it beats the current best. Returns true when stored.
    fn record(&self, score: u32) -> Result<bool>;
}

#[derive(Debug, Clone)]
pub struct FileHighScore {
    path: PathBuf,
}

impl FileHighScore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScore {
    fn load(&self) -> u32 {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => return 0,
        };

        match text.trim().parse() {
            Ok(score) => score,
            Err(err) => {
                warn!(path = ?self.path, error = %err, "high score file is unreadable, using 0");
                0
            }
        }
    }

    fn record(&self, score: u32) -> Result<bool> {
        if score <= self.load() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }
        std::fs::write(&self.path, score.to_string())
            .with_context(|| format!("Failed to write high score to {:?}", self.path))?;

        info!(score, "new high score");
        Ok(true)
    }
}
