//! High score persistence
//!
//! A single number in a text file. Only the first whitespace-separated token
//! is read, so the file may carry anything after it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Best score so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighScore {
    pub score: u64,
}

impl HighScore {
    pub fn new(score: u64) -> Self {
        Self { score }
    }

    /// Parse the leading number of `text`
    pub fn parse(path: &Path, text: &str) -> Result<Self, LoadError> {
        text.split_whitespace()
            .next()
            .and_then(|token| token.parse::<u64>().ok())
            .map(Self::new)
            .ok_or_else(|| LoadError::BadHighScore {
                path: path.to_path_buf(),
                text: text.lines().next().unwrap_or_default().to_string(),
            })
    }

    /// Load from disk. A missing or unreadable file is an error.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let high = Self::parse(path, &text)?;
        log::info!("High score {} from {}", high.score, path.display());
        Ok(high)
    }

    pub fn save(&self, path: &Path) -> Result<(), LoadError> {
        std::fs::write(path, format!("{}\n", self.score)).map_err(|e| LoadError::io(path, e))?;
        log::info!("High score {} saved", self.score);
        Ok(())
    }

    /// Record `score` if it beats the current best. Returns true if it did.
    pub fn submit(&mut self, score: u64) -> bool {
        if score > self.score {
            self.score = score;
            true
        } else {
            false
        }
    }
}
