//! Best score persisted across sessions as a plain-text integer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{info, warn};

use crate::error::{Error, Result};

pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<platform data dir>/car-runner/high_score`.
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "car-runner").ok_or(Error::NoDataDir)?;
        Ok(Self::at(dirs.data_dir().join("high_score")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored score. A missing file is 0; so is unreadable content, with a warning.
    pub fn load(&self) -> Result<u32> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(Error::HighScore {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        match text.trim().parse() {
            Ok(score) => Ok(score),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt high score");
                Ok(0)
            }
        }
    }

    pub fn save(&self, score: u32) -> Result<()> {
        let io_err = |source| Error::HighScore {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        fs::write(&self.path, score.to_string()).map_err(io_err)
    }

    /// Save `score` if it beats the stored one. Returns whether it did.
    pub fn record(&self, score: u32) -> Result<bool> {
        if score <= self.load()? {
            return Ok(false);
        }
        self.save(score)?;
        info!(score, "new high score");
        Ok(true)
    }
}
