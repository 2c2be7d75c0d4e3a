//! Runtime configuration (not gameplay tuning).
//!
//! Precedence, lowest first: built-in defaults, the TOML file, environment
//! variables, then command-line flags applied by the binary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::Viewport;
use crate::error::{Error, Result};
use crate::tuning::Tuning;

pub const VARIANT_VAR: &str = "CAR_RUNNER_VARIANT";
pub const FRAME_MS_VAR: &str = "CAR_RUNNER_FRAME_MS";
pub const LOG_FILE_VAR: &str = "CAR_RUNNER_LOG";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Classic,
    Rally,
    #[default]
    BossRun,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Classic, Variant::Rally, Variant::BossRun];

    pub fn tuning(self) -> Tuning {
        match self {
            Variant::Classic => Tuning::classic(),
            Variant::Rally => Tuning::rally(),
            Variant::BossRun => Tuning::boss_run(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Rally => "rally",
            Variant::BossRun => "boss_run",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "classic" => Ok(Variant::Classic),
            "rally" => Ok(Variant::Rally),
            "boss_run" | "boss" => Ok(Variant::BossRun),
            _ => Err(Error::UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub variant: Variant,
    /// Length of one simulation frame in milliseconds.
    pub frame_ms: u64,
    pub world_width: f32,
    pub world_height: f32,
    /// Overrides the platform data directory location.
    pub high_score_file: Option<PathBuf>,
    pub log_file: PathBuf,
    /// Replaces the variant preset entirely when present.
    pub tuning: Option<Tuning>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            frame_ms: 16,
            world_width: 1200.0,
            world_height: 600.0,
            high_score_file: None,
            log_file: PathBuf::from("car_runner.log"),
            tuning: None,
        }
    }
}

impl Config {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Apply `CAR_RUNNER_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(VARIANT_VAR) {
            self.variant = value.parse().map_err(|_| Error::Env {
                var: VARIANT_VAR,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(FRAME_MS_VAR) {
            self.frame_ms = match value.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(Error::Env {
                        var: FRAME_MS_VAR,
                        value,
                    })
                }
            };
        }
        if let Some(value) = lookup(LOG_FILE_VAR) {
            self.log_file = PathBuf::from(value);
        }
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.world_width,
            height: self.world_height,
        }
    }

    /// The tuning a run should use, validated.
    pub fn resolve_tuning(&self) -> Result<Tuning> {
        let tuning = match &self.tuning {
            Some(custom) => custom.clone(),
            None => self.variant.tuning(),
        };
        tuning.validate()?;
        tuning.validate_viewport(self.viewport())?;
        Ok(tuning)
    }
}
