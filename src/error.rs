use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Host-side failures. Gameplay itself never errors; a lost run is
/// `GameMode::GameOver`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    #[error("unknown variant {0:?} (expected classic, rally or boss_run)")]
    UnknownVariant(String),

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("could not determine a data directory")]
    NoDataDir,

    #[error("high score file {path}: {source}")]
    HighScore {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
