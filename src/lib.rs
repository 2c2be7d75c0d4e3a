pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod high_score;
pub mod tuning;

pub use error::{Error, Result};
