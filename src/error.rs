//! Error types
//!
//! Only caller contract violations and I/O failures are errors. Degraded
//! predictions are ordinary values, see [`crate::ai::Prediction`].

use thiserror::Error;

/// Errors reported by the prediction entry points
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictError {
    #[error("invalid player side {0:?}, expected \"1P\" or \"2P\"")]
    InvalidSide(String),
}

/// Errors reported while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
