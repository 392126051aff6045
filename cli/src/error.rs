//! Error types raised between parsing and running a command.

use thiserror::Error;

/// Validation failures after flag parsing succeeded.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The raw values do not deserialize into the schema type.
    #[error("invalid arguments: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// The schema's own `validate` check rejected the values.
    #[error("{0}")]
    Schema(String),
}

/// Why a dispatch stopped before the handler produced a result.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Parse(#[from] clap::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl DispatchError {
    /// Exit code reported for this error.
    pub fn exit_code(&self) -> i64 {
        match self {
            Self::Parse(err) => i64::from(err.exit_code()),
            Self::Validation(_) | Self::Runtime(_) => 1,
        }
    }
}
