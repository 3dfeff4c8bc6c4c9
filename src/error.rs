use std::path::PathBuf;

use thiserror::Error;

/// Every way a transpile run can fail. All variants are fatal for the run.
#[derive(Error, Debug)]
pub enum TranspileError {
    #[error("failed to load config {}: {message}", path.display())]
    ConfigLoad { path: PathBuf, message: String },

    #[error("{context}: missing required field `{field}`")]
    MissingField { context: String, field: String },

    #[error("invalid color {value}: {reason}")]
    InvalidColor { value: String, reason: String },

    #[error("invalid arguments for {context}: {reason}")]
    InvalidArguments { context: String, reason: String },

    #[error("texture set must contain 1 or 6 files, got {count}")]
    InvalidTextureSet { count: usize },

    #[error("failed to read asset {}", path.display())]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = TranspileError> = std::result::Result<T, E>;

impl TranspileError {
    pub fn missing(context: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            context: context.into(),
            field: field.into(),
        }
    }

    pub fn invalid_args(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            context: context.into(),
            reason: reason.into(),
        }
    }
}
