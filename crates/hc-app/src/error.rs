//! Error types for the hc-app service layer.

use std::path::PathBuf;

use crate::compile::CompileError;

/// Application error type wrapping the backend crates for every front end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported config format: {path} (expected .yaml, .yml or .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Config syntax error: {0}")]
    Syntax(String),

    #[error("Compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("Schedule not found: {0}")]
    ScheduleNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Result type for hc-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<hc_schema::SchemaError> for AppError {
    fn from(err: hc_schema::SchemaError) -> Self {
        match err {
            hc_schema::SchemaError::Parse(parse) => AppError::Compile(CompileError::Parse(parse)),
            other => AppError::Syntax(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialize(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialize(err.to_string())
    }
}
