//! Core error types for capsule-core.
//!
//! This module defines the error hierarchy using thiserror. Fatal
//! conditions propagate as `Result`; best-effort side effects (the
//! viewed flag) log a warning and are swallowed at the call site.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for capsule-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Capsule-store errors.
///
/// A fetch failure is fatal to the session that requested it; retry
/// policy belongs to the caller, never to this crate.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No capsule with the requested id
    #[error("No capsule with id {0}")]
    NotFound(Uuid),

    /// Failed to read the backing file
    #[error("Failed to read store at {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    /// Failed to write the backing file
    #[error("Failed to write store at {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The viewed flag is set without a timestamp
    #[error("viewed is set but viewed_at is missing")]
    ViewedWithoutTimestamp,

    /// viewed_at precedes the unlock timestamp
    #[error("viewed_at ({viewed_at}) precedes unlock_at ({unlock_at})")]
    ViewedBeforeUnlock {
        viewed_at: chrono::DateTime<chrono::Utc>,
        unlock_at: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
