//! Error types for the e2e harness
//!
//! Per-query validation problems are not errors: they are collected as
//! human-readable failure strings. This type covers the operations that
//! genuinely fail, such as loading files, decoding samples or spawning apps.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to open '{path}' for writing: {error}")]
    FileWrite { path: String, error: String },

    #[error("Invalid suite definition: {0}")]
    SuiteParse(#[from] serde_yaml::Error),

    // === Query Errors ===
    #[error("delay must not be negative, got {0}s")]
    NegativeDelay(i64),

    #[error("invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // === Decode Errors ===
    #[error("Malformed sample: {0}")]
    MalformedSample(String),

    // === Managed App Errors ===
    #[error("Binary '{binary}' for app '{app}' not found")]
    BinaryNotFound { app: String, binary: String },

    #[error("Failed to start app '{app}': {reason}")]
    AppStartFailed { app: String, reason: String },

    #[error("Failed to stop app '{app}': {reason}")]
    AppStopFailed { app: String, reason: String },
}

impl Error {
    /// Create a malformed sample error
    pub fn malformed_sample(reason: impl Into<String>) -> Self {
        Self::MalformedSample(reason.into())
    }

    /// Create an app start failed error
    pub fn app_start_failed(app: &str, reason: impl ToString) -> Self {
        Self::AppStartFailed {
            app: app.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an app stop failed error
    pub fn app_stop_failed(app: &str, reason: impl ToString) -> Self {
        Self::AppStopFailed {
            app: app.to_string(),
            reason: reason.to_string(),
        }
    }
}
