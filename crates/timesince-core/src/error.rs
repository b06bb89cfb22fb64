//! Error types for timesince-core.

use std::path::PathBuf;
use thiserror::Error;

/// Soft failures during a poll check attempt.
///
/// Every variant is reported and otherwise behaves identically: the
/// check returns "no change" and timer state is left untouched. The
/// next due tick simply retries.
#[derive(Error, Debug)]
pub enum PollError {
    /// No transport attached or link down. Checked before any I/O.
    #[error("no transport available")]
    NoTransport,

    /// The request could not be issued or completed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-200 response status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// Response body is not the expected JSON shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// An extracted timestamp string does not match the expected pattern.
    #[error("timestamp parse error: {0}")]
    Timestamp(String),
}

/// Unrecoverable construction failures. These abort initialization
/// rather than silently degrading.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("{service} identity '{value}' exceeds maximum length of {max} characters")]
    IdentityTooLong {
        service: &'static str,
        value: String,
        max: usize,
    },

    #[error("invalid endpoint '{url}': {message}")]
    InvalidEndpoint { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration load/save failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("could not determine configuration directory")]
    NoConfigDir,
}
