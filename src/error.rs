//! Error types for cribwatch

use std::path::PathBuf;

use crate::types::SessionState;

/// Lifecycle errors surfaced by [`crate::core::Session`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {action} while session is {from}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },

    /// Perception never came up. Blocks entering PLAYING until cleared.
    #[error("perception unavailable: {0}")]
    PerceptionUnavailable(String),
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors from the landmark perception collaborator.
#[derive(Debug, thiserror::Error)]
pub enum PerceptionError {
    /// Camera or model could not be brought up. Not retried.
    #[error("perception init failed: {0}")]
    Init(String),

    /// A single frame could not be produced or decoded.
    #[error("frame {index} unreadable: {reason}")]
    Frame { index: usize, reason: String },

    #[error("perception source I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Presentation/audio side effect failure. Never reaches core state.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification sink closed")]
    Closed,

    #[error("notification output failed: {0}")]
    Output(#[from] std::io::Error),
}
