//! Error types for the Finch client engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Finch client.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. The synchronization engine
/// distinguishes only two remote failure kinds: `Remote` (the server answered
/// with a non-2xx status) and `Transport` (the server could not be reached or
/// timed out). Both are reported to the caller without retry.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FinchError {
    /// The remote service answered with a non-2xx status
    #[error("Remote error ({status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Remote { status: u16, detail: Option<String> },

    /// The remote service could not be reached (network failure, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A local programming-contract violation (never shown to the user)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "header", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FinchError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Remote error from a status code and optional server detail
    pub fn remote(status: u16, detail: Option<String>) -> Self {
        Self::Remote { status, detail }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Remote error
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Check if this is a Transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a Precondition error
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// The HTTP status of a Remote error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// A short message suitable for display near the input area.
    ///
    /// Remote errors prefer the server-provided detail over the status line;
    /// everything else falls back to the Display impl.
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote {
                detail: Some(detail),
                ..
            } => detail.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FinchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FinchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, FinchError>`.
pub type Result<T> = std::result::Result<T, FinchError>;
