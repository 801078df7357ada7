//! Stage-level error types.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Errors surfaced by stage operations.
#[derive(Debug, Error)]
pub enum StageError {
    /// The stage is closing or closed; no new actors are accepted.
    #[error("stage is closed")]
    Closed,

    /// The stage's root guardians are not available yet.
    #[error("stage is not initialized")]
    NotInitialized,

    /// No supervisor is registered under the given name.
    #[error("unknown supervisor: {0}")]
    UnknownSupervisor(String),

    /// Actor creation failed.
    #[error("failed to spawn actor: {0}")]
    SpawnFailed(String),

    /// Graceful close did not finish in time.
    #[error("stage close timed out after {0:?}")]
    CloseTimeout(Duration),

    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

impl StageError {
    /// True for errors that mean the stage can no longer be used.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StageError::Closed | StageError::CloseTimeout(_))
    }

    /// True for errors a caller can fix and retry.
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}
