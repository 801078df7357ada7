//! Scoped logger carried by every actor environment.
//!
//! A thin wrapper over `tracing` that stamps each event with the owning
//! actor's type and address, so runtime logs read per-actor without every
//! call site repeating the scope.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (tracing used via macros)

// Layer 3: Internal module imports
use super::ids::Address;

/// Per-actor logger with a fixed `type@address` scope.
#[derive(Debug, Clone)]
pub struct Logger {
    scope: Arc<str>,
}

impl Logger {
    /// Create a logger scoped to an actor.
    pub fn scoped(type_name: &str, address: &Address) -> Self {
        Self {
            scope: Arc::from(format!("{type_name}@{address}")),
        }
    }

    /// Create a logger with a free-form scope (runtime internals).
    pub fn named(scope: impl Into<String>) -> Self {
        Self {
            scope: Arc::from(scope.into()),
        }
    }

    /// The scope string this logger stamps on every event.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) {
        tracing::debug!(actor = %self.scope, "{message}");
    }

    /// Log at info level.
    pub fn info(&self, message: &str) {
        tracing::info!(actor = %self.scope, "{message}");
    }

    /// Log at warn level.
    pub fn warn(&self, message: &str) {
        tracing::warn!(actor = %self.scope, "{message}");
    }

    /// Log at error level.
    pub fn error(&self, message: &str) {
        tracing::error!(actor = %self.scope, "{message}");
    }
}
