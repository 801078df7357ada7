//! Snapshot surface actors can expose for tests and tooling.
//!
//! An actor that overrides `Actor::observable_state` publishes a bag of
//! named values; readers fetch it through the mailbox (so reads serialize
//! with handlers) via `ActorRef::observable_state`.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde_json::Value;

// Layer 3: Internal module imports
// (none)

/// Named-value snapshot of an actor's state.
#[derive(Debug, Clone)]
pub struct ObservableState {
    values: HashMap<String, Value>,
    captured_at: DateTime<Utc>,
}

impl ObservableState {
    /// An empty snapshot (the default for actors that expose nothing).
    pub fn empty() -> Self {
        Self {
            values: HashMap::new(),
            captured_at: Utc::now(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Read a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Number of published values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing is published.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// When the snapshot was taken.
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

impl Default for ObservableState {
    fn default() -> Self {
        Self::empty()
    }
}
