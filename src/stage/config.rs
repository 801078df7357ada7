//! Stage configuration with sensible defaults.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use super::errors::StageError;
use crate::mailbox::MailboxKind;

/// Default number of directory shards.
pub const DEFAULT_DIRECTORY_SHARDS: usize = 32;

/// Default initial capacity per directory shard.
pub const DEFAULT_DIRECTORY_SHARD_CAPACITY: usize = 64;

/// Default scheduler resolution hint.
pub const DEFAULT_SCHEDULER_RESOLUTION: Duration = Duration::from_millis(10);

/// Default timeout for graceful stage close.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration the stage recognizes.
///
/// # Example
/// ```rust
/// use stagework::stage::StageConfig;
/// use stagework::mailbox::{MailboxKind, OverflowPolicy};
///
/// let config = StageConfig::builder()
///     .with_directory_shards(16)
///     .with_default_mailbox(MailboxKind::Bounded {
///         capacity: 256,
///         policy: OverflowPolicy::Reject,
///     })
///     .build()
///     .unwrap();
/// assert_eq!(config.directory_shards, 16);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Number of directory shards.
    pub directory_shards: usize,

    /// Initial capacity of each directory shard.
    pub directory_shard_capacity: usize,

    /// Mailbox used when a definition carries no override.
    pub default_mailbox: MailboxKind,

    /// Scheduler resolution hint; also the floor for repeat intervals.
    pub scheduler_resolution: Duration,

    /// Timeout for graceful `Stage::close`.
    pub close_timeout: Duration,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            directory_shards: DEFAULT_DIRECTORY_SHARDS,
            directory_shard_capacity: DEFAULT_DIRECTORY_SHARD_CAPACITY,
            default_mailbox: MailboxKind::Unbounded,
            scheduler_resolution: DEFAULT_SCHEDULER_RESOLUTION,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }
}

impl StageConfig {
    /// Create a configuration builder.
    pub fn builder() -> StageConfigBuilder {
        StageConfigBuilder::default()
    }

    /// Reject configurations the runtime cannot operate with.
    pub fn validate(&self) -> Result<(), StageError> {
        if self.directory_shards == 0 {
            return Err(StageError::ConfigError(
                "directory_shards must be > 0".to_owned(),
            ));
        }
        if let MailboxKind::Bounded { capacity, .. } = self.default_mailbox {
            if capacity == 0 {
                return Err(StageError::ConfigError(
                    "bounded mailbox capacity must be > 0".to_owned(),
                ));
            }
        }
        if self.close_timeout.is_zero() {
            return Err(StageError::ConfigError(
                "close_timeout must be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`StageConfig`].
#[derive(Debug, Default)]
pub struct StageConfigBuilder {
    config: StageConfig,
}

impl StageConfigBuilder {
    /// Set the directory shard count.
    pub fn with_directory_shards(mut self, shards: usize) -> Self {
        self.config.directory_shards = shards;
        self
    }

    /// Set the per-shard initial capacity.
    pub fn with_directory_shard_capacity(mut self, capacity: usize) -> Self {
        self.config.directory_shard_capacity = capacity;
        self
    }

    /// Set the default mailbox kind.
    pub fn with_default_mailbox(mut self, mailbox: MailboxKind) -> Self {
        self.config.default_mailbox = mailbox;
        self
    }

    /// Set the scheduler resolution hint.
    pub fn with_scheduler_resolution(mut self, resolution: Duration) -> Self {
        self.config.scheduler_resolution = resolution;
        self
    }

    /// Set the graceful close timeout.
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.config.close_timeout = timeout;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<StageConfig, StageError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
