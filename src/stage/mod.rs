//! The stage and its configuration, errors, and root guardians.

pub mod config;
pub mod errors;
pub mod guardians;
pub mod local;

pub use config::{
    StageConfig, StageConfigBuilder, DEFAULT_CLOSE_TIMEOUT, DEFAULT_DIRECTORY_SHARDS,
    DEFAULT_DIRECTORY_SHARD_CAPACITY, DEFAULT_SCHEDULER_RESOLUTION,
};
pub use errors::StageError;
pub use guardians::{PrivateRootActor, PublicRootActor};
pub use local::Stage;
