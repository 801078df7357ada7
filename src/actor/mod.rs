//! Actors: bodies, lifecycles, environments, cells, and references.

pub mod cell;
pub mod environment;
pub mod lifecycle;
pub mod protocol;
pub mod reference;
pub mod traits;

pub use cell::ActorHandle;
pub use environment::{Environment, ExecutionContext};
pub use lifecycle::{LifeCycle, LifeCycleState};
pub use protocol::{Definition, Parameters, Protocol};
pub use reference::ActorRef;
pub use traits::Actor;
