//! Shared utilities: addresses and scoped logging.

pub mod ids;
pub mod logger;

pub use ids::{Address, NumericAddressFactory};
pub use logger::Logger;
