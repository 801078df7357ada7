// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Opaque actor identity with total equality and a stable hash.
///
/// Two variants exist: a time-ordered 128-bit UUID (version 7, the
/// default, so addresses created later sort later) and a plain numeric
/// identity for callers that manage their own counters.
///
/// # Example
/// ```rust
/// use stagework::util::Address;
///
/// let a = Address::unique();
/// let b = Address::unique();
/// assert_ne!(a, b);
///
/// let n = Address::numeric(7);
/// assert_eq!(n, Address::numeric(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Address {
    /// Time-ordered UUID identity.
    Uuid(Uuid),
    /// Monotonic integer identity.
    Numeric(u64),
}

impl Address {
    /// Create a new unique, time-ordered address.
    pub fn unique() -> Self {
        Self::Uuid(Uuid::now_v7())
    }

    /// Create a numeric address.
    pub fn numeric(value: u64) -> Self {
        Self::Numeric(value)
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self::Uuid(uuid)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(id) => write!(f, "{id}"),
            Self::Numeric(id) => write!(f, "#{id}"),
        }
    }
}

/// Factory for monotonically increasing numeric addresses.
///
/// # Example
/// ```rust
/// use stagework::util::{Address, NumericAddressFactory};
///
/// let factory = NumericAddressFactory::new();
/// assert_eq!(factory.next_address(), Address::numeric(1));
/// assert_eq!(factory.next_address(), Address::numeric(2));
/// ```
#[derive(Debug, Default)]
pub struct NumericAddressFactory {
    next: AtomicU64,
}

impl NumericAddressFactory {
    /// Create a factory whose first address is `#1`.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Hand out the next address.
    pub fn next_address(&self) -> Address {
        Address::Numeric(self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
