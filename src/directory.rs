//! Sharded map from address to actor handle.
//!
//! Contention is bounded by splitting the population across `N` shards;
//! the address hash picks the shard and every operation is atomic within
//! it. Shard count and per-shard initial capacity come from the stage
//! configuration.

// Layer 1: Standard library imports
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::RwLock;

// Layer 3: Internal module imports
use crate::actor::ActorHandle;
use crate::util::Address;

type Shard = RwLock<HashMap<Address, Arc<dyn ActorHandle>>>;

/// Address-indexed registry of live actors.
pub struct Directory {
    shards: Vec<Shard>,
}

impl Directory {
    /// Create a directory with `shard_count` shards (at least one), each
    /// pre-sized to `shard_capacity`.
    pub fn new(shard_count: usize, shard_capacity: usize) -> Self {
        let shard_count = shard_count.max(1);
        let shards = (0..shard_count)
            .map(|_| RwLock::new(HashMap::with_capacity(shard_capacity)))
            .collect();
        Self { shards }
    }

    fn shard_for(&self, address: &Address) -> &Shard {
        let mut hasher = DefaultHasher::new();
        address.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.shards.len();
        &self.shards[index]
    }

    /// Register a handle. Re-registration at the same address replaces
    /// the previous handle.
    pub fn register(&self, address: Address, handle: Arc<dyn ActorHandle>) {
        self.shard_for(&address).write().insert(address, handle);
    }

    /// Remove and return the handle at `address`.
    pub fn unregister(&self, address: &Address) -> Option<Arc<dyn ActorHandle>> {
        self.shard_for(address).write().remove(address)
    }

    /// Look up the handle at `address`.
    pub fn get(&self, address: &Address) -> Option<Arc<dyn ActorHandle>> {
        self.shard_for(address).read().get(address).cloned()
    }

    /// True if `address` is registered.
    pub fn has(&self, address: &Address) -> bool {
        self.shard_for(address).read().contains_key(address)
    }

    /// Total registered handles, summed across shards.
    pub fn size(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Drop every registration.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.write().clear();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::any::Any;

    struct StubHandle {
        address: Address,
    }

    #[async_trait]
    impl ActorHandle for StubHandle {
        fn address(&self) -> &Address {
            &self.address
        }

        fn type_name(&self) -> &str {
            "stub"
        }

        fn is_stopped(&self) -> bool {
            false
        }

        async fn stop(&self) {}

        fn adopt(&self, _child: Arc<dyn ActorHandle>) {}

        fn abandon(&self, _address: &Address) {}

        fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn stub(address: Address) -> Arc<dyn ActorHandle> {
        Arc::new(StubHandle { address })
    }

    #[test]
    fn test_register_and_get() {
        let directory = Directory::new(32, 8);
        let address = Address::unique();
        directory.register(address.clone(), stub(address.clone()));

        assert!(directory.has(&address));
        assert_eq!(directory.size(), 1);
        assert_eq!(directory.get(&address).unwrap().address(), &address);
    }

    #[test]
    fn test_unregister_removes() {
        let directory = Directory::new(4, 8);
        let address = Address::numeric(11);
        directory.register(address.clone(), stub(address.clone()));

        assert!(directory.unregister(&address).is_some());
        assert!(!directory.has(&address));
        assert!(directory.get(&address).is_none());
        assert_eq!(directory.size(), 0);
    }

    #[test]
    fn test_reregistration_replaces() {
        let directory = Directory::new(4, 8);
        let address = Address::numeric(5);
        directory.register(address.clone(), stub(address.clone()));
        directory.register(address.clone(), stub(address.clone()));
        assert_eq!(directory.size(), 1);
    }

    #[test]
    fn test_zero_shards_clamps_to_one() {
        let directory = Directory::new(0, 8);
        assert_eq!(directory.shard_count(), 1);
        let address = Address::numeric(1);
        directory.register(address.clone(), stub(address.clone()));
        assert!(directory.has(&address));
    }

    #[test]
    fn test_clear_empties_all_shards() {
        let directory = Directory::new(8, 8);
        for i in 0..50 {
            let address = Address::numeric(i);
            directory.register(address.clone(), stub(address));
        }
        assert_eq!(directory.size(), 50);
        directory.clear();
        assert_eq!(directory.size(), 0);
    }

    proptest! {
        #[test]
        fn prop_every_registered_address_is_retrievable(ids in prop::collection::hash_set(0u64..10_000, 1..200)) {
            let directory = Directory::new(32, 8);
            for id in &ids {
                let address = Address::numeric(*id);
                directory.register(address.clone(), stub(address));
            }
            prop_assert_eq!(directory.size(), ids.len());
            for id in &ids {
                prop_assert!(directory.has(&Address::numeric(*id)));
            }
        }

        #[test]
        fn prop_unregistered_addresses_are_absent(id in 0u64..10_000) {
            let directory = Directory::new(16, 8);
            let address = Address::numeric(id);
            directory.register(address.clone(), stub(address.clone()));
            directory.unregister(&address);
            prop_assert!(directory.get(&address).is_none());
        }
    }
}
