//! Namespace lookup for class descriptors
//!
//! Uses DashMap for lock-free concurrent access, so one catalog can back
//! injections running on several test threads at once.

use crate::Injectable;
use crate::class::{Class, ClassRef};
use ahash::RandomState;
use dashmap::DashMap;

#[cfg(feature = "logging")]
use tracing::debug;

/// Registry of class descriptors keyed by qualified name.
///
/// The naming convention produces a candidate name; the catalog turns it
/// back into a descriptor.
pub struct Catalog {
    /// Map from qualified name to descriptor
    classes: DashMap<String, ClassRef, RandomState>,
}

impl Catalog {
    /// Create an empty catalog.
    ///
    /// Uses 8 shards; fixture catalogs hold a few dozen types at most.
    #[inline]
    pub fn new() -> Self {
        Self {
            classes: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
        }
    }

    /// Register the descriptor of `T`
    #[inline]
    pub fn register<T: Injectable + ?Sized>(&self) -> &Self {
        self.register_class(<T as Injectable>::class)
    }

    /// Register a descriptor; a later registration under the same name wins
    pub fn register_class(&self, class: ClassRef) -> &Self {
        let qualified = class().qualified_name();

        #[cfg(feature = "logging")]
        debug!(
            target: "fixture_injector",
            class = %qualified,
            catalog_size = self.classes.len() + 1,
            "Registering class in catalog"
        );

        self.classes.insert(qualified, class);
        self
    }

    /// Find a descriptor by qualified name
    #[inline]
    pub fn lookup(&self, qualified_name: &str) -> Option<&'static Class> {
        self.classes.get(qualified_name).map(|entry| (*entry.value())())
    }

    #[inline]
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.classes.contains_key(qualified_name)
    }

    /// Get number of registered classes
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("count", &self.len())
            .finish()
    }
}
