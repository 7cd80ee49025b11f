//! Per-call registries
//!
//! One set of registries is created for every top-level `inject` call and
//! dropped when it returns, so nothing leaks from one test into the next.

use crate::class::Class;
use crate::slot::Managed;
use ahash::RandomState;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};

/// Shared service components, one per concrete type
#[derive(Debug, Default)]
pub(crate) struct ServiceRegistry {
    services: HashMap<TypeId, Managed, RandomState>,
}

impl ServiceRegistry {
    #[inline]
    pub fn get(&self, class: &Class) -> Option<&Managed> {
        self.services.get(&class.id())
    }

    /// Store `managed` as the component for the concrete type `class`
    #[inline]
    pub fn insert(&mut self, class: &Class, managed: Managed) {
        self.services.insert(class.id(), managed);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.services.len()
    }
}

#[derive(Debug)]
struct Substitute {
    managed: Managed,
    /// Hooks run and fields injected
    prepared: bool,
}

/// Test doubles keyed by the contract they stand in for
#[derive(Debug, Default)]
pub(crate) struct SubstituteRegistry {
    substitutes: HashMap<TypeId, Substitute, RandomState>,
}

impl SubstituteRegistry {
    #[inline]
    pub fn get(&self, contract: &Class) -> Option<&Managed> {
        self.substitutes.get(&contract.id()).map(|entry| &entry.managed)
    }

    #[inline]
    pub fn contains(&self, contract: &Class) -> bool {
        self.substitutes.contains_key(&contract.id())
    }

    /// Register a substitute for `contract`; the first registration wins
    pub fn register(&mut self, contract: &Class, substitute: Managed) -> &Managed {
        &self
            .substitutes
            .entry(contract.id())
            .or_insert(Substitute {
                managed: substitute,
                prepared: false,
            })
            .managed
    }

    /// Mark the substitute for `contract` as prepared.
    ///
    /// Returns `true` only for the first call on a registered substitute.
    pub fn mark_prepared(&mut self, contract: &Class) -> bool {
        match self.substitutes.get_mut(&contract.id()) {
            Some(entry) if !entry.prepared => {
                entry.prepared = true;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.substitutes.len()
    }
}

/// Field paths that already produced a fixture
#[derive(Debug, Default)]
pub(crate) struct GenerationPaths {
    paths: HashSet<String, RandomState>,
}

impl GenerationPaths {
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Record `path`; returns `false` if it was already recorded
    #[inline]
    pub fn insert(&mut self, path: String) -> bool {
        self.paths.insert(path)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }
}
