//! Named shared contexts
//!
//! Most fixture graphs share one context handle. When fixtures talk to more
//! than one backing store, a [`ContextHolder`] keeps the default handle plus
//! named ones, and each root class picks its handle through
//! [`ClassBuilder::context_name`](crate::ClassBuilder::context_name).

use crate::class::Class;
use crate::error::{InjectionError, Result};
use ahash::RandomState;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::debug;

/// Name reserved for the default context
pub const DEFAULT_CONTEXT: &str = "_DEFAULT_";

/// The default context handle and any number of named ones
pub struct ContextHolder<C> {
    default: Arc<C>,
    named: HashMap<String, Arc<C>, RandomState>,
}

impl<C> ContextHolder<C> {
    pub fn new(default: Arc<C>) -> Self {
        Self {
            default,
            named: HashMap::default(),
        }
    }

    /// Add a named context. The reserved default name is rejected in any
    /// letter case; a repeated name replaces the earlier handle.
    pub fn with_named(mut self, name: impl Into<String>, context: Arc<C>) -> Result<Self> {
        let name = name.into();
        if is_reserved(&name) {
            return Err(InjectionError::ReservedContextName { name });
        }

        #[cfg(feature = "logging")]
        debug!(target: "fixture_injector", context = %name, "Registering named context");

        self.named.insert(name, context);
        Ok(self)
    }

    pub fn default_context(&self) -> &Arc<C> {
        &self.default
    }

    /// A named context; the default one is not reachable by name
    pub fn named(&self, name: &str) -> Option<&Arc<C>> {
        self.named.get(name)
    }

    /// The context requested by `class`, falling back to the default one
    pub fn for_class(&self, class: &Class) -> Result<Arc<C>> {
        match class.context_name() {
            Some(name) if !is_reserved(name) => {
                self.named.get(name).cloned().ok_or_else(|| InjectionError::UnknownContext {
                    name: name.to_string(),
                    type_name: class.name(),
                })
            }
            _ => Ok(Arc::clone(&self.default)),
        }
    }

    /// All handles, default first
    pub fn contexts(&self) -> impl Iterator<Item = &Arc<C>> {
        std::iter::once(&self.default).chain(self.named.values())
    }

    /// Number of named contexts, not counting the default one
    pub fn len(&self) -> usize {
        self.named.len()
    }

    /// Whether only the default context is held
    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }
}

impl<C> fmt::Debug for ContextHolder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.named.keys().collect();
        names.sort();
        f.debug_struct("ContextHolder")
            .field("named", &names)
            .finish_non_exhaustive()
    }
}

fn is_reserved(name: &str) -> bool {
    name.eq_ignore_ascii_case(DEFAULT_CONTEXT)
}
