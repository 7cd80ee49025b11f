//! Implementation resolution
//!
//! Turns the declared type of a field into a concrete type the injector can
//! construct.

use crate::catalog::Catalog;
use crate::class::{Class, Kind, Nesting, Visibility};
use crate::error::{InjectionError, Result};
use crate::naming::{MarkerPrefix, NamingConvention};
use crate::slot::Managed;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Resolves declared types to instantiable implementations.
///
/// Concrete types resolve to themselves. Contracts go through the
/// [`NamingConvention`] and the [`Catalog`]: the candidate name is looked up
/// in the namespace (and enclosing type) of the contract.
pub struct Resolver {
    catalog: Catalog,
    naming: Box<dyn NamingConvention>,
}

impl Resolver {
    pub fn new(catalog: Catalog, naming: Box<dyn NamingConvention>) -> Self {
        Self { catalog, naming }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolve `declared` to a concrete, publicly constructible class
    pub fn resolve(&self, declared: &'static Class) -> Result<&'static Class> {
        let class = match declared.kind() {
            Kind::Concrete => declared,
            Kind::Contract { .. } => {
                let candidate = declared.sibling(&self.naming.candidate(declared));

                #[cfg(feature = "logging")]
                trace!(
                    target: "fixture_injector",
                    contract = %declared,
                    candidate = %candidate,
                    "Looking up implementation by naming convention"
                );

                self.catalog.lookup(&candidate).ok_or_else(|| {
                    InjectionError::no_implementation(
                        declared.qualified_name(),
                        format!("Unable to find a concrete class named {candidate} for contract {declared}"),
                    )
                })?
            }
        };

        ensure_instantiable(class)?;
        Ok(class)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Catalog::new(), Box::new(MarkerPrefix::default()))
    }
}

/// Check that `class` is concrete, public, static if nested, and has a
/// public no-argument constructor.
pub fn ensure_instantiable(class: &Class) -> Result<()> {
    let fail = |reason: String| {
        #[cfg(feature = "logging")]
        debug!(
            target: "fixture_injector",
            class = %class,
            reason = %reason,
            "Class cannot be instantiated"
        );
        Err(InjectionError::no_implementation(class.qualified_name(), reason))
    };

    if class.is_contract() {
        return fail(format!("The class {class} is a contract, not a concrete type."));
    }
    if class.visibility() != Visibility::Public {
        return fail(format!("The class {class} is not public."));
    }
    if let Nesting::Member { is_static: false, .. } = class.nesting() {
        return fail(format!(
            "The member class {class} should be static to be instantiated."
        ));
    }
    match class.constructor() {
        None => fail(format!("It seems that {} has no empty constructor.", class.name())),
        Some(constructor) if constructor.visibility() != Visibility::Public => fail(format!(
            "The empty constructor of class {} must be public.",
            class.name()
        )),
        Some(_) => Ok(()),
    }
}

/// Create a new instance of `class` through its no-argument constructor
pub fn instantiate(class: &'static Class) -> Result<Managed> {
    let constructor = class.constructor().ok_or_else(|| {
        InjectionError::no_implementation(
            class.qualified_name(),
            format!("It seems that {} has no empty constructor.", class.name()),
        )
    })?;

    let instance = constructor
        .create()
        .map_err(|source| InjectionError::instantiation(class.qualified_name(), source))?;

    Managed::new(class, instance).ok_or_else(|| {
        InjectionError::instantiation(
            class.qualified_name(),
            "the constructor produced an instance of another type",
        )
    })
}
