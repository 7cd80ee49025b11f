//! The injector
//!
//! Walks a fixture's object graph and fills every empty field carrying an
//! injection marker. Each field gets exactly one treatment, tried in order:
//!
//! 1. substitutes listed on the field are registered for their contract,
//! 2. service components are shared per concrete type (or replaced by a
//!    registered substitute, prepared like a new component on first use),
//! 3. nested fixtures are created fresh for every field path, when enabled,
//! 4. context slots receive the shared context handle.
//!
//! All registries live for one top-level call only.

use crate::access;
use crate::catalog::Catalog;
use crate::class::{Class, ClassRef, Field};
use crate::context::ContextHolder;
use crate::error::{InjectionError, Result};
use crate::lifecycle;
use crate::naming::{MarkerPrefix, NamingConvention};
use crate::registry::{GenerationPaths, ServiceRegistry, SubstituteRegistry};
use crate::resolver::{self, Resolver};
use crate::slot::{ContextHandle, Managed, Value};
use crate::Injectable;
use std::any::{Any, TypeId};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Populates fixture graphs.
///
/// An injector owns the [`Catalog`] used to find implementations of
/// contracts and the [`NamingConvention`] that names them. It holds no state
/// between calls and can be shared by tests running in parallel.
///
/// # Examples
///
/// ```rust
/// use fixture_injector::{Class, Constructor, Context, Field, Injectable, Injector, Instance, Lazy, Slot};
/// use std::sync::Arc;
///
/// pub struct Session(&'static str);
///
/// #[derive(Default)]
/// pub struct UserFinder {
///     session: Context<Session>,
/// }
///
/// impl Injectable for UserFinder {
///     fn class() -> &'static Class {
///         static CLASS: Lazy<Class> = Lazy::new(|| {
///             Class::concrete::<UserFinder>("UserFinder", module_path!())
///                 .constructor(Constructor::public(|| Ok(Arc::new(UserFinder::default()) as Instance)))
///                 .field(Field::new::<Context<Session>>("session", |o| {
///                     o.downcast_ref::<UserFinder>().map(|f| &f.session as &dyn Slot)
///                 }).context())
///                 .build()
///         });
///         &CLASS
///     }
/// }
///
/// let injector = Injector::new();
/// let finder = UserFinder::default();
/// injector.inject_finder(&finder, Arc::new(Session("db"))).unwrap();
///
/// assert_eq!(finder.session.get().unwrap().0, "db");
/// ```
#[derive(Debug, Default)]
pub struct Injector {
    resolver: Resolver,
}

impl Injector {
    /// An injector with an empty catalog and the default naming convention
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    /// The catalog implementations are looked up in
    #[inline]
    pub fn catalog(&self) -> &Catalog {
        self.resolver.catalog()
    }

    #[inline]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Populate the graph reachable from `root`.
    ///
    /// `context` goes into every context slot of the graph. Nested fixtures
    /// are created only when `include_fixtures` is set. The call stops at the
    /// first error; fields assigned before it stay assigned.
    pub fn inject<T, C>(&self, root: &T, context: Arc<C>, include_fixtures: bool) -> Result<()>
    where
        T: Injectable,
        C: Send + Sync + 'static,
    {
        self.inject_erased(T::class(), root, context, include_fixtures)
    }

    /// Populate a data generator: nested fixtures are created
    #[inline]
    pub fn inject_generator<T, C>(&self, root: &T, context: Arc<C>) -> Result<()>
    where
        T: Injectable,
        C: Send + Sync + 'static,
    {
        self.inject(root, context, true)
    }

    /// Populate a finder: nested fixtures are left empty
    #[inline]
    pub fn inject_finder<T, C>(&self, root: &T, context: Arc<C>) -> Result<()>
    where
        T: Injectable,
        C: Send + Sync + 'static,
    {
        self.inject(root, context, false)
    }

    /// Populate `root` with the context its class asks for in `holder`
    pub fn inject_with<T, C>(
        &self,
        root: &T,
        holder: &ContextHolder<C>,
        include_fixtures: bool,
    ) -> Result<()>
    where
        T: Injectable,
        C: Send + Sync + 'static,
    {
        let context = holder.for_class(T::class())?;
        self.inject(root, context, include_fixtures)
    }

    /// Populate the graph of a root known only through its descriptor
    pub fn inject_erased(
        &self,
        class: &'static Class,
        root: &dyn Any,
        context: ContextHandle,
        include_fixtures: bool,
    ) -> Result<()> {
        #[cfg(feature = "logging")]
        debug!(
            target: "fixture_injector",
            root = %class,
            include_fixtures,
            "Starting injection"
        );

        let mut traversal = Traversal {
            resolver: &self.resolver,
            context,
            include_fixtures,
            services: ServiceRegistry::default(),
            substitutes: SubstituteRegistry::default(),
            paths: GenerationPaths::default(),
            lineage: vec![class.id()],
        };

        let result = traversal.visit(class, root, class.name());

        #[cfg(feature = "logging")]
        match &result {
            Ok(()) => debug!(
                target: "fixture_injector",
                root = %class,
                services = traversal.services.len(),
                substitutes = traversal.substitutes.len(),
                fixtures = traversal.paths.len(),
                "Injection complete"
            ),
            Err(err) => debug!(
                target: "fixture_injector",
                root = %class,
                error = %err,
                "Injection failed"
            ),
        }

        result
    }
}

/// Builder for [`Injector`]
pub struct InjectorBuilder {
    catalog: Catalog,
    naming: Box<dyn NamingConvention>,
}

impl InjectorBuilder {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
            naming: Box::new(MarkerPrefix::default()),
        }
    }

    /// Make `T` discoverable by the naming convention
    pub fn register<T: Injectable + ?Sized>(self) -> Self {
        self.catalog.register::<T>();
        self
    }

    pub fn register_class(self, class: ClassRef) -> Self {
        self.catalog.register_class(class);
        self
    }

    /// Replace the default `I`-prefix / `Impl`-suffix convention
    pub fn naming(mut self, naming: impl NamingConvention + 'static) -> Self {
        self.naming = Box::new(naming);
        self
    }

    pub fn build(self) -> Injector {
        Injector {
            resolver: Resolver::new(self.catalog, self.naming),
        }
    }
}

impl Default for InjectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one top-level injection call
struct Traversal<'i> {
    resolver: &'i Resolver,
    context: ContextHandle,
    include_fixtures: bool,
    services: ServiceRegistry,
    substitutes: SubstituteRegistry,
    paths: GenerationPaths,
    /// Fixture classes entered since the last new service component
    lineage: Vec<TypeId>,
}

impl Traversal<'_> {
    /// Fill the fields `class` declares on `target`, ancestors first
    fn visit(&mut self, class: &'static Class, target: &dyn Any, path: &str) -> Result<()> {
        if let Some(superclass) = class.superclass() {
            let ancestor = access::view(class, superclass, target)?;
            self.visit(superclass.class(), ancestor, path)?;
        }

        for field in class.fields() {
            if !access::is_empty(class, field, target)? {
                #[cfg(feature = "logging")]
                trace!(
                    target: "fixture_injector",
                    class = %class,
                    field = field.name(),
                    "Field already set, skipping"
                );
                continue;
            }

            for substitute in field.substitutes() {
                self.register_substitute(substitute)?;
            }

            if field.is_service() {
                self.inject_service(class, field, target, path)?;
            } else if self.include_fixtures && field.is_fixture() {
                self.inject_fixture(class, field, target, path)?;
            } else if field.is_context() {
                access::set(class, field, target, &Value::Context(Arc::clone(&self.context)))?;
            }
        }

        Ok(())
    }

    /// Instantiate `substitute` for its contract unless one is registered
    fn register_substitute(&mut self, substitute: &'static Class) -> Result<()> {
        let contract = substitute.substitutable_contract().ok_or_else(|| {
            InjectionError::NoSuitableContract {
                type_name: substitute.qualified_name(),
            }
        })?;

        if self.substitutes.contains(contract) {
            return Ok(());
        }

        resolver::ensure_instantiable(substitute)?;
        let managed = resolver::instantiate(substitute)?;

        #[cfg(feature = "logging")]
        debug!(
            target: "fixture_injector",
            substitute = %substitute,
            contract = %contract,
            "Registered substitute"
        );

        self.substitutes.register(contract, managed);
        Ok(())
    }

    fn inject_service(
        &mut self,
        owner: &'static Class,
        field: &Field,
        target: &dyn Any,
        path: &str,
    ) -> Result<()> {
        let class = self.resolver.resolve(declared_class(owner, field)?)?;

        let contract = class.substitutable_contract();
        let substitute = contract.and_then(|contract| self.substitutes.get(contract).cloned());
        if let (Some(contract), Some(substitute)) = (contract, substitute) {
            if !self.substitutes.mark_prepared(contract) {
                #[cfg(feature = "logging")]
                trace!(
                    target: "fixture_injector",
                    field = field.name(),
                    substitute = %substitute.class(),
                    "Reusing substitute"
                );
                return access::set(owner, field, target, &Value::Object(substitute));
            }

            #[cfg(feature = "logging")]
            debug!(
                target: "fixture_injector",
                field = field.name(),
                substitute = %substitute.class(),
                contract = %contract,
                "Using substitute"
            );
            return self.wire_new_service(owner, field, target, path, class, substitute);
        }

        if let Some(existing) = self.services.get(class) {
            #[cfg(feature = "logging")]
            trace!(
                target: "fixture_injector",
                field = field.name(),
                class = %class,
                "Reusing service component"
            );
            return access::set(owner, field, target, &Value::Object(existing.clone()));
        }

        let managed = resolver::instantiate(class)?;

        #[cfg(feature = "logging")]
        debug!(
            target: "fixture_injector",
            class = %class,
            field = field.name(),
            path,
            "Created service component"
        );

        self.wire_new_service(owner, field, target, path, class, managed)
    }

    /// Run the hooks of a component not seen before in this call, register
    /// it for `class`, assign it and inject into it
    fn wire_new_service(
        &mut self,
        owner: &'static Class,
        field: &Field,
        target: &dyn Any,
        path: &str,
        class: &'static Class,
        managed: Managed,
    ) -> Result<()> {
        lifecycle::invoke_init_hooks(&managed)?;
        self.services.insert(class, managed.clone());
        access::set(owner, field, target, &Value::Object(managed.clone()))?;

        // A new service starts a new chain of fixture descents
        let lineage = std::mem::take(&mut self.lineage);
        let result = self.visit(managed.class(), managed.target(), path);
        self.lineage = lineage;
        result
    }

    fn inject_fixture(
        &mut self,
        owner: &'static Class,
        field: &Field,
        target: &dyn Any,
        path: &str,
    ) -> Result<()> {
        let class = self.resolver.resolve(declared_class(owner, field)?)?;
        let current = format!("{path}.{}", field.name());

        if self.paths.contains(&current) || self.lineage.contains(&class.id()) {
            #[cfg(feature = "logging")]
            debug!(
                target: "fixture_injector",
                class = %class,
                path = %current,
                "Fixture loop detected"
            );
            return Err(InjectionError::CircularFixtureDependency {
                type_name: class.name(),
                path: current,
            });
        }
        self.paths.insert(current.clone());

        let managed: Managed = resolver::instantiate(class)?;

        #[cfg(feature = "logging")]
        debug!(
            target: "fixture_injector",
            class = %class,
            path = %current,
            "Created fixture"
        );

        access::set(owner, field, target, &Value::Object(managed.clone()))?;

        self.lineage.push(class.id());
        let result = self.visit(class, managed.target(), &current);
        self.lineage.pop();
        result
    }
}

fn declared_class(owner: &Class, field: &Field) -> Result<&'static Class> {
    field.declared_class().ok_or_else(|| {
        InjectionError::access_denied(
            field.name(),
            owner.name(),
            "a context slot cannot hold a service or a fixture",
        )
    })
}
