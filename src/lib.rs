//! # Fixture Injector - Object-Graph Injection for Test Fixtures
//!
//! Populates the object graph of integration test fixtures (data generators
//! and finders) with their collaborators, so tests can exercise
//! persistence-backed code without wiring it by hand.
//!
//! ## Features
//!
//! - **Service components** - one shared instance per concrete type and call,
//!   reference cycles among services are fine
//! - **Nested fixtures** - a fresh instance per field path, loops are reported
//!   as [`InjectionError::CircularFixtureDependency`]
//! - **Shared context** - one handle (e.g. a database session) propagated to
//!   every context slot in the graph
//! - **Substitutes** - test doubles replacing the implementation of a
//!   substitutable contract for a whole call
//! - **Convention-based resolution** - `IUserDao` is implemented by `UserDao`,
//!   `UserDao` by `UserDaoImpl`, or any [`NamingConvention`] you plug in
//! - **Observable** - optional tracing integration
//!
//! ## Describing types
//!
//! Rust has no runtime reflection, so every type in the graph publishes a
//! [`Class`] descriptor through [`Injectable`]. Fields are write-once cells:
//! [`Inject<T>`] for services and fixtures, [`Context<C>`] for the shared
//! context. With the `derive` feature, `#[derive(Injectable)]` writes the
//! descriptor for you.
//!
//! ## Quick Start
//!
//! ```rust
//! use fixture_injector::prelude::*;
//! use fixture_injector::{contract, upcast, Constructor, Field, Instance, Lazy, Slot};
//!
//! pub struct Session(&'static str);
//!
//! pub trait UserDao: Send + Sync {
//!     fn session(&self) -> &'static str;
//! }
//! contract!(dyn UserDao as "IUserDao");
//!
//! #[derive(Default)]
//! pub struct PgUserDao {
//!     session: Context<Session>,
//! }
//!
//! impl UserDao for PgUserDao {
//!     fn session(&self) -> &'static str {
//!         self.session.get().map_or("none", |s| s.0)
//!     }
//! }
//!
//! impl Injectable for PgUserDao {
//!     fn class() -> &'static Class {
//!         static CLASS: Lazy<Class> = Lazy::new(|| {
//!             Class::concrete::<PgUserDao>("UserDao", module_path!())
//!                 .constructor(Constructor::public(|| Ok(Arc::new(PgUserDao::default()) as Instance)))
//!                 .implements(<dyn UserDao as Injectable>::class)
//!                 .upcast(upcast!(PgUserDao => dyn UserDao))
//!                 .field(Field::new::<Context<Session>>("session", |o| {
//!                     o.downcast_ref::<PgUserDao>().map(|d| &d.session as &dyn Slot)
//!                 }).context())
//!                 .build()
//!         });
//!         &CLASS
//!     }
//! }
//!
//! #[derive(Default)]
//! pub struct UserGenerator {
//!     users: Inject<dyn UserDao>,
//! }
//!
//! impl Injectable for UserGenerator {
//!     fn class() -> &'static Class {
//!         static CLASS: Lazy<Class> = Lazy::new(|| {
//!             Class::concrete::<UserGenerator>("UserGenerator", module_path!())
//!                 .field(Field::new::<Inject<dyn UserDao>>("users", |o| {
//!                     o.downcast_ref::<UserGenerator>().map(|g| &g.users as &dyn Slot)
//!                 }).service())
//!                 .build()
//!         });
//!         &CLASS
//!     }
//! }
//!
//! let injector = Injector::builder().register::<PgUserDao>().build();
//! let generator = UserGenerator::default();
//! injector.inject_generator(&generator, Arc::new(Session("test-db"))).unwrap();
//!
//! assert_eq!(generator.users.get().unwrap().session(), "test-db");
//! ```

mod access;
mod catalog;
mod class;
mod context;
mod error;
mod injector;
mod lifecycle;
#[cfg(feature = "logging")]
pub mod logging;
mod naming;
mod provider;
mod registry;
mod resolver;
mod slot;

pub use catalog::*;
pub use class::*;
pub use context::*;
pub use error::*;
pub use injector::*;
pub use lifecycle::{IntoHookResult, invoke_init_hooks};
pub use naming::*;
pub use provider::*;
pub use resolver::{Resolver, ensure_instantiable, instantiate};
pub use slot::*;

/// Field access used by the injector, exposed for custom tooling
pub mod fields {
    pub use crate::access::{get, is_empty, set, view};
}

// Descriptor statics are built with this
pub use once_cell::sync::Lazy;

#[cfg(feature = "derive")]
pub use fixture_injector_derive::Injectable;

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Class, Context, ContextHolder, Inject, Injectable, InjectionError, Injector, Result,
    };
    pub use std::sync::Arc;
}
