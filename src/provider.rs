//! Provider traits for fixture injection
//!
//! These traits and macros connect Rust types to their class descriptors.

use crate::class::Class;

/// A type that publishes a class descriptor.
///
/// Implemented for fixture and service structs (usually through
/// `#[derive(Injectable)]`) and for contract trait objects through
/// [`contract!`](crate::contract).
///
/// # Examples
///
/// ```rust
/// use fixture_injector::{Class, Constructor, Injectable, Instance, Lazy};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// pub struct AuditLog;
///
/// impl Injectable for AuditLog {
///     fn class() -> &'static Class {
///         static CLASS: Lazy<Class> = Lazy::new(|| {
///             Class::concrete::<AuditLog>("AuditLog", module_path!())
///                 .constructor(Constructor::public(|| Ok(Arc::new(AuditLog) as Instance)))
///                 .build()
///         });
///         &CLASS
///     }
/// }
///
/// assert_eq!(AuditLog::class().name(), "AuditLog");
/// ```
pub trait Injectable: Send + Sync + 'static {
    /// The descriptor of this type
    fn class() -> &'static Class;
}

/// Declare the descriptor of a contract trait object.
///
/// The descriptor lives in the namespace of the invoking module, which is
/// where the naming convention looks for the implementation.
///
/// ```rust
/// use fixture_injector::{contract, Injectable};
///
/// pub trait UserDao: Send + Sync {}
/// contract!(dyn UserDao as "IUserDao", substitutable);
///
/// let class = <dyn UserDao as Injectable>::class();
/// assert_eq!(class.name(), "IUserDao");
/// assert!(class.is_substitutable());
/// ```
#[macro_export]
macro_rules! contract {
    (dyn $contract:ident) => {
        $crate::contract!(@describe $contract, stringify!($contract), false);
    };
    (dyn $contract:ident, substitutable) => {
        $crate::contract!(@describe $contract, stringify!($contract), true);
    };
    (dyn $contract:ident as $name:literal) => {
        $crate::contract!(@describe $contract, $name, false);
    };
    (dyn $contract:ident as $name:literal, substitutable) => {
        $crate::contract!(@describe $contract, $name, true);
    };
    (@describe $contract:ident, $name:expr, $substitutable:expr) => {
        impl $crate::Injectable for dyn $contract {
            fn class() -> &'static $crate::Class {
                static CLASS: $crate::Lazy<$crate::Class> = $crate::Lazy::new(|| {
                    $crate::Class::contract::<dyn $contract>($name, module_path!())
                        .substitutable($substitutable)
                        .build()
                });
                &CLASS
            }
        }
    };
}

/// Build the [`Conversion`](crate::Conversion) from a concrete type to one
/// of its contracts.
///
/// ```rust,ignore
/// Class::concrete::<PgUserDao>("PgUserDao", module_path!())
///     .implements(<dyn UserDao as Injectable>::class)
///     .upcast(upcast!(PgUserDao => dyn UserDao))
/// ```
#[macro_export]
macro_rules! upcast {
    ($concrete:ty => $contract:ty) => {
        $crate::Conversion::new::<$contract>(|instance| {
            let concrete: ::std::sync::Arc<$concrete> =
                ::std::sync::Arc::clone(instance).downcast::<$concrete>().ok()?;
            let contract: ::std::sync::Arc<$contract> = concrete;
            Some(::std::boxed::Box::new(contract)
                as ::std::boxed::Box<dyn ::std::any::Any + Send + Sync>)
        })
    };
}
