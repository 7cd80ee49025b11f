//! Injectable field cells
//!
//! Fixture structs declare their injection points with [`Inject`] (objects)
//! and [`Context`] (the shared context handle). Both are write-once cells:
//! the injector fills empty cells and leaves filled ones alone, which keeps
//! manual pre-wiring intact and lets shared services be wired after they
//! are already referenced elsewhere in the graph.

use crate::Injectable;
use crate::class::{Class, FieldType};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Type-erased instance created or tracked by the injector
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Type-erased shared context handle
pub type ContextHandle = Arc<dyn Any + Send + Sync>;

/// An instance together with the concrete class that describes it
#[derive(Clone)]
pub struct Managed {
    class: &'static Class,
    instance: Instance,
}

impl Managed {
    /// Pair an instance with its class.
    ///
    /// Returns `None` when the instance is not of the described type.
    pub fn new(class: &'static Class, instance: Instance) -> Option<Self> {
        let target: &dyn Any = &*instance;
        if target.type_id() == class.id() {
            Some(Self { class, instance })
        } else {
            None
        }
    }

    #[inline]
    pub fn class(&self) -> &'static Class {
        self.class
    }

    #[inline]
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Borrow the instance for field access
    #[inline]
    pub fn target(&self) -> &dyn Any {
        &*self.instance
    }

    /// View the instance as `Arc<T>`, where `T` is the concrete type or one
    /// of the contracts its class converts to.
    pub fn cast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.class
            .conversions()
            .iter()
            .find(|conversion| conversion.produces::<T>())
            .and_then(|conversion| conversion.apply(&self.instance))
            .and_then(|boxed| boxed.downcast::<Arc<T>>().ok())
            .map(|arc| *arc)
    }

    /// Whether both point at the same allocation
    #[inline]
    pub fn ptr_eq(&self, other: &Managed) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl fmt::Debug for Managed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Managed")
            .field("class", &self.class.name())
            .field("instance", &Arc::as_ptr(&self.instance))
            .finish()
    }
}

/// A value the injector assigns to a field
#[derive(Clone, Debug)]
pub enum Value {
    Object(Managed),
    Context(ContextHandle),
}

impl Value {
    fn describe(&self) -> String {
        match self {
            Value::Object(managed) => managed.class().qualified_name(),
            Value::Context(_) => "context handle".to_string(),
        }
    }
}

/// Why a slot rejected a value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("cannot assign {found} to a slot of type {expected}")]
    Mismatch { expected: &'static str, found: String },

    #[error("slot already holds a value")]
    Occupied,
}

/// Type-erased view of a field cell
pub trait Slot: Send + Sync {
    /// The declared type recorded in the field descriptor
    fn declared_type() -> FieldType
    where
        Self: Sized;

    /// Whether the cell holds no value yet
    fn is_empty(&self) -> bool;

    /// Store `value`, converting it to the cell's type
    fn fill(&self, value: &Value) -> Result<(), SlotError>;
}

/// Injection point holding a shared service or a generated fixture.
///
/// `T` is either a concrete struct or a contract such as `dyn UserDao`.
pub struct Inject<T: ?Sized> {
    cell: OnceCell<Arc<T>>,
}

impl<T: ?Sized> Inject<T> {
    /// An empty cell
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// A cell pre-wired with `value`; the injector will not touch it
    pub fn with(value: Arc<T>) -> Self {
        Self {
            cell: OnceCell::with_value(value),
        }
    }

    #[inline]
    pub fn get(&self) -> Option<&Arc<T>> {
        self.cell.get()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: ?Sized> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("type", &std::any::type_name::<T>())
            .field("set", &self.is_set())
            .finish()
    }
}

impl<T: ?Sized + Injectable> Slot for Inject<T> {
    fn declared_type() -> FieldType {
        FieldType::Class(<T as Injectable>::class)
    }

    fn is_empty(&self) -> bool {
        !self.is_set()
    }

    fn fill(&self, value: &Value) -> Result<(), SlotError> {
        let mismatch = || SlotError::Mismatch {
            expected: std::any::type_name::<T>(),
            found: value.describe(),
        };

        let Value::Object(managed) = value else {
            return Err(mismatch());
        };
        let arc = managed.cast::<T>().ok_or_else(mismatch)?;
        self.cell.set(arc).map_err(|_| SlotError::Occupied)
    }
}

/// Field receiving the shared context handle (e.g. a persistence session)
pub struct Context<C> {
    cell: OnceCell<Arc<C>>,
}

impl<C> Context<C> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn with(value: Arc<C>) -> Self {
        Self {
            cell: OnceCell::with_value(value),
        }
    }

    #[inline]
    pub fn get(&self) -> Option<&Arc<C>> {
        self.cell.get()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<C> Default for Context<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Context<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("type", &std::any::type_name::<C>())
            .field("set", &self.is_set())
            .finish()
    }
}

impl<C: Send + Sync + 'static> Slot for Context<C> {
    fn declared_type() -> FieldType {
        FieldType::Context(std::any::type_name::<C>())
    }

    fn is_empty(&self) -> bool {
        !self.is_set()
    }

    fn fill(&self, value: &Value) -> Result<(), SlotError> {
        let mismatch = || SlotError::Mismatch {
            expected: std::any::type_name::<C>(),
            found: value.describe(),
        };

        let Value::Context(handle) = value else {
            return Err(mismatch());
        };
        let handle = Arc::clone(handle).downcast::<C>().map_err(|_| mismatch())?;
        self.cell.set(handle).map_err(|_| SlotError::Occupied)
    }
}
