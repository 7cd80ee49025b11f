//! Field access
//!
//! The injector reaches fields only through the accessors recorded in the
//! class descriptors. This module wraps those accessors and turns every
//! failure into [`InjectionError::FieldAccessDenied`] naming the field and
//! its owner.

use crate::class::{Class, Field, Superclass};
use crate::error::{InjectionError, Result};
use crate::slot::{Slot, Value};
use std::any::Any;

/// Borrow the slot of `field`, declared on `owner`, from `target`
pub fn get<'a>(owner: &Class, field: &Field, target: &'a dyn Any) -> Result<&'a dyn Slot> {
    field.slot(target).ok_or_else(|| {
        InjectionError::access_denied(
            field.name(),
            owner.name(),
            "the accessor does not recognize the target instance",
        )
    })
}

/// Whether the slot of `field` holds no value yet
#[inline]
pub fn is_empty(owner: &Class, field: &Field, target: &dyn Any) -> Result<bool> {
    get(owner, field, target).map(|slot| slot.is_empty())
}

/// Assign `value` to the slot of `field`
pub fn set(owner: &Class, field: &Field, target: &dyn Any, value: &Value) -> Result<()> {
    get(owner, field, target)?
        .fill(value)
        .map_err(|err| InjectionError::access_denied(field.name(), owner.name(), err.to_string()))
}

/// Borrow the ancestor part of `target` described by `superclass`
pub fn view<'a>(owner: &Class, superclass: &Superclass, target: &'a dyn Any) -> Result<&'a dyn Any> {
    superclass.view(target).ok_or_else(|| {
        InjectionError::access_denied(
            superclass.class().name(),
            owner.name(),
            "the ancestor view does not recognize the target instance",
        )
    })
}
