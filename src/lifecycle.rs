//! Initialization hooks
//!
//! A freshly constructed service component gets its initialization hooks
//! invoked before it is wired into the graph. Hooks are looked up on the
//! concrete class first, then on each ancestor in turn.

use crate::access;
use crate::error::{BoxError, InjectionError, Result};
use crate::slot::Managed;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

const HOOK_REASON: &str = "Initialization hooks must be methods without arguments.";

/// Return type accepted from an initialization hook.
///
/// Hooks may return `()` or `Result<(), E>` for any error convertible into
/// [`BoxError`]; `#[derive(Injectable)]` relies on this to wrap them.
pub trait IntoHookResult {
    fn into_hook_result(self) -> std::result::Result<(), BoxError>;
}

impl IntoHookResult for () {
    #[inline]
    fn into_hook_result(self) -> std::result::Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> IntoHookResult for std::result::Result<(), E> {
    #[inline]
    fn into_hook_result(self) -> std::result::Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// Invoke every initialization hook declared across the class hierarchy of
/// `managed`, own class first.
pub fn invoke_init_hooks(managed: &Managed) -> Result<()> {
    let mut target = managed.target();
    let mut class = managed.class();

    loop {
        for method in class.methods().iter().filter(|m| m.is_init_hook()) {
            if method.arity() != 0 {
                return Err(InjectionError::misdeclared_hook(
                    method.name(),
                    class.qualified_name(),
                    HOOK_REASON,
                ));
            }

            #[cfg(feature = "logging")]
            trace!(
                target: "fixture_injector",
                class = %class,
                method = method.name(),
                "Invoking initialization hook"
            );

            method.invoke(target).map_err(|source| {
                #[cfg(feature = "logging")]
                debug!(
                    target: "fixture_injector",
                    class = %class,
                    method = method.name(),
                    error = %source,
                    "Initialization hook failed"
                );

                InjectionError::LifecycleInvocation {
                    method: method.name(),
                    type_name: class.qualified_name(),
                    reason: HOOK_REASON.to_string(),
                    source: Some(source),
                }
            })?;
        }

        let Some(superclass) = class.superclass() else {
            return Ok(());
        };
        target = access::view(class, superclass, target)?;
        class = superclass.class();
    }
}
