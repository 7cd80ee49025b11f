//! Error types for fixture injection

use thiserror::Error;

/// Boxed error returned by constructors and initialization hooks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while populating a fixture graph.
///
/// Every variant is a misconfiguration of the fixture types or a structural
/// problem in the graph, so nothing here is retried. The whole `inject` call
/// aborts on the first error and fields already assigned stay assigned.
#[derive(Error, Debug)]
pub enum InjectionError {
    /// No concrete, publicly constructible type could be found
    #[error("Unable to instantiate a new object from type [{type_name}]: {reason}")]
    NoInstantiableImplementation { type_name: String, reason: String },

    /// A substitute type implements no contract marked as substitutable
    #[error("There is no suitable contract for substitute class: {type_name}")]
    NoSuitableContract { type_name: String },

    /// A field could not be read or written
    #[error("Unable to access field [{field}] of the object [{owner}]: {reason}")]
    FieldAccessDenied {
        field: &'static str,
        owner: &'static str,
        reason: String,
    },

    /// The same fixture path was reached twice
    #[error(
        "The fixture {type_name} already exists for the path: {path}. \
         It seems that you have a loop in your fixture configuration that is not allowed."
    )]
    CircularFixtureDependency { type_name: &'static str, path: String },

    /// An initialization hook failed or cannot be called without arguments
    #[error("Unable to call the method {method} on object of class {type_name}: {reason}")]
    LifecycleInvocation {
        method: &'static str,
        type_name: String,
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A constructor returned an error
    #[error("Unable to instantiate {type_name}: {source}")]
    InstantiationFailure {
        type_name: String,
        #[source]
        source: BoxError,
    },

    /// A class asks for a named context the holder does not know
    #[error("No context named [{name}] is registered (requested by {type_name})")]
    UnknownContext { name: String, type_name: &'static str },

    /// A named context tried to take the name reserved for the default one
    #[error("The context name [{name}] is reserved")]
    ReservedContextName { name: String },
}

impl InjectionError {
    /// Create a NoInstantiableImplementation error
    #[inline]
    pub fn no_implementation(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NoInstantiableImplementation {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a FieldAccessDenied error
    #[inline]
    pub fn access_denied(
        field: &'static str,
        owner: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::FieldAccessDenied {
            field,
            owner,
            reason: reason.into(),
        }
    }

    /// Create a LifecycleInvocation error without an underlying cause
    #[inline]
    pub fn misdeclared_hook(
        method: &'static str,
        type_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::LifecycleInvocation {
            method,
            type_name: type_name.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Create an InstantiationFailure error
    #[inline]
    pub fn instantiation(type_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::InstantiationFailure {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// Check whether this error reports a cycle among fixtures
    #[inline]
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularFixtureDependency { .. })
    }
}

/// Result type alias for injection operations
pub type Result<T> = std::result::Result<T, InjectionError>;
