//! Naming conventions mapping a contract to its implementation
//!
//! Implementations are found by name instead of through explicit bindings.
//! Fixture authors therefore have to follow a naming discipline: for a
//! contract `IUserDao` the implementation is `UserDao`, for a contract
//! `UserDao` it is `UserDaoImpl`, declared in the same namespace.

use crate::class::Class;

/// Strategy producing the simple name of the type implementing a contract
pub trait NamingConvention: Send + Sync {
    /// Candidate implementation name for `contract`
    fn candidate(&self, contract: &Class) -> String;
}

impl<F> NamingConvention for F
where
    F: Fn(&Class) -> String + Send + Sync,
{
    fn candidate(&self, contract: &Class) -> String {
        self(contract)
    }
}

/// Strip a leading marker character, or append a suffix.
///
/// `IUserDao` becomes `UserDao` because the marker `I` is followed by an
/// uppercase letter; `Inventory` becomes `InventoryImpl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPrefix {
    marker: char,
    suffix: &'static str,
}

impl MarkerPrefix {
    pub const fn new(marker: char, suffix: &'static str) -> Self {
        Self { marker, suffix }
    }

    /// Candidate implementation name for a contract named `name`
    pub fn candidate_for(&self, name: &str) -> String {
        candidate_name(name, self.marker, self.suffix)
    }
}

impl Default for MarkerPrefix {
    fn default() -> Self {
        Self::new('I', "Impl")
    }
}

impl NamingConvention for MarkerPrefix {
    fn candidate(&self, contract: &Class) -> String {
        self.candidate_for(contract.name())
    }
}

fn candidate_name(name: &str, marker: char, suffix: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first == marker && second.is_uppercase() => {
            name[first.len_utf8()..].to_string()
        }
        _ => format!("{name}{suffix}"),
    }
}
