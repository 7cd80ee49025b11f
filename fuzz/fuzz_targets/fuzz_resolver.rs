#![no_main]

//! Fuzz target for convention-based resolution
//!
//! Feeds arbitrary contract names and naming conventions through the
//! candidate computation and the catalog lookup.

use arbitrary::Arbitrary;
use fixture_injector::{Catalog, MarkerPrefix};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    marker: char,
    suffix: Suffix,
    names: Vec<String>,
    lookups: Vec<String>,
}

#[derive(Debug, Arbitrary)]
enum Suffix {
    Impl,
    Bean,
    Empty,
}

impl Suffix {
    fn as_str(&self) -> &'static str {
        match self {
            Suffix::Impl => "Impl",
            Suffix::Bean => "Bean",
            Suffix::Empty => "",
        }
    }
}

fuzz_target!(|input: Input| {
    let naming = MarkerPrefix::new(input.marker, input.suffix.as_str());

    for name in &input.names {
        let candidate = naming.candidate_for(name);

        // Either the marker was stripped or the suffix was appended
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(first), Some(second)) if first == input.marker && second.is_uppercase() => {
                assert_eq!(candidate.len() + first.len_utf8(), name.len());
                assert!(name.ends_with(&candidate));
            }
            _ => {
                assert!(candidate.starts_with(name.as_str()));
                assert!(candidate.ends_with(input.suffix.as_str()));
            }
        }
    }

    // Lookups on an empty catalog never find anything
    let catalog = Catalog::new();
    for name in &input.lookups {
        assert!(catalog.lookup(name).is_none());
        assert!(!catalog.contains(name));
    }
    assert!(catalog.is_empty());
});
