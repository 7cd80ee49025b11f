//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (CI):
//! ```bash
//! cargo run --example logging --features derive,logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features derive,logging-pretty
//! ```

use fixture_injector::{Context, Inject, Injectable, Injector};
use std::sync::Arc;

struct Session;

pub trait InvoiceDao: Send + Sync {}
fixture_injector::contract!(dyn InvoiceDao as "IInvoiceDao");

#[derive(Default, Injectable)]
#[injectable(name = "InvoiceDao", implements(dyn InvoiceDao))]
pub struct SqlInvoiceDao {
    #[context]
    session: Context<Session>,
}

impl InvoiceDao for SqlInvoiceDao {}

#[derive(Default, Injectable)]
pub struct LineGenerator {
    #[service]
    invoices: Inject<dyn InvoiceDao>,
}

#[derive(Default, Injectable)]
pub struct InvoiceGenerator {
    #[service]
    invoices: Inject<dyn InvoiceDao>,
    #[fixture]
    lines: Inject<LineGenerator>,
    #[fixture]
    loop_back: Inject<InvoiceGenerator>,
}

#[derive(Default, Injectable)]
pub struct InvoiceFinder {
    #[service]
    invoices: Inject<dyn InvoiceDao>,
    #[fixture]
    lines: Inject<LineGenerator>,
}

fn main() {
    // JSON with logging-json, compact with logging-pretty
    fixture_injector::logging::builder().trace().fixtures_only().init();

    println!("=== Fixture Injector Logging Demo ===\n");

    let injector = Injector::builder().register::<SqlInvoiceDao>().build();

    // Logs: "Starting injection", "Created service component",
    // "Injection complete"; fixtures are skipped for finders
    let finder = InvoiceFinder::default();
    let _ = injector.inject_finder(&finder, Arc::new(Session));

    // Logs: "Created fixture", "Reusing service component", then
    // "Fixture loop detected" and "Injection failed" for the self-nesting field
    let generator = InvoiceGenerator::default();
    if let Err(err) = injector.inject_generator(&generator, Arc::new(Session)) {
        println!("  expected failure: {err}");
    }

    println!("\n=== Demo Complete ===");
    println!("Check the log output above to see structured logging in action!");
    println!("\nTip: Use --features logging-json for CI (JSON output)");
    println!("     Use --features logging-pretty for development");
}
