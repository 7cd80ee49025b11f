//! Example demonstrating the #[derive(Injectable)] macro
//!
//! Run with:
//!   cargo run --example derive --features derive

use fixture_injector::{Context, Inject, Injectable, Injector};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// Stand-in for a database session
struct Session {
    url: String,
}

pub trait CustomerDao: Send + Sync {
    fn describe(&self) -> String;
}
fixture_injector::contract!(dyn CustomerDao as "ICustomerDao");

pub trait Mailer: Send + Sync {
    fn send(&self, to: &str) -> String;
}
fixture_injector::contract!(dyn Mailer as "IMailer", substitutable);

// `ICustomerDao` is implemented by the type named `CustomerDao`
#[derive(Default, Injectable)]
#[injectable(name = "CustomerDao", implements(dyn CustomerDao), init = connect)]
pub struct PgCustomerDao {
    #[context]
    session: Context<Session>,
    connections: AtomicU64,
}

impl PgCustomerDao {
    fn connect(&self) {
        self.connections.fetch_add(1, Ordering::SeqCst);
    }
}

impl CustomerDao for PgCustomerDao {
    fn describe(&self) -> String {
        let url = self.session.get().map_or("<none>", |s| s.url.as_str());
        format!(
            "CustomerDao on {} ({} connection)",
            url,
            self.connections.load(Ordering::SeqCst)
        )
    }
}

#[derive(Default, Injectable)]
#[injectable(name = "Mailer", implements(dyn Mailer))]
pub struct SmtpMailer;

impl Mailer for SmtpMailer {
    fn send(&self, to: &str) -> String {
        format!("smtp -> {to}")
    }
}

// Test double, only used where a field asks for it
#[derive(Default, Injectable)]
#[injectable(implements(dyn Mailer))]
pub struct RecordingMailer;

impl Mailer for RecordingMailer {
    fn send(&self, to: &str) -> String {
        format!("recorded mail to {to}")
    }
}

#[derive(Default, Injectable)]
pub struct CustomerGenerator {
    #[service]
    customers: Inject<dyn CustomerDao>,
    #[service]
    mailer: Inject<dyn Mailer>,
}

#[derive(Default, Injectable)]
pub struct OrderGenerator {
    #[service]
    #[use_substitute(RecordingMailer)]
    mailer: Inject<dyn Mailer>,
    #[fixture]
    customers: Inject<CustomerGenerator>,
    #[context]
    session: Context<Session>,
    // Not described, left alone by the injector
    created: u64,
}

fn main() {
    println!("=== Fixture Injector Derive Macro Demo ===\n");

    let injector = Injector::builder()
        .register::<PgCustomerDao>()
        .register::<SmtpMailer>()
        .register::<RecordingMailer>()
        .build();

    let session = Arc::new(Session {
        url: "postgres://localhost:5432/test".into(),
    });

    // Finder: services and context only
    println!("Injecting a CustomerGenerator as a finder...");
    let finder = CustomerGenerator::default();
    if let Err(err) = injector.inject_finder(&finder, Arc::clone(&session)) {
        eprintln!("  injection failed: {err}");
        return;
    }
    if let (Some(customers), Some(mailer)) = (finder.customers.get(), finder.mailer.get()) {
        println!("  {}", customers.describe());
        println!("  {}", mailer.send("finder@example.com"));
    }
    println!();

    // Generator: nested fixtures too, with the mailer substituted everywhere
    println!("Injecting an OrderGenerator as a generator...");
    let orders = OrderGenerator::default();
    if let Err(err) = injector.inject_generator(&orders, Arc::clone(&session)) {
        eprintln!("  injection failed: {err}");
        return;
    }
    if let Some(nested) = orders.customers.get() {
        if let Some(customers) = nested.customers.get() {
            println!("  nested: {}", customers.describe());
        }
        if let Some(mailer) = nested.mailer.get() {
            println!("  nested: {}", mailer.send("orders@example.com"));
        }
    }
    println!(
        "  context shared: {}",
        orders
            .session
            .get()
            .is_some_and(|s| Arc::ptr_eq(s, &session))
    );
    println!("  created counter untouched: {}", orders.created);

    println!("\n=== Demo Complete ===");
    println!("\nThe #[derive(Injectable)] macro generated a class descriptor that:");
    println!("  - Lists #[service], #[fixture] and #[context] fields");
    println!("  - Registers #[use_substitute] test doubles when the field is visited");
    println!("  - Runs init hooks on freshly created services");
}
