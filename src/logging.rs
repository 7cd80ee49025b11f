//! Logging setup for test suites
//!
//! The injector emits `tracing` events under the `fixture_injector` target:
//! `debug` for created components, registered substitutes and failures,
//! `trace` for reused components and skipped fields.
//!
//! Test binaries usually install a subscriber once per process; every
//! `init` function here may be called from many tests and only the first
//! call takes effect.
//!
//! # Features
//!
//! - `logging` - emit events (default)
//! - `logging-json` - JSON subscriber output
//! - `logging-pretty` - multi-line human readable output
//!
//! # Example
//!
//! ```rust,ignore
//! use fixture_injector::logging;
//!
//! #[test]
//! fn test_order_generator() {
//!     logging::builder().trace().fixtures_only().init();
//!     // ...
//! }
//! ```

#[cfg(feature = "logging")]
use tracing::Level;

/// Target of every event emitted by the injector
pub const TARGET: &str = "fixture_injector";

/// Subscriber output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One line per event, fits test runner output
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Builder for the test subscriber
#[cfg(feature = "logging")]
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_file: bool,
    with_line_number: bool,
}

#[cfg(feature = "logging")]
impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Compact,
            target: None,
            with_file: false,
            with_line_number: false,
        }
    }
}

#[cfg(feature = "logging")]
impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Include reused components and skipped fields
    pub fn trace(self) -> Self {
        self.with_level(Level::TRACE)
    }

    pub fn debug(self) -> Self {
        self.with_level(Level::DEBUG)
    }

    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Hide events from every crate but this one
    pub fn fixtures_only(self) -> Self {
        self.with_target_filter(TARGET)
    }

    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// The `EnvFilter` directive `init` installs
    pub fn directive(&self) -> String {
        match self.target {
            Some(target) => format!("{}={}", target, self.level),
            None => self.level.to_string(),
        }
    }

    /// Install the subscriber.
    ///
    /// Returns `false` when a global subscriber was already installed.
    /// `Json` falls back to compact output without the `logging-json`
    /// feature.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) -> bool {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::new(self.directive());
        let layer = fmt::layer()
            .with_test_writer()
            .with_file(self.with_file)
            .with_line_number(self.with_line_number)
            .with_target(true);
        let registry = tracing_subscriber::registry().with(filter);

        match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => registry.with(layer.json()).try_init().is_ok(),
            LogFormat::Pretty => registry.with(layer.pretty()).try_init().is_ok(),
            _ => registry.with(layer.compact()).try_init().is_ok(),
        }
    }

    /// No subscriber is available without `logging-json` or `logging-pretty`
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) -> bool {
        false
    }
}

#[cfg(feature = "logging")]
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Install the default subscriber: JSON with `logging-json`, compact
/// otherwise. No-op without a subscriber feature.
pub fn init() {
    #[cfg(feature = "logging-json")]
    builder().json().init();

    #[cfg(all(feature = "logging-pretty", not(feature = "logging-json")))]
    builder().compact().init();
}

/// Install a subscriber showing only this crate's events at `trace` level
pub fn init_fixtures_only() {
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    builder().fixtures_only().trace().init();
}
