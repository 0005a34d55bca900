//! Logging and tracing setup for the provider.
//!
//! All logs go to **stderr**; stdout belongs to the host's plugin handshake.
//! Filtering follows `RUST_LOG`, e.g. `RUST_LOG=jiraassets_provider=debug`
//! to see every Assets API request.
//!
//! Credentials never reach the log: the password is held as a
//! [`secrecy::SecretString`] and handlers skip it in their spans.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LEVEL: &str = "info";

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn try_install(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(filter(default_level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .is_ok()
}

/// Initialize the global subscriber at the [`DEFAULT_LEVEL`].
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LEVEL);
}

/// Like [`init_logging`], with a custom level used when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    if !try_install(default_level) {
        panic!("a global tracing subscriber has already been set");
    }
}

/// Try to initialize logging, returning false if a subscriber already exists.
///
/// Safe to call from tests and from hosts that may set up logging themselves.
pub fn try_init_logging() -> bool {
    try_install(DEFAULT_LEVEL)
}
