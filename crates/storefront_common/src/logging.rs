//! Logging utilities for the storefront backend.
//!
//! Every crate logs through `tracing` macros with structured fields; this
//! module only owns subscriber initialisation.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with a specific log level.
///
/// The level applies to the storefront crates. `RUST_LOG` directives are
/// honoured on top of it, e.g. `RUST_LOG=tower_http=debug`. Calling this
/// more than once is harmless; only the first subscriber is installed.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    for target in ["storefront_backend", "storefront_stripe", "storefront_db", "storefront_common", "storefront_config"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Parses a level name from configuration, falling back to INFO.
pub fn parse_level(name: &str) -> Level {
    name.trim().parse().unwrap_or(Level::INFO)
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => tracing::error!("{}: {}", error_context, e),
    }
    result
}
