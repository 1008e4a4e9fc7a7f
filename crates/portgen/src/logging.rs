//! Tracing setup for the binary.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Filter used when `RUST_LOG` is unset. Covers every `portgen*` crate.
pub const DEFAULT_FILTER: &str = "portgen=info";

/// Initialize tracing to stderr.
///
/// Safe to call multiple times. Override verbosity with e.g.
/// `RUST_LOG=portgen_codegen=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    });
}
