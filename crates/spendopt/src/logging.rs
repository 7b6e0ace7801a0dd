//! Tracing initialization for the CLI

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging to stderr.
///
/// Reads `SPENDOPT_LOG` for per-module levels, e.g.
/// `SPENDOPT_LOG=spendopt_core::optimizer=debug,spendopt_core::parsers=info`.
///
/// Falls back to `spendopt=warn` if `SPENDOPT_LOG` is not set or is invalid.
/// Safe to call more than once.
pub fn init_tracing(no_color: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("SPENDOPT_LOG")
            .unwrap_or_else(|_| EnvFilter::new("spendopt=warn"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(!no_color)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}
