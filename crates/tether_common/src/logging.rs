//! Logging setup for binaries built on tether.
//!
//! Library code only emits `tracing` events; installing a subscriber is left to
//! the executable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable that overrides the default filter (same syntax as
/// `RUST_LOG`).
pub const LOG_ENV: &str = "TETHER_LOG";

/// Returns the default filter directive for the given verbosity flags.
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Installs a stderr subscriber filtered by `TETHER_LOG` or the verbosity flags.
///
/// Calling it twice is harmless: the second installation is ignored.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(default_directive(true, true), "error");
        assert_eq!(default_directive(true, false), "debug");
        assert_eq!(default_directive(false, false), "info");
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(false, true);
        init_logging(true, false);
    }
}
