//! Tracing initialization.

use tracing_subscriber::EnvFilter;

/// Initialize tracing (warn level unless `RUST_LOG` overrides it).
///
/// Safe to call more than once; later calls are no-ops so tests and
/// embedding applications don't fight over the global subscriber.
pub fn init() {
    init_with_filter("warn");
}

/// Initialize tracing with a caller-chosen default filter
/// (e.g. `"hookline=info"`). `RUST_LOG` still wins when set.
pub fn init_with_filter(default: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
