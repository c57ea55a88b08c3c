//! Log capture for tests.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Route reconciler logs into the test harness output.
///
/// Uses `RUST_LOG` when set, otherwise `warn`. Safe to call from every test;
/// only the first call in a process installs the subscriber.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer().with_test_writer().with_target(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::warn!("captured by the test writer");
    }
}
