//! Shared test utilities
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration test suite. Keep anything here free of production behavior -
//! these helpers exist purely to make tests shorter and more uniform.

use tracing_subscriber::EnvFilter;

/// Initializes test logging once per process.
///
/// Respects `RUST_LOG` when set and defaults to `warn` otherwise, so noisy
/// lifecycle logging stays out of test output unless explicitly requested.
pub fn init_test_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_test_writer()
        .try_init();
}
