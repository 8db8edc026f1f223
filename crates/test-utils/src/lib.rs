//! Shared helpers for the `rundag` integration tests.

pub mod tasks;

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// Uses `with_test_writer()`, so output is captured per-test and only
/// printed for failing tests (unless the harness runs with `--nocapture`).
/// Levels come from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Upper bound on any single awaited engine pass in tests.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Await `f`, panicking if it does not finish within [`TEST_TIMEOUT`].
///
/// Every test that drives a scheduling pass goes through this, so a
/// scheduler bug that stops draining workers fails the test instead of
/// hanging the suite.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .expect("test timed out after 5 seconds")
}
