pub mod builders;
pub mod recording_store;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use chrono::NaiveDate;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// How long an async test may run before it is considered hung.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a per-test tracing writer once per test binary.
///
/// Output is captured and only shown for failing tests (or with
/// `-- --nocapture`). Filter with `RUST_LOG`, e.g.
/// `RUST_LOG=taskshift::engine=debug cargo test`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,taskshift=info"));

        // Another harness may already have installed a subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
///
/// Used to turn a runaway cascade into a test failure instead of a hang.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test did not finish within {TEST_TIMEOUT:?}"))
}

/// Parse a `YYYY-MM-DD` literal.
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("bad test date literal {s:?}: {e}"))
}
