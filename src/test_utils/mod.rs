//! Test utilities for Packsmith
//!
//! Compiled for unit tests and, with the `test-utils` feature, for the
//! integration test harness.
//!
//! - [`builder`] - fluent builder for temporary content repositories
//! - [`fixtures`] - sample packs, packages and documents
//! - [`init_test_logging`] - opt-in log output for tests

pub mod builder;
pub mod fixtures;

pub use builder::{ContentRepo, ContentRepoBuilder};
pub use fixtures::{pack_metadata, sample_repo, sample_repo_builder};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for a test run.
///
/// Uses `level` when given, else `RUST_LOG` when set, else stays silent. Only
/// the first call in a process has any effect.
///
/// ```rust,ignore
/// use packsmith_cli::test_utils::init_test_logging;
///
/// init_test_logging(Some(tracing::Level::DEBUG));
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true) // targets such as "id_set::walk"
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
