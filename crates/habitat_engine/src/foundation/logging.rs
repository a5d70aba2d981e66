//! Logging utilities

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system.
///
/// Honors `RUST_LOG`; defaults to `info` when it is unset. Safe to call more
/// than once (later calls are ignored).
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Initialize logging for unit tests (captured by the test harness).
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
