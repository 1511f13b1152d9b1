//! `env_logger` setup for binaries and tests embedding the codecs.

use env_logger::{Builder, Env};

const DEFAULT_FILTER: &str = "netcode=info";

/// Installs a global logger filtered by `RUST_LOG`, falling back to
/// `netcode=info`. Calling it again is a no-op.
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .format_timestamp_millis()
        .format_target(true)
        .try_init();
}

/// Debug-level logger whose output the test harness captures per test.
pub fn init_for_tests() {
    let _ = Builder::from_env(Env::default().default_filter_or("netcode=debug"))
        .is_test(true)
        .try_init();
}
