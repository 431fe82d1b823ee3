// Shared helpers for the integration tests. Each topic file pulls this in
// with `#[path = "../common/mod.rs"]`, so not every helper is used
// everywhere.
#![allow(dead_code)]

pub mod fixtures;

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
