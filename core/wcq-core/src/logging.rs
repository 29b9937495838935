//! Logging utilities for WCQ
//!
//! Every event of the read path is emitted under the `wcq` target: compile
//! summaries and reconstruction counts at `debug`, per-group events at
//! `trace`, contract violations at `error`.

#[cfg(feature = "logging")]
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(level: &str) -> String {
    format!("wcq={level}")
}

/// Initialize logging at `info` for the read path
///
/// # Environment Variables
/// - `RUST_LOG` - overrides the filter entirely
///
/// # Example
/// ```rust
/// wcq_core::logging::init();
/// ```
#[cfg(feature = "logging")]
pub fn init() {
    init_with_level("info")
}

/// Initialize logging for the read path at `level`
/// (trace, debug, info, warn, error). Later calls are ignored.
#[cfg(feature = "logging")]
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// 테스트용 초기화: `debug` 레벨, test harness writer
#[cfg(feature = "logging")]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(default_directive("debug")))
        .with_test_writer()
        .try_init();
}

// Stub implementations when logging feature is disabled
#[cfg(not(feature = "logging"))]
pub fn init() {}

#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: &str) {}

#[cfg(not(feature = "logging"))]
pub fn init_test() {}
