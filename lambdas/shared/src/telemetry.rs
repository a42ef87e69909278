//! Logging setup shared by every Lambda

use tracing_subscriber::EnvFilter;

/// Installs the JSON subscriber. Level comes from `RUST_LOG`, default `info`.
///
/// CloudWatch stamps every line, so no timestamp is emitted here.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_current_span(false)
        .try_init();
}
