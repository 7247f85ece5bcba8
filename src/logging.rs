//! Tracing subscriber setup.
//!
//! Logs go to stderr so rendered output on stdout stays clean. `RUST_LOG`
//! wins when set; otherwise the level comes from the verbosity flag.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool) {
    let default_level = if verbose { "resonance=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
