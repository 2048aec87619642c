//! Console logging for the CLI.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber on stderr.
///
/// `RUST_LOG` wins over `level` when set. Safe to call more than once; later
/// calls are ignored.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
