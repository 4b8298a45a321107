//! Logging initialization
//!
//! Logs go to stderr so they never mix with command output. `RUST_LOG`
//! takes precedence over the verbosity flag.

use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "promptvc=debug"
    } else {
        "promptvc=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
