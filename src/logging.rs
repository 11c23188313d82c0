//! Logging initialization built on `tracing`.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging for the binary.
///
/// Verbosity: `-v` enables debug, `-vv` trace; `--quiet` restricts to
/// errors. `RUST_LOG` overrides everything when set.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool) -> anyhow::Result<()> {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("civitrack={default_level}")));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Initialize logging for tests. Safe to call more than once.
pub fn init_test_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("civitrack=debug"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
