use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "TALLY_LOG";

/// Install a stderr subscriber. `TALLY_LOG` takes precedence; otherwise
/// `verbose` selects `debug` over the default `warn`.
pub fn init(verbose: bool) {
    let default_level = if verbose { "tally=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // Subscriber may already be installed (tests, embedding hosts).
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
