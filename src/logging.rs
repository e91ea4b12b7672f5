use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `warn`, raised to `debug` with
/// `--verbose`; either can be overridden via the `RUST_LOG` environment
/// variable. Events go to stderr so stdout stays reserved for command
/// output.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
