use tracing_subscriber::EnvFilter;

/// Installs the process-global structured logging subscriber. Called once
/// per worker process (spec §5: "process-global logging configuration is
/// initialized once per worker").
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
