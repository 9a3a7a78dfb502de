use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `ECOSCORE_LOG` wins over `RUST_LOG`; without either, only warnings show
/// (debug with `verbose`).
pub fn init(verbose: bool) {
    let fallback = if verbose { "ecoscore=debug" } else { "warn" };
    let env_filter = std::env::var("ECOSCORE_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
