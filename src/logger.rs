use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Installs a global `tracing` subscriber for applications embedding the
/// crate. `REQGATE_LOG` (or `RUST_LOG`) overrides the default level;
/// `verbose` selects debug over info when neither is set.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = std::env::var("REQGATE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    let subscriber = fmt().with_env_filter(filter).with_target(false).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already initialized, keep the first subscriber.
        tracing::debug!("logging already initialized");
    }
}
