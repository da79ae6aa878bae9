use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Console logging. `RUST_LOG` wins; otherwise `info`, or `debug` for this crate in debug mode.
pub fn init_tracing(debug: bool) {
    let default_directive = if debug {
        "info,recipe_assistant=debug,tower_http=debug"
    } else {
        "info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
