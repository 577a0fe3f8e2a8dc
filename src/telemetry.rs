use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber: JSON lines on stdout, level from
/// `RUST_LOG`. Safe to call more than once; later calls are no-ops.
pub fn init_telemetry() {
    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .json();

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(formatting_layer)
        .try_init();
}
