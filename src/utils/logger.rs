// Logger initialization

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "photo_gateway=debug,tower_http=debug,axum=debug";

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_logger() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
