pub mod admin;
pub mod appointments;
pub mod articles;
pub mod auth;
pub mod config;
pub mod doctors;
pub mod models;
pub mod notifications;
pub mod polis;
pub mod store;
pub mod users;
pub mod view_state;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` wins when set.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} core starting v{}", config::APP_NAME, config::APP_VERSION);
}
