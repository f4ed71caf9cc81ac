pub mod app;
pub mod config;
pub mod error;
pub mod flash;
pub mod migrate;
pub mod movies;
pub mod omdb;
pub mod state;
pub mod store;
pub mod users;

/// Installs the global subscriber: `RUST_LOG` filter, JSON lines when
/// `LOG_FORMAT=json`.
pub fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "movieweb=debug,migrate_json=debug,axum=info,tower_http=info".to_string()
    });
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}
