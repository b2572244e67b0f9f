//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use api::identity::BearerSessionIdentity;
use api::state::AppState;
use sqlx::postgres::PgPoolOptions;
use store::{PostgresCatalogStore, PostgresOrderStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Connects to PostgreSQL and applies pending migrations.
async fn postgres_state(url: &str, max_connections: u32) -> Arc<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .expect("failed to connect to database");

    store::run_migrations(&pool)
        .await
        .expect("failed to run migrations");
    tracing::info!(max_connections, "connected to PostgreSQL");

    Arc::new(AppState::new(
        Arc::new(PostgresCatalogStore::new(pool.clone())),
        Arc::new(PostgresOrderStore::new(pool)),
        Arc::new(BearerSessionIdentity),
    ))
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Pick the backing stores
    let state = match config.database_url.as_deref() {
        Some(url) => postgres_state(url, config.database_max_connections).await,
        None => {
            tracing::warn!(
                principal = api::DEMO_PRINCIPAL,
                "DATABASE_URL not set, using seeded in-memory stores"
            );
            let (catalog, orders) = api::seeded_in_memory_stores().await;
            api::create_in_memory_state(catalog, orders)
        }
    };

    // 4. Build the application
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
