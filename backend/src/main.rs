//! Discovery backend HTTP server.

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use backend::api;
use backend::config::Config;
use backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config)?;

    let app = Router::new()
        .route("/api/datasets/search", post(api::search_datasets_handler))
        .route("/api/datasets/{id}", get(api::retrieve_dataset_handler))
        .route("/api/filters", get(api::list_filters_handler))
        .route("/api/variants", post(api::query_variants_handler))
        .route("/healthz", get(healthz))
        .with_state(state);

    info!("discovery backend listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}
