use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{clients::provider::ProviderRegistry, config::Config, models::channel::Channel};

pub struct AppState {
    registry: Arc<ProviderRegistry>,
}

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    active_providers: HashMap<Channel, usize>,
}

pub async fn run_api_server(
    config: Config,
    registry: Arc<ProviderRegistry>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState { registry });

    let app = Router::new()
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Health check server started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let active_providers: HashMap<Channel, usize> = Channel::ALL
        .iter()
        .map(|channel| (*channel, state.registry.active_count(*channel)))
        .collect();

    // In-app needs no provider; any other channel without one is degraded,
    // not down: sends on covered channels still work.
    let degraded = active_providers
        .iter()
        .any(|(channel, count)| *channel != Channel::InApp && *count == 0);

    let report = HealthReport {
        status: if degraded { "degraded" } else { "healthy" },
        active_providers,
    };

    (StatusCode::OK, Json(report))
}
