use axum::{extract::State, Json};
use serde::Serialize;
use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub upstream: String,
    pub cached_payloads: usize,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Liveness only; the gateway is not probed here.
    let cached_payloads = state.portfolio.cache().len().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        upstream: state.portfolio.gateway_endpoint().to_string(),
        cached_payloads,
    })
}
