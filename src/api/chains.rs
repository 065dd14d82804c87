use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use super::AppState;
use crate::error::Result;

/// GET /chains
pub async fn get_chains(State(state): State<AppState>) -> Result<Response> {
    let names = state.portfolio.chain_names().await?;
    let cache_control = format!("public, max-age={}", state.config.chain_list_max_age_secs);

    Ok(([(header::CACHE_CONTROL, cache_control)], Json(names)).into_response())
}
