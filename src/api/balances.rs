use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::AppState;
use crate::{
    error::{AppError, Result},
    services::PortfolioView,
};

#[derive(Debug, Default, Deserialize)]
pub struct BalancesQuery {
    pub chain: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

/// GET /balances/{address}
pub async fn get_balances(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<BalancesQuery>,
) -> Result<Response> {
    let view = PortfolioView::new(
        query.chain.as_deref(),
        query.search.as_deref(),
        query.sort.as_deref(),
    )?;
    let payload = state.portfolio.balances_payload(&address, &view).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        payload,
    )
        .into_response())
}

/// GET /balances
pub async fn missing_address() -> Result<Response> {
    Err(AppError::InvalidAddress("address is required".to_string()))
}
