//! API route handlers

pub mod bins;
pub mod health;
pub mod liquidity;
pub mod trades;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use liquidity_book::LbError;

use crate::dto::ApiError;
use crate::{AppState, StateError};

type HandlerError = (StatusCode, Json<ApiError>);

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/routes", post(trades::find_routes))
        .nest("/bins", bins::router())
        .nest("/liquidity", liquidity::router())
        .nest("/trades", trades::router())
        .with_state(state)
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub(crate) fn lb_error(e: LbError) -> HandlerError {
    if e.status_code() >= 500 {
        tracing::warn!(error = %e, "Request failed");
    }
    (
        status(e.status_code()),
        Json(ApiError::new(e.error_code(), e.to_string())),
    )
}

pub(crate) fn state_error(e: StateError) -> HandlerError {
    (
        status(e.status_code()),
        Json(ApiError::new(e.error_code(), e.to_string())),
    )
}

/// Raw token amount sent as a decimal string
pub(crate) fn parse_amount(field: &str, raw: &str) -> Result<u128, HandlerError> {
    raw.trim().parse::<u128>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                "invalid_amount",
                format!("{} must be a non-negative integer, got {:?}", field, raw),
            )),
        )
    })
}
