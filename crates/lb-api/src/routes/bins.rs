//! Bin math routes

use axum::{http::StatusCode, routing::post, Json, Router};

use crate::dto::{ApiError, BinResponse, IdFromPriceRequest, PriceFromIdRequest};
use crate::routes::lb_error;
use crate::AppState;

/// Create bin routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/price", post(price_from_id))
        .route("/id", post(id_from_price))
}

/// POST /bins/price - Price of a bin id
async fn price_from_id(Json(request): Json<PriceFromIdRequest>) -> Json<BinResponse> {
    Json(BinResponse {
        id: request.id,
        price: liquidity_book::get_price_from_id(request.id, request.bin_step),
        bin_step: request.bin_step,
    })
}

/// POST /bins/id - Bin id containing a price
async fn id_from_price(
    Json(request): Json<IdFromPriceRequest>,
) -> Result<Json<BinResponse>, (StatusCode, Json<ApiError>)> {
    let id = liquidity_book::try_get_id_from_price(request.price, request.bin_step)
        .map_err(lb_error)?;

    Ok(Json(BinResponse {
        id,
        price: request.price,
        bin_step: request.bin_step,
    }))
}
