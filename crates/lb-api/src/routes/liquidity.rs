//! Liquidity shape routes

use axum::{http::StatusCode, routing::post, Json, Router};
use liquidity_book::{
    get_bid_ask_distribution_from_bin_range, get_curve_distribution_from_bin_range,
    get_distribution_from_target_bin, get_liquidity_config,
    get_uniform_distribution_from_bin_range, TokenAmount,
};

use crate::dto::{ApiError, DistributionRequest, DistributionResponse, RangeShape};
use crate::routes::{lb_error, parse_amount};
use crate::AppState;

/// Create liquidity routes
pub fn router() -> Router<AppState> {
    Router::new().route("/distribution", post(distribution))
}

/// POST /liquidity/distribution - addLiquidity distribution for a shape
async fn distribution(
    Json(request): Json<DistributionRequest>,
) -> Result<Json<DistributionResponse>, (StatusCode, Json<ApiError>)> {
    let params = match request {
        DistributionRequest::Canned { shape } => get_liquidity_config(shape),
        DistributionRequest::TargetBin {
            active_id,
            target_bin,
        } => get_distribution_from_target_bin(active_id, target_bin),
        DistributionRequest::Range {
            shape,
            active_id,
            lo,
            hi,
            token_x,
            token_y,
            amount_x,
            amount_y,
        } => {
            let amount_x = TokenAmount::new(token_x, parse_amount("amount_x", &amount_x)?);
            let amount_y = TokenAmount::new(token_y, parse_amount("amount_y", &amount_y)?);
            let amounts = [&amount_x, &amount_y];
            let build = match shape {
                RangeShape::Uniform => get_uniform_distribution_from_bin_range,
                RangeShape::BidAsk => get_bid_ask_distribution_from_bin_range,
                RangeShape::Curve => get_curve_distribution_from_bin_range,
            };
            build(active_id, (lo, hi), amounts).map_err(lb_error)?
        }
    };

    Ok(Json(params.into()))
}
