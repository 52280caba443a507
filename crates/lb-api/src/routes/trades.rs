//! Route discovery and trade quoting routes

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use lb_core::{Address, ChainConfig, Token};
use liquidity_book::{
    choose_best_trade, choose_best_trade_with_gas, create_all_routes, get_trades_exact_in,
    get_trades_exact_out, LbError, Pair, Percent, Route, TokenAmount, Trade, TradeType,
};

use crate::dto::{
    ApiError, BestTradeRequest, BestTradeResponse, RouteDto, RoutesRequest, RoutesResponse,
    TradeFeeDto,
};
use crate::routes::{lb_error, parse_amount, state_error};
use crate::AppState;

/// Create trade routes
pub fn router() -> Router<AppState> {
    Router::new().route("/best", post(best_trade))
}

/// Candidate routes through the chain's base tokens
fn discover_routes(
    chain: &ChainConfig,
    token_in: &Token,
    token_out: &Token,
    max_hops: usize,
) -> Vec<Route> {
    let token_pairs = Pair::create_all_token_pairs(token_in, token_out, &chain.bases);
    let pairs = Pair::init_pairs(&token_pairs);
    create_all_routes(&pairs, token_in, token_out, max_hops)
}

/// POST /routes - Candidate routes between two tokens
pub async fn find_routes(
    State(state): State<AppState>,
    Json(request): Json<RoutesRequest>,
) -> Result<Json<RoutesResponse>, (StatusCode, Json<ApiError>)> {
    let chain = state.chain(request.chain_id).await.map_err(state_error)?;
    let max_hops = state.max_hops(request.max_hops).await.map_err(state_error)?;

    let routes = discover_routes(&chain, &request.token_in, &request.token_out, max_hops);
    let routes: Vec<RouteDto> = routes.iter().map(Into::into).collect();
    let count = routes.len();

    Ok(Json(RoutesResponse { routes, count }))
}

/// POST /trades/best - Quote every candidate route and pick the best
async fn best_trade(
    State(state): State<AppState>,
    Json(request): Json<BestTradeRequest>,
) -> Result<Json<BestTradeResponse>, (StatusCode, Json<ApiError>)> {
    let chain = state.chain(request.chain_id).await.map_err(state_error)?;
    let max_hops = state.max_hops(request.max_hops).await.map_err(state_error)?;
    let amount = parse_amount("amount", &request.amount)?;
    let client = state.client();

    let routes = discover_routes(&chain, &request.token_in, &request.token_out, max_hops);
    let (trade_type, trades) = if request.exact_in {
        let amount_in = TokenAmount::new(request.token_in.clone(), amount);
        let trades = get_trades_exact_in(
            &routes,
            &amount_in,
            &request.token_out,
            request.native_in,
            request.native_out,
            client.as_ref(),
            &chain,
        )
        .await;
        (TradeType::ExactInput, trades)
    } else {
        let amount_out = TokenAmount::new(request.token_out.clone(), amount);
        let trades = get_trades_exact_out(
            &routes,
            &amount_out,
            &request.token_in,
            request.native_in,
            request.native_out,
            client.as_ref(),
            &chain,
        )
        .await;
        (TradeType::ExactOutput, trades)
    };
    let trades = trades.map_err(lb_error)?;

    let slippage = Percent::from_bps(request.slippage_bps);
    let (best, estimated_gas): (Option<&Trade>, Option<u128>) = match &request.account {
        None => (choose_best_trade(&trades, trade_type), None),
        Some(account) => {
            let account = Address::parse(account).map_err(|e| lb_error(e.into()))?;
            let mut gas = Vec::with_capacity(trades.len());
            for trade in &trades {
                let estimate = trade
                    .estimate_gas(client.as_ref(), account, &chain, &slippage)
                    .await
                    .map_err(lb_error)?;
                gas.push(estimate);
            }
            match choose_best_trade_with_gas(&trades, &gas).map_err(lb_error)? {
                Some(best) => (Some(best.trade), Some(best.estimated_gas)),
                None => (None, None),
            }
        }
    };

    let best = best.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                "no_route",
                format!(
                    "No quotable route from {} to {}",
                    request.token_in.display_symbol(),
                    request.token_out.display_symbol()
                ),
            )),
        )
    })?;

    tracing::info!(
        route = %best.to_log().route,
        candidates = trades.len(),
        "Selected best trade"
    );

    Ok(Json(summarize(best, &slippage, estimated_gas, trades.len()).map_err(lb_error)?))
}

fn summarize(
    trade: &Trade,
    slippage: &Percent,
    estimated_gas: Option<u128>,
    trades_considered: usize,
) -> Result<BestTradeResponse, LbError> {
    let fee = trade.get_trade_fee()?;
    Ok(BestTradeResponse {
        trade: trade.to_log(),
        input_amount: trade.input_amount.raw.to_string(),
        output_amount: trade.output_amount.raw.to_string(),
        minimum_amount_out: trade.minimum_amount_out(slippage)?.raw.to_string(),
        maximum_amount_in: trade.maximum_amount_in(slippage)?.raw.to_string(),
        price_impact_pct: trade.price_impact.to_significant(6),
        fee: TradeFeeDto {
            total_fee_pct: fee.total_fee_pct.to_significant(6),
            fee_amount_in: fee.fee_amount_in.raw.to_string(),
        },
        estimated_gas: estimated_gas.map(|gas| gas.to_string()),
        trades_considered,
    })
}
