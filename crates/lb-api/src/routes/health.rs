//! Health check endpoint

use axum::{extract::State, Json};

use crate::dto::HealthResponse;
use crate::AppState;

/// GET /health - API version and the chains it can serve
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut chains: Vec<_> = state
        .config()
        .await
        .chains
        .iter()
        .map(|chain| chain.chain_id)
        .collect();
    chains.sort();
    Json(HealthResponse::with_chains(chains))
}
