//! Data Transfer Objects for API requests and responses

use lb_core::{Address, ChainId, Token};
use liquidity_book::{LiquidityDistribution, LiquidityDistributionParams, Route, TradeLog};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Chains with a configuration entry
    pub chains: Vec<ChainId>,
}

impl HealthResponse {
    pub fn with_chains(chains: Vec<ChainId>) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            chains,
        }
    }
}

// ----------------------------------------------------------------------------
// Bins
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFromIdRequest {
    pub id: u32,
    pub bin_step: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdFromPriceRequest {
    /// Token Y per token X, raw units
    pub price: f64,
    pub bin_step: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinResponse {
    pub id: u32,
    pub price: f64,
    pub bin_step: u16,
}

// ----------------------------------------------------------------------------
// Liquidity
// ----------------------------------------------------------------------------

/// Shape of a custom bin range distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeShape {
    Uniform,
    BidAsk,
    Curve,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionRequest {
    /// One of the canned 11-bin shapes
    Canned { shape: LiquidityDistribution },
    /// All liquidity in a single bin
    TargetBin { active_id: u32, target_bin: u32 },
    /// A shape spread over `[lo, hi]`
    Range {
        shape: RangeShape,
        active_id: u32,
        lo: u32,
        hi: u32,
        token_x: Token,
        token_y: Token,
        /// Raw amount of token X, decimal string
        amount_x: String,
        /// Raw amount of token Y, decimal string
        amount_y: String,
    },
}

/// Weights are 18-decimal fixed point, encoded as decimal strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionResponse {
    pub delta_ids: Vec<i32>,
    pub distribution_x: Vec<String>,
    pub distribution_y: Vec<String>,
}

impl From<LiquidityDistributionParams> for DistributionResponse {
    fn from(params: LiquidityDistributionParams) -> Self {
        let encode = |v: Vec<u128>| v.into_iter().map(|w| w.to_string()).collect();
        Self {
            delta_ids: params.delta_ids,
            distribution_x: encode(params.distribution_x),
            distribution_y: encode(params.distribution_y),
        }
    }
}

// ----------------------------------------------------------------------------
// Routes and trades
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesRequest {
    pub chain_id: ChainId,
    pub token_in: Token,
    pub token_out: Token,
    #[serde(default)]
    pub max_hops: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDto {
    pub path: Vec<Address>,
    pub symbols: Vec<String>,
    pub hops: usize,
}

impl From<&Route> for RouteDto {
    fn from(route: &Route) -> Self {
        Self {
            path: route.path_to_addresses(),
            symbols: route.path.iter().map(Token::display_symbol).collect(),
            hops: route.hops(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesResponse {
    pub routes: Vec<RouteDto>,
    pub count: usize,
}

fn default_true() -> bool {
    true
}

fn default_slippage_bps() -> u32 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestTradeRequest {
    pub chain_id: ChainId,
    pub token_in: Token,
    pub token_out: Token,
    /// Raw amount, decimal string. Input for exact-in, output for exact-out.
    pub amount: String,
    #[serde(default = "default_true")]
    pub exact_in: bool,
    #[serde(default)]
    pub native_in: bool,
    #[serde(default)]
    pub native_out: bool,
    #[serde(default)]
    pub max_hops: Option<usize>,
    /// When set, candidates are compared net of estimated gas for this sender
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeFeeDto {
    pub total_fee_pct: String,
    /// Raw amount of the input token
    pub fee_amount_in: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestTradeResponse {
    pub trade: TradeLog,
    pub input_amount: String,
    pub output_amount: String,
    pub minimum_amount_out: String,
    pub maximum_amount_in: String,
    pub price_impact_pct: String,
    pub fee: TradeFeeDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_gas: Option<String>,
    pub trades_considered: usize,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}
