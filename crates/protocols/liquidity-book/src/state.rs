//! Liquidity Book State Types
//!
//! On-chain pair descriptors, bin reserves, liquidity shapes and errors.

use std::fmt;

use lb_core::{Address, AddressError, ChainError, ConfigError, Token};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Swap direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    /// Input amount is fixed, output is quoted
    ExactInput,
    /// Output amount is fixed, input is quoted
    ExactOutput,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactInput => "EXACT_INPUT",
            Self::ExactOutput => "EXACT_OUTPUT",
        }
    }
}

/// Pool generation a hop of a quote goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolVersion {
    V1,
    V2,
    #[serde(rename = "V2_1")]
    V21,
}

impl PoolVersion {
    /// Numeric value used by the router path encoding
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::V1 => 0,
            Self::V2 => 1,
            Self::V21 => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::V1),
            1 => Some(Self::V2),
            2 => Some(Self::V21),
            _ => None,
        }
    }
}

impl fmt::Display for PoolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// LBPair descriptor returned by the factory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LbPairInfo {
    pub bin_step: u16,
    /// Pair contract address; zero when no pair exists for the bin step
    pub lb_pair: Address,
    pub created_by_owner: bool,
    pub is_blacklisted: bool,
}

impl LbPairInfo {
    pub fn exists(&self) -> bool {
        !self.lb_pair.is_zero()
    }
}

/// Reserves and active bin of an LBPair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservesAndId {
    pub reserve_x: u128,
    pub reserve_y: u128,
    pub active_id: u32,
}

/// Fee parameters stored by a v2 LBPair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParameters {
    pub bin_step: u16,
    pub base_factor: u64,
    pub filter_period: u64,
    pub decay_period: u64,
    pub reduction_factor: u64,
    pub variable_fee_control: u64,
    pub protocol_share: u64,
    pub max_volatility_accumulated: u64,
    pub volatility_accumulated: u64,
    pub volatility_reference: u64,
    pub index_ref: u64,
    pub time: u64,
}

/// Reserves held by one bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinReserves {
    pub reserve_x: u128,
    pub reserve_y: u128,
}

/// Token amounts redeemable from a set of bins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinAmounts {
    pub amount_x: u128,
    pub amount_y: u128,
}

/// Canned liquidity shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityDistribution {
    /// Uniform across the window
    Spot,
    /// Concentrated around the active bin
    Curve,
    /// Concentrated at the window edges
    BidAsk,
    /// Flat across every bin of each side
    Wide,
}

/// Arguments for the on-chain addLiquidity distribution
///
/// All three vectors have the same length; weights are 18-decimal fixed point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityDistributionParams {
    pub delta_ids: Vec<i32>,
    pub distribution_x: Vec<u128>,
    pub distribution_y: Vec<u128>,
}

/// Amounts and distribution for an addLiquidity call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLiquidityParameters {
    pub token_x: Token,
    pub token_y: Token,
    pub bin_step: u16,
    pub amount_x: u128,
    pub amount_y: u128,
    pub amount_x_min: u128,
    pub amount_y_min: u128,
    pub id_slippage: u32,
    pub delta_ids: Vec<i32>,
    pub distribution_x: Vec<u128>,
    pub distribution_y: Vec<u128>,
}

/// Expected and minimum amounts for a removeLiquidity call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidityAmounts {
    pub amount_x: u128,
    pub amount_y: u128,
    pub amount_x_min: u128,
    pub amount_y_min: u128,
}

/// Liquidity Book errors
#[derive(Debug, Error)]
pub enum LbError {
    #[error("Pair {pair} does not contain token {token}")]
    DisconnectedRoute { pair: String, token: Address },

    #[error("Route must contain at least one pair")]
    EmptyRoute,

    #[error("Invalid quote: {0}")]
    InvalidQuote(String),

    #[error("Slippage tolerance must not be negative")]
    InvalidSlippage,

    #[error("Deadline or ttl must be positive, got {value}")]
    InvalidDeadline { value: i64 },

    #[error("Router cannot swap native in and native out in one call")]
    NativeInAndOut,

    #[error("Exact output swaps do not support fee-on-transfer tokens")]
    ExactOutFeeOnTransfer,

    #[error("Price must be positive and finite, got {0}")]
    InvalidPrice(f64),

    #[error("Bin step must be positive")]
    InvalidBinStep,

    #[error("Invalid bin range [{lo}, {hi}] for active bin {active_id}")]
    InvalidBinRange { lo: u32, hi: u32, active_id: u32 },

    #[error("Length mismatch: expected {expected} {what}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Bin {bin_id} has zero total supply")]
    EmptyBinSupply { bin_id: u32 },

    #[error("Pool version {0:?} is not supported here")]
    UnsupportedVersion(PoolVersion),

    #[error("Amount overflow in {0}")]
    Overflow(&'static str),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

impl LbError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DisconnectedRoute { .. } | Self::EmptyRoute => "invalid_route",
            Self::InvalidQuote(_) => "invalid_quote",
            Self::InvalidSlippage => "invalid_slippage",
            Self::InvalidDeadline { .. } => "invalid_deadline",
            Self::NativeInAndOut => "native_in_and_out",
            Self::ExactOutFeeOnTransfer => "exact_out_fee_on_transfer",
            Self::InvalidPrice(_) => "invalid_price",
            Self::InvalidBinStep => "invalid_bin_step",
            Self::InvalidBinRange { .. } => "invalid_bin_range",
            Self::LengthMismatch { .. } => "length_mismatch",
            Self::EmptyBinSupply { .. } => "empty_bin_supply",
            Self::UnsupportedVersion(_) => "unsupported_version",
            Self::Overflow(_) => "overflow",
            Self::InvalidAddress(_) => "invalid_address",
            Self::Config(_) => "config_error",
            Self::Chain(e) => e.error_code(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Chain(e) => e.status_code(),
            Self::Config(_) => 422,
            Self::Overflow(_) | Self::InvalidQuote(_) => 502,
            _ => 400,
        }
    }
}
