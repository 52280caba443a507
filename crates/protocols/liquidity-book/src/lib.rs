//! Liquidity Book Protocol Implementation
//!
//! This crate implements the client side of the Liquidity Book DEX: bin
//! price math, pair discovery and reserves, route enumeration, quoting and
//! best-trade selection through the v2.1 quoter, router call construction,
//! and the liquidity shapes used when adding liquidity.

pub mod bin;
pub mod constants;
pub mod distribution;
pub mod fees;
pub mod fraction;
pub mod pair;
pub mod quote;
pub mod route;
pub mod state;
pub mod swap_call;
pub mod trade;

// Re-exports
pub use bin::{
    get_id_from_price, get_id_slippage_from_price_slippage, get_price_from_id,
    try_get_id_from_price,
};
pub use constants::{bin as bin_constants, fixed_point, routing, shapes, swap};
pub use distribution::{
    get_bid_ask_distribution_from_bin_range, get_curve_distribution_from_bin_range,
    get_distribution_from_target_bin, get_liquidity_config,
    get_uniform_distribution_from_bin_range, normalize_dist,
};
pub use fees::{calculate_fee_percentage, FeePercentages};
pub use fraction::{
    amount_with_slippage_max, amount_with_slippage_min, Fraction, Percent, Price, TokenAmount,
};
pub use pair::Pair;
pub use quote::Quote;
pub use route::{create_all_routes, Route};
pub use state::{
    AddLiquidityParameters, BinAmounts, BinReserves, FeeParameters, LbError, LbPairInfo,
    LiquidityDistribution, LiquidityDistributionParams, PoolVersion, RemoveLiquidityAmounts,
    ReservesAndId, TradeType,
};
pub use swap_call::{Deadline, RouterPathParameters, SwapArg, SwapParameters, TradeOptions};
pub use trade::{
    choose_best_trade, choose_best_trade_with_gas, get_trades_exact_in, get_trades_exact_out,
    BestTrade, QuoteLog, Trade, TradeFee, TradeLog,
};
