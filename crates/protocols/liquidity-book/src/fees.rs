//! Pair fee percentages
//!
//! Fees are 18-decimal fixed point on the contract side:
//! `baseFee = baseFactor * binStep * 1e10` and
//! `variableFee = ((volatilityAccumulated * binStep) ^ 2) * variableFeeControl / 100`.
//!
//! The `^` above is XOR, not exponentiation.

use serde::Serialize;

use crate::constants::fixed_point::PRECISION;
use crate::state::FeeParameters;

const BASE_FEE_SCALE: u128 = 10_000_000_000;

/// Fees of an LBPair, raw (1e18 == 100%) and as percentages
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeePercentages {
    pub base_fee: u128,
    pub variable_fee: u128,
    pub base_fee_pct: f64,
    pub variable_fee_pct: f64,
}

impl FeePercentages {
    pub fn total_fee_pct(&self) -> f64 {
        self.base_fee_pct + self.variable_fee_pct
    }
}

pub fn calculate_fee_percentage(params: &FeeParameters) -> FeePercentages {
    let bin_step = u128::from(params.bin_step);

    let base_fee = u128::from(params.base_factor) * bin_step * BASE_FEE_SCALE;

    let variable_fee = if params.variable_fee_control == 0 {
        0
    } else {
        let accumulated = u128::from(params.volatility_accumulated) * bin_step;
        (accumulated ^ 2) * u128::from(params.variable_fee_control) / 100
    };

    FeePercentages {
        base_fee,
        variable_fee,
        base_fee_pct: to_pct(base_fee),
        variable_fee_pct: to_pct(variable_fee),
    }
}

fn to_pct(fee: u128) -> f64 {
    fee as f64 / PRECISION as f64 * 100.0
}
