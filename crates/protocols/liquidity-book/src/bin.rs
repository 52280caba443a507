//! Bin Math
//!
//! Conversions between bin ids and prices: `price = (1 + binStep / 10_000) ^ (id - 2^23)`.
//!
//! The inverse truncates toward zero, so a price just below 1 maps to the bin
//! directly below the center and a price just above 1 to the bin directly above.

use crate::constants::bin::{BASIS_POINT_MAX, REAL_ID_SHIFT};
use crate::state::LbError;

fn step_base(bin_step: u16) -> f64 {
    1.0 + f64::from(bin_step) / BASIS_POINT_MAX
}

/// Price of bin `id` (token Y per token X, raw units)
///
/// A zero bin step prices every bin at 1.
pub fn get_price_from_id(id: u32, bin_step: u16) -> f64 {
    let exponent = f64::from(id) - f64::from(REAL_ID_SHIFT);
    step_base(bin_step).powf(exponent)
}

/// Bin id for a price. The caller guarantees `price > 0` and `bin_step > 0`;
/// see [`try_get_id_from_price`] for a validating variant.
pub fn get_id_from_price(price: f64, bin_step: u16) -> u32 {
    let offset = (price.ln() / step_base(bin_step).ln()).trunc() as i64;
    (offset + i64::from(REAL_ID_SHIFT)).clamp(0, i64::from(u32::MAX)) as u32
}

/// Validating form of [`get_id_from_price`]
pub fn try_get_id_from_price(price: f64, bin_step: u16) -> Result<u32, LbError> {
    if !(price.is_finite() && price > 0.0) {
        return Err(LbError::InvalidPrice(price));
    }
    if bin_step == 0 {
        return Err(LbError::InvalidBinStep);
    }
    Ok(get_id_from_price(price, bin_step))
}

/// Number of bins a price may move for a fractional price slippage (0.05 == 5%)
pub fn get_id_slippage_from_price_slippage(price_slippage: f64, bin_step: u16) -> u32 {
    let bins = ((1.0 + price_slippage).ln() / step_base(bin_step).ln()).floor();
    if bins.is_finite() && bins > 0.0 {
        bins as u32
    } else {
        0
    }
}
