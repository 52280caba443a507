//! Liquidity Distributions
//!
//! Builds the `deltaIds` / `distributionX` / `distributionY` arrays passed to
//! addLiquidity, either from a canned ±5-bin shape or from a custom bin range.
//!
//! For a custom range the side of the active bin decides what is deposited:
//! a range at or below the active bin holds only Y, at or above only X, and
//! a range straddling it holds both with the active bin shared. Weights are
//! computed in `f64`, normalized per side, rounded to the token's decimals
//! and converted to 18-decimal fixed point.

use std::f64::consts::PI;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::constants::fixed_point::{MAX_DECIMALS, PRECISION};
use crate::constants::shapes;
use crate::fraction::TokenAmount;
use crate::state::{LbError, LiquidityDistribution, LiquidityDistributionParams};

/// Canned ±5-bin shape for addLiquidity
pub fn get_liquidity_config(distribution: LiquidityDistribution) -> LiquidityDistributionParams {
    let (x, y) = match distribution {
        LiquidityDistribution::Spot => (shapes::SPOT_X, shapes::SPOT_Y),
        LiquidityDistribution::Curve => (shapes::CURVE_X, shapes::CURVE_Y),
        LiquidityDistribution::BidAsk => (shapes::BID_ASK_X, shapes::BID_ASK_Y),
        LiquidityDistribution::Wide => (shapes::WIDE_X, shapes::WIDE_Y),
    };
    LiquidityDistributionParams {
        delta_ids: shapes::DELTA_IDS.to_vec(),
        distribution_x: x.to_vec(),
        distribution_y: y.to_vec(),
    }
}

/// All liquidity in a single bin
pub fn get_distribution_from_target_bin(active_id: u32, target_bin: u32) -> LiquidityDistributionParams {
    let delta = i64::from(target_bin) - i64::from(active_id);
    LiquidityDistributionParams {
        delta_ids: vec![delta as i32],
        distribution_x: vec![if target_bin >= active_id { PRECISION } else { 0 }],
        distribution_y: vec![if target_bin <= active_id { PRECISION } else { 0 }],
    }
}

/// Rescale `dist` so it sums to `sum_to`, up to `precision`.
///
/// An all-zero distribution is returned unchanged.
pub fn normalize_dist(dist: &[u128], sum_to: u128, precision: u128) -> Vec<u128> {
    let sum: BigUint = dist.iter().map(|d| BigUint::from(*d)).sum();
    if sum.is_zero() || sum_to == 0 {
        return dist.to_vec();
    }
    let precision = BigUint::from(precision);
    let factor = &sum * &precision / BigUint::from(sum_to);
    if factor.is_zero() {
        return dist.to_vec();
    }
    dist.iter()
        .map(|d| {
            (BigUint::from(*d) * &precision / &factor)
                .to_u128()
                .unwrap_or(u128::MAX)
        })
        .collect()
}

// ----------------------------------------------------------------------------
// Custom ranges
// ----------------------------------------------------------------------------

/// Which tokens a bin range receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeSide {
    /// At or below the active bin, token Y only
    YOnly,
    /// At or above the active bin, token X only
    XOnly,
    /// Straddles the active bin; `neg` bins below and `pos` bins above it
    Both { neg: usize, pos: usize },
}

fn classify(
    active_id: u32,
    (lo, hi): (u32, u32),
    [amount_x, amount_y]: [&TokenAmount; 2],
) -> Result<(Vec<i32>, RangeSide), LbError> {
    let invalid = LbError::InvalidBinRange { lo, hi, active_id };
    if lo > hi {
        return Err(invalid);
    }

    let side = if hi <= active_id && amount_x.raw == 0 {
        RangeSide::YOnly
    } else if active_id <= lo && amount_y.raw == 0 {
        RangeSide::XOnly
    } else if lo <= active_id && active_id <= hi {
        RangeSide::Both {
            neg: (active_id - lo) as usize,
            pos: (hi - active_id) as usize,
        }
    } else {
        return Err(invalid);
    };

    let first = i64::from(lo) - i64::from(active_id);
    let last = i64::from(hi) - i64::from(active_id);
    let delta_ids = (first..=last)
        .map(i32::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| LbError::InvalidBinRange { lo, hi, active_id })?;

    Ok((delta_ids, side))
}

/// Same weight in every bin of each side; the active bin gets half
pub fn get_uniform_distribution_from_bin_range(
    active_id: u32,
    bin_range: (u32, u32),
    amounts: [&TokenAmount; 2],
) -> Result<LiquidityDistributionParams, LbError> {
    let (delta_ids, side) = classify(active_id, bin_range, amounts)?;
    let n = delta_ids.len();

    let (x, y) = match side {
        RangeSide::YOnly => (vec![0.0; n], vec![1.0 / n as f64; n]),
        RangeSide::XOnly => (vec![1.0 / n as f64; n], vec![0.0; n]),
        RangeSide::Both { neg, pos } => {
            let pos_pct = 1.0 / (0.5 + pos as f64);
            let neg_pct = 1.0 / (0.5 + neg as f64);
            (
                join(vec![0.0; neg], pos_pct / 2.0, vec![pos_pct; pos]),
                join(vec![neg_pct; neg], neg_pct / 2.0, vec![0.0; pos]),
            )
        }
    };

    Ok(finish(delta_ids, x, y, amounts))
}

/// Weight grows linearly with distance from the active bin
pub fn get_bid_ask_distribution_from_bin_range(
    active_id: u32,
    bin_range: (u32, u32),
    amounts: [&TokenAmount; 2],
) -> Result<LiquidityDistributionParams, LbError> {
    let (delta_ids, side) = classify(active_id, bin_range, amounts)?;
    let n = delta_ids.len();

    let (x, y) = match side {
        RangeSide::YOnly => {
            let r2 = squared(delta_ids[0]);
            let y = delta_ids
                .iter()
                .map(|&d| linear(f64::from(1 - d) * 2.0, r2))
                .collect();
            (vec![0.0; n], y)
        }
        RangeSide::XOnly => {
            let r2 = squared(delta_ids[n - 1]);
            let x = delta_ids
                .iter()
                .map(|&d| linear(f64::from(d + 1) * 2.0, r2))
                .collect();
            (x, vec![0.0; n])
        }
        RangeSide::Both { neg, pos } => {
            let x = if pos == 0 {
                join(vec![0.0; neg], 1.0, Vec::new())
            } else {
                let r2 = (pos * pos) as f64;
                join(
                    vec![0.0; neg],
                    1.0 / r2,
                    (1..=pos).map(|i| (i + 1) as f64 / r2).collect(),
                )
            };
            let y = if neg == 0 {
                join(Vec::new(), 1.0, vec![0.0; pos])
            } else {
                let r2 = (neg * neg) as f64;
                join(
                    (1..=neg).rev().map(|i| (i + 1) as f64 / r2).collect(),
                    1.0 / r2,
                    vec![0.0; pos],
                )
            };
            (x, y)
        }
    };

    Ok(finish(delta_ids, x, y, amounts))
}

/// Gaussian weights peaking at the active bin
pub fn get_curve_distribution_from_bin_range(
    active_id: u32,
    bin_range: (u32, u32),
    amounts: [&TokenAmount; 2],
) -> Result<LiquidityDistributionParams, LbError> {
    let (delta_ids, side) = classify(active_id, bin_range, amounts)?;
    let n = delta_ids.len();

    let (x, y) = match side {
        RangeSide::YOnly => {
            let r = n - 1;
            let y = if r == 0 {
                vec![1.0]
            } else {
                let (sigma, a) = gaussian(r);
                (0..n)
                    .map(|ind| 2.0 * a * bell((r - ind) as f64, sigma))
                    .collect()
            };
            (vec![0.0; n], y)
        }
        RangeSide::XOnly => {
            let r = n - 1;
            let x = if r == 0 {
                vec![1.0]
            } else {
                let (sigma, a) = gaussian(r);
                (0..n).map(|ind| 2.0 * a * bell(ind as f64, sigma)).collect()
            };
            (x, vec![0.0; n])
        }
        RangeSide::Both { neg, pos } => {
            let x = if pos == 0 {
                join(vec![0.0; neg], 1.0, Vec::new())
            } else {
                let (sigma, a) = gaussian(pos);
                join(
                    vec![0.0; neg],
                    a,
                    (1..=pos).map(|d| 2.0 * a * bell(d as f64, sigma)).collect(),
                )
            };
            let y = if neg == 0 {
                join(Vec::new(), 1.0, vec![0.0; pos])
            } else {
                let (sigma, a) = gaussian(neg);
                join(
                    (0..neg).map(|ind| 2.0 * a * bell((neg - ind) as f64, sigma)).collect(),
                    a,
                    vec![0.0; pos],
                )
            };
            (x, y)
        }
    };

    Ok(finish(delta_ids, x, y, amounts))
}

fn squared(delta: i32) -> f64 {
    let d = f64::from(delta);
    d * d
}

/// `weight / r2`, or a flat weight when the radius is zero
fn linear(weight: f64, r2: f64) -> f64 {
    if r2 == 0.0 {
        1.0
    } else {
        weight / r2
    }
}

/// Width and height of the bell for a radius of `r` bins
fn gaussian(r: usize) -> (f64, f64) {
    let factor = if r >= 20 {
        2.0
    } else if r >= 15 {
        1.8
    } else if r >= 10 {
        1.7
    } else if r >= 8 {
        1.6
    } else if r >= 6 {
        1.5
    } else if r >= 5 {
        1.4
    } else {
        1.0
    };
    let sigma = r as f64 / factor;
    (sigma, 1.0 / ((2.0 * PI).sqrt() * sigma))
}

fn bell(distance: f64, sigma: f64) -> f64 {
    (-0.5 * (distance / sigma).powi(2)).exp()
}

fn join(mut below: Vec<f64>, active: f64, above: Vec<f64>) -> Vec<f64> {
    below.push(active);
    below.extend(above);
    below
}

fn finish(
    delta_ids: Vec<i32>,
    x: Vec<f64>,
    y: Vec<f64>,
    [amount_x, amount_y]: [&TokenAmount; 2],
) -> LiquidityDistributionParams {
    let distribution_x = cap_at_precision(
        normalize_weights(x)
            .into_iter()
            .map(|w| to_fixed_point(w, amount_x.token.decimals))
            .collect(),
    );
    let distribution_y = cap_at_precision(
        normalize_weights(y)
            .into_iter()
            .map(|w| to_fixed_point(w, amount_y.token.decimals))
            .collect(),
    );

    LiquidityDistributionParams {
        delta_ids,
        distribution_x,
        distribution_y,
    }
}

fn normalize_weights(weights: Vec<f64>) -> Vec<f64> {
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        weights.into_iter().map(|w| w / sum).collect()
    } else {
        weights
    }
}

/// Per-bin rounding can push the total past 1e18; the excess comes off the largest weight.
/// Every entry is a multiple of the rounding step, so the trimmed weight stays on that grid.
fn cap_at_precision(mut dist: Vec<u128>) -> Vec<u128> {
    let sum: u128 = dist.iter().sum();
    if sum > PRECISION {
        if let Some(largest) = dist.iter_mut().max() {
            *largest = largest.saturating_sub(sum - PRECISION);
        }
    }
    dist
}

/// Round to `decimals` places, then scale to 18-decimal fixed point
fn to_fixed_point(weight: f64, decimals: u8) -> u128 {
    let d = decimals.min(MAX_DECIMALS);
    let scaled = (weight * 10f64.powi(i32::from(d))).round();
    if !(scaled.is_finite() && scaled > 0.0) {
        return 0;
    }
    scaled as u128 * 10u128.pow(u32::from(MAX_DECIMALS - d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lb_core::{Address, ChainId, Token};

    const E12: u128 = 1_000_000_000_000;
    const TOLERANCE: u128 = E12;

    fn amount(decimals: u8, raw: u128) -> TokenAmount {
        let mut bytes = [0u8; 20];
        bytes[19] = decimals;
        TokenAmount::new(
            Token::new(ChainId::FUJI, Address::from_bytes(bytes), decimals, "T", "Token"),
            raw,
        )
    }

    fn assert_sums_to_one(dist: &[u128]) {
        let sum: u128 = dist.iter().sum();
        assert!(
            sum.abs_diff(PRECISION) <= TOLERANCE,
            "distribution sums to {}",
            sum
        );
    }

    fn assert_lengths(params: &LiquidityDistributionParams) {
        assert_eq!(params.delta_ids.len(), params.distribution_x.len());
        assert_eq!(params.delta_ids.len(), params.distribution_y.len());
    }

    #[test]
    fn test_canned_shapes() {
        for shape in [
            LiquidityDistribution::Spot,
            LiquidityDistribution::Curve,
            LiquidityDistribution::BidAsk,
            LiquidityDistribution::Wide,
        ] {
            let params = get_liquidity_config(shape);
            assert_lengths(&params);
            assert_eq!(params.delta_ids, (-5..=5).collect::<Vec<i32>>());
            assert_sums_to_one(&params.distribution_x);
            assert_sums_to_one(&params.distribution_y);
            // X sits at and above the active bin, Y at and below
            assert!(params.distribution_x[..5].iter().all(|w| *w == 0));
            assert!(params.distribution_y[6..].iter().all(|w| *w == 0));
        }
    }

    #[test]
    fn test_target_bin() {
        let above = get_distribution_from_target_bin(100, 103);
        assert_eq!(above.delta_ids, vec![3]);
        assert_eq!(above.distribution_x, vec![PRECISION]);
        assert_eq!(above.distribution_y, vec![0]);

        let active = get_distribution_from_target_bin(100, 100);
        assert_eq!(active.distribution_x, vec![PRECISION]);
        assert_eq!(active.distribution_y, vec![PRECISION]);

        let below = get_distribution_from_target_bin(100, 98);
        assert_eq!(below.delta_ids, vec![-2]);
        assert_eq!(below.distribution_x, vec![0]);
    }

    #[test]
    fn test_uniform_both_sides() {
        let x = amount(6, 1_000_000);
        let y = amount(6, 2_000_000);
        let params = get_uniform_distribution_from_bin_range(100, (98, 103), [&x, &y]).unwrap();

        assert_eq!(params.delta_ids, vec![-2, -1, 0, 1, 2, 3]);
        assert_eq!(
            params.distribution_x,
            vec![0, 0, 142_857 * E12, 285_714 * E12, 285_714 * E12, 285_714 * E12]
        );
        assert_eq!(
            params.distribution_y,
            vec![400_000 * E12, 400_000 * E12, 200_000 * E12, 0, 0, 0]
        );
    }

    #[test]
    fn test_uniform_single_sided() {
        let zero = amount(6, 0);
        let some = amount(6, 5_000_000);

        let y_only = get_uniform_distribution_from_bin_range(100, (95, 99), [&zero, &some]).unwrap();
        assert_eq!(y_only.delta_ids, vec![-5, -4, -3, -2, -1]);
        assert!(y_only.distribution_x.iter().all(|w| *w == 0));
        assert!(y_only.distribution_y.iter().all(|w| *w == 200_000 * E12));

        let x_only = get_uniform_distribution_from_bin_range(100, (100, 103), [&some, &zero]).unwrap();
        assert_eq!(x_only.delta_ids, vec![0, 1, 2, 3]);
        assert!(x_only.distribution_x.iter().all(|w| *w == 250_000 * E12));
        assert!(x_only.distribution_y.iter().all(|w| *w == 0));
    }

    #[test]
    fn test_invalid_ranges() {
        let x = amount(18, 1);
        let y = amount(18, 1);
        assert!(matches!(
            get_uniform_distribution_from_bin_range(100, (105, 95), [&x, &y]),
            Err(LbError::InvalidBinRange { lo: 105, hi: 95, active_id: 100 })
        ));
        // above the active bin but Y was provided
        assert!(matches!(
            get_curve_distribution_from_bin_range(100, (101, 105), [&x, &y]),
            Err(LbError::InvalidBinRange { .. })
        ));
        assert!(matches!(
            get_bid_ask_distribution_from_bin_range(100, (90, 99), [&x, &y]),
            Err(LbError::InvalidBinRange { .. })
        ));
    }

    #[test]
    fn test_bid_ask_grows_toward_edges() {
        let zero = amount(18, 0);
        let some = amount(18, 1);

        let y_only = get_bid_ask_distribution_from_bin_range(100, (96, 100), [&zero, &some]).unwrap();
        assert_eq!(y_only.delta_ids, vec![-4, -3, -2, -1, 0]);
        assert_sums_to_one(&y_only.distribution_y);
        assert!(y_only.distribution_y.windows(2).all(|w| w[0] > w[1]));
        // weights 10, 8, 6, 4, 2 over 30
        assert_eq!(y_only.distribution_y[4] / E12, PRECISION / 15 / E12);

        let both = get_bid_ask_distribution_from_bin_range(100, (97, 103), [&some, &some]).unwrap();
        assert_lengths(&both);
        assert_sums_to_one(&both.distribution_x);
        assert_sums_to_one(&both.distribution_y);
        assert!(both.distribution_x[..3].iter().all(|w| *w == 0));
        assert!(both.distribution_x[3..].windows(2).all(|w| w[0] < w[1]));
        assert!(both.distribution_y[..4].windows(2).all(|w| w[0] > w[1]));
        assert!(both.distribution_y[4..].iter().all(|w| *w == 0));
    }

    #[test]
    fn test_curve_peaks_at_active_bin() {
        let zero = amount(18, 0);
        let some = amount(18, 1);

        let x_only = get_curve_distribution_from_bin_range(100, (100, 108), [&some, &zero]).unwrap();
        assert_sums_to_one(&x_only.distribution_x);
        assert!(x_only.distribution_x.windows(2).all(|w| w[0] > w[1]));

        let y_only = get_curve_distribution_from_bin_range(100, (92, 100), [&zero, &some]).unwrap();
        assert_sums_to_one(&y_only.distribution_y);
        assert!(y_only.distribution_y.windows(2).all(|w| w[0] < w[1]));

        let both = get_curve_distribution_from_bin_range(100, (95, 105), [&some, &some]).unwrap();
        assert_eq!(both.delta_ids.len(), 11);
        assert_sums_to_one(&both.distribution_x);
        assert_sums_to_one(&both.distribution_y);
        assert!(both.distribution_x[6..].windows(2).all(|w| w[0] > w[1]));
        assert!(both.distribution_y[..5].windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_single_bin_ranges_do_not_divide_by_zero() {
        let some = amount(18, 1);
        let zero = amount(18, 0);

        let curve = get_curve_distribution_from_bin_range(100, (100, 100), [&some, &some]).unwrap();
        assert_eq!(curve.delta_ids, vec![0]);
        assert_eq!(curve.distribution_x, vec![PRECISION]);
        assert_eq!(curve.distribution_y, vec![PRECISION]);

        let bid_ask = get_bid_ask_distribution_from_bin_range(100, (100, 100), [&zero, &some]).unwrap();
        assert_eq!(bid_ask.distribution_y, vec![PRECISION]);

        let x_only = get_curve_distribution_from_bin_range(100, (100, 100), [&some, &zero]).unwrap();
        assert_eq!(x_only.distribution_x, vec![PRECISION]);
    }

    #[test]
    fn test_rounded_weights_never_exceed_one() {
        let zero = amount(6, 0);
        let some = amount(6, 5_000_000);

        // 1/51 rounds up at 6 decimals: 51 * 0.019608 = 1.000008
        let x_only = get_uniform_distribution_from_bin_range(100, (100, 150), [&some, &zero]).unwrap();
        assert_eq!(x_only.delta_ids.len(), 51);
        assert_eq!(x_only.distribution_x.iter().sum::<u128>(), PRECISION);
        assert!(x_only.distribution_x.iter().all(|w| w % E12 == 0));
        assert_eq!(
            x_only.distribution_x.iter().filter(|w| **w == 19_608 * E12).count(),
            50
        );

        let y_only = get_uniform_distribution_from_bin_range(100, (85, 99), [&zero, &some]).unwrap();
        assert!(y_only.distribution_y.iter().sum::<u128>() <= PRECISION);

        for (lo, hi) in [(100, 400), (0, 100)] {
            let curve = get_curve_distribution_from_bin_range(100, (lo, hi), [&some, &some]);
            let curve = match curve {
                Ok(curve) => curve,
                Err(e) => panic!("curve over {lo}..={hi}: {e}"),
            };
            assert_lengths(&curve);
            assert!(curve.distribution_x.iter().sum::<u128>() <= PRECISION);
            assert!(curve.distribution_y.iter().sum::<u128>() <= PRECISION);
        }

        let bid_ask = get_bid_ask_distribution_from_bin_range(100, (40, 160), [&some, &some]).unwrap();
        assert!(bid_ask.distribution_x.iter().sum::<u128>() <= PRECISION);
        assert!(bid_ask.distribution_y.iter().sum::<u128>() <= PRECISION);
    }

    #[test]
    fn test_normalize_dist() {
        let dist = [100_000 * E12, 100_000 * E12, 200_000 * E12];
        let normalized = normalize_dist(&dist, PRECISION, 100_000);
        assert_eq!(
            normalized,
            vec![250_000_000_000_000_000, 250_000_000_000_000_000, 500_000_000_000_000_000]
        );
        assert_eq!(normalize_dist(&[0, 0], PRECISION, 100_000), vec![0, 0]);
        // too coarse for the precision, left as is
        assert_eq!(normalize_dist(&[1, 1, 2], PRECISION, 100_000), vec![1, 1, 2]);
    }
}
