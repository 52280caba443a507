//! Liquidity Book Constants
//!
//! Bin model parameters, fixed-point precision and the canned liquidity shapes.

/// Bin price model
pub mod bin {
    /// Bin id whose price is exactly 1 (2^23)
    pub const REAL_ID_SHIFT: u32 = 8_388_608;

    /// Bin step is expressed in basis points
    pub const BASIS_POINT_MAX: f64 = 10_000.0;
}

/// 18-decimal fixed point used by the contracts for weights and fees
pub mod fixed_point {
    /// 1.0 in fixed point (1e18)
    pub const PRECISION: u128 = 1_000_000_000_000_000_000;

    /// Maximum number of decimals a distribution weight is rounded to
    pub const MAX_DECIMALS: u8 = 18;
}

/// Route discovery
pub mod routing {
    /// Default hop bound for route enumeration
    pub const DEFAULT_MAX_HOPS: usize = 3;
}

/// Router call construction
pub mod swap {
    /// Deadline offset applied to the latest block timestamp when estimating gas
    pub const GAS_ESTIMATE_DEADLINE_SECS: u64 = 120;
}

/// Canned ±5-bin liquidity shapes (fixed point, 1e18 == 100%)
pub mod shapes {
    /// Bin offsets shared by all canned shapes
    pub const DELTA_IDS: [i32; 11] = [-5, -4, -3, -2, -1, 0, 1, 2, 3, 4, 5];

    const E12: u128 = 1_000_000_000_000;
    const E16: u128 = 10_000_000_000_000_000;

    /// Spot (uniform): half weight on the active bin
    pub const SPOT_X: [u128; 11] = [
        0,
        0,
        0,
        0,
        0,
        90_909 * E12,
        181_818 * E12,
        181_818 * E12,
        181_818 * E12,
        181_818 * E12,
        181_818 * E12,
    ];
    pub const SPOT_Y: [u128; 11] = [
        181_818 * E12,
        181_818 * E12,
        181_818 * E12,
        181_818 * E12,
        181_818 * E12,
        90_909 * E12,
        0,
        0,
        0,
        0,
        0,
    ];

    /// Curve: concentrated next to the active bin
    pub const CURVE_X: [u128; 11] = [
        0,
        0,
        0,
        0,
        0,
        18 * E16,
        30 * E16,
        24 * E16,
        16 * E16,
        8 * E16,
        4 * E16,
    ];
    pub const CURVE_Y: [u128; 11] = [
        4 * E16,
        8 * E16,
        16 * E16,
        24 * E16,
        30 * E16,
        18 * E16,
        0,
        0,
        0,
        0,
        0,
    ];

    /// Bid-ask: concentrated at the edges of the window
    pub const BID_ASK_X: [u128; 11] = [
        0,
        0,
        0,
        0,
        0,
        4 * E16,
        12 * E16,
        16 * E16,
        20 * E16,
        24 * E16,
        24 * E16,
    ];
    pub const BID_ASK_Y: [u128; 11] = [
        24 * E16,
        24 * E16,
        20 * E16,
        16 * E16,
        12 * E16,
        4 * E16,
        0,
        0,
        0,
        0,
        0,
    ];

    /// Wide: equal weight on every bin of each side, active bin included
    const WIDE_BIN: u128 = 166_666_666_666_666_666;
    pub const WIDE_X: [u128; 11] = [
        0, 0, 0, 0, 0, WIDE_BIN, WIDE_BIN, WIDE_BIN, WIDE_BIN, WIDE_BIN, WIDE_BIN,
    ];
    pub const WIDE_Y: [u128; 11] = [
        WIDE_BIN, WIDE_BIN, WIDE_BIN, WIDE_BIN, WIDE_BIN, WIDE_BIN, 0, 0, 0, 0, 0,
    ];
}
