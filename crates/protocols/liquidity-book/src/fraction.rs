//! Exact rational values: fractions, percents, token amounts and prices
//!
//! Everything that feeds a contract argument is computed with `BigInt` and
//! truncated at the end. `f64` is only used for display.

use std::cmp::Ordering;

use lb_core::Token;
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Serialize, Serializer};

use crate::state::LbError;

/// A rational number with a positive denominator
#[derive(Debug, Clone)]
pub struct Fraction {
    pub numerator: BigInt,
    pub denominator: BigInt,
}

impl Fraction {
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Self {
        let numerator = numerator.into();
        let denominator = denominator.into();
        if denominator.is_negative() {
            Self {
                numerator: -numerator,
                denominator: -denominator,
            }
        } else {
            Self {
                numerator,
                denominator,
            }
        }
    }

    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self::new(value, BigInt::one())
    }

    pub fn one() -> Self {
        Self::from_integer(BigInt::one())
    }

    pub fn zero() -> Self {
        Self::from_integer(BigInt::zero())
    }

    /// Integer part, truncated toward zero
    pub fn quotient(&self) -> BigInt {
        &self.numerator / &self.denominator
    }

    pub fn invert(&self) -> Self {
        Self::new(self.denominator.clone(), self.numerator.clone())
    }

    pub fn add(&self, other: &Fraction) -> Self {
        Self::new(
            &self.numerator * &other.denominator + &other.numerator * &self.denominator,
            &self.denominator * &other.denominator,
        )
    }

    pub fn subtract(&self, other: &Fraction) -> Self {
        Self::new(
            &self.numerator * &other.denominator - &other.numerator * &self.denominator,
            &self.denominator * &other.denominator,
        )
    }

    pub fn multiply(&self, other: &Fraction) -> Self {
        Self::new(
            &self.numerator * &other.numerator,
            &self.denominator * &other.denominator,
        )
    }

    pub fn divide(&self, other: &Fraction) -> Self {
        Self::new(
            &self.numerator * &other.denominator,
            &self.denominator * &other.numerator,
        )
    }

    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn to_f64(&self) -> f64 {
        let num = self.numerator.to_f64().unwrap_or(f64::NAN);
        let den = self.denominator.to_f64().unwrap_or(f64::NAN);
        num / den
    }

    pub fn to_significant(&self, digits: usize) -> String {
        format_significant(self.to_f64(), digits)
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

/// A fraction read as a ratio (0.005 == 0.5%)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percent(pub Fraction);

impl Percent {
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Self {
        Self(Fraction::new(numerator, denominator))
    }

    /// Basis points, e.g. 50 == 0.5%
    pub fn from_bps(bps: u32) -> Self {
        Self::new(bps, 10_000u32)
    }

    pub fn zero() -> Self {
        Self(Fraction::zero())
    }

    pub fn as_fraction(&self) -> &Fraction {
        &self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Ratio as a float (0.005 for 0.5%)
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64()
    }

    /// Percentage with `digits` significant digits ("0.5" for 0.5%)
    pub fn to_significant(&self, digits: usize) -> String {
        format_significant(self.0.to_f64() * 100.0, digits)
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64() * 100.0)
    }
}

/// Raw token amount bound to its token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenAmount {
    pub token: Token,
    pub raw: u128,
}

impl TokenAmount {
    pub fn new(token: Token, raw: u128) -> Self {
        Self { token, raw }
    }

    pub fn as_fraction(&self) -> Fraction {
        Fraction::from_integer(self.raw)
    }

    /// Exact decimal rendering using the token's decimals
    pub fn to_exact(&self) -> String {
        let decimals = u32::from(self.token.decimals);
        if decimals == 0 {
            return self.raw.to_string();
        }
        let unit = BigInt::from(10u32).pow(decimals);
        let raw = BigInt::from(self.raw);
        let whole = &raw / &unit;
        let frac = (&raw % &unit).to_string();
        let frac = format!("{:0>width$}", frac, width = decimals as usize);
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, frac)
        }
    }

    pub fn to_significant(&self, digits: usize) -> String {
        let unit = 10f64.powi(i32::from(self.token.decimals));
        format_significant(self.raw as f64 / unit, digits)
    }
}

/// Price of `base` in units of `quote` (quote raw / base raw)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    pub base: Token,
    pub quote: Token,
    pub numerator: BigInt,
    pub denominator: BigInt,
}

impl Price {
    pub fn new(base: Token, quote: Token, base_raw: u128, quote_raw: u128) -> Self {
        Self {
            base,
            quote,
            numerator: BigInt::from(quote_raw),
            denominator: BigInt::from(base_raw),
        }
    }

    pub fn raw(&self) -> Fraction {
        Fraction::new(self.numerator.clone(), self.denominator.clone())
    }

    /// Price corrected for token decimals
    pub fn adjusted(&self) -> Fraction {
        let scalar = Fraction::new(
            BigInt::from(10u32).pow(u32::from(self.base.decimals)),
            BigInt::from(10u32).pow(u32::from(self.quote.decimals)),
        );
        self.raw().multiply(&scalar)
    }

    pub fn invert(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
            numerator: self.denominator.clone(),
            denominator: self.numerator.clone(),
        }
    }

    pub fn to_significant(&self, digits: usize) -> String {
        if self.denominator.is_zero() {
            return "0".to_string();
        }
        self.adjusted().to_significant(digits)
    }
}

/// `amount / (1 + slippage)`, truncating
pub fn amount_with_slippage_min(amount: u128, slippage: &Percent) -> Result<u128, LbError> {
    if slippage.is_negative() {
        return Err(LbError::InvalidSlippage);
    }
    Fraction::one()
        .add(slippage.as_fraction())
        .invert()
        .multiply(&Fraction::from_integer(amount))
        .quotient()
        .to_u128()
        .ok_or(LbError::Overflow("slippage minimum"))
}

/// `amount * (1 + slippage)`, truncating
pub fn amount_with_slippage_max(amount: u128, slippage: &Percent) -> Result<u128, LbError> {
    if slippage.is_negative() {
        return Err(LbError::InvalidSlippage);
    }
    Fraction::one()
        .add(slippage.as_fraction())
        .multiply(&Fraction::from_integer(amount))
        .quotient()
        .to_u128()
        .ok_or(LbError::Overflow("slippage maximum"))
}

/// Render a float with at most `digits` significant digits, trailing zeros trimmed
pub(crate) fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let digits = digits.max(1) as i32;
    let magnitude = value.abs().log10().floor() as i32;

    if magnitude >= digits {
        let scale = 10f64.powi(magnitude - digits + 1);
        return format!("{:.0}", (value / scale).round() * scale);
    }

    let decimals = (digits - 1 - magnitude).max(0) as usize;
    let s = format!("{:.*}", decimals, value);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
