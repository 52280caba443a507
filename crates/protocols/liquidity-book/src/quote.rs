//! Quoter output
//!
//! The v2.1 quoter returns the best path through a route as a set of
//! parallel arrays, one entry per token or hop.

use evm_rpc_client::decode::{as_address_vec, as_u128, as_u128_vec, field};
use lb_core::{Address, ChainError};
use serde::Serialize;
use serde_json::Value;

use crate::state::{LbError, PoolVersion};

/// Best path found by the quoter for one route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Token addresses, input first
    pub route: Vec<Address>,
    /// LBPair (or v1 pair) address per hop
    pub pairs: Vec<Address>,
    pub bin_steps: Vec<u16>,
    pub versions: Vec<PoolVersion>,
    /// Amount at every token of the route, `route.len()` entries
    pub amounts: Vec<u128>,
    /// Amounts the route would yield at the active price with no price impact
    pub virtual_amounts_without_slippage: Vec<u128>,
    /// Fee per hop (1e18 == 100%)
    pub fees: Vec<u128>,
    /// Trade value in the native asset, when the quoter reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_value_native: Option<u128>,
}

impl Quote {
    /// Decode a quoter result given either as a named object or a positional tuple
    pub fn from_value(value: &Value) -> Result<Self, LbError> {
        let bin_steps = as_u128_vec(field(value, "binSteps", 2)?)?
            .into_iter()
            .map(|step| {
                u16::try_from(step)
                    .map_err(|_| ChainError::Decode(format!("bin step {} out of range", step)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let versions = as_u128_vec(field(value, "versions", 3)?)?
            .into_iter()
            .map(|v| {
                u8::try_from(v)
                    .ok()
                    .and_then(PoolVersion::from_u8)
                    .ok_or_else(|| ChainError::Decode(format!("unknown pool version {}", v)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let trade_value_native = ["tradeValueNative", "tradeValueAVAX"]
            .iter()
            .find_map(|name| field(value, name, 7).ok())
            .map(as_u128)
            .transpose()?;

        let quote = Self {
            route: as_address_vec(field(value, "route", 0)?)?,
            pairs: as_address_vec(field(value, "pairs", 1)?)?,
            bin_steps,
            versions,
            amounts: as_u128_vec(field(value, "amounts", 4)?)?,
            virtual_amounts_without_slippage: as_u128_vec(field(
                value,
                "virtualAmountsWithoutSlippage",
                5,
            )?)?,
            fees: as_u128_vec(field(value, "fees", 6)?)?,
            trade_value_native,
        };
        quote.validate()?;
        Ok(quote)
    }

    fn validate(&self) -> Result<(), LbError> {
        if self.route.len() < 2 || self.amounts.len() != self.route.len() {
            return Err(LbError::InvalidQuote(format!(
                "{} amounts for a route of {} tokens",
                self.amounts.len(),
                self.route.len()
            )));
        }
        if self.virtual_amounts_without_slippage.len() != self.route.len() {
            return Err(LbError::InvalidQuote(format!(
                "{} virtual amounts for a route of {} tokens",
                self.virtual_amounts_without_slippage.len(),
                self.route.len()
            )));
        }
        let hops = self.route.len() - 1;
        if self.pairs.len() != hops
            || self.bin_steps.len() != hops
            || self.versions.len() != hops
            || self.fees.len() != hops
        {
            return Err(LbError::InvalidQuote(format!(
                "hop arrays do not match a route of {} hops",
                hops
            )));
        }
        Ok(())
    }

    pub fn amount_in(&self) -> u128 {
        self.amounts.first().copied().unwrap_or(0)
    }

    pub fn amount_out(&self) -> u128 {
        self.amounts.last().copied().unwrap_or(0)
    }

    pub fn virtual_amount_in(&self) -> u128 {
        self.virtual_amounts_without_slippage
            .first()
            .copied()
            .unwrap_or(0)
    }

    pub fn virtual_amount_out(&self) -> u128 {
        self.virtual_amounts_without_slippage
            .last()
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TOKEN_A: &str = "0x0000000000000000000000000000000000000001";
    const TOKEN_B: &str = "0x0000000000000000000000000000000000000002";
    const PAIR: &str = "0x00000000000000000000000000000000000000A1";

    #[test]
    fn test_decode_named_quote() {
        let quote = Quote::from_value(&json!({
            "route": [TOKEN_A, TOKEN_B],
            "pairs": [PAIR],
            "binSteps": [20],
            "versions": [2],
            "amounts": ["1000000000000000000", "19950000"],
            "virtualAmountsWithoutSlippage": ["1000000000000000000", "20000000"],
            "fees": ["2000000000000000"]
        }))
        .unwrap();

        assert_eq!(quote.bin_steps, vec![20]);
        assert_eq!(quote.versions, vec![PoolVersion::V21]);
        assert_eq!(quote.amount_in(), 1_000_000_000_000_000_000);
        assert_eq!(quote.amount_out(), 19_950_000);
        assert_eq!(quote.virtual_amount_out(), 20_000_000);
        assert_eq!(quote.trade_value_native, None);
    }

    #[test]
    fn test_decode_positional_quote_with_trade_value() {
        let quote = Quote::from_value(&json!([
            [TOKEN_A, TOKEN_B],
            [PAIR],
            [0],
            [0],
            [500, 480],
            [500, 490],
            [3000000000000000u64],
            "0x3e8"
        ]))
        .unwrap();
        assert_eq!(quote.versions, vec![PoolVersion::V1]);
        assert_eq!(quote.trade_value_native, Some(1000));
    }

    #[test]
    fn test_decode_rejects_inconsistent_arrays() {
        let err = Quote::from_value(&json!({
            "route": [TOKEN_A, TOKEN_B],
            "pairs": [PAIR],
            "binSteps": [20],
            "versions": [2],
            "amounts": ["1"],
            "virtualAmountsWithoutSlippage": ["1"],
            "fees": ["0"]
        }))
        .unwrap_err();
        assert!(matches!(err, LbError::InvalidQuote(_)));

        let err = Quote::from_value(&json!({ "route": [TOKEN_A] })).unwrap_err();
        assert!(matches!(err, LbError::Chain(ChainError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_short_virtual_amounts() {
        let err = Quote::from_value(&json!({
            "route": [TOKEN_A, PAIR, TOKEN_B],
            "pairs": [PAIR, PAIR],
            "binSteps": [20, 10],
            "versions": [2, 2],
            "amounts": ["100", "95", "90"],
            "virtualAmountsWithoutSlippage": ["100", "96"],
            "fees": ["0", "0"]
        }))
        .unwrap_err();
        match err {
            LbError::InvalidQuote(message) => assert!(message.contains("virtual amounts")),
            other => panic!("expected an invalid quote, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let err = Quote::from_value(&json!({
            "route": [TOKEN_A, TOKEN_B],
            "pairs": [PAIR],
            "binSteps": [20],
            "versions": [7],
            "amounts": ["1", "1"],
            "virtualAmountsWithoutSlippage": ["1", "1"],
            "fees": ["0"]
        }))
        .unwrap_err();
        assert!(matches!(err, LbError::Chain(ChainError::Decode(_))));
    }
}
