//! LBRouter v2.1 swap calls
//!
//! Turns a [`Trade`] into the router method name, hex-encoded arguments and
//! native value a wallet needs to submit it.

use std::time::{SystemTime, UNIX_EPOCH};

use lb_core::{constants::ZERO_HEX, Address};
use serde::Serialize;

use crate::fraction::Percent;
use crate::state::{LbError, TradeType};
use crate::trade::Trade;

/// When a swap expires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Seconds from now, using local time
    Ttl(i64),
    /// Absolute unix timestamp
    At(u64),
}

impl Deadline {
    fn resolve(&self) -> Result<u64, LbError> {
        match *self {
            Self::Ttl(ttl) if ttl <= 0 => Err(LbError::InvalidDeadline { value: ttl }),
            Self::Ttl(ttl) => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                Ok(now + ttl.unsigned_abs())
            }
            Self::At(0) => Err(LbError::InvalidDeadline { value: 0 }),
            Self::At(at) => Ok(at),
        }
    }
}

/// Options for building router call arguments
#[derive(Debug, Clone)]
pub struct TradeOptions {
    /// Unfavorable price movement tolerated from the quoted amounts
    pub allowed_slippage: Percent,
    pub deadline: Deadline,
    /// Receiver of the output tokens
    pub recipient: String,
    /// Use the fee-on-transfer variants of the exact-input methods
    pub fee_on_transfer: bool,
}

/// Router path argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterPathParameters {
    pub pair_bin_steps: Vec<String>,
    pub versions: Vec<u8>,
    pub token_path: Vec<Address>,
}

/// One positional router argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SwapArg {
    Hex(String),
    Address(Address),
    Path(RouterPathParameters),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapParameters {
    pub method_name: String,
    pub args: Vec<SwapArg>,
    /// Native amount to attach, hex encoded
    pub value: String,
}

fn to_hex(value: u128) -> String {
    format!("0x{:x}", value)
}

impl Trade {
    pub fn swap_call_parameters(&self, options: &TradeOptions) -> Result<SwapParameters, LbError> {
        if self.native_in && self.native_out {
            return Err(LbError::NativeInAndOut);
        }
        let deadline = SwapArg::Hex(to_hex(u128::from(options.deadline.resolve()?)));
        let to = SwapArg::Address(Address::parse(&options.recipient)?);

        let amount_in = to_hex(self.maximum_amount_in(&options.allowed_slippage)?.raw);
        let amount_out = to_hex(self.minimum_amount_out(&options.allowed_slippage)?.raw);

        let path = SwapArg::Path(RouterPathParameters {
            pair_bin_steps: self
                .quote
                .bin_steps
                .iter()
                .map(|step| to_hex(u128::from(*step)))
                .collect(),
            versions: self.quote.versions.iter().map(|v| v.as_u8()).collect(),
            token_path: self.quote.route.clone(),
        });

        let fot = options.fee_on_transfer;
        let (method, args, value) = match (self.trade_type, self.native_in, self.native_out, fot) {
            (TradeType::ExactInput, true, _, fot) => (
                exact_in_method("swapExactNATIVEForTokens", fot),
                vec![SwapArg::Hex(amount_out), path, to, deadline],
                amount_in,
            ),
            (TradeType::ExactInput, false, true, fot) => (
                exact_in_method("swapExactTokensForNATIVE", fot),
                vec![SwapArg::Hex(amount_in), SwapArg::Hex(amount_out), path, to, deadline],
                ZERO_HEX.to_string(),
            ),
            (TradeType::ExactInput, false, false, fot) => (
                exact_in_method("swapExactTokensForTokens", fot),
                vec![SwapArg::Hex(amount_in), SwapArg::Hex(amount_out), path, to, deadline],
                ZERO_HEX.to_string(),
            ),
            (TradeType::ExactOutput, _, _, true) => return Err(LbError::ExactOutFeeOnTransfer),
            (TradeType::ExactOutput, true, _, false) => (
                "swapNATIVEForExactTokens".to_string(),
                vec![SwapArg::Hex(amount_out), path, to, deadline],
                amount_in,
            ),
            (TradeType::ExactOutput, false, true, false) => (
                "swapTokensForExactNATIVE".to_string(),
                vec![SwapArg::Hex(amount_out), SwapArg::Hex(amount_in), path, to, deadline],
                ZERO_HEX.to_string(),
            ),
            (TradeType::ExactOutput, false, false, false) => (
                "swapTokensForExactTokens".to_string(),
                vec![SwapArg::Hex(amount_out), SwapArg::Hex(amount_in), path, to, deadline],
                ZERO_HEX.to_string(),
            ),
        };

        Ok(SwapParameters {
            method_name: method,
            args,
            value,
        })
    }
}

fn exact_in_method(base: &str, fee_on_transfer: bool) -> String {
    if fee_on_transfer {
        format!("{}SupportingFeeOnTransferTokens", base)
    } else {
        base.to_string()
    }
}
