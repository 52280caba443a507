//! Trades
//!
//! A trade is a route priced by the v2.1 quoter in one direction. This module
//! fetches quotes for candidate routes, derives amounts, price impact and
//! fees, and picks the best candidate with or without gas costs.

use evm_rpc_client::{CallOutcome, ChainClient, ContractAbi, ContractCall, GasEstimateRequest};
use lb_core::{constants::ZERO_HEX, Address, ChainConfig, Contract, Token};
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use serde::Serialize;
use serde_json::json;

use crate::constants::fixed_point::PRECISION;
use crate::constants::swap::GAS_ESTIMATE_DEADLINE_SECS;
use crate::fraction::{
    amount_with_slippage_max, amount_with_slippage_min, Fraction, Percent, Price, TokenAmount,
};
use crate::quote::Quote;
use crate::route::Route;
use crate::state::{LbError, TradeType};
use crate::swap_call::{Deadline, TradeOptions};

/// A quoted swap along one route
#[derive(Debug, Clone)]
pub struct Trade {
    pub route: Route,
    pub quote: Quote,
    pub trade_type: TradeType,
    pub input_amount: TokenAmount,
    pub output_amount: TokenAmount,
    /// Output per input
    pub execution_price: Price,
    /// Amount at the active price with no price impact (output for
    /// exact-in, input for exact-out)
    pub exact_quote: TokenAmount,
    pub price_impact: Percent,
    pub native_in: bool,
    pub native_out: bool,
}

/// Fees paid along a trade, expressed in the input token
#[derive(Debug, Clone, Serialize)]
pub struct TradeFee {
    pub total_fee_pct: Percent,
    pub fee_amount_in: TokenAmount,
}

/// Trade picked by [`choose_best_trade_with_gas`] and its gas estimate
#[derive(Debug, Clone, Copy)]
pub struct BestTrade<'a> {
    pub trade: &'a Trade,
    pub estimated_gas: u128,
}

/// Human-readable summary of a trade
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeLog {
    pub route: String,
    pub trade_type: String,
    pub input_amount: String,
    pub output_amount: String,
    pub execution_price: String,
    pub exact_quote: String,
    pub price_impact: String,
    pub quote: QuoteLog,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLog {
    pub route: String,
    pub pairs: String,
    pub bin_steps: String,
    pub versions: String,
    pub amounts: String,
    pub fees: String,
    pub virtual_amounts_without_slippage: String,
}

impl Trade {
    pub fn new(
        route: Route,
        token_in: Token,
        token_out: Token,
        quote: Quote,
        trade_type: TradeType,
        native_in: bool,
        native_out: bool,
    ) -> Result<Self, LbError> {
        if quote.amounts.len() < 2 {
            return Err(LbError::InvalidQuote(format!(
                "expected at least 2 amounts, found {}",
                quote.amounts.len()
            )));
        }
        let input_amount = TokenAmount::new(token_in.clone(), quote.amount_in());
        let output_amount = TokenAmount::new(token_out.clone(), quote.amount_out());
        let execution_price = Price::new(
            token_in.clone(),
            token_out.clone(),
            input_amount.raw,
            output_amount.raw,
        );

        let (exact_quote, price_impact) = match trade_type {
            TradeType::ExactInput => {
                let exact = quote.virtual_amount_out();
                (
                    TokenAmount::new(token_out, exact),
                    relative_difference(exact, output_amount.raw, exact),
                )
            }
            TradeType::ExactOutput => {
                let exact = quote.virtual_amount_in();
                (
                    TokenAmount::new(token_in, exact),
                    relative_difference(input_amount.raw, exact, input_amount.raw),
                )
            }
        };

        Ok(Self {
            route,
            quote,
            trade_type,
            input_amount,
            output_amount,
            execution_price,
            exact_quote,
            price_impact,
            native_in,
            native_out,
        })
    }

    /// Smallest output accepted under `slippage`; the fixed output for exact-out trades
    pub fn minimum_amount_out(&self, slippage: &Percent) -> Result<TokenAmount, LbError> {
        let raw = match self.trade_type {
            TradeType::ExactInput => amount_with_slippage_min(self.output_amount.raw, slippage)?,
            TradeType::ExactOutput => {
                if slippage.is_negative() {
                    return Err(LbError::InvalidSlippage);
                }
                self.output_amount.raw
            }
        };
        Ok(TokenAmount::new(self.output_amount.token.clone(), raw))
    }

    /// Largest input spent under `slippage`; the fixed input for exact-in trades
    pub fn maximum_amount_in(&self, slippage: &Percent) -> Result<TokenAmount, LbError> {
        let raw = match self.trade_type {
            TradeType::ExactOutput => amount_with_slippage_max(self.input_amount.raw, slippage)?,
            TradeType::ExactInput => {
                if slippage.is_negative() {
                    return Err(LbError::InvalidSlippage);
                }
                self.input_amount.raw
            }
        };
        Ok(TokenAmount::new(self.input_amount.token.clone(), raw))
    }

    /// Fees of every hop, converted into the input token and summed
    pub fn get_trade_fee(&self) -> Result<TradeFee, LbError> {
        let amounts = &self.quote.amounts;
        let precision = BigInt::from(PRECISION);
        let amount_in = BigInt::from(self.input_amount.raw);

        let mut total = BigInt::zero();
        for (i, fee) in self.quote.fees.iter().enumerate() {
            let Some(&amount) = amounts.get(i) else {
                break;
            };
            let hop_fee = BigInt::from(*fee) * BigInt::from(amount) / &precision;
            if i == 0 {
                total += hop_fee;
            } else if amount > 0 {
                // amounts[0] / amounts[i] is the running mid price back to the input
                total += &amount_in * hop_fee / BigInt::from(amount);
            }
        }

        let total_fee_pct = if self.input_amount.raw == 0 {
            Percent::zero()
        } else {
            Percent::new(total.clone(), self.input_amount.raw)
        };
        let fee_raw = total.to_u128().ok_or(LbError::Overflow("trade fee"))?;

        Ok(TradeFee {
            total_fee_pct,
            fee_amount_in: TokenAmount::new(self.input_amount.token.clone(), fee_raw),
        })
    }

    /// Gas needed to execute this trade through the v2.1 router
    pub async fn estimate_gas(
        &self,
        client: &dyn ChainClient,
        account: Address,
        chain: &ChainConfig,
        slippage: &Percent,
    ) -> Result<u128, LbError> {
        let timestamp = client.latest_block_timestamp().await?;
        let options = TradeOptions {
            allowed_slippage: slippage.clone(),
            deadline: Deadline::At(timestamp + GAS_ESTIMATE_DEADLINE_SECS),
            recipient: account.to_checksum(),
            fee_on_transfer: false,
        };
        let params = self.swap_call_parameters(&options)?;

        let value = if params.value == ZERO_HEX {
            None
        } else {
            let digits = params.value.trim_start_matches("0x");
            Some(u128::from_str_radix(digits, 16).map_err(|_| LbError::Overflow("swap value"))?)
        };

        let call = ContractCall::new(
            ContractAbi::LbRouterV21,
            chain.address(Contract::LbRouterV21)?,
            params.method_name.as_str(),
        )
        .with_args(params.args.iter().map(|arg| json!(arg)).collect());

        let gas = client
            .estimate_gas(&GasEstimateRequest {
                account,
                call,
                value,
            })
            .await?;

        tracing::debug!(method = %params.method_name, gas = %gas, "Estimated swap gas");
        Ok(gas)
    }

    pub fn to_log(&self) -> TradeLog {
        let amount = |a: &TokenAmount| format!("{} {}", a.to_significant(6), a.token.display_symbol());
        let join = |items: Vec<String>| items.join(", ");

        TradeLog {
            route: join(
                self.route
                    .path
                    .iter()
                    .map(|token| {
                        let name = token.name.clone().unwrap_or_else(|| token.display_symbol());
                        format!("{}({})", name, token.address)
                    })
                    .collect(),
            ),
            trade_type: self.trade_type.as_str().to_string(),
            input_amount: amount(&self.input_amount),
            output_amount: amount(&self.output_amount),
            execution_price: format!(
                "{} {} / {}",
                self.execution_price.to_significant(6),
                self.output_amount.token.display_symbol(),
                self.input_amount.token.display_symbol()
            ),
            exact_quote: amount(&self.exact_quote),
            price_impact: format!("{}%", self.price_impact.to_significant(6)),
            quote: QuoteLog {
                route: join(self.quote.route.iter().map(|a| a.to_string()).collect()),
                pairs: join(self.quote.pairs.iter().map(|a| a.to_string()).collect()),
                bin_steps: join(self.quote.bin_steps.iter().map(|s| s.to_string()).collect()),
                versions: join(self.quote.versions.iter().map(|v| v.to_string()).collect()),
                amounts: join(self.quote.amounts.iter().map(|a| a.to_string()).collect()),
                fees: join(self.quote.fees.iter().map(|f| f.to_string()).collect()),
                virtual_amounts_without_slippage: join(
                    self.quote
                        .virtual_amounts_without_slippage
                        .iter()
                        .map(|a| a.to_string())
                        .collect(),
                ),
            },
        }
    }
}

/// `(a - b) / denominator`, zero when the denominator is zero
fn relative_difference(a: u128, b: u128, denominator: u128) -> Percent {
    if denominator == 0 {
        return Percent::zero();
    }
    Percent::new(BigInt::from(a) - BigInt::from(b), denominator)
}

// ----------------------------------------------------------------------------
// Quoting
// ----------------------------------------------------------------------------

/// Quote every route for a fixed input amount
pub async fn get_trades_exact_in(
    routes: &[Route],
    amount_in: &TokenAmount,
    token_out: &Token,
    native_in: bool,
    native_out: bool,
    client: &dyn ChainClient,
    chain: &ChainConfig,
) -> Result<Vec<Trade>, LbError> {
    let is_wrap = (native_in && chain.is_wrapped_native(token_out))
        || (native_out && chain.is_wrapped_native(&amount_in.token));
    if is_wrap {
        return Ok(Vec::new());
    }

    get_trades(
        routes,
        TradeType::ExactInput,
        amount_in.raw,
        (&amount_in.token, token_out),
        (native_in, native_out),
        client,
        chain,
    )
    .await
}

/// Quote every route for a fixed output amount
pub async fn get_trades_exact_out(
    routes: &[Route],
    amount_out: &TokenAmount,
    token_in: &Token,
    native_in: bool,
    native_out: bool,
    client: &dyn ChainClient,
    chain: &ChainConfig,
) -> Result<Vec<Trade>, LbError> {
    let is_wrap = (native_in && chain.is_wrapped_native(&amount_out.token))
        || (native_out && chain.is_wrapped_native(token_in));
    if is_wrap {
        return Ok(Vec::new());
    }

    get_trades(
        routes,
        TradeType::ExactOutput,
        amount_out.raw,
        (token_in, &amount_out.token),
        (native_in, native_out),
        client,
        chain,
    )
    .await
}

async fn get_trades(
    routes: &[Route],
    trade_type: TradeType,
    amount: u128,
    (token_in, token_out): (&Token, &Token),
    (native_in, native_out): (bool, bool),
    client: &dyn ChainClient,
    chain: &ChainConfig,
) -> Result<Vec<Trade>, LbError> {
    if routes.is_empty() {
        return Ok(Vec::new());
    }

    let quoter = chain.address(Contract::LbQuoterV21)?;
    let function = match trade_type {
        TradeType::ExactInput => "findBestPathFromAmountIn",
        TradeType::ExactOutput => "findBestPathFromAmountOut",
    };
    let calls: Vec<ContractCall> = routes
        .iter()
        .map(|route| {
            ContractCall::new(ContractAbi::LbQuoterV21, quoter, function)
                .with_args(vec![json!(route.path_to_addresses()), json!(amount.to_string())])
        })
        .collect();

    let outcomes = client.multicall(&calls).await?;

    let mut trades = Vec::with_capacity(routes.len());
    for (route, outcome) in routes.iter().zip(outcomes) {
        let value = match outcome {
            CallOutcome::Success(value) => value,
            CallOutcome::Failure(reason) => {
                tracing::debug!(route = ?route.path_to_addresses(), %reason, "Quote failed");
                continue;
            }
        };

        let trade = Quote::from_value(&value).and_then(|quote| {
            Trade::new(
                route.clone(),
                token_in.clone(),
                token_out.clone(),
                quote,
                trade_type,
                native_in,
                native_out,
            )
        });
        match trade {
            Ok(trade) => {
                let positive = match trade_type {
                    TradeType::ExactInput => trade.output_amount.raw > 0,
                    TradeType::ExactOutput => trade.input_amount.raw > 0,
                };
                if positive {
                    trades.push(trade);
                }
            }
            Err(e) => {
                tracing::debug!(route = ?route.path_to_addresses(), error = %e, "Undecodable quote");
            }
        }
    }

    tracing::debug!(
        trade_type = trade_type.as_str(),
        routes = routes.len(),
        trades = trades.len(),
        "Quoted routes"
    );
    Ok(trades)
}

// ----------------------------------------------------------------------------
// Selection
// ----------------------------------------------------------------------------

/// Exact-out trades quoted at a zero input are never selected
fn is_candidate(trade: &Trade, trade_type: TradeType) -> bool {
    match trade_type {
        TradeType::ExactInput => true,
        TradeType::ExactOutput => trade.input_amount.raw > 0,
    }
}

/// Highest output for exact-in, lowest positive input for exact-out.
/// Ties keep the earlier trade.
pub fn choose_best_trade(trades: &[Trade], trade_type: TradeType) -> Option<&Trade> {
    let mut best: Option<&Trade> = None;
    for trade in trades.iter().filter(|t| is_candidate(t, trade_type)) {
        let better = match best {
            None => true,
            Some(current) => match trade_type {
                TradeType::ExactInput => trade.output_amount.raw > current.output_amount.raw,
                TradeType::ExactOutput => trade.input_amount.raw < current.input_amount.raw,
            },
        };
        if better {
            best = Some(trade);
        }
    }
    best
}

/// Best trade once each candidate's gas cost is charged against it.
///
/// Gas is converted into trade units using the largest native trade value
/// reported by the quotes. Without one, gas is ignored.
pub fn choose_best_trade_with_gas<'a>(
    trades: &'a [Trade],
    estimated_gas: &[u128],
) -> Result<Option<BestTrade<'a>>, LbError> {
    if trades.len() != estimated_gas.len() {
        return Err(LbError::LengthMismatch {
            what: "gas estimates",
            expected: trades.len(),
            found: estimated_gas.len(),
        });
    }
    let Some(first) = trades.first() else {
        return Ok(None);
    };
    let trade_type = first.trade_type;

    let reference = trades
        .iter()
        .filter_map(|t| t.quote.trade_value_native)
        .max()
        .unwrap_or(0);
    if reference == 0 {
        tracing::warn!("No native trade value in quotes, comparing trades without gas");
    }

    let outcome = |trade: &Trade, gas: u128| -> Fraction {
        let amount = match trade_type {
            TradeType::ExactInput => trade.output_amount.raw,
            TradeType::ExactOutput => trade.input_amount.raw,
        };
        let amount_fraction = Fraction::from_integer(amount);
        if reference == 0 {
            return amount_fraction;
        }
        let cost = Fraction::new(BigInt::from(amount) * BigInt::from(gas), reference);
        match trade_type {
            TradeType::ExactInput => amount_fraction.subtract(&cost),
            TradeType::ExactOutput => amount_fraction.add(&cost),
        }
    };

    let mut best: Option<(usize, Fraction)> = None;
    for (i, (trade, &gas)) in trades.iter().zip(estimated_gas).enumerate() {
        if !is_candidate(trade, trade_type) {
            continue;
        }
        let current = outcome(trade, gas);
        let better = match &best {
            None => true,
            Some((_, best_outcome)) => match trade_type {
                TradeType::ExactInput => current > *best_outcome,
                TradeType::ExactOutput => current < *best_outcome,
            },
        };
        if better {
            best = Some((i, current));
        }
    }

    Ok(best.map(|(i, _)| BestTrade {
        trade: &trades[i],
        estimated_gas: estimated_gas[i],
    }))
}
