//! In-memory chain client
//!
//! Answers contract reads from a table of canned responses keyed by
//! (address, function, args). Used by tests and offline tooling.

use std::collections::HashMap;

use async_trait::async_trait;
use lb_core::ChainError;
use serde_json::Value;

use crate::{ChainClient, ContractCall, GasEstimateRequest, Result};

#[derive(Debug, Clone)]
enum FixtureResponse {
    Value(Value),
    Revert(String),
}

/// Canned-response [`ChainClient`]
#[derive(Debug, Clone, Default)]
pub struct FixtureClient {
    responses: HashMap<String, FixtureResponse>,
    gas_by_function: HashMap<String, u128>,
    block_timestamp: u64,
    unreachable_url: Option<String>,
}

impl FixtureClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose every request fails at the transport level
    pub fn unreachable(url: impl Into<String>) -> Self {
        Self {
            unreachable_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_response(mut self, call: &ContractCall, value: Value) -> Self {
        self.responses
            .insert(call_key(call), FixtureResponse::Value(value));
        self
    }

    pub fn with_revert(mut self, call: &ContractCall, reason: impl Into<String>) -> Self {
        self.responses
            .insert(call_key(call), FixtureResponse::Revert(reason.into()));
        self
    }

    /// Gas returned by `estimate_gas` for calls to `function`
    pub fn with_gas(mut self, function: impl Into<String>, gas: u128) -> Self {
        self.gas_by_function.insert(function.into(), gas);
        self
    }

    pub fn with_block_timestamp(mut self, timestamp: u64) -> Self {
        self.block_timestamp = timestamp;
        self
    }

    fn check_reachable(&self) -> Result<()> {
        match &self.unreachable_url {
            Some(url) => Err(ChainError::Unreachable { url: url.clone() }),
            None => Ok(()),
        }
    }
}

fn call_key(call: &ContractCall) -> String {
    format!(
        "{}:{}:{}",
        call.address.to_lower_hex(),
        call.function,
        Value::Array(call.args.clone())
    )
}

#[async_trait]
impl ChainClient for FixtureClient {
    async fn read_contract(&self, call: &ContractCall) -> Result<Value> {
        self.check_reachable()?;
        match self.responses.get(&call_key(call)) {
            Some(FixtureResponse::Value(value)) => Ok(value.clone()),
            Some(FixtureResponse::Revert(reason)) => Err(ChainError::Reverted {
                reason: reason.clone(),
            }),
            None => Err(ChainError::Reverted {
                reason: format!("no fixture for {} at {}", call.function, call.address),
            }),
        }
    }

    async fn estimate_gas(&self, request: &GasEstimateRequest) -> Result<u128> {
        self.check_reachable()?;
        self.gas_by_function
            .get(&request.call.function)
            .copied()
            .ok_or_else(|| ChainError::Reverted {
                reason: format!("no gas fixture for {}", request.call.function),
            })
    }

    async fn latest_block_timestamp(&self) -> Result<u64> {
        self.check_reachable()?;
        Ok(self.block_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContractAbi;
    use lb_core::Address;
    use serde_json::json;

    fn factory_call(bin_step: u64) -> ContractCall {
        ContractCall::new(
            ContractAbi::LbFactory,
            Address::from_hex_literal("0x7e4bEe572255673044035d62802c6D2d8Ef1fF9f"),
            "getLBPairInformation",
        )
        .with_args(vec![json!(bin_step)])
    }

    #[tokio::test]
    async fn test_responses_are_keyed_by_args() {
        let client = FixtureClient::new().with_response(&factory_call(10), json!({ "binStep": 10 }));

        let value = client.read_contract(&factory_call(10)).await.unwrap();
        assert_eq!(value["binStep"], 10);

        let err = client.read_contract(&factory_call(20)).await.unwrap_err();
        assert!(matches!(err, ChainError::Reverted { .. }));
    }

    #[tokio::test]
    async fn test_gas_fixture() {
        let client = FixtureClient::new().with_gas("swapExactTokensForTokens", 210_000);
        let request = GasEstimateRequest {
            account: Address::ZERO,
            call: ContractCall::new(
                ContractAbi::LbRouterV21,
                Address::ZERO,
                "swapExactTokensForTokens",
            ),
            value: None,
        };
        assert_eq!(client.estimate_gas(&request).await.unwrap(), 210_000);
    }
}
