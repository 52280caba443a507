//! evm-rpc-client: Chain read boundary for the Liquidity Book SDK
//!
//! The SDK never talks JSON-RPC or ABI directly. It describes contract reads
//! as [`ContractCall`]s and hands them to a [`ChainClient`], which returns the
//! decoded outputs as JSON values.

pub mod decode;
pub mod fixture;

use std::time::Duration;

use async_trait::async_trait;
use lb_core::{Address, ChainError, RpcConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use fixture::FixtureClient;

/// Default timeout for chain requests (30 seconds).
const CHAIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for chain client operations
pub type Result<T> = std::result::Result<T, ChainError>;

/// ABI a contract call is made against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractAbi {
    LbFactory,
    LbFactoryV21,
    LbPair,
    LbPairV21,
    LbQuoterV21,
    LbRouterV21,
    Multicall,
}

/// A single read-only contract call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractCall {
    pub abi: ContractAbi,
    pub address: Address,
    pub function: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl ContractCall {
    pub fn new(abi: ContractAbi, address: Address, function: impl Into<String>) -> Self {
        Self {
            abi,
            address,
            function: function.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }
}

/// Outcome of one call inside a batch
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Success(Value),
    Failure(String),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Gas estimation request for a state-changing router call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasEstimateRequest {
    /// Sender of the transaction
    pub account: Address,
    /// Target contract and method
    pub call: ContractCall,
    /// Native value attached to the call, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u128>,
}

/// Read access to an EVM chain
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Execute one read-only contract call
    async fn read_contract(&self, call: &ContractCall) -> Result<Value>;

    /// Execute a batch of calls, one outcome per call in input order.
    ///
    /// Reverts and undecodable results become [`CallOutcome::Failure`];
    /// a transport failure fails the whole batch. The default issues the
    /// calls concurrently; transports with an on-chain aggregator override it.
    async fn multicall(&self, calls: &[ContractCall]) -> Result<Vec<CallOutcome>> {
        let reads = calls.iter().map(|call| self.read_contract(call));
        let results = futures::future::join_all(reads).await;

        let mut outcomes = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(value) => outcomes.push(CallOutcome::Success(value)),
                Err(e) if e.is_transport() => {
                    tracing::warn!(error = %e, calls = calls.len(), "Multicall transport failure");
                    return Err(e);
                }
                Err(e) => outcomes.push(CallOutcome::Failure(e.to_string())),
            }
        }
        Ok(outcomes)
    }

    /// Estimate gas for a state-changing call
    async fn estimate_gas(&self, request: &GasEstimateRequest) -> Result<u128>;

    /// Timestamp of the latest block, in seconds
    async fn latest_block_timestamp(&self) -> Result<u64>;
}

/// Wraps any [`ChainClient`] with a per-request timeout
#[derive(Debug, Clone)]
pub struct TimedClient<C> {
    inner: C,
    timeout: Duration,
}

impl<C: ChainClient> TimedClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            timeout: CHAIN_REQUEST_TIMEOUT,
        }
    }

    pub fn from_config(inner: C, config: &RpcConfig) -> Self {
        Self {
            inner,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the wrapped client
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<C: ChainClient> ChainClient for TimedClient<C> {
    async fn read_contract(&self, call: &ContractCall) -> Result<Value> {
        timed_request(self.timeout, self.inner.read_contract(call)).await
    }

    async fn multicall(&self, calls: &[ContractCall]) -> Result<Vec<CallOutcome>> {
        timed_request(self.timeout, self.inner.multicall(calls)).await
    }

    async fn estimate_gas(&self, request: &GasEstimateRequest) -> Result<u128> {
        timed_request(self.timeout, self.inner.estimate_gas(request)).await
    }

    async fn latest_block_timestamp(&self) -> Result<u64> {
        timed_request(self.timeout, self.inner.latest_block_timestamp()).await
    }
}

async fn timed_request<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, fut).await.map_err(|_| {
        tracing::warn!(timeout_secs = timeout.as_secs(), "Chain request timed out");
        ChainError::Timeout {
            secs: timeout.as_secs(),
        }
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Never answers
    struct StalledClient;

    #[async_trait]
    impl ChainClient for StalledClient {
        async fn read_contract(&self, _call: &ContractCall) -> Result<Value> {
            futures::future::pending().await
        }

        async fn estimate_gas(&self, _request: &GasEstimateRequest) -> Result<u128> {
            futures::future::pending().await
        }

        async fn latest_block_timestamp(&self) -> Result<u64> {
            futures::future::pending().await
        }
    }

    fn quoter_call(amount: u64) -> ContractCall {
        ContractCall::new(
            ContractAbi::LbQuoterV21,
            Address::from_hex_literal("0x0EE0e8e2E35F9008835312AD012B0Ae0983338EC"),
            "findBestPathFromAmountIn",
        )
        .with_args(vec![json!([]), json!(amount.to_string())])
    }

    #[tokio::test]
    async fn test_timed_client_times_out() {
        let client = TimedClient::new(StalledClient).with_timeout(Duration::from_millis(10));
        let err = client.latest_block_timestamp().await.unwrap_err();
        assert!(matches!(err, ChainError::Timeout { .. }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_timed_client_passes_through() {
        let fixture = FixtureClient::new().with_block_timestamp(1_700_000_000);
        let client = TimedClient::from_config(fixture, &RpcConfig::default());
        assert_eq!(client.timeout(), Duration::from_secs(30));
        assert_eq!(client.latest_block_timestamp().await.unwrap(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_default_multicall_collects_per_call_outcomes() {
        let ok = quoter_call(1);
        let reverted = quoter_call(2);
        let client = FixtureClient::new()
            .with_response(&ok, json!({ "amounts": ["1", "2"] }))
            .with_revert(&reverted, "LBQuoter__InsufficientLiquidity");

        let outcomes = client.multicall(&[ok, reverted]).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_success());
        assert!(matches!(&outcomes[1], CallOutcome::Failure(msg) if msg.contains("InsufficientLiquidity")));
    }

    #[tokio::test]
    async fn test_default_multicall_propagates_transport_failure() {
        let client = FixtureClient::unreachable("http://127.0.0.1:9650");
        let err = client.multicall(&[quoter_call(1)]).await.unwrap_err();
        assert!(matches!(err, ChainError::Unreachable { .. }));
    }
}
