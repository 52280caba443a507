//! Configuration types for the Liquidity Book SDK
//!
//! Per-chain contract addresses are plain data injected into the protocol
//! functions that need them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{WAVAX_AVALANCHE, WAVAX_FUJI};
use crate::{Address, ChainId, ConfigError, Token};

/// RPC connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// RPC URL (e.g., "http://127.0.0.1:8545")
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Deployed contracts the SDK talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contract {
    LbFactory,
    LbFactoryV21,
    LbRouterV21,
    LbQuoterV21,
    Multicall,
    LbRewarder,
    VaultFactory,
}

impl Contract {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LbFactory => "LBFactory",
            Self::LbFactoryV21 => "LBFactory v2.1",
            Self::LbRouterV21 => "LBRouter v2.1",
            Self::LbQuoterV21 => "LBQuoter v2.1",
            Self::Multicall => "Multicall",
            Self::LbRewarder => "LBRewarder",
            Self::VaultFactory => "VaultFactory",
        }
    }
}

/// Contract address registry for one chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainAddresses {
    pub lb_factory: Option<Address>,
    pub lb_factory_v21: Option<Address>,
    pub lb_router_v21: Option<Address>,
    pub lb_quoter_v21: Option<Address>,
    pub multicall: Option<Address>,
    pub lb_rewarder: Option<Address>,
    pub vault_factory: Option<Address>,
}

impl ChainAddresses {
    pub fn get(&self, contract: Contract) -> Option<Address> {
        match contract {
            Contract::LbFactory => self.lb_factory,
            Contract::LbFactoryV21 => self.lb_factory_v21,
            Contract::LbRouterV21 => self.lb_router_v21,
            Contract::LbQuoterV21 => self.lb_quoter_v21,
            Contract::Multicall => self.multicall,
            Contract::LbRewarder => self.lb_rewarder,
            Contract::VaultFactory => self.vault_factory,
        }
    }
}

/// Everything the SDK needs to know about one chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: ChainId,

    /// Human readable network name
    pub name: String,

    /// Wrapped representation of the native asset (WAVAX)
    pub wrapped_native: Token,

    #[serde(default)]
    pub addresses: ChainAddresses,

    /// Intermediate tokens considered when building multi-hop routes
    #[serde(default)]
    pub bases: Vec<Token>,
}

impl ChainConfig {
    /// Avalanche Fuji testnet with the v2 deployment addresses
    pub fn fuji() -> Self {
        let chain_id = ChainId::FUJI;
        let wavax = Token::new(chain_id, WAVAX_FUJI, 18, "WAVAX", "Wrapped AVAX");
        let usdc = Token::new(
            chain_id,
            Address::from_hex_literal("0xB6076C93701D6a07266c31066B298AeC6dd65c2d"),
            6,
            "USDC",
            "USD Coin",
        );
        let usdt = Token::new(
            chain_id,
            Address::from_hex_literal("0xAb231A5744C8E6c45481754928cCfFFFD4aa0732"),
            6,
            "USDT.e",
            "Tether USD",
        );

        Self {
            chain_id,
            name: "fuji".to_string(),
            wrapped_native: wavax.clone(),
            addresses: ChainAddresses {
                lb_factory: Some(Address::from_hex_literal(
                    "0x7e4bEe572255673044035d62802c6D2d8Ef1fF9f",
                )),
                lb_router_v21: Some(Address::from_hex_literal(
                    "0xE9e38190D2440d6cD28cF0Ce453FB86CB8725f8A",
                )),
                lb_quoter_v21: Some(Address::from_hex_literal(
                    "0x0EE0e8e2E35F9008835312AD012B0Ae0983338EC",
                )),
                multicall: Some(Address::from_hex_literal(
                    "0xb465Fd2d9C71d5D6e6c069aaC9b4E21c69aAA78f",
                )),
                ..ChainAddresses::default()
            },
            bases: vec![wavax, usdc, usdt],
        }
    }

    /// Avalanche C-Chain; contract addresses must come from configuration
    pub fn avalanche() -> Self {
        let chain_id = ChainId::AVALANCHE;
        let wavax = Token::new(chain_id, WAVAX_AVALANCHE, 18, "WAVAX", "Wrapped AVAX");
        Self {
            chain_id,
            name: "avalanche".to_string(),
            wrapped_native: wavax.clone(),
            addresses: ChainAddresses::default(),
            bases: vec![wavax],
        }
    }

    /// Look up a contract address, failing if it is not configured
    pub fn address(&self, contract: Contract) -> Result<Address, ConfigError> {
        self.addresses
            .get(contract)
            .ok_or(ConfigError::MissingAddress {
                chain_id: self.chain_id.as_u64(),
                contract: contract.as_str(),
            })
    }

    pub fn is_wrapped_native(&self, token: &Token) -> bool {
        token.address == self.wrapped_native.address
    }
}

/// SDK configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    /// RPC connection settings
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Supported chains
    #[serde(default = "default_chains")]
    pub chains: Vec<ChainConfig>,

    /// Maximum number of hops considered during route discovery
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_chains() -> Vec<ChainConfig> {
    vec![ChainConfig::fuji(), ChainConfig::avalanche()]
}

fn default_max_hops() -> usize {
    3
}

fn default_api_port() -> u16 {
    18545
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            chains: default_chains(),
            max_hops: default_max_hops(),
            api_port: default_api_port(),
        }
    }
}

impl SdkConfig {
    pub fn chain(&self, chain_id: ChainId) -> Result<&ChainConfig, ConfigError> {
        self.chains
            .iter()
            .find(|c| c.chain_id == chain_id)
            .ok_or(ConfigError::UnknownChain {
                chain_id: chain_id.as_u64(),
            })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SdkConfig::default();
        assert_eq!(config.rpc.url, "http://127.0.0.1:8545");
        assert_eq!(config.rpc.request_timeout_secs, 30);
        assert_eq!(config.max_hops, 3);
        assert_eq!(config.api_port, 18545);
        assert_eq!(config.chains.len(), 2);
    }

    #[test]
    fn test_config_serialization() {
        let config = SdkConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = SdkConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.rpc.url, config.rpc.url);
        assert_eq!(
            parsed.chain(ChainId::FUJI).unwrap().addresses,
            config.chain(ChainId::FUJI).unwrap().addresses
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SdkConfig::from_json_str(r#"{ "max_hops": 2 }"#).unwrap();
        assert_eq!(config.max_hops, 2);
        assert_eq!(config.rpc.request_timeout_secs, 30);
        assert!(config.chain(ChainId::AVALANCHE).is_ok());
    }

    #[test]
    fn test_unknown_chain() {
        let config = SdkConfig::default();
        let err = config.chain(ChainId(1)).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownChain { chain_id: 1 }));
    }

    #[test]
    fn test_missing_address() {
        let avalanche = ChainConfig::avalanche();
        let err = avalanche.address(Contract::LbQuoterV21).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingAddress {
                chain_id: 43114,
                contract: "LBQuoter v2.1"
            }
        ));

        let fuji = ChainConfig::fuji();
        assert!(fuji.address(Contract::LbQuoterV21).is_ok());
        assert!(fuji.address(Contract::LbFactoryV21).is_err());
    }

    #[test]
    fn test_wrapped_native() {
        let fuji = ChainConfig::fuji();
        assert!(fuji.is_wrapped_native(&fuji.wrapped_native));
        assert!(!fuji.is_wrapped_native(&fuji.bases[1]));
    }
}
