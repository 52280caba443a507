//! Error types for the Liquidity Book SDK

use thiserror::Error;

/// Core errors that can occur across the workspace
#[derive(Debug, Error)]
pub enum Error {
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Chain read client errors (transport, RPC, decoding)
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC endpoint unreachable at {url}")]
    Unreachable { url: String },

    #[error("RPC returned error: {message}")]
    Rpc { message: String },

    #[error("Contract call reverted: {reason}")]
    Reverted { reason: String },

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ChainError {
    /// Transport-level failures abort a whole batch; reverts and bad
    /// payloads only affect the call that produced them.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::Rpc { .. } | Self::Timeout { .. }
        )
    }

    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "rpc_unreachable",
            Self::Rpc { .. } => "rpc_error",
            Self::Reverted { .. } => "call_reverted",
            Self::Timeout { .. } => "rpc_timeout",
            Self::Decode(_) => "decode_error",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } => 503,
            Self::Rpc { .. } | Self::Decode(_) => 502,
            Self::Reverted { .. } => 422,
        }
    }
}

/// Configuration and address registry errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Chain {chain_id} is not configured")]
    UnknownChain { chain_id: u64 },

    #[error("No {contract} address configured for chain {chain_id}")]
    MissingAddress {
        chain_id: u64,
        contract: &'static str,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Failed to read configuration file {path}: {message}")]
    Io { path: String, message: String },
}

/// Address parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Address must start with 0x: {address}")]
    MissingPrefix { address: String },

    #[error("Address must have 40 hex digits, got {len}: {address}")]
    InvalidLength { address: String, len: usize },

    #[error("Address contains invalid hex: {address}")]
    InvalidHex { address: String },
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, Error>;
