//! Application state shared across API handlers

use std::sync::Arc;

use evm_rpc_client::ChainClient;
use lb_core::{ChainConfig, ChainId, ConfigError, SdkConfig};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised while resolving request parameters against the state
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Requested hop bound is zero or above the configured maximum
    #[error("max_hops must be between 1 and {max}, got {value}")]
    InvalidMaxHops { value: usize, max: usize },
}

impl StateError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(ConfigError::UnknownChain { .. }) => "unknown_chain",
            Self::Config(_) => "config_error",
            Self::InvalidMaxHops { .. } => "invalid_max_hops",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(ConfigError::UnknownChain { .. }) => 404,
            Self::Config(_) => 422,
            Self::InvalidMaxHops { .. } => 400,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RwLock<SdkConfig>,
    client: Arc<dyn ChainClient>,
}

impl AppState {
    pub fn new(config: SdkConfig, client: Arc<dyn ChainClient>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config: RwLock::new(config),
                client,
            }),
        }
    }

    /// Get current config
    pub async fn config(&self) -> SdkConfig {
        self.inner.config.read().await.clone()
    }

    /// Replace the configuration
    pub async fn set_config(&self, config: SdkConfig) {
        let mut current = self.inner.config.write().await;
        tracing::info!(chains = config.chains.len(), "Updating SDK configuration");
        *current = config;
    }

    /// Chain read client
    pub fn client(&self) -> Arc<dyn ChainClient> {
        self.inner.client.clone()
    }

    pub async fn chain(&self, chain_id: ChainId) -> Result<ChainConfig, StateError> {
        let config = self.inner.config.read().await;
        Ok(config.chain(chain_id)?.clone())
    }

    /// Hop bound for route discovery, defaulting to the configured maximum
    pub async fn max_hops(&self, requested: Option<usize>) -> Result<usize, StateError> {
        let max = self.inner.config.read().await.max_hops;
        match requested {
            None => Ok(max),
            Some(value) if value == 0 || value > max => {
                Err(StateError::InvalidMaxHops { value, max })
            }
            Some(value) => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evm_rpc_client::FixtureClient;

    fn state() -> AppState {
        AppState::new(SdkConfig::default(), Arc::new(FixtureClient::new()))
    }

    #[tokio::test]
    async fn test_chain_lookup() {
        let state = state();
        let fuji = state.chain(ChainId::FUJI).await.unwrap();
        assert_eq!(fuji.name, "fuji");

        let err = state.chain(ChainId(1)).await.unwrap_err();
        assert_eq!(err.error_code(), "unknown_chain");
    }

    #[tokio::test]
    async fn test_max_hops_bounds() {
        let state = state();
        assert_eq!(state.max_hops(None).await.unwrap(), 3);
        assert_eq!(state.max_hops(Some(2)).await.unwrap(), 2);
        assert!(matches!(
            state.max_hops(Some(0)).await,
            Err(StateError::InvalidMaxHops { value: 0, max: 3 })
        ));
        assert!(state.max_hops(Some(4)).await.is_err());

        state
            .set_config(SdkConfig {
                max_hops: 4,
                ..SdkConfig::default()
            })
            .await;
        assert_eq!(state.max_hops(Some(4)).await.unwrap(), 4);
    }
}
