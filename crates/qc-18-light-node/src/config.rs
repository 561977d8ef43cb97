//! # Light Node Configuration
//!
//! Configuration for the Light Node coordinator.

use crate::domain::{
    LightNodeError, Network, NodeType, DEFAULT_BLOCK_CAPACITY, DEFAULT_LISTENER_CAPACITY,
    DEFAULT_TRANSACTION_CAPACITY, DEFAULT_WALLET_CAPACITY,
};
use serde::{Deserialize, Serialize};
use shared_bus::ShutdownPolicy;
use std::env;
use std::time::Duration;

/// Light node configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightNodeConfig {
    /// Chain to operate on.
    pub network: Network,

    /// Protocol family of the client collaborator.
    pub node_type: NodeType,

    /// Initial wallet registry capacity.
    pub wallet_capacity: usize,

    /// Initial block registry capacity.
    pub block_capacity: usize,

    /// Initial transaction registry capacity.
    pub transaction_capacity: usize,

    /// Initial listener capacity.
    pub listener_capacity: usize,

    /// How long to wait for the client to acknowledge a disconnect before
    /// forcing `Disconnected`.
    pub disconnect_timeout_ms: u64,

    /// Fate of queued events at shutdown.
    pub shutdown_policy: ShutdownPolicy,
}

impl Default for LightNodeConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            node_type: NodeType::Les,
            wallet_capacity: DEFAULT_WALLET_CAPACITY,
            block_capacity: DEFAULT_BLOCK_CAPACITY,
            transaction_capacity: DEFAULT_TRANSACTION_CAPACITY,
            listener_capacity: DEFAULT_LISTENER_CAPACITY,
            disconnect_timeout_ms: 5_000,
            shutdown_policy: ShutdownPolicy::Drain,
        }
    }
}

impl LightNodeConfig {
    /// Create a config for testing (smaller values, short timeouts).
    pub fn for_testing() -> Self {
        Self {
            network: Network::Ropsten,
            wallet_capacity: 2,
            block_capacity: 4,
            transaction_capacity: 8,
            listener_capacity: 1,
            disconnect_timeout_ms: 100,
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_LN_NETWORK`: mainnet, ropsten or rinkeby (default: mainnet)
    /// - `QC_LN_NODE_TYPE`: les or json_rpc (default: les)
    /// - `QC_LN_DISCONNECT_TIMEOUT_MS`: disconnect acknowledgement timeout (default: 5000)
    /// - `QC_LN_SHUTDOWN_POLICY`: drain or discard (default: drain)
    pub fn from_env() -> Result<Self, LightNodeError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self, LightNodeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(network) = lookup("QC_LN_NETWORK") {
            config.network = network.parse().map_err(LightNodeError::Config)?;
        }

        if let Some(node_type) = lookup("QC_LN_NODE_TYPE") {
            config.node_type = match node_type.to_ascii_lowercase().as_str() {
                "les" => NodeType::Les,
                "json_rpc" | "jsonrpc" => NodeType::JsonRpc,
                other => {
                    return Err(LightNodeError::Config(format!("unknown node type '{}'", other)))
                }
            };
        }

        if let Some(timeout) = lookup("QC_LN_DISCONNECT_TIMEOUT_MS") {
            config.disconnect_timeout_ms = timeout.parse().map_err(|_| {
                LightNodeError::Config(format!("invalid disconnect timeout '{}'", timeout))
            })?;
        }

        if let Some(policy) = lookup("QC_LN_SHUTDOWN_POLICY") {
            config.shutdown_policy = match policy.to_ascii_lowercase().as_str() {
                "drain" => ShutdownPolicy::Drain,
                "discard" => ShutdownPolicy::Discard,
                other => {
                    return Err(LightNodeError::Config(format!(
                        "unknown shutdown policy '{}'",
                        other
                    )))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the node cannot run with.
    pub fn validate(&self) -> Result<(), LightNodeError> {
        if self.disconnect_timeout_ms == 0 {
            return Err(LightNodeError::Config(
                "disconnect_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Disconnect acknowledgement timeout.
    pub fn disconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.disconnect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = LightNodeConfig::default();
        assert_eq!(config.listener_capacity, 3);
        assert_eq!(config.wallet_capacity, 10);
        assert_eq!(config.block_capacity, 100);
        assert_eq!(config.transaction_capacity, 1000);
        assert_eq!(config.shutdown_policy, ShutdownPolicy::Drain);
    }

    #[test]
    fn test_testing_config() {
        let config = LightNodeConfig::for_testing();
        assert_eq!(config.network, Network::Ropsten);
        assert_eq!(config.disconnect_timeout(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_vars() {
        let config = LightNodeConfig::from_vars(vars(&[
            ("QC_LN_NETWORK", "rinkeby"),
            ("QC_LN_NODE_TYPE", "json_rpc"),
            ("QC_LN_DISCONNECT_TIMEOUT_MS", "250"),
            ("QC_LN_SHUTDOWN_POLICY", "discard"),
        ]))
        .unwrap();
        assert_eq!(config.network, Network::Rinkeby);
        assert_eq!(config.node_type, NodeType::JsonRpc);
        assert_eq!(config.disconnect_timeout_ms, 250);
        assert_eq!(config.shutdown_policy, ShutdownPolicy::Discard);
    }

    #[test]
    fn test_from_vars_rejects_garbage() {
        assert!(LightNodeConfig::from_vars(vars(&[("QC_LN_NETWORK", "moon")])).is_err());
        assert!(LightNodeConfig::from_vars(vars(&[("QC_LN_DISCONNECT_TIMEOUT_MS", "0")])).is_err());
        assert!(LightNodeConfig::from_vars(vars(&[("QC_LN_SHUTDOWN_POLICY", "later")])).is_err());
    }

    #[test]
    fn test_from_vars_empty_is_default() {
        assert_eq!(
            LightNodeConfig::from_vars(|_| None).unwrap(),
            LightNodeConfig::default()
        );
    }
}
