//! Handler-layer configuration.
//!
//! Provides [`RpcConfig`] with defaults for the RPC binding, the mempool
//! snapshot TTL, and the byte budget reserved for the coinbase
//! transaction. The configuration can be customized programmatically by
//! the embedding daemon.

use std::time::Duration;

use ember_core::params::DEFAULT_RPC_PORT;

/// Configuration for the RPC handler layer.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// IP address for the JSON-RPC server to bind to.
    pub rpc_bind: String,
    /// Port for the JSON-RPC server.
    pub rpc_port: u16,
    /// How long a mempool snapshot stays fresh at an unchanged height.
    pub template_ttl: Duration,
    /// Bytes subtracted from the block size limit to leave room for the
    /// coinbase transaction when filling templates from the mempool.
    pub coinbase_reserve_bytes: u64,
    /// Log level filter string (e.g. "info", "debug", "ember_rpc=trace").
    pub log_level: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_bind: "127.0.0.1".to_string(),
            rpc_port: DEFAULT_RPC_PORT,
            template_ttl: Duration::from_secs(30),
            coinbase_reserve_bytes: 20_000,
            log_level: "info".to_string(),
        }
    }
}

impl RpcConfig {
    /// Socket address string for the RPC server.
    pub fn rpc_addr(&self) -> String {
        format!("{}:{}", self.rpc_bind, self.rpc_port)
    }
}
