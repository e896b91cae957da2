//! JSON-RPC handler surface.
//!
//! Uses jsonrpsee 0.24 to expose the bitcoind-compatible query methods
//! this layer owns: `getblocktemplate`, `getchaintips`,
//! `getaddressutxos`, and `getaddressmempool`. Handlers parse and
//! validate parameters, run sequential queries against the external
//! chain engine, and assemble the response document; everything else is
//! the engine's business.

use std::sync::Arc;

use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use ember_core::engine::ChainEngine;
use ember_core::error::EngineError;
use ember_core::types::{AddressUtxo, BranchTip, MempoolDelta};

use crate::clock::{Clock, SystemClock};
use crate::config::RpcConfig;
use crate::error::HandlerError;
use crate::template::{BlockTemplate, TemplateBuilder};

/// JSON representation of one block-tree tip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainTipJson {
    /// Height of the branch tip.
    pub height: u64,
    /// Block hash of the tip as hex.
    pub hash: String,
    /// Blocks connecting the tip to the main chain (zero for the active tip).
    pub branchlen: u64,
    /// Branch status: "active", "valid-fork", "valid-headers",
    /// "headers-only", or "invalid".
    pub status: String,
}

impl From<BranchTip> for ChainTipJson {
    fn from(tip: BranchTip) -> Self {
        Self {
            height: tip.height,
            hash: tip.hash.to_string(),
            branchlen: tip.branch_len,
            status: tip.status.as_str().to_string(),
        }
    }
}

/// JSON representation of one unspent output owned by an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressUtxoJson {
    /// The owning address.
    pub address: String,
    /// Creating transaction ID as hex.
    pub txid: String,
    /// Output index within the transaction.
    #[serde(rename = "outputIndex")]
    pub output_index: u64,
    /// Serialized output script as hex.
    pub script: String,
    /// Output value in satoshis.
    pub satoshis: u64,
    /// Height the transaction confirmed at.
    pub height: u64,
}

impl From<AddressUtxo> for AddressUtxoJson {
    fn from(utxo: AddressUtxo) -> Self {
        Self {
            address: utxo.address,
            txid: utxo.txid.to_string(),
            output_index: utxo.output_index,
            script: hex::encode(utxo.script),
            satoshis: utxo.satoshis,
            height: utxo.height,
        }
    }
}

/// JSON representation of mempool activity touching an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MempoolDeltaJson {
    /// The address touched.
    pub address: String,
    /// Mempool transaction ID as hex.
    pub txid: String,
    /// Input or output index within the transaction.
    pub index: u64,
    /// Signed amount in satoshis (negative for spends).
    pub satoshis: i64,
    /// When the transaction entered the mempool (Unix seconds).
    pub timestamp: u64,
    /// For spends, the transaction being spent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevtxid: Option<String>,
    /// For spends, the output index being spent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevout: Option<u64>,
}

impl From<MempoolDelta> for MempoolDeltaJson {
    fn from(delta: MempoolDelta) -> Self {
        Self {
            address: delta.address,
            txid: delta.txid.to_string(),
            index: delta.index,
            satoshis: delta.satoshis,
            timestamp: delta.timestamp,
            prevtxid: delta.prev_txid.map(|txid| txid.to_string()),
            prevout: delta.prev_index,
        }
    }
}

/// Address-query parameters: a bare address, an address array, or the
/// bitcoind object form `{"addresses": [...], "chainInfo": bool}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressQuery {
    /// The object form, optionally requesting tip info in the response.
    Object {
        addresses: Vec<String>,
        #[serde(default, rename = "chainInfo")]
        chain_info: bool,
    },
    /// A plain list of addresses.
    List(Vec<String>),
    /// A single address.
    Single(String),
}

impl AddressQuery {
    /// The queried addresses, regardless of parameter form.
    pub fn addresses(&self) -> &[String] {
        match self {
            Self::Object { addresses, .. } => addresses,
            Self::List(addresses) => addresses,
            Self::Single(address) => std::slice::from_ref(address),
        }
    }

    /// Whether the caller asked for chain info alongside the results.
    pub fn chain_info(&self) -> bool {
        matches!(self, Self::Object { chain_info: true, .. })
    }
}

/// `getaddressutxos` result: a bare array, or (with `chainInfo`) the
/// array wrapped together with the current tip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressUtxosResponse {
    /// Utxo array plus tip info.
    WithChainInfo {
        utxos: Vec<AddressUtxoJson>,
        hash: String,
        height: u64,
    },
    /// Just the utxo array.
    Plain(Vec<AddressUtxoJson>),
}

/// The Ember JSON-RPC handler interface.
#[rpc(server)]
pub trait EmberRpc {
    /// Returns a block template for mining.
    #[method(name = "getblocktemplate")]
    async fn get_block_template(
        &self,
        template_request: Option<serde_json::Value>,
    ) -> Result<BlockTemplate, ErrorObjectOwned>;

    /// Returns all known tips of the block tree, the active chain first.
    #[method(name = "getchaintips")]
    async fn get_chain_tips(&self) -> Result<Vec<ChainTipJson>, ErrorObjectOwned>;

    /// Returns the unspent outputs owned by the given addresses.
    #[method(name = "getaddressutxos")]
    async fn get_address_utxos(
        &self,
        query: AddressQuery,
    ) -> Result<AddressUtxosResponse, ErrorObjectOwned>;

    /// Returns mempool activity touching the given addresses.
    #[method(name = "getaddressmempool")]
    async fn get_address_mempool(
        &self,
        query: AddressQuery,
    ) -> Result<Vec<MempoolDeltaJson>, ErrorObjectOwned>;
}

/// Handler implementation wrapping the external chain engine.
pub struct RpcHandlers {
    engine: Arc<dyn ChainEngine>,
    builder: TemplateBuilder,
    config: RpcConfig,
}

impl RpcHandlers {
    /// Create handlers over the given engine, using the system clock.
    pub fn new(engine: Arc<dyn ChainEngine>, config: RpcConfig) -> Self {
        Self::with_clock(engine, config, Arc::new(SystemClock))
    }

    /// Create handlers with an injected clock.
    pub fn with_clock(
        engine: Arc<dyn ChainEngine>,
        config: RpcConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let builder = TemplateBuilder::new(Arc::clone(&engine), clock);
        Self {
            engine,
            builder,
            config,
        }
    }

    /// Mempool byte budget for templates: the block size limit minus the
    /// configured coinbase reserve.
    fn template_max_bytes(&self) -> u64 {
        self.engine
            .params()
            .max_block_size
            .saturating_sub(self.config.coinbase_reserve_bytes)
    }

    fn require_addresses<'q>(query: &'q AddressQuery) -> Result<&'q [String], HandlerError> {
        let addresses = query.addresses();
        if addresses.is_empty() {
            return Err(HandlerError::InvalidParameters(
                "at least one address is required".to_string(),
            ));
        }
        Ok(addresses)
    }
}

/// An index/address query error: unknown addresses are the caller's
/// fault, everything else is an engine failure.
fn address_query_error(err: EngineError) -> HandlerError {
    match err {
        EngineError::InvalidAddress(address) => HandlerError::InvalidAddress(address),
        other => HandlerError::EngineQueryFailed(other),
    }
}

#[async_trait]
impl EmberRpcServer for RpcHandlers {
    async fn get_block_template(
        &self,
        template_request: Option<serde_json::Value>,
    ) -> Result<BlockTemplate, ErrorObjectOwned> {
        // The template-request object ("capabilities", "mode") is
        // accepted but not consulted; the template always offers the
        // proposal capability.
        let _ = template_request;

        let template = self
            .builder
            .build(self.template_max_bytes(), self.config.template_ttl)
            .await?;
        Ok(template)
    }

    async fn get_chain_tips(&self) -> Result<Vec<ChainTipJson>, ErrorObjectOwned> {
        let tips = self
            .engine
            .branch_tips()
            .await
            .map_err(HandlerError::ChainUnavailable)?;
        Ok(tips.into_iter().map(ChainTipJson::from).collect())
    }

    async fn get_address_utxos(
        &self,
        query: AddressQuery,
    ) -> Result<AddressUtxosResponse, ErrorObjectOwned> {
        let addresses = Self::require_addresses(&query)?;

        let mut utxos = Vec::new();
        for address in addresses {
            let entries = self
                .engine
                .address_history(address)
                .await
                .map_err(address_query_error)?;
            utxos.extend(entries.into_iter().map(AddressUtxoJson::from));
        }

        if !query.chain_info() {
            return Ok(AddressUtxosResponse::Plain(utxos));
        }

        let tip = self
            .engine
            .chain_tip()
            .await
            .map_err(HandlerError::ChainUnavailable)?;
        Ok(AddressUtxosResponse::WithChainInfo {
            utxos,
            hash: tip.header.hash.to_string(),
            height: tip.height,
        })
    }

    async fn get_address_mempool(
        &self,
        query: AddressQuery,
    ) -> Result<Vec<MempoolDeltaJson>, ErrorObjectOwned> {
        let addresses = Self::require_addresses(&query)?;
        let deltas = self
            .engine
            .mempool_deltas(addresses)
            .await
            .map_err(address_query_error)?;
        Ok(deltas.into_iter().map(MempoolDeltaJson::from).collect())
    }
}

/// Start the JSON-RPC server on the given address.
///
/// Returns a [`ServerHandle`] that can be used to stop the server.
pub async fn start_rpc_server(
    addr: &str,
    handlers: RpcHandlers,
) -> Result<ServerHandle, HandlerError> {
    let server = Server::builder()
        .build(addr)
        .await
        .map_err(|err| HandlerError::Server(err.to_string()))?;

    let handle = server.start(handlers.into_rpc());
    info!(addr, "rpc server listening");

    Ok(handle)
}
