//! Mining block-template assembly.
//!
//! Builds the `getblocktemplate` response document: chain tip, timing
//! window, difficulty target, subsidy plus mempool fees, and the cached
//! mempool transaction list. Every engine query is awaited in sequence;
//! nothing here fans out.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ember_core::compact::target_hex;
use ember_core::engine::ChainEngine;
use ember_core::error::EngineError;
use ember_core::subsidy::block_subsidy;

use crate::clock::Clock;
use crate::error::HandlerError;
use crate::mempool_cache::MempoolCache;

/// One mempool transaction in the template document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateTransaction {
    /// Serialized transaction, hex-encoded.
    pub data: String,
    /// Transaction ID, hex-encoded.
    pub txid: String,
    /// Same as `txid`; kept for consumer compatibility.
    pub hash: String,
    /// Indices of in-template transactions this one depends on.
    pub depends: Vec<u64>,
    /// Fee in satoshis.
    pub fee: u64,
    /// Signature operation count.
    pub sigops: u64,
    /// Serialized size in bytes.
    pub weight: u64,
}

/// The `coinbaseaux` object: extra data miners may place in the coinbase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinbaseAux {
    /// Hex-encoded flag bytes. Currently always empty.
    pub flags: String,
}

/// A mineable block template.
///
/// Field names and formatting are wire-protocol requirements: `target`
/// is exactly 64 zero-padded hex characters, `bits` exactly 8.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockTemplate {
    /// Template capabilities offered to the miner.
    pub capabilities: Vec<String>,
    /// Protocol version for the new block.
    pub version: u32,
    /// Active soft-fork rule names.
    pub rules: Vec<String>,
    /// Version-bits deployments available for signalling (none).
    pub vbavailable: serde_json::Map<String, serde_json::Value>,
    /// Version bits the miner is required to set.
    pub vbrequired: u32,
    /// Server time, clamped to never precede `mintime` (Unix seconds).
    pub curtime: u64,
    /// Earliest acceptable block time: median-time-past + 1.
    pub mintime: u64,
    /// Hash of the current tip, hex-encoded.
    pub previousblockhash: String,
    /// Maximum signature operations in the block.
    pub sigoplimit: u64,
    /// Maximum serialized block size in bytes.
    pub sizelimit: u64,
    /// Maximum block weight in bytes.
    pub weightlimit: u64,
    /// Mempool transactions, in snapshot order (coinbase excluded).
    pub transactions: Vec<TemplateTransaction>,
    /// Subsidy plus total fees claimable by the coinbase, in satoshis.
    pub coinbasevalue: u64,
    /// Extra coinbase data.
    pub coinbaseaux: CoinbaseAux,
    /// Proof-of-work threshold as 64 zero-padded hex characters.
    pub target: String,
    /// Template fields the miner may alter.
    pub mutable: Vec<String>,
    /// Nonce search range, as two concatenated 32-bit hex bounds.
    pub noncerange: String,
    /// Compact difficulty bits as 8 hex characters.
    pub bits: String,
    /// Height of the block being templated.
    pub height: u64,
}

/// Assembles block templates from engine queries and the mempool cache.
///
/// Owns its [`MempoolCache`]; construct one builder per engine and share
/// it across RPC-handling tasks.
pub struct TemplateBuilder {
    engine: Arc<dyn ChainEngine>,
    cache: MempoolCache,
    clock: Arc<dyn Clock>,
}

impl TemplateBuilder {
    /// Create a builder with a fresh, never-refreshed mempool cache.
    pub fn new(engine: Arc<dyn ChainEngine>, clock: Arc<dyn Clock>) -> Self {
        let cache = MempoolCache::new(Arc::clone(&engine), Arc::clone(&clock));
        Self {
            engine,
            cache,
            clock,
        }
    }

    /// Build a template including up to `max_bytes` of mempool
    /// transactions, reusing the cached snapshot within `ttl`.
    ///
    /// `max_bytes` must be positive and no larger than the network's
    /// block size limit; violations are rejected before any engine query.
    pub async fn build(
        &self,
        max_bytes: u64,
        ttl: Duration,
    ) -> Result<BlockTemplate, HandlerError> {
        let params = self.engine.params();
        if max_bytes == 0 || max_bytes > params.max_block_size {
            return Err(HandlerError::InvalidParameters(format!(
                "max_bytes must be in 1..={}, got {max_bytes}",
                params.max_block_size
            )));
        }

        let tip_height = self
            .engine
            .tip_height()
            .await
            .map_err(HandlerError::ChainUnavailable)?;
        let tip_header = self
            .engine
            .header_at(tip_height)
            .await
            .map_err(HandlerError::ChainUnavailable)?;

        // Templates must never claim a time before the chain's minimum
        // acceptable time, so curtime is clamped up to mintime.
        let mintime = self
            .engine
            .median_time_past()
            .await
            .map_err(HandlerError::ChainUnavailable)?
            + 1;
        let curtime = self.clock.unix_now().max(mintime);

        let bits = self
            .engine
            .next_required_bits(curtime)
            .await
            .map_err(HandlerError::ChainUnavailable)?;
        let target = bits.expand().map_err(|err| {
            HandlerError::ChainUnavailable(EngineError::QueryFailed(format!(
                "difficulty bits {bits}: {err}"
            )))
        })?;

        let height = tip_height + 1;
        let subsidy = block_subsidy(height, params);

        let snapshot = self.cache.snapshot(tip_height, max_bytes, ttl).await?;
        let mut fees = 0u64;
        let mut transactions = Vec::with_capacity(snapshot.len());
        for tx in snapshot.iter() {
            fees = fees.saturating_add(tx.fee);
            transactions.push(TemplateTransaction {
                data: hex::encode(&tx.data),
                txid: tx.txid.to_string(),
                hash: tx.txid.to_string(),
                depends: Vec::new(),
                fee: tx.fee,
                sigops: tx.sigops,
                weight: tx.size,
            });
        }

        debug!(height, txs = transactions.len(), fees, "assembled block template");

        Ok(BlockTemplate {
            capabilities: vec!["proposal".to_string()],
            version: params.block_version,
            rules: params.rules.iter().map(|rule| rule.to_string()).collect(),
            vbavailable: serde_json::Map::new(),
            vbrequired: 0,
            curtime,
            mintime,
            previousblockhash: tip_header.hash.to_string(),
            sigoplimit: params.max_block_sigops,
            sizelimit: params.max_block_size,
            weightlimit: params.max_block_size,
            transactions,
            coinbasevalue: subsidy.saturating_add(fees),
            coinbaseaux: CoinbaseAux {
                flags: String::new(),
            },
            target: target_hex(target),
            mutable: vec![
                "time".to_string(),
                "transactions".to_string(),
                "prevblock".to_string(),
            ],
            noncerange: "00000000ffffffff".to_string(),
            bits: bits.to_hex(),
            height,
        })
    }
}
