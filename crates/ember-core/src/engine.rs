//! The chain-engine collaborator interface.
//!
//! The blockchain engine (chain state, UTXO and address indexes, mempool,
//! proof-of-work validation, block storage) lives outside this workspace.
//! [`ChainEngine`] is the seam: every query the RPC layer needs, expressed
//! as an awaited call so handler logic reads as straight-line steps even
//! though the engine completes queries asynchronously.

use async_trait::async_trait;

use crate::compact::CompactBits;
use crate::error::EngineError;
use crate::params::NetworkParams;
use crate::types::{AddressUtxo, BlockHeader, BranchTip, ChainTip, MempoolDelta, MempoolTx};

/// Read-only query interface of the external chain engine.
///
/// Each method is awaited to completion; the engine imposes no internal
/// timeout. Implementations must be safe to share across RPC-handling
/// tasks.
#[async_trait]
pub trait ChainEngine: Send + Sync {
    /// Height of the chain's best-known block.
    async fn tip_height(&self) -> Result<u64, EngineError>;

    /// Header of the block at the given height.
    async fn header_at(&self, height: u64) -> Result<BlockHeader, EngineError>;

    /// Height and header of the best-known block, as one snapshot.
    ///
    /// Default implementation chains [`tip_height`](Self::tip_height) and
    /// [`header_at`](Self::header_at).
    async fn chain_tip(&self) -> Result<ChainTip, EngineError> {
        let height = self.tip_height().await?;
        let header = self.header_at(height).await?;
        Ok(ChainTip { height, header })
    }

    /// Median-time-past of the current tip (Unix seconds).
    async fn median_time_past(&self) -> Result<u64, EngineError>;

    /// Difficulty bits required for the next block, keyed on the given
    /// current time.
    async fn next_required_bits(&self, current_time: u64) -> Result<CompactBits, EngineError>;

    /// Mempool transactions up to `max_bytes` total serialized size,
    /// in mempool insertion order.
    async fn fetch_mempool(&self, max_bytes: u64) -> Result<Vec<MempoolTx>, EngineError>;

    /// Unspent outputs owned by an address, from the engine's address
    /// index, ordered by confirmation height.
    async fn address_history(&self, address: &str) -> Result<Vec<AddressUtxo>, EngineError>;

    /// Mempool activity touching any of the given addresses.
    async fn mempool_deltas(&self, addresses: &[String]) -> Result<Vec<MempoolDelta>, EngineError>;

    /// All known tips of the block tree. The active tip is always present
    /// with a branch length of zero.
    async fn branch_tips(&self) -> Result<Vec<BranchTip>, EngineError>;

    /// Consensus constants of the network the engine runs on.
    fn params(&self) -> &NetworkParams;
}
