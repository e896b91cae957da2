//! Read-only chain snapshot types.
//!
//! Everything here is a value reported by the external chain engine:
//! headers, mempool entries, address index rows, branch tips. None of it
//! is validated or re-derived locally. All monetary amounts are in
//! satoshis; all timestamps are Unix seconds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::compact::CompactBits;

/// A 32-byte hash value.
///
/// Used for block header hashes and transaction IDs. Displays as 64
/// lowercase hex characters.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Block header snapshot as reported by the engine.
///
/// Only the fields the RPC layer consumes are carried; full header
/// decoding stays on the engine side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Header hash.
    pub hash: Hash256,
    /// Compact difficulty bits the block was mined at.
    pub bits: CompactBits,
    /// Block timestamp (Unix seconds).
    pub timestamp: u64,
}

/// The chain's best-known block: height plus header.
///
/// Refreshed from the engine on every query that needs it; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTip {
    /// Height of the tip block.
    pub height: u64,
    /// Header of the tip block.
    pub header: BlockHeader,
}

/// One entry of a mempool snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MempoolTx {
    /// Serialized transaction bytes.
    pub data: Vec<u8>,
    /// Transaction ID.
    pub txid: Hash256,
    /// Fee paid by the transaction, in satoshis.
    pub fee: u64,
    /// Signature operation count.
    pub sigops: u64,
    /// Serialized size in bytes.
    pub size: u64,
}

/// An unspent output owned by an address, from the engine's address index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressUtxo {
    /// The owning address, in its canonical encoding.
    pub address: String,
    /// Transaction the output was created in.
    pub txid: Hash256,
    /// Output index within that transaction.
    pub output_index: u64,
    /// Output value in satoshis.
    pub satoshis: u64,
    /// Height of the block the transaction confirmed in.
    pub height: u64,
    /// Serialized output script.
    pub script: Vec<u8>,
}

/// Mempool activity touching an address.
///
/// Outputs credit the address (positive satoshis); spends debit it
/// (negative satoshis) and carry the previous outpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MempoolDelta {
    /// The address touched.
    pub address: String,
    /// Mempool transaction ID.
    pub txid: Hash256,
    /// Input or output index within the transaction.
    pub index: u64,
    /// Signed amount in satoshis (negative for spends).
    pub satoshis: i64,
    /// When the transaction entered the mempool (Unix seconds).
    pub timestamp: u64,
    /// For spends, the transaction being spent.
    pub prev_txid: Option<Hash256>,
    /// For spends, the output index being spent.
    pub prev_index: Option<u64>,
}

/// Validation status of a branch tip in the block tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipStatus {
    /// Tip of the active main chain.
    Active,
    /// Fully validated branch off the active chain.
    ValidFork,
    /// Headers valid, blocks present but never fully validated.
    ValidHeaders,
    /// Only headers are available for this branch.
    HeadersOnly,
    /// Branch contains at least one invalid block.
    Invalid,
}

impl TipStatus {
    /// The wire-protocol string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::ValidFork => "valid-fork",
            Self::ValidHeaders => "valid-headers",
            Self::HeadersOnly => "headers-only",
            Self::Invalid => "invalid",
        }
    }
}

/// A tip of the block tree: the active chain head or an orphaned branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    /// Height of the branch tip.
    pub height: u64,
    /// Hash of the tip block.
    pub hash: Hash256,
    /// Blocks connecting the tip to the main chain (zero for the active tip).
    pub branch_len: u64,
    /// Validation status of the branch.
    pub status: TipStatus,
}
