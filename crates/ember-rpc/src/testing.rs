//! Test doubles: a scriptable in-memory chain engine and a manual clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use parking_lot::Mutex;

use ember_core::compact::CompactBits;
use ember_core::engine::ChainEngine;
use ember_core::error::EngineError;
use ember_core::params::NetworkParams;
use ember_core::types::{
    AddressUtxo, BlockHeader, BranchTip, Hash256, MempoolDelta, MempoolTx, TipStatus,
};

/// Scriptable [`ChainEngine`] backed by in-memory state.
///
/// Query counters let tests assert how often the engine was touched;
/// per-query failure injection exercises the error paths.
pub(crate) struct MockEngine {
    params: NetworkParams,
    tip_height: AtomicU64,
    header: Mutex<BlockHeader>,
    median_time_past: AtomicU64,
    next_bits: Mutex<CompactBits>,
    mempool: Mutex<Vec<MempoolTx>>,
    utxos: Mutex<HashMap<String, Vec<AddressUtxo>>>,
    deltas: Mutex<Vec<MempoolDelta>>,
    tips: Mutex<Vec<BranchTip>>,
    tip_calls: AtomicU64,
    mempool_calls: AtomicU64,
    fail_tip: Mutex<Option<EngineError>>,
    fail_mempool: Mutex<Option<EngineError>>,
}

impl MockEngine {
    pub(crate) fn new() -> Self {
        let header = BlockHeader {
            hash: Hash256([0x11; 32]),
            bits: CompactBits(0x1d00_ffff),
            timestamp: 1_700_000_000,
        };
        Self {
            params: NetworkParams::mainnet(),
            tip_height: AtomicU64::new(100),
            header: Mutex::new(header),
            median_time_past: AtomicU64::new(1_699_999_000),
            next_bits: Mutex::new(CompactBits(0x1d00_ffff)),
            mempool: Mutex::new(Vec::new()),
            utxos: Mutex::new(HashMap::new()),
            deltas: Mutex::new(Vec::new()),
            tips: Mutex::new(vec![BranchTip {
                height: 100,
                hash: Hash256([0x11; 32]),
                branch_len: 0,
                status: TipStatus::Active,
            }]),
            tip_calls: AtomicU64::new(0),
            mempool_calls: AtomicU64::new(0),
            fail_tip: Mutex::new(None),
            fail_mempool: Mutex::new(None),
        }
    }

    pub(crate) fn set_tip(&self, height: u64, hash: Hash256) {
        self.tip_height.store(height, Ordering::SeqCst);
        self.header.lock().hash = hash;
        *self.tips.lock() = vec![BranchTip {
            height,
            hash,
            branch_len: 0,
            status: TipStatus::Active,
        }];
    }

    pub(crate) fn set_median_time_past(&self, timestamp: u64) {
        self.median_time_past.store(timestamp, Ordering::SeqCst);
    }

    pub(crate) fn set_next_bits(&self, bits: CompactBits) {
        *self.next_bits.lock() = bits;
    }

    /// Append a mempool transaction with the given fee and size. The
    /// txid is derived from the entry's position so ordering is visible.
    pub(crate) fn push_mempool_tx(&self, fee: u64, size: u64) {
        let mut pool = self.mempool.lock();
        let seq = pool.len() as u8 + 1;
        pool.push(MempoolTx {
            data: vec![seq; size as usize],
            txid: Hash256([seq; 32]),
            fee,
            sigops: 1,
            size,
        });
    }

    pub(crate) fn insert_utxos(&self, address: &str, utxos: Vec<AddressUtxo>) {
        self.utxos.lock().insert(address.to_string(), utxos);
    }

    pub(crate) fn set_deltas(&self, deltas: Vec<MempoolDelta>) {
        *self.deltas.lock() = deltas;
    }

    pub(crate) fn push_branch_tip(&self, tip: BranchTip) {
        self.tips.lock().push(tip);
    }

    pub(crate) fn fail_tip_with(&self, err: EngineError) {
        *self.fail_tip.lock() = Some(err);
    }

    pub(crate) fn fail_mempool_with(&self, err: EngineError) {
        *self.fail_mempool.lock() = Some(err);
    }

    pub(crate) fn clear_failures(&self) {
        *self.fail_tip.lock() = None;
        *self.fail_mempool.lock() = None;
    }

    pub(crate) fn tip_queries(&self) -> u64 {
        self.tip_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn mempool_fetches(&self) -> u64 {
        self.mempool_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainEngine for MockEngine {
    async fn tip_height(&self) -> Result<u64, EngineError> {
        self.tip_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_tip.lock().clone() {
            return Err(err);
        }
        Ok(self.tip_height.load(Ordering::SeqCst))
    }

    async fn header_at(&self, _height: u64) -> Result<BlockHeader, EngineError> {
        if let Some(err) = self.fail_tip.lock().clone() {
            return Err(err);
        }
        Ok(*self.header.lock())
    }

    async fn median_time_past(&self) -> Result<u64, EngineError> {
        Ok(self.median_time_past.load(Ordering::SeqCst))
    }

    async fn next_required_bits(&self, _current_time: u64) -> Result<CompactBits, EngineError> {
        Ok(*self.next_bits.lock())
    }

    async fn fetch_mempool(&self, _max_bytes: u64) -> Result<Vec<MempoolTx>, EngineError> {
        self.mempool_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_mempool.lock().clone() {
            return Err(err);
        }
        Ok(self.mempool.lock().clone())
    }

    async fn address_history(&self, address: &str) -> Result<Vec<AddressUtxo>, EngineError> {
        self.utxos
            .lock()
            .get(address)
            .cloned()
            .ok_or_else(|| EngineError::InvalidAddress(address.to_string()))
    }

    async fn mempool_deltas(&self, addresses: &[String]) -> Result<Vec<MempoolDelta>, EngineError> {
        Ok(self
            .deltas
            .lock()
            .iter()
            .filter(|delta| addresses.contains(&delta.address))
            .cloned()
            .collect())
    }

    async fn branch_tips(&self) -> Result<Vec<BranchTip>, EngineError> {
        if let Some(err) = self.fail_tip.lock().clone() {
            return Err(err);
        }
        Ok(self.tips.lock().clone())
    }

    fn params(&self) -> &NetworkParams {
        &self.params
    }
}

/// Hand-driven [`Clock`](crate::clock::Clock).
pub(crate) struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    pub(crate) fn at_unix(secs: u64) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(UNIX_EPOCH + Duration::from_secs(secs)),
        })
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub(crate) fn rewind(&self, by: Duration) {
        let mut now = self.now.lock();
        *now -= by;
    }
}

impl crate::clock::Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock()
    }
}
