//! Height- and TTL-gated mempool snapshot cache.
//!
//! Template assembly wants a stable view of the mempool without hitting
//! the engine on every poll: the snapshot is reused until the chain tip
//! advances or the configured TTL elapses, whichever comes first. The
//! cache is an explicitly owned object, one instance per
//! [`TemplateBuilder`](crate::template::TemplateBuilder), not hidden
//! process state.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::Mutex;
use tracing::debug;

use ember_core::engine::ChainEngine;
use ember_core::types::MempoolTx;

use crate::clock::Clock;
use crate::error::HandlerError;

/// Staleness bookkeeping plus the held snapshot.
///
/// Starts never-refreshed; mutated only by a successful refresh.
struct CacheState {
    snapshot: Arc<Vec<MempoolTx>>,
    last_height: Option<u64>,
    refreshed_at: Option<SystemTime>,
}

/// Cache wrapping the engine's mempool query.
///
/// The lock is held across the whole check → refresh → update sequence,
/// so concurrent callers cannot trigger duplicate refreshes or observe a
/// half-updated state.
pub struct MempoolCache {
    engine: Arc<dyn ChainEngine>,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl MempoolCache {
    /// Create an empty, never-refreshed cache.
    pub fn new(engine: Arc<dyn ChainEngine>, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine,
            clock,
            state: Mutex::new(CacheState {
                snapshot: Arc::new(Vec::new()),
                last_height: None,
                refreshed_at: None,
            }),
        }
    }

    /// The current mempool snapshot, refreshed if stale.
    ///
    /// A refresh happens iff this is the first call, `tip_height` differs
    /// from the height at the last refresh, or at least `ttl` has passed
    /// since the last refresh. At most one refresh per call. On engine
    /// failure the error propagates and the cache keeps its previous
    /// snapshot and bookkeeping for the next attempt.
    pub async fn snapshot(
        &self,
        tip_height: u64,
        max_bytes: u64,
        ttl: Duration,
    ) -> Result<Arc<Vec<MempoolTx>>, HandlerError> {
        let mut state = self.state.lock().await;

        let stale = match (state.last_height, state.refreshed_at) {
            (Some(height), Some(at)) => {
                // A clock that moved backwards counts as expired.
                let expired = self
                    .clock
                    .now()
                    .duration_since(at)
                    .map(|elapsed| elapsed >= ttl)
                    .unwrap_or(true);
                height != tip_height || expired
            }
            _ => true,
        };

        if stale {
            let txs = self
                .engine
                .fetch_mempool(max_bytes)
                .await
                .map_err(HandlerError::EngineQueryFailed)?;
            debug!(height = tip_height, txs = txs.len(), "refreshed mempool snapshot");
            state.snapshot = Arc::new(txs);
            state.last_height = Some(tip_height);
            state.refreshed_at = Some(self.clock.now());
        }

        Ok(Arc::clone(&state.snapshot))
    }
}
