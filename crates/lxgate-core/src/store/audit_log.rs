// ── Central audit log store ──
//
// Bounded, newest-first alert storage fed from two sources: the live
// WebSocket stream (prepend) and periodic audit log polls (replace).
// Mutations are broadcast to subscribers via a `watch` channel.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;

use crate::feed::LogStream;
use crate::model::{AlertEvent, DedupKey};

/// Default retention limit for the in-memory audit log.
pub const DEFAULT_CAPACITY: usize = 200;

struct State {
    /// Newest-first. Index 0 is always the most recently observed alert.
    entries: VecDeque<Arc<AlertEvent>>,
    /// Identity set mirroring `entries`, for O(1) duplicate rejection.
    keys: HashSet<DedupKey>,
}

/// Reactive audit log of alert events.
///
/// Holds at most `capacity` entries, newest first. An alert that arrives
/// over both the live stream and a poll is stored once; identity is
/// `(timestamp, sensor_id, attack_type)`. Every mutation publishes a fresh
/// immutable snapshot to subscribers.
pub struct AuditLog {
    state: RwLock<State>,
    capacity: usize,
    snapshot_tx: watch::Sender<Arc<Vec<Arc<AlertEvent>>>>,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            state: RwLock::new(State {
                entries: VecDeque::with_capacity(capacity),
                keys: HashSet::with_capacity(capacity),
            }),
            capacity,
            snapshot_tx,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Insert a live-stream alert at the front. Returns `false` if the
    /// alert was already present (duplicate of a polled entry or an
    /// earlier frame); the store is unchanged in that case.
    pub fn prepend(&self, event: AlertEvent) -> bool {
        let key = event.dedup_key();
        {
            let mut state = self.write();
            if !state.keys.insert(key) {
                tracing::trace!(
                    attack_type = %event.attack_type,
                    "duplicate alert dropped"
                );
                return false;
            }

            state.entries.push_front(Arc::new(event));
            while state.entries.len() > self.capacity {
                if let Some(evicted) = state.entries.pop_back() {
                    state.keys.remove(&evicted.dedup_key());
                }
            }
        }
        self.publish_snapshot();
        true
    }

    /// Reconcile the store against an authoritative poll of the gateway's
    /// audit log.
    ///
    /// Polled entries replace the stored set, but live-stream alerts the
    /// gateway has not persisted yet are retained rather than lost. The
    /// merged result is re-sorted newest-first and truncated to capacity.
    pub fn replace_from_poll(&self, polled: Vec<AlertEvent>) {
        {
            let mut state = self.write();

            let mut keys: HashSet<DedupKey> =
                polled.iter().map(AlertEvent::dedup_key).collect();

            let mut merged: Vec<Arc<AlertEvent>> =
                polled.into_iter().map(Arc::new).collect();

            // Keep live entries the poll did not cover
            for entry in state.entries.drain(..) {
                if keys.insert(entry.dedup_key()) {
                    merged.push(entry);
                }
            }

            merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            merged.truncate(self.capacity);

            state.keys = merged.iter().map(|e| e.dedup_key()).collect();
            state.entries = merged.into();
        }
        self.publish_snapshot();
    }

    /// Drop all stored entries and notify subscribers with an empty
    /// snapshot.
    pub fn reset(&self) {
        {
            let mut state = self.write();
            state.entries.clear();
            state.keys.clear();
        }
        self.publish_snapshot();
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Point-in-time snapshot, newest first.
    pub fn snapshot(&self) -> Arc<Vec<Arc<AlertEvent>>> {
        self.snapshot_tx.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> LogStream {
        LogStream::new(self.snapshot_tx.subscribe())
    }

    // ── Internals ────────────────────────────────────────────────────

    fn publish_snapshot(&self) {
        let snapshot: Vec<Arc<AlertEvent>> =
            self.read().entries.iter().cloned().collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot_tx
            .send_modify(|snap| *snap = Arc::new(snapshot));
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
