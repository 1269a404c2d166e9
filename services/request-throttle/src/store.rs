// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-key attempt records and the store that holds them.
//!
//! The limiter only talks to [`RecordStore`], so a shared TTL cache can be
//! dropped in for multi-instance deployments without touching the algorithm.
//! [`MemoryStore`] is the process-local default.

use dashmap::DashMap;
use serde::Serialize;

/// Attempt state for one `identifier:origin` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitRecord {
    /// Attempts seen in the current window
    pub count: u32,
    /// Epoch ms at which the current window began
    pub first_attempt: u64,
    /// Epoch ms after which the key is unblocked
    pub block_until: Option<u64>,
}

impl RateLimitRecord {
    /// A fresh record whose window starts at `now`.
    pub fn new(now: u64) -> Self {
        Self {
            count: 0,
            first_attempt: now,
            block_until: None,
        }
    }

    /// End of the active block, if one is still running at `now`.
    pub fn active_block(&self, now: u64) -> Option<u64> {
        self.block_until.filter(|&until| now < until)
    }

    pub fn is_blocked(&self, now: u64) -> bool {
        self.active_block(now).is_some()
    }

    pub fn window_expired(&self, now: u64, window_ms: u64) -> bool {
        now.saturating_sub(self.first_attempt) > window_ms
    }

    /// Neither the window nor any block is still live.
    pub fn is_stale(&self, now: u64, window_ms: u64) -> bool {
        self.window_expired(now, window_ms) && !self.is_blocked(now)
    }

    /// Restart the window at `now`, dropping any expired block.
    pub fn restart_window(&mut self, now: u64) {
        self.count = 0;
        self.first_attempt = now;
        self.block_until = None;
    }
}

/// Key-value storage for attempt records.
///
/// `update` is the only mutating path used by `check_limit`; it must run
/// `op` exactly once while holding exclusive access to that key, so that
/// read-increment-write is atomic per key.
pub trait RecordStore: Send + Sync {
    /// Run `op` on the record for `key`, inserting `init` first if absent.
    fn update(&self, key: &str, init: RateLimitRecord, op: &mut dyn FnMut(&mut RateLimitRecord));

    /// Snapshot of the record for `key`.
    fn get(&self, key: &str) -> Option<RateLimitRecord>;

    fn remove(&self, key: &str);

    /// Remove `key` only if `predicate` holds for its current record.
    /// The predicate is evaluated under the same lock as the removal.
    fn remove_if(&self, key: &str, predicate: &dyn Fn(&RateLimitRecord) -> bool) -> bool;

    /// Snapshot of all keys currently stored.
    fn keys(&self) -> Vec<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory sharded record store. State is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, RateLimitRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn update(&self, key: &str, init: RateLimitRecord, op: &mut dyn FnMut(&mut RateLimitRecord)) {
        // The entry guard holds the shard write lock until dropped.
        let mut entry = self.records.entry(key.to_string()).or_insert(init);
        op(&mut *entry);
    }

    fn get(&self, key: &str) -> Option<RateLimitRecord> {
        self.records.get(key).map(|r| *r)
    }

    fn remove(&self, key: &str) {
        self.records.remove(key);
    }

    fn remove_if(&self, key: &str, predicate: &dyn Fn(&RateLimitRecord) -> bool) -> bool {
        self.records
            .remove_if(key, |_, record| predicate(record))
            .is_some()
    }

    fn keys(&self) -> Vec<String> {
        self.records.iter().map(|e| e.key().clone()).collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
