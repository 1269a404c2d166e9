// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Windowed attempt limiter with progressive blocking.
//!
//! Each call to [`RateLimiter::check_limit`] counts one attempt for an
//! `identifier:origin` key and returns a [`Decision`]:
//!
//! 1. Origins on the suspicious list are rejected outright, before any
//!    per-key counting.
//! 2. Within a window, up to `max_attempts` attempts are allowed. Past 70%
//!    of the limit the caller is asked to interpose a challenge.
//! 3. The attempt after the limit blocks the key. Repeat violations inside
//!    the same window escalate the block by `progressive_multiplier`.
//! 4. A key that goes past three times the limit gets its origin flagged,
//!    which blocks that origin for every identifier until cleared.

use crate::clock::{Clock, SystemClock};
use crate::config::RateLimitConfig;
use crate::error::{Result, ThrottleError};
use crate::store::{MemoryStore, RateLimitRecord, RecordStore};
use dashmap::DashSet;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Origin recorded for callers that cannot supply one.
pub const UNKNOWN_ORIGIN: &str = "unknown";

const MINUTE_MS: u64 = 60 * 1000;

/// Why a request was not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The origin is on the suspicious list
    SuspiciousOrigin,
    /// The key is already serving a block
    RateLimited,
    /// This attempt crossed the limit and started a block
    LimitExceeded {
        /// Whole minutes blocked, rounded up
        minutes: u64,
    },
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuspiciousOrigin => write!(f, "Suspicious activity detected"),
            Self::RateLimited => write!(f, "Rate limit exceeded"),
            Self::LimitExceeded { minutes: 1 } => {
                write!(f, "Too many attempts. Try again in 1 minute")
            }
            Self::LimitExceeded { minutes } => {
                write!(f, "Too many attempts. Try again in {} minutes", minutes)
            }
        }
    }
}

impl Serialize for BlockReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Verdict for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    /// Attempts left in the window; zero when not allowed
    pub remaining: u32,
    /// Epoch ms when the current window or block ends
    pub reset_time: u64,
    /// Caller should present a human-verification challenge
    pub requires_challenge: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<BlockReason>,
}

impl Decision {
    fn allowed(remaining: u32, reset_time: u64, requires_challenge: bool) -> Self {
        Self {
            allowed: true,
            remaining,
            reset_time,
            requires_challenge,
            block_reason: None,
        }
    }

    fn denied(reason: BlockReason, reset_time: u64) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            reset_time,
            requires_challenge: true,
            block_reason: Some(reason),
        }
    }

    /// Time from `now` until `reset_time`.
    pub fn retry_after(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.reset_time.saturating_sub(now_ms))
    }

    /// `reset_time` as a UTC timestamp.
    pub fn reset_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        i64::try_from(self.reset_time)
            .ok()
            .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
    }

    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match (self.allowed, self.block_reason) {
            (true, _) if self.requires_challenge => "challenged",
            (true, _) => "allowed",
            (false, Some(BlockReason::SuspiciousOrigin)) => "suspicious",
            (false, _) => "blocked",
        }
    }
}

/// Result of evaluating one attempt under the record lock.
struct Evaluation {
    decision: Decision,
    count: u32,
    newly_blocked_ms: Option<u64>,
    flag_origin: bool,
}

/// Thread-safe attempt limiter for one operation category.
pub struct RateLimiter {
    name: String,
    config: RateLimitConfig,
    store: Arc<dyn RecordStore>,
    suspicious: DashSet<String>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create an in-memory limiter on the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::named("default", config)
    }

    pub fn named(name: impl Into<String>, config: RateLimitConfig) -> Self {
        Self {
            name: name.into(),
            config,
            store: Arc::new(MemoryStore::new()),
            suspicious: DashSet::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the record store.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = store;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Count one attempt for `identifier` from `origin` and decide whether it may proceed.
    ///
    /// An empty identifier is a caller bug and is rejected without touching
    /// any state. A missing or empty origin is tracked as `"unknown"` and can
    /// never be flagged as suspicious.
    pub fn check_limit(&self, identifier: &str, origin: Option<&str>) -> Result<Decision> {
        if identifier.trim().is_empty() {
            return Err(ThrottleError::EmptyIdentifier);
        }
        let origin = normalize_origin(origin);
        let now = self.clock.now_ms();

        if let Some(origin) = origin {
            if self.suspicious.contains(origin) {
                debug!(limiter = %self.name, %origin, "Rejecting suspicious origin");
                return Ok(Decision::denied(
                    BlockReason::SuspiciousOrigin,
                    now.saturating_add(self.config.block_duration_ms),
                ));
            }
        }

        let key = record_key(identifier, origin);
        let mut evaluation = None;
        self.store
            .update(&key, RateLimitRecord::new(now), &mut |record| {
                evaluation = Some(self.evaluate(record, now));
            });

        let Some(evaluation) = evaluation else {
            // A store that skipped the callback gives us nothing to go on; fail closed.
            warn!(limiter = %self.name, "Record store did not run update; denying attempt");
            return Ok(Decision::denied(
                BlockReason::RateLimited,
                now.saturating_add(self.config.block_duration_ms),
            ));
        };

        if let Some(block_ms) = evaluation.newly_blocked_ms {
            warn!(
                limiter = %self.name,
                origin = origin.unwrap_or(UNKNOWN_ORIGIN),
                count = evaluation.count,
                block_ms,
                "Attempt limit exceeded, blocking key"
            );
        }

        if evaluation.flag_origin {
            if let Some(origin) = origin {
                if self.suspicious.insert(origin.to_string()) {
                    warn!(
                        limiter = %self.name,
                        %origin,
                        count = evaluation.count,
                        "Origin flagged as suspicious"
                    );
                }
            }
        }

        if evaluation.decision.allowed {
            debug!(
                limiter = %self.name,
                remaining = evaluation.decision.remaining,
                requires_challenge = evaluation.decision.requires_challenge,
                "Attempt allowed"
            );
        }

        Ok(evaluation.decision)
    }

    /// Steps run while holding the key's lock.
    fn evaluate(&self, record: &mut RateLimitRecord, now: u64) -> Evaluation {
        let config = &self.config;

        if record.is_stale(now, config.window_ms) {
            record.restart_window(now);
        }

        // Attempts during a block are not counted and do not extend it.
        if let Some(until) = record.active_block(now) {
            return Evaluation {
                decision: Decision::denied(BlockReason::RateLimited, until),
                count: record.count,
                newly_blocked_ms: None,
                flag_origin: false,
            };
        }

        record.count = record.count.saturating_add(1);

        if record.count > config.max_attempts {
            let block_ms = self.block_duration_for(record.count);
            let until = now.saturating_add(block_ms);
            record.block_until = Some(until);

            return Evaluation {
                decision: Decision::denied(
                    BlockReason::LimitExceeded {
                        minutes: block_ms.div_ceil(MINUTE_MS),
                    },
                    until,
                ),
                count: record.count,
                newly_blocked_ms: Some(block_ms),
                flag_origin: record.count > config.suspicious_threshold(),
            };
        }

        Evaluation {
            decision: Decision::allowed(
                config.max_attempts - record.count,
                record.first_attempt.saturating_add(config.window_ms),
                record.count > config.challenge_threshold(),
            ),
            count: record.count,
            newly_blocked_ms: None,
            flag_origin: false,
        }
    }

    /// Block length for a violation at `count`: `base * multiplier^k` with
    /// `k = count / max_attempts - 1`, clamped to `max_block_duration_ms`.
    fn block_duration_for(&self, count: u32) -> u64 {
        let config = &self.config;
        let k = (count / config.max_attempts.max(1)).saturating_sub(1);
        let exponent = i32::try_from(k).unwrap_or(i32::MAX);
        let scaled = config.block_duration_ms as f64 * config.progressive_multiplier.powi(exponent);

        if scaled.is_finite() && scaled < config.max_block_duration_ms as f64 {
            scaled as u64
        } else {
            config.max_block_duration_ms
        }
    }

    /// Forget the record for this key, e.g. after a solved challenge.
    ///
    /// Rejects an empty identifier the same way [`RateLimiter::check_limit`] does.
    pub fn reset(&self, identifier: &str, origin: Option<&str>) -> Result<()> {
        if identifier.trim().is_empty() {
            return Err(ThrottleError::EmptyIdentifier);
        }
        let key = record_key(identifier, normalize_origin(origin));
        self.store.remove(&key);
        debug!(limiter = %self.name, "Record reset");
        Ok(())
    }

    /// Current record for this key without counting an attempt.
    pub fn status(&self, identifier: &str, origin: Option<&str>) -> Option<RateLimitRecord> {
        self.store
            .get(&record_key(identifier, normalize_origin(origin)))
    }

    /// Drop records whose window and block have both expired.
    ///
    /// Each removal re-checks staleness under that key's lock, so a record
    /// touched by a concurrent `check_limit` since the key snapshot survives.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now_ms();
        let window_ms = self.config.window_ms;

        let removed = self
            .store
            .keys()
            .into_iter()
            .filter(|key| {
                self.store
                    .remove_if(key.as_str(), &|record| record.is_stale(now, window_ms))
            })
            .count();

        debug!(limiter = %self.name, removed, remaining = self.store.len(), "Cleanup complete");
        removed
    }

    /// Origins currently flagged, sorted for stable output.
    pub fn suspicious_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = self.suspicious.iter().map(|o| o.key().clone()).collect();
        origins.sort();
        origins
    }

    pub fn is_suspicious(&self, origin: &str) -> bool {
        self.suspicious.contains(origin)
    }

    /// Remove an origin from the suspicious list. Returns whether it was listed.
    pub fn clear_suspicious_origin(&self, origin: &str) -> bool {
        let cleared = self.suspicious.remove(origin).is_some();
        if cleared {
            info!(limiter = %self.name, %origin, "Suspicious origin cleared");
        }
        cleared
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.store.len()
    }
}

fn normalize_origin(origin: Option<&str>) -> Option<&str> {
    origin.map(str::trim).filter(|o| !o.is_empty())
}

/// `identifier:origin`, with `%` and `:` percent-escaped in the identifier so
/// the first `:` always separates the two halves.
fn record_key(identifier: &str, origin: Option<&str>) -> String {
    let origin = origin.unwrap_or(UNKNOWN_ORIGIN);
    let mut key = String::with_capacity(identifier.len() + origin.len() + 1);
    for c in identifier.chars() {
        match c {
            '%' => key.push_str("%25"),
            ':' => key.push_str("%3A"),
            c => key.push(c),
        }
    }
    key.push(':');
    key.push_str(origin);
    key
}
