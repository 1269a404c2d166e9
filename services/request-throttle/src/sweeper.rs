// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Periodic cleanup of expired attempt records.
//!
//! The sweep interval is independent of any limiter's window. Each sweep
//! removes records one lock at a time, so overlapping sweeps and concurrent
//! checks on other keys never wait on a whole-map lock.

use crate::error::{Result, ThrottleError};
use crate::metrics::Metrics;
use crate::registry::LimiterRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub struct Sweeper {
    limiters: Arc<LimiterRegistry>,
    interval: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl Sweeper {
    /// Fails on a zero interval, which tokio cannot tick on.
    pub fn new(limiters: Arc<LimiterRegistry>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(ThrottleError::InvalidConfig {
                section: "sweeper".to_string(),
                reason: "sweep interval must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            limiters,
            interval,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run a single sweep over every limiter.
    pub fn sweep(&self) -> usize {
        let removed = self.limiters.cleanup_all();
        if let Some(metrics) = &self.metrics {
            metrics.record_sweep(removed);
            metrics.observe(&self.limiters);
        }
        debug!(removed, "Sweep finished");
        removed
    }

    /// Spawn the sweep loop. Abort the returned handle to stop it.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(interval_secs = self.interval.as_secs(), "Starting record sweeper");
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; there is nothing to sweep yet.
            interval.tick().await;
            loop {
                interval.tick().await;
                self.sweep();
            }
        })
    }
}
