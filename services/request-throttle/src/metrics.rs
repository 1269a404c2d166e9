// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for throttle decisions.
//!
//! Metrics live in a service-owned [`Registry`] rather than the process
//! default, so tests and embedded uses do not collide on registration.

use crate::limiter::Decision;
use crate::registry::{LimiterKind, LimiterRegistry};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    decisions: IntCounterVec,
    suspicious_origins: IntGaugeVec,
    tracked_keys: IntGaugeVec,
    records_swept: IntCounter,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let decisions = IntCounterVec::new(
            Opts::new("throttle_decisions_total", "Throttle decisions by limiter and outcome"),
            &["limiter", "outcome"],
        )?;
        let suspicious_origins = IntGaugeVec::new(
            Opts::new("throttle_suspicious_origins", "Origins currently flagged as suspicious"),
            &["limiter"],
        )?;
        let tracked_keys = IntGaugeVec::new(
            Opts::new("throttle_tracked_keys", "Attempt records currently held"),
            &["limiter"],
        )?;
        let records_swept = IntCounter::new(
            "throttle_records_swept_total",
            "Expired attempt records removed by the sweeper",
        )?;

        registry.register(Box::new(decisions.clone()))?;
        registry.register(Box::new(suspicious_origins.clone()))?;
        registry.register(Box::new(tracked_keys.clone()))?;
        registry.register(Box::new(records_swept.clone()))?;

        Ok(Self {
            registry,
            decisions,
            suspicious_origins,
            tracked_keys,
            records_swept,
        })
    }

    pub fn record_decision(&self, kind: LimiterKind, decision: &Decision) {
        self.decisions
            .with_label_values(&[kind.as_str(), decision.outcome()])
            .inc();
    }

    pub fn record_sweep(&self, removed: usize) {
        self.records_swept.inc_by(removed as u64);
    }

    /// Refresh gauges from the current limiter state.
    pub fn observe(&self, limiters: &LimiterRegistry) {
        for (kind, limiter) in limiters.iter() {
            self.suspicious_origins
                .with_label_values(&[kind.as_str()])
                .set(limiter.suspicious_origins().len() as i64);
            self.tracked_keys
                .with_label_values(&[kind.as_str()])
                .set(limiter.tracked_keys() as i64);
        }
    }

    pub fn decision_count(&self, kind: LimiterKind, outcome: &str) -> u64 {
        self.decisions
            .with_label_values(&[kind.as_str(), outcome])
            .get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
