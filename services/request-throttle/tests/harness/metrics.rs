// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for attack simulation results.

use request_throttle::limiter::{BlockReason, Decision};
use std::collections::{HashMap, HashSet};

/// Collects metrics during attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Count of attempts by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Identifiers that got at least one attempt through
    compromised_identifiers: HashSet<String>,
    /// Origins seen during the attack
    origins: HashSet<String>,
    /// Index of the first attempt that was not allowed
    first_block_at: Option<usize>,
}

/// Possible outcomes for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    Challenged,
    NewBlock,
    AlreadyBlocked,
    SuspiciousOrigin,
}

impl Outcome {
    pub fn from_decision(decision: &Decision) -> Self {
        match decision.block_reason {
            None if decision.requires_challenge => Outcome::Challenged,
            None => Outcome::Allowed,
            Some(BlockReason::LimitExceeded { .. }) => Outcome::NewBlock,
            Some(BlockReason::RateLimited) => Outcome::AlreadyBlocked,
            Some(BlockReason::SuspiciousOrigin) => Outcome::SuspiciousOrigin,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Outcome::Allowed | Outcome::Challenged)
    }
}

impl AttackMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt outcome.
    pub fn record(&mut self, index: usize, decision: &Decision, identifier: &str, origin: Option<&str>) {
        let outcome = Outcome::from_decision(decision);
        *self.outcomes.entry(outcome).or_insert(0) += 1;

        if outcome.is_allowed() {
            self.compromised_identifiers.insert(identifier.to_string());
        } else if self.first_block_at.is_none() {
            self.first_block_at = Some(index);
        }
        if let Some(o) = origin {
            self.origins.insert(o.to_string());
        }
    }

    /// Get total attempt count.
    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Attempts that were let through, challenged or not.
    pub fn allowed(&self) -> usize {
        self.count(Outcome::Allowed) + self.count(Outcome::Challenged)
    }

    /// Get block rate (ratio of rejected to total).
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (total - self.allowed()) as f64 / total as f64
    }

    pub fn first_block_at(&self) -> Option<usize> {
        self.first_block_at
    }

    pub fn unique_origins(&self) -> usize {
        self.origins.len()
    }

    pub fn identifiers_reached(&self) -> usize {
        self.compromised_identifiers.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            allowed: self.count(Outcome::Allowed),
            challenged: self.count(Outcome::Challenged),
            new_blocks: self.count(Outcome::NewBlock),
            already_blocked: self.count(Outcome::AlreadyBlocked),
            suspicious_origin: self.count(Outcome::SuspiciousOrigin),
            block_rate: self.block_rate(),
            unique_origins: self.unique_origins(),
            identifiers_reached: self.identifiers_reached(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub allowed: usize,
    pub challenged: usize,
    pub new_blocks: usize,
    pub already_blocked: usize,
    pub suspicious_origin: usize,
    pub block_rate: f64,
    pub unique_origins: usize,
    pub identifiers_reached: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Total Attempts:    {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Allowed:           {}", self.allowed)?;
        writeln!(f, "Challenged:        {}", self.challenged)?;
        writeln!(f, "New Blocks:        {}", self.new_blocks)?;
        writeln!(f, "Already Blocked:   {}", self.already_blocked)?;
        writeln!(f, "Suspicious Origin: {}", self.suspicious_origin)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f)?;
        writeln!(f, "--- Distribution ---")?;
        writeln!(f, "Unique Origins:    {}", self.unique_origins)?;
        writeln!(f, "Accounts Reached:  {}", self.identifiers_reached)?;
        Ok(())
    }
}
