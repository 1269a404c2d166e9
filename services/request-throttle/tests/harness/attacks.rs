// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Attack simulation patterns for security testing.

use request_throttle::registry::LimiterKind;

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Limiter category under attack
    pub kind: LimiterKind,
    /// Total number of attempts to send
    pub total_requests: usize,
    /// Simulated milliseconds between attempts
    pub interval_ms: u64,
    /// Number of unique origins to rotate through
    pub unique_origins: usize,
    /// Number of unique identifiers to rotate through
    pub unique_identifiers: usize,
    /// Whether the attacker omits its origin
    pub hide_origin: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            kind: LimiterKind::Auth,
            total_requests: 100,
            interval_ms: 100,
            unique_origins: 1,
            unique_identifiers: 1,
            hide_origin: false,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Password guessing against one account from one origin.
    pub fn brute_force() -> Self {
        Self {
            total_requests: 200,
            interval_ms: 50,
            ..Default::default()
        }
    }

    /// Guessing that waits out each block, pushing one key past 3x the limit.
    ///
    /// Needs a limiter whose block is shorter than its window; with the
    /// default presets the window lapses first and the count starts over.
    pub fn persistent_brute_force() -> Self {
        Self {
            total_requests: 40,
            interval_ms: 1_000,
            ..Default::default()
        }
    }

    /// One origin trying many accounts (credential stuffing).
    pub fn credential_stuffing() -> Self {
        Self {
            total_requests: 600,
            interval_ms: 20,
            unique_identifiers: 100,
            ..Default::default()
        }
    }

    /// Many origins, one account each, low rate.
    pub fn distributed_attack() -> Self {
        Self {
            total_requests: 500,
            interval_ms: 20,
            unique_origins: 100,
            unique_identifiers: 1,
            ..Default::default()
        }
    }

    /// Same account, origin rotated on every attempt.
    pub fn origin_rotation() -> Self {
        Self {
            total_requests: 300,
            interval_ms: 10,
            unique_origins: 300,
            ..Default::default()
        }
    }

    /// Attacker strips its origin, so every attempt lands on the `unknown` key.
    pub fn anonymous_flood() -> Self {
        Self {
            kind: LimiterKind::Api,
            total_requests: 1_000,
            interval_ms: 10,
            hide_origin: true,
            ..Default::default()
        }
    }

    /// Legitimate user well under the limit.
    pub fn slow_drip() -> Self {
        Self {
            kind: LimiterKind::Api,
            total_requests: 100,
            // 1 attempt per second = 60/min, under the 100/min API limit
            interval_ms: 1_000,
            ..Default::default()
        }
    }

    /// Simulated duration of the attack in milliseconds.
    pub fn expected_duration_ms(&self) -> u64 {
        self.total_requests as u64 * self.interval_ms
    }
}
