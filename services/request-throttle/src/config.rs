// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the request throttle.
//!
//! Each operation category gets its own immutable [`RateLimitConfig`]. The
//! defaults below are the production starting points; all of them can be
//! overridden at startup and none of them change at runtime.

use crate::error::{Result, ThrottleError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MINUTE_MS: u64 = 60 * 1000;

/// Configuration for the request throttle service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Per-category limiter configuration
    #[serde(default)]
    pub limiters: LimiterConfigs,

    /// Interval between cleanup sweeps in seconds (default: 300)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Parameters for one limiter instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Length of the attempt-counting window in milliseconds
    pub window_ms: u64,

    /// Attempts allowed within one window
    pub max_attempts: u32,

    /// Base block duration once the threshold is exceeded, in milliseconds
    pub block_duration_ms: u64,

    /// Factor applied to successive blocks for repeat offenders (default: 1)
    #[serde(default = "default_progressive_multiplier")]
    pub progressive_multiplier: f64,

    /// Ceiling for any escalated block, in milliseconds (default: 24 hours)
    #[serde(default = "default_max_block_duration_ms")]
    pub max_block_duration_ms: u64,
}

/// The four independently configured limiter categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimiterConfigs {
    #[serde(default = "RateLimitConfig::auth")]
    pub auth: RateLimitConfig,

    #[serde(default = "RateLimitConfig::api")]
    pub api: RateLimitConfig,

    #[serde(default = "RateLimitConfig::upload")]
    pub upload: RateLimitConfig,

    #[serde(default = "RateLimitConfig::sensitive")]
    pub sensitive: RateLimitConfig,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_progressive_multiplier() -> f64 {
    1.0
}

fn default_max_block_duration_ms() -> u64 {
    24 * 60 * MINUTE_MS
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            limiters: LimiterConfigs::default(),
            sweep_interval_secs: default_sweep_interval_secs(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for LimiterConfigs {
    fn default() -> Self {
        Self {
            auth: RateLimitConfig::auth(),
            api: RateLimitConfig::api(),
            upload: RateLimitConfig::upload(),
            sensitive: RateLimitConfig::sensitive(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Flat-block configuration (multiplier 1, default ceiling).
    pub fn new(window_ms: u64, max_attempts: u32, block_duration_ms: u64) -> Self {
        Self {
            window_ms,
            max_attempts,
            block_duration_ms,
            progressive_multiplier: default_progressive_multiplier(),
            max_block_duration_ms: default_max_block_duration_ms(),
        }
    }

    pub fn with_progressive_multiplier(mut self, multiplier: f64) -> Self {
        self.progressive_multiplier = multiplier;
        self
    }

    pub fn with_max_block_duration_ms(mut self, ms: u64) -> Self {
        self.max_block_duration_ms = ms;
        self
    }

    /// Login and credential attempts: 5 per 15 minutes, 30 minute block, doubling.
    pub fn auth() -> Self {
        Self::new(15 * MINUTE_MS, 5, 30 * MINUTE_MS).with_progressive_multiplier(2.0)
    }

    /// General API traffic: 100 per minute, 5 minute flat block.
    pub fn api() -> Self {
        Self::new(MINUTE_MS, 100, 5 * MINUTE_MS)
    }

    /// File uploads: 10 per minute, 10 minute flat block.
    pub fn upload() -> Self {
        Self::new(MINUTE_MS, 10, 10 * MINUTE_MS)
    }

    /// High-sensitivity actions: 5 per minute, 60 minute block, tripling.
    pub fn sensitive() -> Self {
        Self::new(MINUTE_MS, 5, 60 * MINUTE_MS).with_progressive_multiplier(3.0)
    }

    /// Get the counting window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Get the base block duration
    pub fn block_duration(&self) -> Duration {
        Duration::from_millis(self.block_duration_ms)
    }

    /// Attempt count above which callers are asked for a challenge (70%, floored).
    pub fn challenge_threshold(&self) -> u32 {
        (u64::from(self.max_attempts) * 7 / 10) as u32
    }

    /// Attempt count above which the origin is flagged as suspicious.
    pub fn suspicious_threshold(&self) -> u32 {
        self.max_attempts.saturating_mul(3)
    }

    /// Reject configurations the limiter cannot honour.
    pub fn validate(&self, limiter: &str) -> Result<()> {
        let invalid = |reason: &str| -> Result<()> {
            Err(ThrottleError::InvalidConfig {
                section: limiter.to_string(),
                reason: reason.to_string(),
            })
        };

        if self.max_attempts == 0 {
            return invalid("max_attempts must be greater than zero");
        }
        if self.window_ms == 0 {
            return invalid("window_ms must be greater than zero");
        }
        if !self.progressive_multiplier.is_finite() || self.progressive_multiplier < 1.0 {
            return invalid("progressive_multiplier must be a finite value >= 1");
        }
        if self.max_block_duration_ms < self.block_duration_ms {
            return invalid("max_block_duration_ms must not be below block_duration_ms");
        }
        Ok(())
    }
}

impl LimiterConfigs {
    pub fn validate(&self) -> Result<()> {
        self.auth.validate("auth")?;
        self.api.validate("api")?;
        self.upload.validate("upload")?;
        self.sensitive.validate("sensitive")
    }
}

impl Config {
    /// Get the sweep interval duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validate every limiter and the sweep interval.
    pub fn validate(&self) -> Result<()> {
        self.limiters.validate()?;
        if self.sweep_interval_secs == 0 {
            return Err(ThrottleError::InvalidConfig {
                section: "sweeper".to_string(),
                reason: "sweep_interval_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
