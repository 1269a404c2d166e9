// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! The four limiter categories, built once at startup.
//!
//! Categories never share counters or suspicious lists: hammering the upload
//! path does not lock the same origin out of authentication.

use crate::clock::{Clock, SystemClock};
use crate::config::{LimiterConfigs, RateLimitConfig};
use crate::error::{Result, ThrottleError};
use crate::limiter::RateLimiter;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Operation category guarded by its own limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimiterKind {
    Auth,
    Api,
    Upload,
    Sensitive,
}

impl LimiterKind {
    pub const ALL: [LimiterKind; 4] = [Self::Auth, Self::Api, Self::Upload, Self::Sensitive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Api => "api",
            Self::Upload => "upload",
            Self::Sensitive => "sensitive",
        }
    }
}

impl std::fmt::Display for LimiterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LimiterKind {
    type Err = ThrottleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auth" => Ok(Self::Auth),
            "api" => Ok(Self::Api),
            "upload" => Ok(Self::Upload),
            "sensitive" => Ok(Self::Sensitive),
            _ => Err(ThrottleError::UnknownLimiter(s.to_string())),
        }
    }
}

/// One limiter per [`LimiterKind`].
pub struct LimiterRegistry {
    auth: RateLimiter,
    api: RateLimiter,
    upload: RateLimiter,
    sensitive: RateLimiter,
}

impl LimiterRegistry {
    /// Validate `configs` and build in-memory limiters on the system clock.
    pub fn new(configs: LimiterConfigs) -> Result<Self> {
        Self::with_clock(configs, Arc::new(SystemClock))
    }

    /// As [`LimiterRegistry::new`], with every limiter reading time from `clock`.
    pub fn with_clock(configs: LimiterConfigs, clock: Arc<dyn Clock>) -> Result<Self> {
        configs.validate()?;

        let build = |kind: LimiterKind, config: RateLimitConfig| {
            RateLimiter::named(kind.as_str(), config).with_clock(clock.clone())
        };

        Ok(Self {
            auth: build(LimiterKind::Auth, configs.auth),
            api: build(LimiterKind::Api, configs.api),
            upload: build(LimiterKind::Upload, configs.upload),
            sensitive: build(LimiterKind::Sensitive, configs.sensitive),
        })
    }

    pub fn get(&self, kind: LimiterKind) -> &RateLimiter {
        match kind {
            LimiterKind::Auth => &self.auth,
            LimiterKind::Api => &self.api,
            LimiterKind::Upload => &self.upload,
            LimiterKind::Sensitive => &self.sensitive,
        }
    }

    pub fn auth(&self) -> &RateLimiter {
        &self.auth
    }

    pub fn api(&self) -> &RateLimiter {
        &self.api
    }

    pub fn upload(&self) -> &RateLimiter {
        &self.upload
    }

    pub fn sensitive(&self) -> &RateLimiter {
        &self.sensitive
    }

    /// All limiters with their kind.
    pub fn iter(&self) -> impl Iterator<Item = (LimiterKind, &RateLimiter)> {
        LimiterKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    /// Run cleanup on every limiter. Returns total records removed.
    pub fn cleanup_all(&self) -> usize {
        let removed: usize = self
            .iter()
            .map(|(_, limiter)| limiter.cleanup())
            .sum();
        debug!(removed, "Swept all limiters");
        removed
    }
}
