// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request Throttle
//!
//! Abuse-resistant attempt limiting for sensitive operations:
//!
//! - Windowed attempt counting per `identifier:origin` key
//! - Progressive, capped blocking for repeat offenders
//! - Origin-wide blocking once an origin crosses 3x the limit
//! - Advisory challenge (CAPTCHA) signal past 70% of the limit
//! - Four isolated categories: auth, api, upload, sensitive
//! - Periodic sweeping of expired records
//!
//! Auxiliary helpers cover injection-pattern scanning, IP literal checks and
//! secure token generation.

pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod registry;
pub mod store;
pub mod sweeper;
pub mod token;
pub mod validator;

pub use config::{Config, LimiterConfigs, RateLimitConfig};
pub use error::{Result, ThrottleError};
pub use limiter::{BlockReason, Decision, RateLimiter};
pub use registry::{LimiterKind, LimiterRegistry};
pub use store::{MemoryStore, RateLimitRecord, RecordStore};
pub use sweeper::Sweeper;
pub use validator::{is_valid_ip, scan_input, InputRisk, RiskReason};
