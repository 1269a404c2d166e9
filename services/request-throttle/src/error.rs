// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the request throttle.

use thiserror::Error;

/// Throttle error types.
///
/// None of these come from the limiting algorithm itself; every record state
/// has a defined decision. Errors only arise at the boundary (caller contract
/// violations) and at startup (configuration, entropy source).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ThrottleError {
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// `section` names the limiter kind or `sweeper`
    #[error("invalid configuration for {section}: {reason}")]
    InvalidConfig { section: String, reason: String },

    #[error("unknown limiter: {0}")]
    UnknownLimiter(String),

    #[error("secure random source unavailable: {0}")]
    RandomSourceUnavailable(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ThrottleError>;
