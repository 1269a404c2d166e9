// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Advisory input checks used alongside the limiter.
//!
//! - Injection-like pattern scanning over free text
//! - IP literal validation for origin identifiers
//!
//! Scanning is heuristic. False positives are expected; callers use the
//! result to log, challenge or tighten limits, never as the only gate.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Category of a suspicious pattern match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskReason {
    SqlKeyword,
    SqlTautology,
    SqlComment,
    ScriptTag,
    EventHandler,
    JavascriptUri,
    PathTraversal,
    ShellCommand,
}

impl std::fmt::Display for RiskReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SqlKeyword => write!(f, "SQL keyword sequence"),
            Self::SqlTautology => write!(f, "SQL tautology"),
            Self::SqlComment => write!(f, "SQL comment sequence"),
            Self::ScriptTag => write!(f, "Script tag"),
            Self::EventHandler => write!(f, "Inline event handler"),
            Self::JavascriptUri => write!(f, "javascript: URI"),
            Self::PathTraversal => write!(f, "Path traversal sequence"),
            Self::ShellCommand => write!(f, "Shell metacharacter sequence"),
        }
    }
}

/// Result of scanning one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputRisk {
    pub suspicious: bool,
    pub reasons: Vec<RiskReason>,
}

static RISK_PATTERNS: Lazy<Vec<(RiskReason, Regex)>> = Lazy::new(|| {
    [
        (
            RiskReason::SqlKeyword,
            r"(?i)\b(union\s+(all\s+)?select|select\s+[\w*,\s]+\s+from|insert\s+into|delete\s+from|drop\s+(table|database)|truncate\s+table|exec(ute)?\s*\()",
        ),
        (
            RiskReason::SqlTautology,
            r#"(?i)['"]\s*(or|and)\s+['"]?\w+['"]?\s*=\s*['"]?\w+"#,
        ),
        (RiskReason::SqlComment, r"(--(\s|$)|/\*|\*/)"),
        (RiskReason::ScriptTag, r"(?i)<\s*/?\s*script\b"),
        (RiskReason::EventHandler, r"(?i)<[^>]*\bon[a-z]+\s*="),
        (RiskReason::JavascriptUri, r"(?i)javascript\s*:"),
        (
            RiskReason::PathTraversal,
            r"(?i)(\.\./|\.\.\\|%2e%2e(%2f|%5c|/|\\))",
        ),
        (
            RiskReason::ShellCommand,
            r"(`|\$\(|&&|\|\||[;|&]\s*(rm|cat|curl|wget|sh|bash|nc|chmod|python|perl)\b)",
        ),
    ]
    .into_iter()
    .map(|(reason, pattern)| {
        (
            reason,
            Regex::new(pattern).expect("Failed to compile risk pattern"),
        )
    })
    .collect()
});

static IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)$")
        .expect("Failed to compile IPv4 pattern")
});

static IPV6: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9a-fA-F]{0,4}:){2,7}[0-9a-fA-F]{0,4}$").expect("Failed to compile IPv6 pattern")
});

/// Scan free text for injection-like sequences.
pub fn scan_input(input: &str) -> InputRisk {
    let reasons: Vec<RiskReason> = RISK_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(input))
        .map(|(reason, _)| *reason)
        .collect();

    if !reasons.is_empty() {
        debug!(?reasons, len = input.len(), "Suspicious input patterns matched");
    }

    InputRisk {
        suspicious: !reasons.is_empty(),
        reasons,
    }
}

/// Accept IPv4 dotted quads and anything made of IPv6 hex groups and colons.
pub fn is_valid_ip(candidate: &str) -> bool {
    IPV4.is_match(candidate) || IPV6.is_match(candidate)
}
