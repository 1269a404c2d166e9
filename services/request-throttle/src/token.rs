// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Secure random tokens for challenge and reset flows.
//!
//! Tokens are drawn from the OS CSPRNG. If that source fails the error is
//! returned to the caller; there is no fallback to a weaker generator.

use crate::error::{Result, ThrottleError};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// Alphabet tokens are drawn from.
pub const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default token length in characters.
pub const DEFAULT_TOKEN_LENGTH: usize = 32;

// Largest multiple of the alphabet size that fits in a byte (62 * 4 = 248).
// Bytes at or above it are discarded so every character is equally likely.
const ACCEPT_BELOW: u8 = (256 - 256 % TOKEN_ALPHABET.len()) as u8;

/// Generate an alphanumeric token of `length` characters from the OS CSPRNG.
pub fn generate_token(length: usize) -> Result<String> {
    generate_token_with(&mut OsRng, length)
}

/// Generate a token from a caller-supplied cryptographic RNG.
pub fn generate_token_with<R: RngCore + CryptoRng>(rng: &mut R, length: usize) -> Result<String> {
    let mut token = String::with_capacity(length);
    let mut buf = [0u8; 64];

    while token.len() < length {
        rng.try_fill_bytes(&mut buf)
            .map_err(|e| ThrottleError::RandomSourceUnavailable(e.to_string()))?;

        for &byte in buf.iter().filter(|&&b| b < ACCEPT_BELOW) {
            if token.len() == length {
                break;
            }
            token.push(TOKEN_ALPHABET[usize::from(byte) % TOKEN_ALPHABET.len()] as char);
        }
    }

    Ok(token)
}
