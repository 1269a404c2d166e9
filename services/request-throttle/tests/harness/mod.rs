// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for request throttle attack simulation.
//!
//! This module provides utilities for simulating abuse patterns against the
//! limiter registry to validate its blocking and flagging behaviour.

#![allow(dead_code)]

pub mod attacks;
pub mod generators;
pub mod metrics;
