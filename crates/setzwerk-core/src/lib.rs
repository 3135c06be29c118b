// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Setzwerk — Core types and error definitions shared across all crates.

pub mod config;
pub mod diagnose;
pub mod error;

pub use config::{EngineConfig, StdoutPolicy};
pub use error::SetzwerkError;
