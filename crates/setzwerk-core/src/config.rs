// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use serde::{Deserialize, Serialize};

/// Where the wrapped engine's standard output goes.
///
/// The engine writes its result to files named on the command line, so its
/// stdout carries progress chatter at most. Discarding it is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StdoutPolicy {
    /// Redirect to the null sink.
    Discard,
    /// Let the engine share this process's stdout.
    Inherit,
}

/// Settings for engine invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Standard-output policy for the child process.
    pub stdout: StdoutPolicy,
    /// Maximum seconds to wait for the engine before killing it.
    /// `None` (the default) waits indefinitely.
    pub wait_timeout_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stdout: StdoutPolicy::Discard,
            wait_timeout_secs: None,
        }
    }
}
