// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Setzwerk.

use thiserror::Error;

/// Top-level error type for all Setzwerk operations.
#[derive(Debug, Error)]
pub enum SetzwerkError {
    // -- Provisioning errors --
    #[error("engine binary '{0}' not found in packaged resources")]
    ResourceMissing(String),

    #[error("engine provisioning failed: {0}")]
    Provisioning(String),

    // -- Launch errors --
    #[error("failed to launch '{binary}': {source}")]
    Launch {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{binary}' exited with code {code}: {diagnostic}")]
    ExitCode {
        binary: String,
        code: i32,
        diagnostic: String,
    },

    #[error("run of '{0}' was cancelled")]
    Cancelled(String),

    #[error("'{binary}' did not exit within {seconds}s")]
    Timeout { binary: String, seconds: u64 },

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SetzwerkError {
    /// Exit code of the wrapped engine, if this error carries one.
    pub fn engine_exit_code(&self) -> Option<i32> {
        match self {
            Self::ExitCode { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SetzwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_message_carries_code_and_diagnostic() {
        let err = SetzwerkError::ExitCode {
            binary: "wkhtmltopdf".into(),
            code: 3,
            diagnostic: "ERROR:\nboom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("code 3"));
        assert!(msg.contains("ERROR:"));
        assert!(msg.contains("boom"));
        assert_eq!(err.engine_exit_code(), Some(3));
    }

    #[test]
    fn launch_error_keeps_os_source() {
        let err = SetzwerkError::Launch {
            binary: "wkhtmltopdf".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.engine_exit_code(), None);
    }
}
