// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operator-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion,
// so an operator can act on a failed render without reading source code.

use crate::error::SetzwerkError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// External interference (temp cleanup, cancellation); re-running may work.
    Transient,
    /// The operator must change something (permissions, arguments, packaging).
    ActionRequired,
    /// Cannot be fixed by re-running with the same inputs.
    Permanent,
}

/// A plain-language account of a failure with an actionable suggestion.
#[derive(Debug, Clone)]
pub struct Diagnosis {
    /// Plain English summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Whether simply re-running the invocation can succeed.
    pub retriable: bool,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `SetzwerkError` into a `Diagnosis` an operator can act on.
pub fn diagnose(err: &SetzwerkError) -> Diagnosis {
    match err {
        SetzwerkError::ResourceMissing(name) => Diagnosis {
            message: format!("The bundled engine '{name}' is missing from this build."),
            suggestion: "Reinstall the application, or point SETZWERK_ENGINE at an \
                         engine binary on disk."
                .into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SetzwerkError::Provisioning(detail) => Diagnosis {
            message: "The engine could not be unpacked to a temporary file.".into(),
            suggestion: format!(
                "Check free space and write permission on the temp directory. Detail: {detail}"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SetzwerkError::Launch { binary, source } => Diagnosis {
            message: format!("The engine '{binary}' could not be started."),
            suggestion: format!(
                "Verify the file exists and is executable for this user. OS said: {source}"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SetzwerkError::ExitCode { binary, code, .. } => Diagnosis {
            message: format!("'{binary}' ran but reported failure (exit code {code})."),
            suggestion: "The full engine error output is included in the error message; \
                         check the input document and arguments."
                .into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        SetzwerkError::Cancelled(binary) => Diagnosis {
            message: format!("The run of '{binary}' was cancelled before it finished."),
            suggestion: "Run it again if the cancellation was not intended.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SetzwerkError::Timeout { binary, seconds } => Diagnosis {
            message: format!("'{binary}' was still running after {seconds}s and was stopped."),
            suggestion: "Raise wait_timeout_secs, or check whether the input makes the \
                         engine hang."
                .into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SetzwerkError::Io(e) => Diagnosis {
            message: "A file operation failed.".into(),
            suggestion: format!("Check disk space and permissions. OS said: {e}"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SetzwerkError::Serialization(e) => Diagnosis {
            message: "The configuration file could not be read or written.".into(),
            suggestion: format!("Fix or delete the config file and retry. Detail: {e}"),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
