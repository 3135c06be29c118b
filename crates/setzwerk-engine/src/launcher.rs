// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine invocation: spawn the provisioned binary and report failure.
//
// The command line is the resolved binary path followed by the caller's
// arguments verbatim; argument semantics belong to the engine's own
// documentation, not to this wrapper. Stderr is captured through an
// owner-only temp file and folded into the error on non-zero exit; the
// capture file is removed on every exit path.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use setzwerk_core::error::{Result, SetzwerkError};
use setzwerk_core::{EngineConfig, StdoutPolicy};

use crate::provision::BinaryProvisioner;

/// Marker prefixed to captured engine output in error messages.
const ERROR_MARKER: &str = "ERROR:";

/// Runs the provisioned engine binary with caller-supplied arguments.
pub struct BinaryLauncher {
    provisioner: Arc<BinaryProvisioner>,
    config: EngineConfig,
}

enum WaitOutcome {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
}

impl BinaryLauncher {
    pub fn new(provisioner: Arc<BinaryProvisioner>) -> Self {
        Self::with_config(provisioner, EngineConfig::default())
    }

    pub fn with_config(provisioner: Arc<BinaryProvisioner>, config: EngineConfig) -> Self {
        Self {
            provisioner,
            config,
        }
    }

    /// Run the engine with the given arguments and wait for it to exit.
    ///
    /// Blocks the calling task until the engine terminates. Succeeds silently
    /// on exit code zero; otherwise returns an error carrying the literal
    /// exit code and the engine's full stderr output.
    pub async fn run<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<()> {
        self.run_until(args, &CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), but abandons the wait when `cancel` fires.
    ///
    /// On cancellation the child process is killed before `Cancelled` is
    /// returned; a cancelled render never reports success. The child is also
    /// killed if the returned future is dropped mid-flight.
    pub async fn run_until<S: AsRef<OsStr>>(
        &self,
        args: &[S],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let name = self.provisioner.engine_name().to_string();
        let binary = self.provisioner.resolve().await?;

        // tempfile creates this 0600 on Unix: the engine's complaints may
        // quote document content, so nobody but the owning user may read it.
        let capture = tempfile::Builder::new()
            .prefix(&format!("{name}-diag"))
            .suffix(".log")
            .tempfile()?;

        let mut command = self.build_command(&binary, args);
        command.stderr(Stdio::from(capture.reopen()?));

        info!(engine = %name, args = args.len(), "starting engine");
        let mut child = command.spawn().map_err(|e| SetzwerkError::Launch {
            binary: name.clone(),
            source: e,
        })?;

        let outcome = tokio::select! {
            _ = cancel.cancelled() => None,
            res = wait_with_deadline(&mut child, self.config.wait_timeout_secs) => Some(res),
        };

        let status = match outcome {
            None => {
                warn!(engine = %name, "cancelled, killing engine");
                child.kill().await.ok();
                return Err(SetzwerkError::Cancelled(name));
            }
            Some(WaitOutcome::TimedOut) => {
                let seconds = self.config.wait_timeout_secs.unwrap_or_default();
                warn!(engine = %name, seconds, "wait deadline expired, killing engine");
                child.kill().await.ok();
                return Err(SetzwerkError::Timeout {
                    binary: name,
                    seconds,
                });
            }
            Some(WaitOutcome::Exited(res)) => res?,
        };

        if !status.success() {
            let diagnostic = read_diagnostic(capture.path(), &status);
            return Err(SetzwerkError::ExitCode {
                binary: name,
                code: status.code().unwrap_or(-1),
                diagnostic,
            });
        }

        debug!(engine = %name, "engine finished");
        Ok(())
        // `capture` drops here (and on every early return), removing the log.
    }

    fn build_command<S: AsRef<OsStr>>(&self, binary: &Path, args: &[S]) -> Command {
        let mut command = Command::new(binary);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(match self.config.stdout {
                StdoutPolicy::Discard => Stdio::null(),
                StdoutPolicy::Inherit => Stdio::inherit(),
            })
            .kill_on_drop(true);
        command
    }
}

async fn wait_with_deadline(child: &mut Child, limit_secs: Option<u64>) -> WaitOutcome {
    match limit_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), child.wait()).await {
            Ok(res) => WaitOutcome::Exited(res),
            Err(_) => WaitOutcome::TimedOut,
        },
        None => WaitOutcome::Exited(child.wait().await),
    }
}

/// Read the captured stderr and join it under the error marker.
fn read_diagnostic(capture: &Path, status: &ExitStatus) -> String {
    let mut lines = vec![ERROR_MARKER.to_string()];

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            lines.push(format!("terminated by signal {signal}"));
        }
    }
    #[cfg(not(unix))]
    let _ = status;

    match std::fs::read(capture) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            lines.extend(text.lines().map(str::to_string));
        }
        Err(e) => lines.push(format!("(diagnostic capture unreadable: {e})")),
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::EmbeddedBinary;
    use std::time::Instant;

    fn launcher_for(name: &'static str, script: &'static [u8]) -> BinaryLauncher {
        BinaryLauncher::new(Arc::new(BinaryProvisioner::new(EmbeddedBinary::new(
            name, script,
        ))))
    }

    /// Any diagnostic capture files left behind for the given engine name.
    fn leftover_captures(name: &str) -> Vec<std::path::PathBuf> {
        let prefix = format!("{name}-diag");
        std::fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect()
    }

    #[test]
    fn command_line_is_path_plus_args_in_order() {
        let launcher = launcher_for("orderstub", b"#!/bin/sh\nexit 0\n");
        let binary = Path::new("/tmp/engine");
        let args = ["--quiet", "in.html", "out.pdf", "--quiet"];

        let command = launcher.build_command(binary, &args);
        let std_command = command.as_std();
        assert_eq!(std_command.get_program(), binary.as_os_str());
        let got: Vec<_> = std_command.get_args().collect();
        assert_eq!(got, args.map(OsStr::new).to_vec());
    }

    #[tokio::test]
    async fn clean_exit_is_silent_success() {
        let launcher = launcher_for("okstub", b"#!/bin/sh\nexit 0\n");
        launcher.run::<&str>(&[]).await.unwrap();
        assert!(leftover_captures("okstub").is_empty());
    }

    #[tokio::test]
    async fn nonzero_exit_carries_code_and_stderr() {
        let launcher = launcher_for("failstub", b"#!/bin/sh\necho boom >&2\nexit 3\n");
        let err = launcher.run(&["ignored-arg"]).await.unwrap_err();

        match &err {
            SetzwerkError::ExitCode {
                code, diagnostic, ..
            } => {
                assert_eq!(*code, 3);
                assert!(diagnostic.starts_with("ERROR:"));
                assert!(diagnostic.contains("boom"));
            }
            other => panic!("expected ExitCode, got {other:?}"),
        }
        // the capture file must be gone even though the run failed
        assert!(leftover_captures("failstub").is_empty());
    }

    #[tokio::test]
    async fn spawn_failure_is_distinct_from_exit_failure() {
        // A file without the executable bit provisioned via direct path.
        let dir = tempfile::tempdir().unwrap();
        let not_executable = dir.path().join("engine");
        std::fs::write(&not_executable, b"just text").unwrap();

        let launcher = BinaryLauncher::new(Arc::new(BinaryProvisioner::new(
            crate::source::FileBinary::new("textfile", &not_executable),
        )));
        let err = launcher.run::<&str>(&[]).await.unwrap_err();
        assert!(matches!(err, SetzwerkError::Launch { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn concurrent_runs_keep_diagnostics_isolated() {
        // Each invocation echoes its own tag; no capture may bleed into
        // another invocation's error.
        let launcher = Arc::new(launcher_for(
            "parstub",
            b"#!/bin/sh\nsleep 0.2\necho \"tag-$1\" >&2\nexit 3\n",
        ));

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..10 {
            let launcher = Arc::clone(&launcher);
            tasks.spawn(async move {
                let err = launcher.run(&[i.to_string()]).await.unwrap_err();
                (i, err)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (i, err) = joined.unwrap();
            match err {
                SetzwerkError::ExitCode { diagnostic, .. } => {
                    assert!(diagnostic.contains(&format!("tag-{i}")));
                    // exactly one tag line: no cross-talk
                    assert_eq!(diagnostic.matches("tag-").count(), 1);
                }
                other => panic!("expected ExitCode, got {other:?}"),
            }
        }
        assert!(leftover_captures("parstub").is_empty());
    }

    #[tokio::test]
    async fn cancellation_kills_the_engine() {
        let launcher = launcher_for("slowstub", b"#!/bin/sh\nsleep 30\n");
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = launcher.run_until::<&str>(&[], &cancel).await.unwrap_err();
        assert!(matches!(err, SetzwerkError::Cancelled(_)), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn wait_deadline_expiry_reports_timeout() {
        let provisioner = Arc::new(BinaryProvisioner::new(EmbeddedBinary::new(
            "hangstub",
            b"#!/bin/sh\nsleep 30\n",
        )));
        let launcher = BinaryLauncher::with_config(
            provisioner,
            EngineConfig {
                wait_timeout_secs: Some(1),
                ..EngineConfig::default()
            },
        );

        let started = Instant::now();
        let err = launcher.run::<&str>(&[]).await.unwrap_err();
        assert!(
            matches!(err, SetzwerkError::Timeout { seconds: 1, .. }),
            "got {err:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
