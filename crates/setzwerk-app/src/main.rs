// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Setzwerk — command-line front end for the bundled PDF engine.
//
// Entry point. Initialises logging, provisions the engine binary, and runs
// it with the trailing arguments verbatim. Ctrl-C cancels the run and kills
// the engine.

mod config_store;
mod data_dir;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use setzwerk_core::diagnose::diagnose;
use setzwerk_core::error::SetzwerkError;
use setzwerk_core::{EngineConfig, StdoutPolicy};
use setzwerk_engine::{BinaryLauncher, BinaryProvisioner, FileBinary};

/// Run a PDF engine binary with captured diagnostics.
#[derive(Debug, Parser)]
#[command(name = "setzwerk", version, about)]
struct Cli {
    /// Path to the engine binary (defaults to $SETZWERK_ENGINE).
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Kill the engine if it runs longer than this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Show the engine's stdout instead of discarding it.
    #[arg(long)]
    show_stdout: bool,

    /// Persist the resulting settings as the new defaults.
    #[arg(long)]
    save_config: bool,

    /// Arguments passed to the engine verbatim; see the engine's own
    /// documentation for what it accepts.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<OsString>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = data_dir::data_dir();

    // Load persisted config or use defaults, then apply one-shot overrides
    let mut config = config_store::load_config(&data_dir).unwrap_or_default();
    if let Some(secs) = cli.timeout {
        config.wait_timeout_secs = Some(secs);
    }
    if cli.show_stdout {
        config.stdout = StdoutPolicy::Inherit;
    }

    if cli.save_config {
        if let Err(e) = config_store::persist_config(&data_dir, &config) {
            tracing::warn!(error = %e, "could not persist config");
        }
    }

    let engine_path = match cli
        .engine
        .or_else(|| std::env::var_os("SETZWERK_ENGINE").map(PathBuf::from))
    {
        Some(path) => path,
        None => {
            eprintln!("no engine binary: pass --engine or set SETZWERK_ENGINE");
            return ExitCode::FAILURE;
        }
    };
    let engine_name = engine_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "engine".to_string());

    let provisioner = Arc::new(BinaryProvisioner::new(FileBinary::new(
        engine_name,
        &engine_path,
    )));
    let launcher = BinaryLauncher::with_config(provisioner, config);

    // Ctrl-C cancels the run and kills the engine
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    match launcher.run_until(&cli.args, &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let diagnosis = diagnose(&err);
            eprintln!("{}", diagnosis.message);
            eprintln!("{}", diagnosis.suggestion);
            tracing::error!(error = %err, "engine run failed");

            match err {
                SetzwerkError::ExitCode { code, .. } => ExitCode::from(code.clamp(1, 255) as u8),
                SetzwerkError::Cancelled(_) => ExitCode::from(130),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
