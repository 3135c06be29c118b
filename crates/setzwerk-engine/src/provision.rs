// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binary provisioning: guarantee a runnable copy of the engine on disk.
//
// The resolved location is cached and shared, so the extraction cost is paid
// once per process. Temp cleaners are allowed to sweep the extracted file at
// any time; every resolve re-checks existence and transparently extracts
// again instead of failing.

use std::io;
use std::path::PathBuf;

use tempfile::TempPath;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use setzwerk_core::error::{Result, SetzwerkError};

use crate::source::BinarySource;

/// A resolved engine location.
enum Provisioned {
    /// The packaging already exposes the binary on disk; used as-is.
    Direct(PathBuf),
    /// Extracted to a temp file. Holding the `TempPath` removes the file
    /// when the provisioner is dropped (best-effort, like the rest of temp
    /// cleanup).
    Extracted(TempPath),
}

impl Provisioned {
    fn path(&self) -> &std::path::Path {
        match self {
            Self::Direct(p) => p,
            Self::Extracted(t) => t,
        }
    }
}

/// Materialises the packaged engine binary on the filesystem and caches the
/// location. Construct once at startup and share via `Arc`.
pub struct BinaryProvisioner {
    source: Box<dyn BinarySource>,
    cached: Mutex<Option<Provisioned>>,
}

impl BinaryProvisioner {
    pub fn new(source: impl BinarySource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cached: Mutex::new(None),
        }
    }

    /// Logical name of the engine this provisioner serves.
    pub fn engine_name(&self) -> &str {
        self.source.name()
    }

    /// Return a filesystem path holding a runnable copy of the engine.
    ///
    /// Idempotent: repeated calls return the cached path without re-copying.
    /// If the file behind the cached path has been deleted externally, the
    /// engine is extracted again at a fresh path.
    pub async fn resolve(&self) -> Result<PathBuf> {
        let mut cached = self.cached.lock().await;

        if let Some(provisioned) = cached.as_ref() {
            if provisioned.path().exists() {
                debug!(path = %provisioned.path().display(), "engine already provisioned");
                return Ok(provisioned.path().to_path_buf());
            }
            // it probably got swept from tmp; extract again instead of failing
            warn!(
                engine = self.source.name(),
                path = %provisioned.path().display(),
                "provisioned engine vanished, re-provisioning"
            );
        }

        let provisioned = self.provision()?;
        let path = provisioned.path().to_path_buf();
        *cached = Some(provisioned);
        Ok(path)
    }

    fn provision(&self) -> Result<Provisioned> {
        if let Some(path) = self.source.direct_path() {
            if path.exists() {
                debug!(path = %path.display(), "engine available directly, no extraction");
                return Ok(Provisioned::Direct(path));
            }
        }

        let bytes = self.source.bytes()?;
        let name = self.source.name();

        let mut file = tempfile::Builder::new()
            .prefix(name)
            .suffix(".bin")
            .tempfile()
            .map_err(|e| {
                SetzwerkError::Provisioning(format!("cannot create temp file for '{name}': {e}"))
            })?;

        io::copy(&mut bytes.as_ref(), file.as_file_mut()).map_err(|e| {
            SetzwerkError::Provisioning(format!("cannot write engine '{name}' to temp file: {e}"))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o700))
                .map_err(|e| {
                    SetzwerkError::Provisioning(format!(
                        "cannot mark engine '{name}' executable: {e}"
                    ))
                })?;
        }

        let temp_path = file.into_temp_path();
        info!(
            engine = name,
            path = %temp_path.display(),
            bytes = bytes.len(),
            "engine extracted to temp file"
        );
        Ok(Provisioned::Extracted(temp_path))
    }
}
