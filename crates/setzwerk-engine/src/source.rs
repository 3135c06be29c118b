// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Where the engine binary comes from.
//
// Packaging is an external collaborator: some builds compile the engine into
// the executable (`include_bytes!`), some ship it as a file next to the
// application. The provisioner only cares about a logical name, an optional
// direct filesystem location, and the raw bytes.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use setzwerk_core::error::{Result, SetzwerkError};

/// A packaged engine binary, addressed by a fixed logical name.
pub trait BinarySource: Send + Sync {
    /// Logical name of the engine (used in temp-file prefixes and errors).
    fn name(&self) -> &str;

    /// Filesystem location of the binary, if the packaging already provides
    /// one. When this path exists on disk, no extraction is needed.
    fn direct_path(&self) -> Option<PathBuf> {
        None
    }

    /// Raw bytes of the executable.
    fn bytes(&self) -> Result<Cow<'_, [u8]>>;
}

/// An engine compiled into the application via `include_bytes!`.
pub struct EmbeddedBinary {
    name: &'static str,
    bytes: &'static [u8],
}

impl EmbeddedBinary {
    pub const fn new(name: &'static str, bytes: &'static [u8]) -> Self {
        Self { name, bytes }
    }
}

impl BinarySource for EmbeddedBinary {
    fn name(&self) -> &str {
        self.name
    }

    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        if self.bytes.is_empty() {
            return Err(SetzwerkError::ResourceMissing(self.name.to_string()));
        }
        Ok(Cow::Borrowed(self.bytes))
    }
}

/// An engine shipped as a plain file on disk.
pub struct FileBinary {
    name: String,
    path: PathBuf,
}

impl FileBinary {
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl BinarySource for FileBinary {
    fn name(&self) -> &str {
        &self.name
    }

    fn direct_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        let data = std::fs::read(&self.path)
            .map_err(|_| SetzwerkError::ResourceMissing(self.name.clone()))?;
        Ok(Cow::Owned(data))
    }
}
