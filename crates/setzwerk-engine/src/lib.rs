// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Setzwerk engine — materialise a bundled PDF engine on disk and run it.
//
// Two pieces, composed sequentially: the provisioner guarantees a runnable
// copy of the engine exists on the filesystem (extracting it from packaged
// bytes on first use), and the launcher turns one invocation of that binary
// into either silent success or a structured error carrying the engine's
// own complaint.

pub mod launcher;
pub mod provision;
pub mod source;

pub use launcher::BinaryLauncher;
pub use provision::BinaryProvisioner;
pub use source::{BinarySource, EmbeddedBinary, FileBinary};
