// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON persistence for the engine configuration.

use std::path::Path;

use setzwerk_core::error::Result;
use setzwerk_core::EngineConfig;

const CONFIG_FILE: &str = "config.json";

/// Load the persisted config, or `None` if absent or unreadable.
pub fn load_config(data_dir: &Path) -> Option<EngineConfig> {
    let data = std::fs::read_to_string(data_dir.join(CONFIG_FILE)).ok()?;
    serde_json::from_str(&data).ok()
}

/// Persist the config as pretty JSON.
pub fn persist_config(data_dir: &Path, config: &EngineConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(data_dir.join(CONFIG_FILE), json)?;
    Ok(())
}
