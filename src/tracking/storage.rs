//! JSON persistence for scalar histories

use std::fs;
use std::path::Path;

use super::ScalarHistory;
use crate::error::{Error, Result};

/// Write a history as pretty JSON, creating parent directories as needed
pub fn write_json(history: &ScalarHistory, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io_path("creating", parent, e))?;
    }
    let json = serde_json::to_string_pretty(history)?;
    fs::write(path, json).map_err(|e| Error::io_path("writing", path, e))
}

/// Read a history written by [`write_json`]
pub fn read_json(path: &Path) -> Result<ScalarHistory> {
    let json = fs::read_to_string(path).map_err(|e| Error::io_path("reading", path, e))?;
    Ok(serde_json::from_str(&json)?)
}
