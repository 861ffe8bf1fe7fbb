//! Writing views to files.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

/// Write `value` as pretty-printed JSON to `path`, replacing the file.
pub fn export_to_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let contents = serde_json::to_string_pretty(value).context("Failed to serialize export")?;
    write(path, &contents)
}

/// Write `text` verbatim to `path`, replacing the file.
pub fn export_to_text(text: &str, path: &Path) -> Result<()> {
    write(path, text)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = contents.len(), "Exported");
    Ok(())
}
