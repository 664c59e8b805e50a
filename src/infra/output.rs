use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::domain::models::Episode;

/// Writes the episode list as pretty-printed JSON, replacing `path`.
///
/// The data goes to a temporary file next to `path` first, so a failed write
/// leaves any previous output untouched.
pub fn write_episodes(path: &Path, episodes: &[Episode]) -> Result<()> {
    let content = serde_json::to_string_pretty(episodes).context("Failed to serialize episodes")?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // Create parent directory if it doesn't exist
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create directory {}", directory.display()))?;

    let mut file = NamedTempFile::new_in(directory)
        .with_context(|| format!("Failed to create temporary file in {}", directory.display()))?;
    file.write_all(content.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
pub fn read_episodes(path: &Path) -> Result<Vec<Episode>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let episodes = serde_json::from_str(&content)
        .with_context(|| format!("Invalid episode file {}", path.display()))?;
    Ok(episodes)
}
