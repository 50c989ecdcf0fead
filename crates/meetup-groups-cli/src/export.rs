//! Write exported groups to disk.

use anyhow::{Context, Result};
use meetup_groups::GroupRecord;
use std::path::Path;
use tracing::info;

/// Write groups as pretty-printed JSON, creating parent directories.
pub fn save_groups(path: &Path, groups: &[GroupRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(groups)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write groups: {}", path.display()))?;
    info!(groups = groups.len(), path = %path.display(), "saved groups");
    Ok(())
}
