//! Loading exclude patterns from ignore files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::app::patterns;

pub const GITIGNORE: &str = ".gitignore";
pub const PROMPTPACK_IGNORE: &str = ".promptpackignore";
/// Always excluded so the tool never bundles itself.
pub const SENTINEL_PATTERN: &str = "promptpack";

/// Read ignore patterns from `path`. A missing file yields no patterns.
///
/// Contents are decoded lossily; invalid UTF-8 never fails the run.
pub fn load_patterns(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let contents = String::from_utf8_lossy(&bytes);
    Ok(contents
        .lines()
        .filter_map(normalize_line)
        .map(str::to_owned)
        .collect())
}

fn normalize_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let stripped = trimmed
        .strip_prefix('/')
        .or_else(|| trimmed.strip_prefix('\\'))
        .unwrap_or(trimmed);
    (!stripped.is_empty()).then_some(stripped)
}

/// Append the patterns of `fragment` that are not yet present.
pub fn merge_patterns(accumulated: &mut Vec<String>, fragment: impl IntoIterator<Item = String>) {
    for pattern in fragment {
        if !accumulated.contains(&pattern) {
            accumulated.push(pattern);
        }
    }
}

/// Build the full exclude list: built-ins, `.gitignore`, `.promptpackignore`, then the sentinel.
///
/// Every pattern is validated as it is merged so errors name the file it came from.
pub fn load_exclude_patterns(builtin: &[String], ignore_dir: &Path) -> Result<Vec<String>> {
    let mut accumulated = Vec::new();
    for pattern in builtin {
        patterns::validate(pattern, "built-in ignore patterns")?;
    }
    merge_patterns(&mut accumulated, builtin.iter().cloned());

    for name in [GITIGNORE, PROMPTPACK_IGNORE] {
        let path = ignore_dir.join(name);
        let fragment = load_patterns(&path)?;
        let origin = path.display().to_string();
        for pattern in &fragment {
            patterns::validate(pattern, &origin)?;
        }
        tracing::debug!(file = %origin, count = fragment.len(), "loaded ignore patterns");
        merge_patterns(&mut accumulated, fragment);
    }

    merge_patterns(&mut accumulated, [SENTINEL_PATTERN.to_owned()]);
    Ok(accumulated)
}
