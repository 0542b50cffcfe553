//! Filesystem utilities.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` in a single step.
///
/// The data is written to a temporary file next to the destination and then
/// renamed over it, so readers never observe a partially written file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write temporary file for {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    Ok(())
}

/// Find the source stems in `dir` (relative to `base`) with the given extension.
///
/// Results are `dir/name` without the extension, using `/` separators, sorted
/// so that generation is independent of directory iteration order.
pub fn discover_stems(base: &Path, dir: &str, extension: &str) -> Result<Vec<String>> {
    let pattern = base.join(dir).join(format!("*.{}", extension));
    let pattern_str = pattern.to_string_lossy();

    let mut stems = Vec::new();
    for entry in glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern_str))? {
        match entry {
            Ok(path) => {
                if !path.is_file() {
                    continue;
                }
                if let Some(stem) = path.file_stem() {
                    stems.push(format!("{}/{}", dir.trim_end_matches('/'), stem.to_string_lossy()));
                }
            }
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    stems.sort();
    stems.dedup();
    Ok(stems)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a path relative to `base` when it lives beneath it, otherwise as-is.
///
/// Separators are normalized to `/`.
pub fn display_relative(base: &Path, path: &Path) -> String {
    let shown = if path.starts_with(base) {
        relative_path(base, path)
    } else {
        path.to_path_buf()
    };
    shown.to_string_lossy().replace('\\', "/")
}
