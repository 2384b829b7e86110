//! File discovery helpers.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Lists the files directly inside `dir` that match a glob `pattern` such as `*.yml`.
///
/// Special glob characters in `dir` itself are escaped. Results are sorted.
pub fn glob_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let full = format!("{escaped}/{pattern}");

    let mut files = Vec::new();
    for entry in glob::glob(&full).with_context(|| format!("Invalid glob pattern: {full}"))? {
        let path = entry.with_context(|| format!("Failed to read glob entry in {}", dir.display()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
