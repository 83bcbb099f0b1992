use crate::error::{IngestError, Result};
use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Expands explicit paths and folders into the list of files to ingest.
///
/// Files are taken as given. Directories, whether passed as paths or as
/// folders, contribute the files matching `pattern` directly inside them in
/// sorted order. A path reached twice is kept at its first position.
pub fn discover_inputs(
    paths: &[PathBuf],
    folders: &[PathBuf],
    pattern: &str,
) -> Result<Vec<PathBuf>> {
    Pattern::new(pattern).map_err(|source| IngestError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut seen = HashSet::new();
    let mut inputs = Vec::new();
    let mut push = |path: PathBuf| {
        if seen.insert(path.clone()) {
            inputs.push(path);
        }
    };

    for path in paths.iter().chain(folders) {
        if path.is_dir() {
            for file in matching_files(path, pattern)? {
                push(file);
            }
        } else if path.is_file() {
            push(path.clone());
        } else {
            return Err(IngestError::MissingInput(path.clone()));
        }
    }

    Ok(inputs)
}

fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = Pattern::escape(&dir.to_string_lossy());
    let full = format!("{escaped}/{pattern}");
    let entries = glob::glob(&full).map_err(|source| IngestError::Pattern {
        pattern: full.clone(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
