use crate::core::constants::{PREDEFINED_FILENAME, is_source_extension};
use std::fs;
use std::path::{Path, PathBuf};

/// Loads a file and returns its content as a string.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

/// True for files the analyzer inspects: `.as` sources and `as.predefined`.
pub fn is_analyzable_file(path: &Path) -> bool {
    if path.file_name().and_then(|n| n.to_str()) == Some(PREDEFINED_FILENAME) {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(is_source_extension)
}

/// Recursively collects every analyzable file under `dir`, sorted by path
/// for deterministic ordering.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn collect_source_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    collect_into(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_into(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), String> {
    let entries =
        fs::read_dir(dir).map_err(|e| format!("Failed to read {}: {}", dir.display(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| format!("Failed to read {}: {}", dir.display(), e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_into(&path, files)?;
        } else if is_analyzable_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "file_io/tests.rs"]
mod tests;
