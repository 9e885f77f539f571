//! Discovery and bulk loading of the implicit include root.
//!
//! A file named `as.predefined` marks its directory as the root of an
//! implicit include scope: the predefined file is included by every `.as`
//! file in the subtree, and with `implicitMutualInclusion` every file
//! includes every other.

use crate::core::constants::PREDEFINED_FILENAME;
use crate::core::file_io::{collect_source_files, load_file};
use crate::syntax::{ParsedScript, parse_script};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// A parsed file from a bulk directory load
pub struct LoadedFile {
    pub path: PathBuf,
    pub content: String,
    pub parsed: ParsedScript,
}

/// Walks parent directories from `start`; the first directory containing
/// `as.predefined` wins.
pub fn find_predefined_dir(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(PREDEFINED_FILENAME).is_file() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

/// Reads and parses every analyzable file under `dir` in parallel.
/// Unreadable files are skipped; parse failures are kept with their
/// recovered partial scripts.
///
/// # Errors
///
/// Returns an error if the directory tree cannot be enumerated.
pub fn load_directory(dir: &Path) -> Result<Vec<LoadedFile>, String> {
    let paths = collect_source_files(dir)?;
    Ok(paths
        .par_iter()
        .filter_map(|path| {
            let content = load_file(path).ok()?;
            let parsed = parse_script(&content);
            Some(LoadedFile {
                path: path.clone(),
                content,
                parsed,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::fs;

    #[test]
    fn test_find_predefined_walks_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("scripts").join("enemies");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(PREDEFINED_FILENAME), "int g;").unwrap();

        let found = find_predefined_dir(&nested).unwrap();
        assert_eq!(found, dir.path());
        assert!(find_predefined_dir(Path::new("/nonexistent/zzz")).is_none());
    }

    #[test]
    fn test_load_directory_parses_all_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.as"), "int a;").unwrap();
        fs::write(dir.path().join("b.as"), "int b;").unwrap();
        fs::write(dir.path().join("skip.txt"), "not code").unwrap();

        let mut loaded = load_directory(dir.path()).unwrap();
        loaded.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|f| f.parsed.errors.is_empty()));
    }
}
