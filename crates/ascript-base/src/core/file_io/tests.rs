#![allow(clippy::unwrap_used)]

use super::*;
use std::fs;

/// Collecting sources finds `.as` files and `as.predefined` recursively
#[test]
fn test_collect_source_files_recursive() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.as"), "").unwrap();
    fs::write(dir.path().join("as.predefined"), "").unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("b.as"), "").unwrap();

    let files = collect_source_files(dir.path()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(files.len(), 3);
    assert!(names.contains(&"a.as".to_string()));
    assert!(names.contains(&"as.predefined".to_string()));
    assert!(names.contains(&"b.as".to_string()));
}

/// Plain text files are not analyzable
#[test]
fn test_is_analyzable_file() {
    assert!(is_analyzable_file(std::path::Path::new("script.as")));
    assert!(is_analyzable_file(std::path::Path::new("dir/as.predefined")));
    assert!(!is_analyzable_file(std::path::Path::new("readme.md")));
}
