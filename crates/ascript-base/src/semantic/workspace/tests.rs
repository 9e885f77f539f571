#![allow(clippy::unwrap_used)]

use super::queue::{DIRECT_DELAY, INDIRECT_DELAY, LAZY_INDIRECT_DELAY};
use super::*;
use crate::semantic::diagnostics::Severity;
use crate::semantic::settings::AnalyzerSettings;
use std::fs;
use std::path::PathBuf;

fn workspace() -> Workspace {
    Workspace::new(AnalyzerSettings::default())
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Scenario: a file imports "missing.as"; analysis continues with results
/// from the includes that do exist
#[test]
fn test_missing_include_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b.as", "void helper() {}");
    let a = write(
        dir.path(),
        "a.as",
        "#include \"missing.as\"\n#include \"b.as\"\nvoid main() { helper(); }",
    );

    let mut ws = workspace();
    ws.open_document(&a, &fs::read_to_string(&a).unwrap());

    let diagnostics = ws.diagnostics(&a);
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    assert!(diagnostics[0].message.contains("Missing include"));
    // The diagnostic sits on the include-path token of line 0
    assert_eq!(diagnostics[0].range.start.line, 0);
}

/// Scenario: editing b.as while a.as is open enqueues a.as into the
/// indirect tier; popping it re-analyzes a.as against its existing AST
#[test]
fn test_edit_propagation_through_include() {
    let dir = tempfile::tempdir().unwrap();
    let b = write(dir.path(), "b.as", "void helper() {}");
    let a = write(
        dir.path(),
        "a.as",
        "#include \"b.as\"\nvoid main() { helper(); }",
    );

    let mut ws = workspace();
    ws.open_document(&a, &fs::read_to_string(&a).unwrap());
    assert!(ws.diagnostics(&a).is_empty(), "{:?}", ws.diagnostics(&a));

    // b.as was pulled in as a dependency (closed)
    assert!(ws.record(&b).is_some());

    // Rename the helper in b.as
    ws.change_document(&b, "void helper_renamed() {}");
    assert_eq!(ws.next_delay(), Some(DIRECT_DELAY));

    // Direct pop re-inspects b.as and schedules its open dependent
    assert_eq!(ws.process_next(), Some(b.clone()));
    assert_eq!(ws.next_delay(), Some(INDIRECT_DELAY));

    // Indirect pop re-analyzes a.as, which now misses the helper
    assert_eq!(ws.process_next(), Some(a.clone()));
    assert!(
        ws.diagnostics(&a)
            .iter()
            .any(|d| d.message.contains("Unresolved identifier 'helper'")),
        "{:?}",
        ws.diagnostics(&a)
    );
    assert_eq!(ws.next_delay(), None);
}

/// flush() leaves the record reflecting the latest content
#[test]
fn test_flush_applies_pending_edit() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.as", "int x;");

    let mut ws = workspace();
    ws.open_document(&a, "int x;");
    ws.change_document(&a, "int x;\nint y;");

    ws.flush(&a);
    let scope = ws.record(&a).unwrap().scope.as_ref().unwrap();
    assert!(scope.scope(scope.root()).symbols.contains_key("y"));
    assert!(!ws.record(&a).unwrap().pending);
}

/// Evicting a record invalidates any task still queued for it
#[test]
fn test_eviction_drops_pending_task() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.as", "int x;");

    let mut ws = workspace();
    ws.open_document(&a, "int x;");
    ws.change_document(&a, "int y;");
    ws.remove_record(&a);

    assert_eq!(ws.process_next(), None);
    assert!(ws.record(&a).is_none());
}

/// The nearest as.predefined is discovered, inspected synchronously and
/// implicitly included by files in its subtree
#[test]
fn test_predefined_discovery() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "as.predefined", "void print(int value) {}");
    let nested = dir.path().join("scripts");
    fs::create_dir(&nested).unwrap();
    write(&nested, "other.as", "void unused() {}");
    let game = write(&nested, "game.as", "void main() { print(42); }");

    let mut ws = workspace();
    ws.open_document(&game, &fs::read_to_string(&game).unwrap());

    assert!(ws.diagnostics(&game).is_empty(), "{:?}", ws.diagnostics(&game));
    // Sibling sources were enumerated and scheduled lazily
    assert_eq!(ws.next_delay(), Some(LAZY_INDIRECT_DELAY));
    ws.drain();
    assert!(ws.record(&nested.join("other.as")).is_some());
}

/// With implicitMutualInclusion every file under the root sees every other
#[test]
fn test_implicit_mutual_inclusion() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "as.predefined", "");
    write(dir.path(), "util.as", "int shared_counter;");
    let a = write(dir.path(), "a.as", "void main() { shared_counter = 1; }");

    let mut ws = Workspace::new(AnalyzerSettings {
        implicit_mutual_inclusion: true,
        ..AnalyzerSettings::default()
    });
    ws.open_document(&a, &fs::read_to_string(&a).unwrap());
    assert!(ws.diagnostics(&a).is_empty(), "{:?}", ws.diagnostics(&a));

    // Without the setting the same source cannot see util.as
    let mut plain = workspace();
    plain.open_document(&a, &fs::read_to_string(&a).unwrap());
    assert!(
        plain
            .diagnostics(&a)
            .iter()
            .any(|d| d.message.contains("shared_counter")),
        "{:?}",
        plain.diagnostics(&a)
    );
}

/// suppressAnalyzerErrors demotes analyzer errors at publication time
#[test]
fn test_analyzer_errors_demoted_to_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.as", "void main() { missing(); }");

    let mut ws = workspace();
    ws.open_document(&a, &fs::read_to_string(&a).unwrap());
    let diagnostics = ws.diagnostics(&a);
    assert!(!diagnostics.is_empty());
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Warning));

    let mut strict = Workspace::new(AnalyzerSettings {
        suppress_analyzer_errors: false,
        ..AnalyzerSettings::default()
    });
    strict.open_document(&a, &fs::read_to_string(&a).unwrap());
    assert!(
        strict
            .diagnostics(&a)
            .iter()
            .all(|d| d.severity == Severity::Error)
    );
}

/// Parser diagnostics survive until the next inspection; analyzer
/// diagnostics are replaced per pass
#[test]
fn test_diagnostics_replaced_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.as", "void main() { }");

    let mut ws = workspace();
    ws.open_document(&a, "void main() { broken(");
    assert!(!ws.diagnostics(&a).is_empty());

    ws.change_document(&a, "void main() {}");
    ws.flush(&a);
    assert!(ws.diagnostics(&a).is_empty(), "{:?}", ws.diagnostics(&a));
}

#[test]
fn test_normalize_path() {
    assert_eq!(
        normalize_path(Path::new("/a/b/../c/./d.as")),
        PathBuf::from("/a/c/d.as")
    );
}

/// Include cycles settle without recursion blowups
#[test]
fn test_include_cycle_is_benign() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b.as", "#include \"a.as\"\nint from_b;");
    let a = write(dir.path(), "a.as", "#include \"b.as\"\nint from_a;\nvoid main() { from_b = 1; }");

    let mut ws = workspace();
    ws.open_document(&a, &fs::read_to_string(&a).unwrap());
    ws.drain();
    assert!(ws.diagnostics(&a).is_empty(), "{:?}", ws.diagnostics(&a));
}
