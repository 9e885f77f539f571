//! Batch analysis driver behind the `ascript` binary.

use ascript::core::file_io::collect_source_files;
use ascript::semantic::diagnostics::Severity;
use ascript::semantic::settings::AnalyzerSettings;
use ascript::semantic::workspace::Workspace;
use std::path::{Path, PathBuf};

/// Summary of one batch run
pub struct AnalysisReport {
    pub file_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    /// `path:line:col severity message` lines, ready to print
    pub lines: Vec<String>,
}

/// Analyzes a file or every `.as` file under a directory and collects the
/// diagnostics of each inspected file.
///
/// # Errors
///
/// Returns an error if the input path does not exist or cannot be
/// enumerated.
pub fn run_analysis(input: &Path, verbose: bool) -> Result<AnalysisReport, String> {
    let files = collect_inputs(input)?;
    if files.is_empty() {
        return Err(format!("No AngelScript sources under {}", input.display()));
    }

    // The CLI reports analyzer problems at full severity
    let settings = AnalyzerSettings {
        suppress_analyzer_errors: false,
        ..AnalyzerSettings::default()
    };
    let mut workspace = Workspace::new(settings);
    for file in &files {
        if let Some(dir) = file.parent() {
            workspace.discover_predefined(dir);
        }
        if !workspace.inspect_from_disk(file) {
            return Err(format!("Failed to read {}", file.display()));
        }
    }
    workspace.drain();

    let mut report = AnalysisReport {
        file_count: files.len(),
        error_count: 0,
        warning_count: 0,
        lines: Vec::new(),
    };
    for file in &files {
        let diagnostics = workspace.diagnostics(file);
        if verbose && diagnostics.is_empty() {
            report.lines.push(format!("{}: ok", file.display()));
        }
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => report.error_count += 1,
                Severity::Warning => report.warning_count += 1,
                Severity::Info => {}
            }
            report
                .lines
                .push(format!("{}:{}", file.display(), diagnostic));
        }
    }
    Ok(report)
}

fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>, String> {
    if input.is_dir() {
        collect_source_files(input)
    } else if input.is_file() {
        Ok(vec![input.to_path_buf()])
    } else {
        Err(format!("No such file or directory: {}", input.display()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::fs;

    #[test]
    fn test_run_analysis_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.as"), "int x;\nvoid main() { x = 1; }").unwrap();
        fs::write(dir.path().join("bad.as"), "void main() { missing(); }").unwrap();

        let report = run_analysis(dir.path(), false).unwrap();
        assert_eq!(report.file_count, 2);
        assert_eq!(report.error_count, 1);
        assert!(report.lines.iter().any(|l| l.contains("missing")));
    }

    #[test]
    fn test_run_analysis_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("one.as");
        fs::write(&file, "void main() {}").unwrap();

        let report = run_analysis(&file, true).unwrap();
        assert_eq!(report.file_count, 1);
        assert_eq!(report.error_count, 0);
    }

    #[test]
    fn test_run_analysis_missing_input() {
        assert!(run_analysis(Path::new("/definitely/not/here"), false).is_err());
    }
}
