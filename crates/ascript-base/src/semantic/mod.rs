pub mod analyzer;
pub mod builtin;
mod context;
pub mod diagnostics;
pub mod hints;
mod hoist;
mod operators;
mod overload;
pub mod resolved_type;
pub mod scope;
pub mod settings;
pub mod symbol;
mod typing;
pub mod workspace;

pub use analyzer::{AnalysisOutput, analyze_script};
pub use diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use settings::AnalyzerSettings;
pub use workspace::Workspace;

#[cfg(test)]
mod tests;
