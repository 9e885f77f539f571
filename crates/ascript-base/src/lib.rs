//! Semantic analysis of AngelScript sources for editor tooling.
//!
//! The pipeline: source text → pest parse → AST → hoist (declare every
//! name, defer the rest) → analyze (resolve types, names and overloads,
//! collect diagnostics and editor hints). The [`semantic::Workspace`]
//! resolver runs that pipeline per file across an include graph and
//! schedules re-analysis on edits.

pub mod core;
pub mod parser;
pub mod project;
pub mod semantic;
pub mod syntax;
