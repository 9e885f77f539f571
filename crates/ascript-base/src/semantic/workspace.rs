//! The workspace analysis resolver.
//!
//! Owns one `PartialInspectRecord` per file, the include graph between
//! them, and the tiered re-analysis queue. Inspection (parse) and analysis
//! (hoist + analyze) always run on the caller's thread; the queue only
//! decides *when* a host should call [`Workspace::process_next`] again.

pub mod include_graph;
pub mod queue;

pub use queue::{AnalysisQueue, QueueTier};

use crate::core::TextRange;
use crate::core::constants::PREDEFINED_FILENAME;
use crate::core::file_io::{collect_source_files, load_file};
use crate::project;
use crate::semantic::analyzer::analyze_script;
use crate::semantic::diagnostics::Diagnostic;
use crate::semantic::scope::SymbolGlobalScope;
use crate::semantic::settings::AnalyzerSettings;
use crate::syntax::ast::{IncludeDirective, NodeScript};
use crate::syntax::{ParsedScript, parse_script};
use include_graph::IncludeGraph;
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// An include path resolved against the file system; `directive` is the
/// source range of the `#include` token when the include was explicit.
#[derive(Debug, Clone)]
pub struct ResolvedInclude {
    pub path: PathBuf,
    pub directive: Option<TextRange>,
}

/// Everything the resolver knows about one file.
#[derive(Debug)]
pub struct PartialInspectRecord {
    pub path: PathBuf,
    pub is_open: bool,
    pub content: String,
    pub parser_diagnostics: Vec<Diagnostic>,
    pub analyzer_diagnostics: Vec<Diagnostic>,
    pub script: Arc<NodeScript>,
    pub includes: Vec<IncludeDirective>,
    pub include_paths: Vec<ResolvedInclude>,
    pub scope: Option<Arc<SymbolGlobalScope>>,
    /// Queued for re-analysis
    pub pending: bool,
}

#[derive(Default)]
pub struct Workspace {
    settings: AnalyzerSettings,
    records: HashMap<PathBuf, PartialInspectRecord>,
    queue: AnalysisQueue,
    include_graph: IncludeGraph,
    predefined_roots: Vec<PathBuf>,
    /// Guards include cycles during recursive dependency analysis
    in_flight: HashSet<PathBuf>,
}

impl Workspace {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Replaces the settings and schedules every record for re-analysis.
    pub fn update_settings(&mut self, settings: AnalyzerSettings) {
        self.settings = settings;
        let paths: Vec<_> = self.records.keys().cloned().collect();
        for path in paths {
            let tier = if self.records[&path].is_open {
                QueueTier::Indirect
            } else {
                QueueTier::LazyIndirect
            };
            self.mark_pending(&path);
            self.queue.enqueue(tier, path);
        }
    }

    pub fn record(&self, path: &Path) -> Option<&PartialInspectRecord> {
        self.records.get(path)
    }

    pub fn records(&self) -> impl Iterator<Item = &PartialInspectRecord> {
        self.records.values()
    }

    /// Evicts a record. Any queued task for it is dropped at pop time.
    pub fn remove_record(&mut self, path: &Path) {
        self.records.remove(path);
        self.include_graph.remove_file(path);
        self.queue.remove(path);
    }

    /// Diagnostics as published to the client: parser and analyzer arrays
    /// as one atomic set, with analyzer errors demoted to warnings when
    /// `suppressAnalyzerErrors` is on.
    pub fn diagnostics(&self, path: &Path) -> Vec<Diagnostic> {
        let Some(record) = self.records.get(path) else {
            return Vec::new();
        };
        let mut out = record.parser_diagnostics.clone();
        for diagnostic in &record.analyzer_diagnostics {
            if self.settings.suppress_analyzer_errors {
                out.push(diagnostic.clone().demoted());
            } else {
                out.push(diagnostic.clone());
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // Document lifecycle
    // -----------------------------------------------------------------------

    /// A document was opened in the editor: discover its predefined root,
    /// then inspect it synchronously.
    pub fn open_document(&mut self, path: &Path, text: &str) {
        if let Some(parent) = path.parent() {
            self.discover_predefined(parent);
        }
        self.inspect(path, text.to_string(), true);
    }

    /// A document changed: record the new content and debounce the
    /// re-inspection through the direct tier.
    pub fn change_document(&mut self, path: &Path, text: &str) {
        match self.records.get_mut(path) {
            Some(record) => {
                record.content = text.to_string();
                record.pending = true;
            }
            None => {
                self.open_document(path, text);
                return;
            }
        }
        self.queue.enqueue(QueueTier::Direct, path.to_path_buf());
    }

    /// A document closed; the record is kept so dependents keep resolving.
    pub fn close_document(&mut self, path: &Path) {
        if let Some(record) = self.records.get_mut(path) {
            record.is_open = false;
        }
    }

    /// Loads a file from disk into the workspace (closed).
    pub fn inspect_from_disk(&mut self, path: &Path) -> bool {
        match load_file(path) {
            Ok(content) => {
                self.inspect(path, content, false);
                true
            }
            Err(_) => false,
        }
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// Delay before the next [`process_next`](Self::process_next) call, or
    /// `None` when all queues are drained.
    pub fn next_delay(&self) -> Option<std::time::Duration> {
        self.queue.next_delay()
    }

    /// Pops and runs one queued task. Direct items are re-inspected from
    /// their latest content; indirect items are re-analyzed against their
    /// existing AST. Evicted paths are silently dropped.
    pub fn process_next(&mut self) -> Option<PathBuf> {
        loop {
            let (tier, path) = self.queue.pop()?;
            let Some(record) = self.records.get(&path) else {
                continue; // evicted while queued
            };
            match tier {
                QueueTier::Direct => {
                    let content = record.content.clone();
                    let is_open = record.is_open;
                    self.inspect(&path, content, is_open);
                }
                QueueTier::Indirect | QueueTier::LazyIndirect => {
                    self.analyze_file(&path);
                }
            }
            return Some(path);
        }
    }

    /// Guarantees the record for `path` reflects the latest content before
    /// an LSP request is answered: drains the direct tier, then promotes a
    /// pending indirect entry for `path` and runs it immediately.
    pub fn flush(&mut self, path: &Path) {
        while self.queue.has_direct() {
            let Some((_, next)) = self.queue.pop() else { break };
            if let Some(record) = self.records.get(&next) {
                let content = record.content.clone();
                let is_open = record.is_open;
                self.inspect(&next, content, is_open);
            }
        }
        if self.queue.remove(path).is_some() && self.records.contains_key(path) {
            self.analyze_file(path);
        }
    }

    /// Runs every queued task to quiescence (batch hosts).
    pub fn drain(&mut self) {
        while self.process_next().is_some() {}
    }

    fn mark_pending(&mut self, path: &Path) {
        if let Some(record) = self.records.get_mut(path) {
            record.pending = true;
        }
    }

    // -----------------------------------------------------------------------
    // Inspection and analysis
    // -----------------------------------------------------------------------

    /// Parses `content`, resolves the include set, analyzes, and schedules
    /// dependents (open ones into indirect, closed ones into lazy-indirect).
    pub fn inspect(&mut self, path: &Path, content: String, is_open: bool) {
        let parsed = parse_script(&content);
        self.install_parsed(path, content, parsed, is_open);
        self.analyze_file(path);

        for affected in self.include_graph.all_affected(path) {
            let Some(record) = self.records.get(&affected) else {
                continue;
            };
            let tier = if record.is_open {
                QueueTier::Indirect
            } else {
                QueueTier::LazyIndirect
            };
            self.mark_pending(&affected);
            self.queue.enqueue(tier, affected);
        }
    }

    /// Installs a parse result as a record without analyzing (bulk loads
    /// enqueue analysis lazily instead).
    pub fn install_parsed(
        &mut self,
        path: &Path,
        content: String,
        parsed: ParsedScript,
        is_open: bool,
    ) {
        let includes = parsed.script.includes.clone();
        let include_paths = self.resolve_includes(path, &includes);
        self.include_graph
            .set_includes(path, include_paths.iter().map(|i| i.path.clone()));
        let parser_diagnostics = parsed
            .errors
            .iter()
            .map(|e| Diagnostic::error(e.message.clone(), e.range))
            .collect();
        let record = PartialInspectRecord {
            path: path.to_path_buf(),
            is_open,
            content,
            parser_diagnostics,
            analyzer_diagnostics: Vec::new(),
            script: Arc::new(parsed.script),
            includes,
            include_paths,
            scope: None,
            pending: true,
        };
        self.records.insert(path.to_path_buf(), record);
    }

    /// Re-runs hoist+analyze for one file against its existing AST: a fresh
    /// global scope, include scopes merged in (missing dependencies are
    /// inspected on demand), diagnostics replaced atomically.
    pub fn analyze_file(&mut self, path: &Path) {
        if !self.in_flight.insert(path.to_path_buf()) {
            return;
        }
        let Some((script, include_paths)) = self
            .records
            .get(path)
            .map(|r| (r.script.clone(), r.include_paths.clone()))
        else {
            self.in_flight.remove(path);
            return;
        };

        let mut missing = Vec::new();
        let mut include_scopes = Vec::new();
        for include in &include_paths {
            self.ensure_analyzed(&include.path);
            match self.records.get(&include.path) {
                Some(record) => {
                    // A cyclic dependency may not have a scope yet; that is
                    // benign, the follow-up re-analysis closes the gap
                    if let Some(scope) = record.scope.clone() {
                        include_scopes.push(scope);
                    }
                }
                None => {
                    if let Some(range) = include.directive {
                        missing.push(Diagnostic::error(
                            format!("Missing include '{}'", include.path.display()),
                            range,
                        ));
                    }
                }
            }
        }

        let uri = path.display().to_string();
        let output = analyze_script(&uri, &script, &include_scopes, &self.settings);
        self.in_flight.remove(path);

        if let Some(record) = self.records.get_mut(path) {
            missing.extend(output.diagnostics);
            record.analyzer_diagnostics = missing;
            record.scope = Some(Arc::new(output.scope));
            record.pending = false;
        }
    }

    /// Makes sure a dependency has an analyzed scope, loading it from disk
    /// if it was never seen. Cycles fall out through `in_flight`.
    fn ensure_analyzed(&mut self, path: &Path) {
        if self.in_flight.contains(path) {
            return;
        }
        match self.records.get(path) {
            Some(record) if record.scope.is_some() && !record.pending => {}
            Some(_) => self.analyze_file(path),
            // inspect() analyzes newly loaded files on the way in
            None => {
                let _ = self.inspect_from_disk(path);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Includes and the predefined root
    // -----------------------------------------------------------------------

    /// Explicit `#include` paths resolved against the file's directory,
    /// plus the implicit set from the nearest `as.predefined` root.
    fn resolve_includes(&self, path: &Path, includes: &[IncludeDirective]) -> Vec<ResolvedInclude> {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut resolved: Vec<ResolvedInclude> = includes
            .iter()
            .map(|directive| ResolvedInclude {
                path: normalize_path(&dir.join(&directive.path)),
                directive: Some(directive.range),
            })
            .collect();

        if let Some(root) = project::find_predefined_dir(&dir) {
            let predefined = root.join(PREDEFINED_FILENAME);
            if predefined != path {
                resolved.push(ResolvedInclude {
                    path: predefined,
                    directive: None,
                });
            }
            if self.settings.implicit_mutual_inclusion {
                for sibling in collect_source_files(&root).unwrap_or_default() {
                    if sibling != path && !resolved.iter().any(|r| r.path == sibling) {
                        resolved.push(ResolvedInclude {
                            path: sibling,
                            directive: None,
                        });
                    }
                }
            }
        }

        resolved.retain(|include| include.path != path);
        resolved
    }

    /// On the first visit to a subtree: find its `as.predefined`, inspect
    /// that file synchronously, then enumerate and schedule every `.as`
    /// file under the root.
    pub fn discover_predefined(&mut self, start_dir: &Path) {
        let Some(root) = project::find_predefined_dir(start_dir) else {
            return;
        };
        if self.predefined_roots.contains(&root) {
            return;
        }
        self.predefined_roots.push(root.clone());

        let predefined = root.join(PREDEFINED_FILENAME);
        self.inspect_from_disk(&predefined);

        if let Ok(loaded) = project::load_directory(&root) {
            for file in loaded {
                if file.path == predefined || self.records.contains_key(&file.path) {
                    continue;
                }
                self.install_parsed(&file.path, file.content, file.parsed, false);
                self.queue
                    .enqueue(QueueTier::LazyIndirect, file.path.clone());
            }
        }
    }
}

/// Lexically normalizes `.` and `..` components so includes hit the same
/// record keys regardless of how they were spelled.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[path = "workspace/tests.rs"]
mod tests;
