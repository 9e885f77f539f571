//! The scope tree of one analyzed file.
//!
//! Scopes live in an arena owned by [`SymbolGlobalScope`]; ids are indices
//! and parents are ids, never owning back-pointers. A scope's path (the
//! identifier segments from the root) is its canonical identity and is what
//! symbols store to refer back to their declaring scope.

use crate::semantic::diagnostics::DiagnosticSink;
use crate::semantic::hints::{ComplementHint, ReferenceEntry, ScopeRegion};
use crate::semantic::symbol::{ScopePath, Symbol, SymbolFunction, SymbolHolder, SymbolType, SymbolVariable};
use crate::syntax::ast::{IdentToken, NodeClass, NodeEnum, NodeFunc, NodeInterface, NodeNamespace};
use indexmap::IndexMap;
use std::sync::Arc;

pub type ScopeId = usize;

const ROOT: ScopeId = 0;

/// Prefix of synthetic names for anonymous scopes (function bodies,
/// statement blocks); they are skipped by include merging and completion.
pub const ANONYMOUS_PREFIX: &str = "$anon";

#[derive(Debug, Clone)]
pub enum ScopeLinkedNode {
    Class(Arc<NodeClass>),
    Interface(Arc<NodeInterface>),
    Enum(Arc<NodeEnum>),
    Namespace(Arc<NodeNamespace>),
    Func(Arc<NodeFunc>),
    /// A statement block or other anonymous region
    Block,
}

fn same_linked(a: &ScopeLinkedNode, b: &ScopeLinkedNode) -> bool {
    match (a, b) {
        (ScopeLinkedNode::Class(x), ScopeLinkedNode::Class(y)) => Arc::ptr_eq(x, y),
        (ScopeLinkedNode::Interface(x), ScopeLinkedNode::Interface(y)) => Arc::ptr_eq(x, y),
        (ScopeLinkedNode::Enum(x), ScopeLinkedNode::Enum(y)) => Arc::ptr_eq(x, y),
        (ScopeLinkedNode::Namespace(x), ScopeLinkedNode::Namespace(y)) => Arc::ptr_eq(x, y),
        (ScopeLinkedNode::Func(x), ScopeLinkedNode::Func(y)) => Arc::ptr_eq(x, y),
        (ScopeLinkedNode::Block, ScopeLinkedNode::Block) => true,
        _ => false,
    }
}

/// One node of the scope tree
#[derive(Debug)]
pub struct SymbolScope {
    pub parent: Option<ScopeId>,
    pub path: ScopePath,
    /// File that first declared this scope (differs from the global scope's
    /// uri for scopes merged in from includes)
    pub uri: String,
    pub linked_node: Option<ScopeLinkedNode>,
    pub symbols: IndexMap<String, SymbolHolder>,
    pub children: IndexMap<String, ScopeId>,
}

impl SymbolScope {
    /// True for scopes usable as namespace qualifiers: no linked node, or a
    /// namespace node.
    pub fn is_pure_namespace(&self) -> bool {
        matches!(self.linked_node, None | Some(ScopeLinkedNode::Namespace(_)))
    }

    pub fn is_anonymous(&self) -> bool {
        self.path
            .last()
            .is_some_and(|name| name.starts_with(ANONYMOUS_PREFIX))
    }
}

/// The root of one file's scope tree, plus the file-level extras: reference
/// entries, complement hints and scope regions.
#[derive(Debug)]
pub struct SymbolGlobalScope {
    pub uri: String,
    scopes: Vec<SymbolScope>,
    pub references: Vec<ReferenceEntry>,
    pub hints: Vec<ComplementHint>,
    pub scope_regions: Vec<ScopeRegion>,
}

impl SymbolGlobalScope {
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let root = SymbolScope {
            parent: None,
            path: Vec::new(),
            uri: uri.clone(),
            linked_node: None,
            symbols: IndexMap::new(),
            children: IndexMap::new(),
        };
        Self {
            uri,
            scopes: vec![root],
            references: Vec::new(),
            hints: Vec::new(),
            scope_regions: Vec::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ROOT
    }

    pub fn scope(&self, id: ScopeId) -> &SymbolScope {
        &self.scopes[id]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut SymbolScope {
        &mut self.scopes[id]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn path_of(&self, id: ScopeId) -> &ScopePath {
        &self.scopes[id].path
    }

    // -----------------------------------------------------------------------
    // Scope insertion
    // -----------------------------------------------------------------------

    /// Returns the existing child scope under `name` (adopting the linked
    /// node if the scope had none), or creates a new one.
    pub fn insert_scope(
        &mut self,
        parent: ScopeId,
        name: &str,
        linked: Option<ScopeLinkedNode>,
    ) -> ScopeId {
        if let Some(&existing) = self.scopes[parent].children.get(name) {
            if self.scopes[existing].linked_node.is_none() {
                self.scopes[existing].linked_node = linked;
            }
            return existing;
        }
        self.push_scope(parent, name, linked, None)
    }

    /// Like [`insert_scope`], but diagnoses a duplicate declaration when the
    /// existing scope is already linked to a different node.
    pub fn insert_scope_and_check(
        &mut self,
        parent: ScopeId,
        ident: &IdentToken,
        linked: Option<ScopeLinkedNode>,
        sink: &mut DiagnosticSink,
    ) -> ScopeId {
        if let Some(&existing) = self.scopes[parent].children.get(&ident.text) {
            let duplicate = match (&self.scopes[existing].linked_node, &linked) {
                (Some(old), Some(new)) => !same_linked(old, new),
                _ => false,
            };
            if duplicate {
                sink.error(
                    format!("Duplicate declaration of '{}'", ident.text),
                    ident.range,
                );
            } else if self.scopes[existing].linked_node.is_none() {
                self.scopes[existing].linked_node = linked;
            }
            return existing;
        }
        self.push_scope(parent, &ident.text, linked, None)
    }

    /// A fresh scope under a unique synthetic name (function bodies,
    /// statement blocks).
    pub fn insert_anonymous_scope(
        &mut self,
        parent: ScopeId,
        linked: Option<ScopeLinkedNode>,
    ) -> ScopeId {
        let name = format!("{}{}", ANONYMOUS_PREFIX, self.scopes.len());
        self.push_scope(parent, &name, linked, None)
    }

    fn push_scope(
        &mut self,
        parent: ScopeId,
        name: &str,
        linked: Option<ScopeLinkedNode>,
        uri: Option<String>,
    ) -> ScopeId {
        let id = self.scopes.len();
        let mut path = self.scopes[parent].path.clone();
        path.push(name.to_string());
        let uri = uri.unwrap_or_else(|| self.uri.clone());
        self.scopes.push(SymbolScope {
            parent: Some(parent),
            path,
            uri,
            linked_node: linked,
            symbols: IndexMap::new(),
            children: IndexMap::new(),
        });
        self.scopes[parent].children.insert(name.to_string(), id);
        id
    }

    // -----------------------------------------------------------------------
    // Symbol insertion
    // -----------------------------------------------------------------------

    /// Installs a symbol. A new function extends an existing overload
    /// holder. On any other collision the existing holder is returned and
    /// nothing is inserted.
    pub fn insert_symbol(&mut self, scope: ScopeId, symbol: Symbol) -> Result<(), SymbolHolder> {
        let name = symbol.name().to_string();
        if self.scopes[scope].symbols.contains_key(&name) {
            let Some(existing) = self.scopes[scope].symbols.get_mut(&name) else {
                return Ok(());
            };
            return match (existing, symbol) {
                (SymbolHolder::Functions(overloads), Symbol::Function(func)) => {
                    overloads.push(func);
                    Ok(())
                }
                (existing, _) => Err(existing.clone()),
            };
        }
        let holder = match symbol {
            Symbol::Type(s) => SymbolHolder::Type(s),
            Symbol::Variable(s) => SymbolHolder::Variable(s),
            Symbol::Function(s) => SymbolHolder::Functions(vec![s]),
        };
        self.scopes[scope].symbols.insert(name, holder);
        Ok(())
    }

    /// Inserts and emits a duplicate-declaration diagnostic on collision.
    pub fn insert_symbol_and_check(
        &mut self,
        scope: ScopeId,
        symbol: Symbol,
        sink: &mut DiagnosticSink,
    ) -> bool {
        let name = symbol.name().to_string();
        let range = symbol.ident_range();
        match self.insert_symbol(scope, symbol) {
            Ok(()) => true,
            Err(_) => {
                sink.error(format!("Duplicate declaration of '{name}'"), range);
                false
            }
        }
    }

    /// Swaps in a rebuilt type symbol (bases become known after the first
    /// deferred hoist step).
    pub fn replace_type(&mut self, scope: ScopeId, symbol: Arc<SymbolType>) {
        let name = symbol.ident.text.clone();
        if let Some(holder) = self.scopes[scope].symbols.get_mut(&name) {
            if matches!(holder, SymbolHolder::Type(_)) {
                *holder = SymbolHolder::Type(symbol);
            }
        }
    }

    /// Swaps in a rebuilt variable symbol (declared types resolve late).
    pub fn replace_variable(&mut self, scope: ScopeId, symbol: Arc<SymbolVariable>) {
        let name = symbol.ident.text.clone();
        if let Some(holder) = self.scopes[scope].symbols.get_mut(&name) {
            if matches!(holder, SymbolHolder::Variable(_)) {
                *holder = SymbolHolder::Variable(symbol);
            }
        }
    }

    /// Swaps in a rebuilt overload once its signature has been resolved.
    pub fn replace_overload(
        &mut self,
        scope: ScopeId,
        name: &str,
        index: usize,
        symbol: Arc<SymbolFunction>,
    ) {
        if let Some(SymbolHolder::Functions(overloads)) = self.scopes[scope].symbols.get_mut(name) {
            if let Some(slot) = overloads.get_mut(index) {
                *slot = symbol;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Shallow lookup in one scope.
    pub fn lookup_symbol(&self, scope: ScopeId, name: &str) -> Option<&SymbolHolder> {
        self.scopes[scope].symbols.get(name)
    }

    /// Lookup walking the parent chain.
    pub fn lookup_symbol_with_parent(&self, scope: ScopeId, name: &str) -> Option<&SymbolHolder> {
        self.find_symbol_with_parent(scope, name).map(|(holder, _)| holder)
    }

    /// Lookup walking the parent chain, also reporting the scope the symbol
    /// was found in (callers use it for access checks).
    pub fn find_symbol_with_parent(
        &self,
        scope: ScopeId,
        name: &str,
    ) -> Option<(&SymbolHolder, ScopeId)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(holder) = self.scopes[id].symbols.get(name) {
                return Some((holder, id));
            }
            current = self.scopes[id].parent;
        }
        None
    }

    /// Child scope lookup walking the parent chain; resolves the first
    /// segment of a namespace qualifier.
    pub fn find_child_scope_with_parent(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(&child) = self.scopes[id].children.get(name) {
                return Some(child);
            }
            current = self.scopes[id].parent;
        }
        None
    }

    /// Walks a scope path from the root.
    pub fn resolve_scope(&self, path: &[String]) -> Option<ScopeId> {
        let mut current = ROOT;
        for segment in path {
            current = *self.scopes[current].children.get(segment)?;
        }
        Some(current)
    }

    /// Resolves a symbol key-style address: declaring path plus name.
    pub fn resolve_symbol(&self, path: &[String], name: &str) -> Option<&SymbolHolder> {
        let scope = self.resolve_scope(path)?;
        self.lookup_symbol(scope, name)
    }

    // -----------------------------------------------------------------------
    // Include merging
    // -----------------------------------------------------------------------

    /// Merges another file's analyzed global scope into this one: symbols
    /// are shared by `Arc`, named child scopes merge recursively, function
    /// holders extend, and anonymous scopes stay behind. First insertion
    /// wins on other collisions; cross-file duplicates are the owning
    /// file's problem to diagnose.
    pub fn include_scope(&mut self, source: &SymbolGlobalScope) {
        self.merge_from(ROOT, source, source.root());
    }

    fn merge_from(&mut self, target: ScopeId, source: &SymbolGlobalScope, source_id: ScopeId) {
        let entries: Vec<(String, SymbolHolder)> = source.scopes[source_id]
            .symbols
            .iter()
            .map(|(name, holder)| (name.clone(), holder.clone()))
            .collect();
        for (name, holder) in entries {
            if self.scopes[target].symbols.contains_key(&name) {
                // Function holders merge; anything else keeps the first
                // insertion (cross-file duplicates are the owning file's
                // diagnostic, not ours)
                if let (Some(SymbolHolder::Functions(existing)), SymbolHolder::Functions(incoming)) =
                    (self.scopes[target].symbols.get_mut(&name), holder)
                {
                    for func in incoming {
                        if !existing.iter().any(|f| Arc::ptr_eq(f, &func)) {
                            existing.push(func);
                        }
                    }
                }
                continue;
            }
            self.scopes[target].symbols.insert(name, holder);
        }

        let children: Vec<(String, ScopeId)> = source.scopes[source_id]
            .children
            .iter()
            .filter(|(name, _)| !name.starts_with(ANONYMOUS_PREFIX))
            .map(|(name, &id)| (name.clone(), id))
            .collect();
        for (name, source_child) in children {
            let target_child = match self.scopes[target].children.get(&name) {
                Some(&existing) => existing,
                None => {
                    let linked = source.scopes[source_child].linked_node.clone();
                    let uri = source.scopes[source_child].uri.clone();
                    self.push_scope(target, &name, linked, Some(uri))
                }
            };
            self.merge_from(target_child, source, source_child);
        }
    }
}

#[cfg(test)]
#[path = "scope/tests.rs"]
mod tests;
