//! Per-file records seeding editor features: reference entries for
//! definition/references/rename, and complement hints for completion,
//! signature help, inlay hints and folding.

use crate::core::{TextLocation, TextRange};
use crate::semantic::resolved_type::{ResolvedType, TemplateTranslator};
use crate::semantic::scope::ScopeId;
use crate::semantic::symbol::{ScopePath, Symbol, SymbolFunction};
use crate::syntax::ast::IdentToken;
use std::sync::Arc;

/// Weak, path-based identity of a symbol: resolvable against the declaring
/// file's global scope without holding the symbol alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolKey {
    pub uri: String,
    pub scope_path: ScopePath,
    pub name: String,
}

impl SymbolKey {
    pub fn of(symbol: &Symbol) -> Self {
        Self {
            uri: symbol.uri().to_string(),
            scope_path: symbol.scope_path().clone(),
            name: symbol.name().to_string(),
        }
    }
}

/// One name resolution: use-site token → referenced symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub from: TextLocation,
    pub to: SymbolKey,
    /// Identifier token of the declaration, cached for goto-definition
    pub to_definition: TextLocation,
}

/// A point of interest recorded during analysis
#[derive(Debug, Clone)]
pub enum ComplementHint {
    /// Completion of instance members after a `.`
    AutocompleteInstanceMember {
        caret: TextRange,
        target: ResolvedType,
    },
    /// Completion of scope members after a `::`
    AutocompleteNamespaceAccess {
        caret: TextRange,
        access_scope: ScopeId,
    },
    /// A resolved call, kept with the whole overload set for signature help
    FunctionCall {
        caller_ident: IdentToken,
        arg_ranges: Vec<TextRange>,
        args_range: TextRange,
        callee_holder: Vec<Arc<SymbolFunction>>,
        translator: Option<Arc<TemplateTranslator>>,
        /// Index of the chosen overload within the holder
        selected: usize,
    },
    /// The type inferred for an `auto` declaration
    AutoTypeResolution {
        auto_range: TextRange,
        ty: ResolvedType,
    },
}

/// A scope paired with its source extent; drives folding and
/// scope-at-position queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeRegion {
    pub scope: ScopeId,
    pub range: TextRange,
}
