use crate::server::LspServer;
use crate::server::helpers::{from_lsp_position, scope_at_position, symbol_declaration};
use ascript::semantic::hints::ComplementHint;
use ascript::semantic::resolved_type::ResolvedType;
use ascript::semantic::scope::{ANONYMOUS_PREFIX, ScopeId, SymbolGlobalScope};
use ascript::semantic::symbol::SymbolHolder;
use std::collections::HashSet;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionResponse, Position, Url,
};

const KEYWORDS: &[&str] = &[
    "class", "interface", "enum", "namespace", "typedef", "funcdef", "mixin", "void", "int",
    "uint", "float", "double", "bool", "auto", "const", "private", "protected", "if", "else",
    "while", "do", "for", "switch", "case", "default", "return", "break", "continue", "cast",
    "true", "false", "null", "this", "super",
];

impl LspServer {
    /// Completion items at a position. An instance-member or
    /// namespace-access hint recorded around the cursor wins; otherwise
    /// symbols visible from the innermost scope plus keywords.
    pub fn get_completions(&mut self, uri: &Url, position: Position) -> CompletionResponse {
        let Some(path) = self.flush_uri(uri) else {
            return CompletionResponse::Array(Vec::new());
        };
        let Some(scope) = self
            .workspace
            .record(&path)
            .and_then(|r| r.scope.clone())
        else {
            return CompletionResponse::Array(Vec::new());
        };
        let position = from_lsp_position(position);

        // Later hints are more deeply nested; prefer them
        for hint in scope.hints.iter().rev() {
            match hint {
                ComplementHint::AutocompleteInstanceMember { caret, target }
                    if caret.contains(position) =>
                {
                    return CompletionResponse::Array(instance_member_items(&scope, target));
                }
                ComplementHint::AutocompleteNamespaceAccess {
                    caret,
                    access_scope,
                } if caret.contains(position) => {
                    return CompletionResponse::Array(scope_access_items(&scope, *access_scope));
                }
                _ => {}
            }
        }

        let mut items = visible_symbol_items(&scope, scope_at_position(&scope, position));
        for keyword in KEYWORDS {
            items.push(CompletionItem {
                label: (*keyword).to_string(),
                kind: Some(CompletionItemKind::KEYWORD),
                ..Default::default()
            });
        }
        CompletionResponse::Array(items)
    }
}

fn holder_item(name: &str, holder: &SymbolHolder) -> CompletionItem {
    CompletionItem {
        label: name.to_string(),
        kind: Some(completion_kind(holder)),
        detail: Some(symbol_declaration(holder)),
        ..Default::default()
    }
}

fn completion_kind(holder: &SymbolHolder) -> CompletionItemKind {
    use ascript::semantic::symbol::TypeKind;
    match holder {
        SymbolHolder::Type(symbol) => match symbol.kind {
            TypeKind::Class => CompletionItemKind::CLASS,
            TypeKind::Interface => CompletionItemKind::INTERFACE,
            TypeKind::Enum => CompletionItemKind::ENUM,
            TypeKind::TemplateParam => CompletionItemKind::TYPE_PARAMETER,
            TypeKind::Primitive(_) | TypeKind::Typedef(_) => CompletionItemKind::STRUCT,
        },
        SymbolHolder::Variable(variable) => {
            if variable.is_instance_member {
                CompletionItemKind::FIELD
            } else {
                CompletionItemKind::VARIABLE
            }
        }
        SymbolHolder::Functions(overloads) => {
            if overloads.first().is_some_and(|f| f.is_instance_member) {
                CompletionItemKind::METHOD
            } else {
                CompletionItemKind::FUNCTION
            }
        }
    }
}

/// The visible instance members of a type, walking the base list; `this`
/// and private members stay hidden.
fn instance_member_items(global: &SymbolGlobalScope, target: &ResolvedType) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut pending: Vec<ResolvedType> = vec![target.clone()];
    while let Some(ty) = pending.pop() {
        let Some(symbol) = ty.type_symbol() else {
            continue;
        };
        let Some(members) = symbol
            .members_scope
            .as_ref()
            .and_then(|path| global.resolve_scope(path))
        else {
            continue;
        };
        for (name, holder) in &global.scope(members).symbols {
            if name == "this" || name == &symbol.ident.text {
                continue;
            }
            if matches!(holder, SymbolHolder::Variable(v) if v.access == ascript::syntax::ast::AccessModifier::Private)
            {
                continue;
            }
            if matches!(holder, SymbolHolder::Type(_)) {
                continue;
            }
            if seen.insert(name.clone()) {
                items.push(holder_item(name, holder));
            }
        }
        pending.extend(symbol.bases.iter().cloned());
    }
    items
}

/// Symbols and child namespaces of a scope named by a `::` qualifier.
fn scope_access_items(global: &SymbolGlobalScope, access: ScopeId) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    let scope = global.scope(access);
    for (name, holder) in &scope.symbols {
        items.push(holder_item(name, holder));
    }
    for (name, &child) in &scope.children {
        if name.starts_with(ANONYMOUS_PREFIX) {
            continue;
        }
        if global.scope(child).is_pure_namespace() {
            items.push(CompletionItem {
                label: name.clone(),
                kind: Some(CompletionItemKind::MODULE),
                ..Default::default()
            });
        }
    }
    items
}

/// Everything visible walking outward from a scope, closest shadowing
/// farthest.
fn visible_symbol_items(global: &SymbolGlobalScope, scope: ScopeId) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut current = Some(scope);
    while let Some(id) = current {
        for (name, holder) in &global.scope(id).symbols {
            if seen.insert(name.clone()) {
                items.push(holder_item(name, holder));
            }
        }
        for (name, &child) in &global.scope(id).children {
            if !name.starts_with(ANONYMOUS_PREFIX)
                && global.scope(child).is_pure_namespace()
                && seen.insert(name.clone())
            {
                items.push(CompletionItem {
                    label: name.clone(),
                    kind: Some(CompletionItemKind::MODULE),
                    ..Default::default()
                });
            }
        }
        current = global.scope(id).parent;
    }
    items
}
