use crate::server::LspServer;
use crate::server::helpers::{symbol_declaration, symbol_kind, to_lsp_range};
use ascript::semantic::scope::{ANONYMOUS_PREFIX, ScopeId, SymbolGlobalScope};
use ascript::semantic::symbol::SymbolHolder;
use tower_lsp::lsp_types::{
    DocumentSymbol, DocumentSymbolResponse, Location, SymbolInformation, SymbolKind, Url,
};

impl LspServer {
    pub fn get_document_symbols(&mut self, uri: &Url) -> Option<DocumentSymbolResponse> {
        let path = self.flush_uri(uri)?;
        let scope = self.workspace.record(&path).and_then(|r| r.scope.clone())?;
        let this_uri = path.display().to_string();
        let symbols = collect_scope_symbols(&scope, scope.root(), &this_uri);
        Some(DocumentSymbolResponse::Nested(symbols))
    }

    /// Workspace-wide symbol search: case-insensitive substring match over
    /// every analyzed record.
    #[allow(deprecated)]
    pub fn get_workspace_symbols(&self, query: &str) -> Vec<SymbolInformation> {
        let needle = query.to_lowercase();
        let mut out = Vec::new();
        for record in self.workspace.records() {
            let Some(scope) = &record.scope else { continue };
            let this_uri = record.path.display().to_string();
            for id in 0..scope.scope_count() {
                for (name, holder) in &scope.scope(id).symbols {
                    if name == "this" || !name.to_lowercase().contains(&needle) {
                        continue;
                    }
                    let Some(symbol) = holder.first_symbol() else {
                        continue;
                    };
                    // Merged include scopes repeat foreign symbols
                    if symbol.uri() != this_uri {
                        continue;
                    }
                    let Ok(location_uri) = Url::from_file_path(symbol.uri()) else {
                        continue;
                    };
                    out.push(SymbolInformation {
                        name: name.clone(),
                        kind: symbol_kind(holder),
                        tags: None,
                        deprecated: None,
                        location: Location {
                            uri: location_uri,
                            range: to_lsp_range(symbol.ident_range()),
                        },
                        container_name: symbol.scope_path().last().cloned(),
                    });
                }
            }
        }
        out
    }
}

#[allow(deprecated)]
fn collect_scope_symbols(
    global: &SymbolGlobalScope,
    scope: ScopeId,
    this_uri: &str,
) -> Vec<DocumentSymbol> {
    let mut out = Vec::new();
    for (name, holder) in &global.scope(scope).symbols {
        if name == "this" {
            continue;
        }
        let Some(symbol) = holder.first_symbol() else {
            continue;
        };
        if symbol.uri() != this_uri {
            continue;
        }
        let children = match holder {
            SymbolHolder::Type(type_symbol) => type_symbol
                .members_scope
                .as_ref()
                .and_then(|path| global.resolve_scope(path))
                .map(|members| collect_scope_symbols(global, members, this_uri))
                .filter(|children| !children.is_empty()),
            _ => None,
        };
        out.push(DocumentSymbol {
            name: name.clone(),
            detail: Some(symbol_declaration(holder)),
            kind: symbol_kind(holder),
            tags: None,
            deprecated: None,
            range: to_lsp_range(symbol.ident_range()),
            selection_range: to_lsp_range(symbol.ident_range()),
            children,
        });
    }
    // Pure namespaces become containers
    for (name, &child) in &global.scope(scope).children {
        if name.starts_with(ANONYMOUS_PREFIX) || !global.scope(child).is_pure_namespace() {
            continue;
        }
        let children = collect_scope_symbols(global, child, this_uri);
        if children.is_empty() {
            continue;
        }
        let range = children
            .iter()
            .map(|c| c.range)
            .reduce(|a, b| tower_lsp::lsp_types::Range {
                start: a.start.min(b.start),
                end: a.end.max(b.end),
            })
            .unwrap_or_default();
        out.push(DocumentSymbol {
            name: name.clone(),
            detail: None,
            kind: SymbolKind::NAMESPACE,
            tags: None,
            deprecated: None,
            range,
            selection_range: range,
            children: Some(children),
        });
    }
    out
}
