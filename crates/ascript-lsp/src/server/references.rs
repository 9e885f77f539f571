use crate::server::LspServer;
use crate::server::helpers::{from_lsp_position, reference_at, to_lsp_range};
use ascript::semantic::hints::SymbolKey;
use std::collections::HashSet;
use tower_lsp::lsp_types::{
    DocumentHighlight, DocumentHighlightKind, Location, Position, Url,
};

impl LspServer {
    /// The symbol key under the cursor, if the position sits on a recorded
    /// reference.
    pub(crate) fn key_at(&mut self, uri: &Url, position: Position) -> Option<SymbolKey> {
        let path = self.flush_uri(uri)?;
        let scope = self.workspace.record(&path).and_then(|r| r.scope.clone())?;
        reference_at(&scope, from_lsp_position(position)).map(|r| r.to.clone())
    }

    /// Every use site of the symbol across all analyzed records, plus its
    /// declaration when requested.
    pub fn get_references(
        &mut self,
        uri: &Url,
        position: Position,
        include_declaration: bool,
    ) -> Vec<Location> {
        let Some(key) = self.key_at(uri, position) else {
            return Vec::new();
        };
        let mut seen: HashSet<(String, u32, u32)> = HashSet::new();
        let mut locations = Vec::new();
        for record in self.workspace.records() {
            let Some(scope) = &record.scope else { continue };
            for reference in &scope.references {
                if reference.to != key {
                    continue;
                }
                // Records sharing include scopes see the same entries once
                let dedup = (
                    reference.from.uri.clone(),
                    reference.from.range.start.line,
                    reference.from.range.start.character,
                );
                if !seen.insert(dedup) {
                    continue;
                }
                if let Ok(location_uri) = Url::from_file_path(&reference.from.uri) {
                    locations.push(Location {
                        uri: location_uri,
                        range: to_lsp_range(reference.from.range),
                    });
                }
                if include_declaration {
                    let decl = (
                        reference.to_definition.uri.clone(),
                        reference.to_definition.range.start.line,
                        reference.to_definition.range.start.character,
                    );
                    if seen.insert(decl) {
                        if let Ok(decl_uri) = Url::from_file_path(&reference.to_definition.uri) {
                            locations.push(Location {
                                uri: decl_uri,
                                range: to_lsp_range(reference.to_definition.range),
                            });
                        }
                    }
                }
            }
        }
        locations
    }

    /// Same-document occurrences for document highlight.
    pub fn get_document_highlights(
        &mut self,
        uri: &Url,
        position: Position,
    ) -> Vec<DocumentHighlight> {
        let Some(key) = self.key_at(uri, position) else {
            return Vec::new();
        };
        let Some(path) = Self::uri_to_path(uri) else {
            return Vec::new();
        };
        let Some(scope) = self.workspace.record(&path).and_then(|r| r.scope.clone()) else {
            return Vec::new();
        };
        let this_uri = path.display().to_string();
        scope
            .references
            .iter()
            .filter(|r| r.to == key && r.from.uri == this_uri)
            .map(|r| DocumentHighlight {
                range: to_lsp_range(r.from.range),
                kind: Some(DocumentHighlightKind::TEXT),
            })
            .collect()
    }
}
