//! Conversions between analyzer types and LSP protocol types, plus shared
//! lookups over a file's analyzed scope.

use ascript::core::{TextPosition, TextRange};
use ascript::semantic::diagnostics::{Diagnostic as CoreDiagnostic, Severity};
use ascript::semantic::hints::{ReferenceEntry, SymbolKey};
use ascript::semantic::scope::{ScopeId, SymbolGlobalScope};
use ascript::semantic::symbol::{SymbolHolder, TypeKind, function_signature};
use ascript::semantic::workspace::Workspace;
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticSeverity, Position, Range, SymbolKind,
};

pub fn to_lsp_position(position: TextPosition) -> Position {
    Position {
        line: position.line,
        character: position.character,
    }
}

pub fn from_lsp_position(position: Position) -> TextPosition {
    TextPosition {
        line: position.line,
        character: position.character,
    }
}

pub fn to_lsp_range(range: TextRange) -> Range {
    Range {
        start: to_lsp_position(range.start),
        end: to_lsp_position(range.end),
    }
}

pub fn to_lsp_diagnostic(diagnostic: CoreDiagnostic) -> Diagnostic {
    Diagnostic {
        range: to_lsp_range(diagnostic.range),
        severity: Some(match diagnostic.severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
            Severity::Info => DiagnosticSeverity::INFORMATION,
        }),
        message: diagnostic.message,
        source: Some("ascript".to_string()),
        ..Default::default()
    }
}

/// The reference entry whose use-site token covers `position`.
pub fn reference_at<'a>(
    scope: &'a SymbolGlobalScope,
    position: TextPosition,
) -> Option<&'a ReferenceEntry> {
    scope
        .references
        .iter()
        .filter(|r| r.from.range.contains(position))
        .min_by_key(|r| {
            let range = r.from.range;
            (
                range.end.line - range.start.line,
                range.end.character.saturating_sub(range.start.character),
            )
        })
}

/// Resolves a path-based symbol key against the owning file's record.
pub fn resolve_symbol_key(workspace: &Workspace, key: &SymbolKey) -> Option<SymbolHolder> {
    let record = workspace.record(std::path::Path::new(&key.uri))?;
    let scope = record.scope.as_ref()?;
    scope.resolve_symbol(&key.scope_path, &key.name).cloned()
}

/// The innermost scope whose recorded region contains `position`; falls
/// back to the global root.
pub fn scope_at_position(scope: &SymbolGlobalScope, position: TextPosition) -> ScopeId {
    scope
        .scope_regions
        .iter()
        .filter(|region| region.range.contains(position))
        .min_by_key(|region| {
            let range = region.range;
            (range.end.line - range.start.line, range.end.character)
        })
        .map(|region| region.scope)
        .unwrap_or_else(|| scope.root())
}

pub fn symbol_kind(holder: &SymbolHolder) -> SymbolKind {
    match holder {
        SymbolHolder::Type(symbol) => match symbol.kind {
            TypeKind::Class => SymbolKind::CLASS,
            TypeKind::Interface => SymbolKind::INTERFACE,
            TypeKind::Enum => SymbolKind::ENUM,
            TypeKind::TemplateParam => SymbolKind::TYPE_PARAMETER,
            TypeKind::Primitive(_) | TypeKind::Typedef(_) => SymbolKind::STRUCT,
        },
        SymbolHolder::Variable(variable) => {
            if variable.is_instance_member {
                SymbolKind::FIELD
            } else {
                SymbolKind::VARIABLE
            }
        }
        SymbolHolder::Functions(overloads) => {
            if overloads.first().is_some_and(|f| f.is_instance_member) {
                SymbolKind::METHOD
            } else {
                SymbolKind::FUNCTION
            }
        }
    }
}

/// One-line declaration text for hover and completion details.
pub fn symbol_declaration(holder: &SymbolHolder) -> String {
    match holder {
        SymbolHolder::Type(symbol) => {
            let keyword = match symbol.kind {
                TypeKind::Class => "class",
                TypeKind::Interface => "interface",
                TypeKind::Enum => "enum",
                TypeKind::Typedef(_) => "typedef",
                TypeKind::TemplateParam | TypeKind::Primitive(_) => "type",
            };
            format!("{keyword} {}", symbol.ident.text)
        }
        SymbolHolder::Variable(variable) => {
            format!("{} {}", variable.ty.display_name(), variable.ident.text)
        }
        SymbolHolder::Functions(overloads) => overloads
            .iter()
            .map(|f| function_signature(f))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

