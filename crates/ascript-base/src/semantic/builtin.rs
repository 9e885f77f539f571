//! Built-in primitive type symbols, shared across all analyses.

use crate::core::TextRange;
use crate::semantic::symbol::{PrimitiveKind, SymbolType, TypeKind};
use crate::syntax::ast::IdentToken;
use std::sync::{Arc, LazyLock};

const PRIMITIVES: &[(&str, PrimitiveKind)] = &[
    ("void", PrimitiveKind::Void),
    ("bool", PrimitiveKind::Bool),
    ("int8", PrimitiveKind::Int8),
    ("int16", PrimitiveKind::Int16),
    ("int", PrimitiveKind::Int32),
    ("int32", PrimitiveKind::Int32),
    ("int64", PrimitiveKind::Int64),
    ("uint8", PrimitiveKind::Uint8),
    ("uint16", PrimitiveKind::Uint16),
    ("uint", PrimitiveKind::Uint32),
    ("uint32", PrimitiveKind::Uint32),
    ("uint64", PrimitiveKind::Uint64),
    ("float", PrimitiveKind::Float),
    ("double", PrimitiveKind::Double),
    ("?", PrimitiveKind::Any),
];

static PRIMITIVE_SYMBOLS: LazyLock<Vec<(&'static str, Arc<SymbolType>)>> = LazyLock::new(|| {
    PRIMITIVES
        .iter()
        .map(|&(name, kind)| {
            let symbol = Arc::new(SymbolType {
                ident: IdentToken::new(name, TextRange::default()),
                uri: String::new(),
                scope_path: Vec::new(),
                members_scope: None,
                template_params: Vec::new(),
                bases: Vec::new(),
                kind: TypeKind::Primitive(kind),
            });
            (name, symbol)
        })
        .collect()
});

/// Looks up a primitive type symbol by source name (`int`, `uint8`, ...).
pub fn lookup_primitive(name: &str) -> Option<Arc<SymbolType>> {
    PRIMITIVE_SYMBOLS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, s)| s.clone())
}

/// The canonical symbol for a primitive kind.
pub fn primitive(kind: PrimitiveKind) -> Arc<SymbolType> {
    PRIMITIVE_SYMBOLS
        .iter()
        .find(|(_, s)| s.kind == TypeKind::Primitive(kind))
        .map(|(_, s)| s.clone())
        .unwrap_or_else(|| {
            Arc::new(SymbolType {
                ident: IdentToken::new("?", TextRange::default()),
                uri: String::new(),
                scope_path: Vec::new(),
                members_scope: None,
                template_params: Vec::new(),
                bases: Vec::new(),
                kind: TypeKind::Primitive(kind),
            })
        })
}
