use crate::semantic::symbol::{PrimitiveKind, SymbolFunction, SymbolType, TypeKind};
use crate::syntax::ast::RefKind;
use indexmap::IndexMap;
use std::sync::Arc;

/// Template parameter name → supplied resolved type
#[derive(Debug, Clone, Default)]
pub struct TemplateTranslator {
    pub bindings: IndexMap<String, ResolvedType>,
}

impl TemplateTranslator {
    pub fn get(&self, name: &str) -> Option<&ResolvedType> {
        self.bindings.get(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeModifiers {
    pub is_const: bool,
    pub is_handle: bool,
    pub ref_kind: Option<RefKind>,
}

#[derive(Debug, Clone)]
pub enum TypeSource {
    Type(Arc<SymbolType>),
    /// Funcdefs are types too (function handles)
    Function(Arc<SymbolFunction>),
}

/// A computed type value: type-or-function symbol, optional template
/// bindings, and modifier flags. Cheap to copy, never mutated after
/// construction. `source: None` is the silent *unresolved* type.
#[derive(Debug, Clone, Default)]
pub struct ResolvedType {
    pub source: Option<TypeSource>,
    pub translator: Option<Arc<TemplateTranslator>>,
    pub modifiers: TypeModifiers,
}

impl ResolvedType {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn of_type(symbol: Arc<SymbolType>) -> Self {
        Self {
            source: Some(TypeSource::Type(symbol)),
            translator: None,
            modifiers: TypeModifiers::default(),
        }
    }

    pub fn of_function(symbol: Arc<SymbolFunction>) -> Self {
        Self {
            source: Some(TypeSource::Function(symbol)),
            translator: None,
            modifiers: TypeModifiers::default(),
        }
    }

    /// The type of a `null` literal: an unresolved handle that converts to
    /// any handle type without complaint.
    pub fn null_handle() -> Self {
        Self {
            source: None,
            translator: None,
            modifiers: TypeModifiers {
                is_handle: true,
                ..TypeModifiers::default()
            },
        }
    }

    pub fn with_handle(mut self, is_handle: bool) -> Self {
        self.modifiers.is_handle = is_handle;
        self
    }

    pub fn is_unresolved(&self) -> bool {
        self.source.is_none()
    }

    pub fn type_symbol(&self) -> Option<&Arc<SymbolType>> {
        match &self.source {
            Some(TypeSource::Type(symbol)) => Some(symbol),
            _ => None,
        }
    }

    pub fn function_symbol(&self) -> Option<&Arc<SymbolFunction>> {
        match &self.source {
            Some(TypeSource::Function(symbol)) => Some(symbol),
            _ => None,
        }
    }

    /// The primitive kind, looking through typedefs and enums (enums are
    /// integers for conversion purposes).
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        let symbol = self.type_symbol()?;
        match symbol.kind {
            TypeKind::Primitive(kind) => Some(kind),
            TypeKind::Typedef(kind) => Some(kind),
            TypeKind::Enum => Some(PrimitiveKind::Int32),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        self.primitive() == Some(PrimitiveKind::Void)
    }

    pub fn is_class_like(&self) -> bool {
        self.type_symbol()
            .is_some_and(|s| matches!(s.kind, TypeKind::Class | TypeKind::Interface))
    }

    /// Substitutes bound template parameters; e.g. the return type `T` of
    /// `array<int>::opIndex` becomes `int` under the instance's translator.
    pub fn apply_translator(&self, translator: Option<&Arc<TemplateTranslator>>) -> ResolvedType {
        let Some(translator) = translator else {
            return self.clone();
        };
        if let Some(symbol) = self.type_symbol() {
            if symbol.kind == TypeKind::TemplateParam {
                if let Some(bound) = translator.get(&symbol.ident.text) {
                    let mut substituted = bound.clone();
                    substituted.modifiers.is_handle |= self.modifiers.is_handle;
                    substituted.modifiers.is_const |= self.modifiers.is_const;
                    return substituted;
                }
            }
        }
        self.clone()
    }

    /// Same nominal type: identical source symbol identity and handle-ness
    /// (const and reference modes are ignored).
    pub fn equals_nominal(&self, other: &ResolvedType) -> bool {
        if self.modifiers.is_handle != other.modifiers.is_handle {
            return false;
        }
        match (&self.source, &other.source) {
            (Some(TypeSource::Type(a)), Some(TypeSource::Type(b))) => {
                a.uri == b.uri
                    && a.scope_path == b.scope_path
                    && a.ident.text == b.ident.text
                    && translators_equal(self.translator.as_ref(), other.translator.as_ref())
            }
            (Some(TypeSource::Function(a)), Some(TypeSource::Function(b))) => {
                a.uri == b.uri && a.scope_path == b.scope_path && a.ident.text == b.ident.text
            }
            _ => false,
        }
    }

    /// Human-readable name: `const array<int>@`
    pub fn display_name(&self) -> String {
        let mut out = String::new();
        if self.modifiers.is_const {
            out.push_str("const ");
        }
        match &self.source {
            None => out.push_str(if self.modifiers.is_handle { "null" } else { "<unknown>" }),
            Some(TypeSource::Type(symbol)) => {
                out.push_str(&symbol.ident.text);
                if !symbol.template_params.is_empty() {
                    out.push('<');
                    for (i, param) in symbol.template_params.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        match self.translator.as_ref().and_then(|t| t.get(param)) {
                            Some(bound) => out.push_str(&bound.display_name()),
                            None => out.push_str(param),
                        }
                    }
                    out.push('>');
                }
            }
            Some(TypeSource::Function(symbol)) => out.push_str(&symbol.ident.text),
        }
        if self.modifiers.is_handle {
            out.push('@');
        }
        out
    }
}

fn translators_equal(
    a: Option<&Arc<TemplateTranslator>>,
    b: Option<&Arc<TemplateTranslator>>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.bindings.len() == b.bindings.len()
                && a.bindings
                    .iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| v.equals_nominal(other)))
        }
        _ => false,
    }
}
