use crate::core::{TextLocation, TextRange};
use crate::semantic::resolved_type::ResolvedType;
use crate::syntax::ast::{AccessModifier, IdentToken, NodeFunc};
use std::fmt::Write as _;
use std::sync::Arc;

/// Ordered identifier segments from the global root; the canonical identity
/// of a scope within one file's global scope.
pub type ScopePath = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float,
    Double,
    /// `?` parameter type of registered functions
    Any,
}

impl PrimitiveKind {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Int8
                | PrimitiveKind::Int16
                | PrimitiveKind::Int32
                | PrimitiveKind::Int64
                | PrimitiveKind::Uint8
                | PrimitiveKind::Uint16
                | PrimitiveKind::Uint32
                | PrimitiveKind::Uint64
        )
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Enum,
    Class,
    Interface,
    /// Alias of a builtin primitive
    Typedef(PrimitiveKind),
    TemplateParam,
}

/// A named type: class, interface, enum, primitive, typedef or template
/// parameter. Immutable once its final `Arc` lands in a symbol table.
#[derive(Debug, Clone)]
pub struct SymbolType {
    pub ident: IdentToken,
    pub uri: String,
    /// Declaring scope
    pub scope_path: ScopePath,
    /// Body scope for class/interface/enum
    pub members_scope: Option<ScopePath>,
    pub template_params: Vec<String>,
    pub bases: Vec<ResolvedType>,
    pub kind: TypeKind,
}

impl SymbolType {
    pub fn has_members(&self) -> bool {
        self.members_scope.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SymbolVariable {
    pub ident: IdentToken,
    pub uri: String,
    pub scope_path: ScopePath,
    pub ty: ResolvedType,
    pub is_instance_member: bool,
    pub access: AccessModifier,
}

#[derive(Debug, Clone)]
pub struct FunctionParam {
    pub name: Option<String>,
    pub ty: ResolvedType,
    pub has_default: bool,
}

#[derive(Debug, Clone)]
pub struct SymbolFunction {
    pub ident: IdentToken,
    pub uri: String,
    pub scope_path: ScopePath,
    pub return_type: ResolvedType,
    pub params: Vec<FunctionParam>,
    pub is_variadic: bool,
    /// Anonymous body scope; absent for funcdefs and declarations
    pub body_scope: Option<ScopePath>,
    pub is_instance_member: bool,
    pub access: AccessModifier,
    pub template_params: Vec<String>,
    pub node: Option<Arc<NodeFunc>>,
}

/// One overload list or a single symbol under an identifier
#[derive(Debug, Clone)]
pub enum SymbolHolder {
    Type(Arc<SymbolType>),
    Variable(Arc<SymbolVariable>),
    Functions(Vec<Arc<SymbolFunction>>),
}

#[derive(Debug, Clone)]
pub enum Symbol {
    Type(Arc<SymbolType>),
    Variable(Arc<SymbolVariable>),
    Function(Arc<SymbolFunction>),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Type(s) => &s.ident.text,
            Symbol::Variable(s) => &s.ident.text,
            Symbol::Function(s) => &s.ident.text,
        }
    }

    pub fn ident_range(&self) -> TextRange {
        match self {
            Symbol::Type(s) => s.ident.range,
            Symbol::Variable(s) => s.ident.range,
            Symbol::Function(s) => s.ident.range,
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            Symbol::Type(s) => &s.uri,
            Symbol::Variable(s) => &s.uri,
            Symbol::Function(s) => &s.uri,
        }
    }

    pub fn scope_path(&self) -> &ScopePath {
        match self {
            Symbol::Type(s) => &s.scope_path,
            Symbol::Variable(s) => &s.scope_path,
            Symbol::Function(s) => &s.scope_path,
        }
    }

    pub fn access(&self) -> AccessModifier {
        match self {
            Symbol::Type(_) => AccessModifier::Public,
            Symbol::Variable(s) => s.access,
            Symbol::Function(s) => s.access,
        }
    }

    pub fn location(&self) -> TextLocation {
        TextLocation::new(self.uri(), self.ident_range())
    }
}

impl SymbolHolder {
    pub fn name(&self) -> &str {
        match self {
            SymbolHolder::Type(s) => &s.ident.text,
            SymbolHolder::Variable(s) => &s.ident.text,
            SymbolHolder::Functions(list) => {
                list.first().map(|f| f.ident.text.as_str()).unwrap_or("")
            }
        }
    }

    /// The single symbol, or the first overload for function holders
    pub fn first_symbol(&self) -> Option<Symbol> {
        match self {
            SymbolHolder::Type(s) => Some(Symbol::Type(s.clone())),
            SymbolHolder::Variable(s) => Some(Symbol::Variable(s.clone())),
            SymbolHolder::Functions(list) => list.first().cloned().map(Symbol::Function),
        }
    }

    pub fn is_functions(&self) -> bool {
        matches!(self, SymbolHolder::Functions(_))
    }
}

/// Renders `ret name(params)` for overload dumps and signature help.
pub fn function_signature(func: &SymbolFunction) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} {}(", func.return_type.display_name(), func.ident.text);
    for (i, param) in func.params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&param.ty.display_name());
        if let Some(name) = &param.name {
            let _ = write!(out, " {name}");
        }
    }
    if func.is_variadic {
        if !func.params.is_empty() {
            out.push_str(", ");
        }
        out.push_str("...");
    }
    out.push(')');
    out
}
