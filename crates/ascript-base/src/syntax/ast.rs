//! Owned AST produced by lowering pest pairs.
//!
//! Declaration nodes are `Arc`-wrapped so the hoist and analyze queues can
//! hold onto the fragments they defer without borrowing the script tree.

use crate::core::TextRange;
use std::sync::Arc;

/// An identifier with its source range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentToken {
    pub text: String,
    pub range: TextRange,
}

impl IdentToken {
    pub fn new(text: impl Into<String>, range: TextRange) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }
}

/// A parsed source file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeScript {
    pub includes: Vec<IncludeDirective>,
    pub items: Vec<ScriptNode>,
}

/// `#include "path"`
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeDirective {
    /// Path with the surrounding quotes stripped
    pub path: String,
    /// Range of the quoted path token
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptNode {
    Namespace(Arc<NodeNamespace>),
    Enum(Arc<NodeEnum>),
    Class(Arc<NodeClass>),
    Interface(Arc<NodeInterface>),
    Typedef(Arc<NodeTypedef>),
    FuncDef(Arc<NodeFuncDef>),
    Func(Arc<NodeFunc>),
    VirtualProp(Arc<NodeVirtualProp>),
    Var(Arc<NodeVar>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeNamespace {
    pub segments: Vec<IdentToken>,
    pub items: Vec<ScriptNode>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeEnum {
    pub ident: IdentToken,
    pub members: Vec<EnumMember>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub ident: IdentToken,
    pub value: Option<NodeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeClass {
    pub ident: IdentToken,
    pub template_params: Vec<IdentToken>,
    pub bases: Vec<NodeQualifiedIdent>,
    pub members: Vec<ClassMember>,
    pub is_mixin: bool,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Func(Arc<NodeFunc>),
    VirtualProp(Arc<NodeVirtualProp>),
    Var(Arc<NodeVar>),
    FuncDef(Arc<NodeFuncDef>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeInterface {
    pub ident: IdentToken,
    pub bases: Vec<NodeQualifiedIdent>,
    pub members: Vec<ClassMember>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeTypedef {
    /// The aliased builtin primitive
    pub primitive: IdentToken,
    pub ident: IdentToken,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeFuncDef {
    pub return_type: NodeType,
    pub ident: IdentToken,
    pub params: Vec<NodeParam>,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessModifier {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FuncHead {
    /// Ordinary function with a return type
    Returns(NodeType),
    Constructor,
    Destructor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeFunc {
    pub access: AccessModifier,
    pub head: FuncHead,
    pub ident: IdentToken,
    pub template_params: Vec<IdentToken>,
    pub params: Vec<NodeParam>,
    pub is_variadic: bool,
    pub is_const: bool,
    /// `property` attribute on the signature
    pub is_property: bool,
    pub body: Option<NodeStatBlock>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeParam {
    pub ty: NodeType,
    pub ident: Option<IdentToken>,
    pub has_default: bool,
    pub default_value: Option<NodeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeVirtualProp {
    pub access: AccessModifier,
    pub ty: NodeType,
    pub ident: IdentToken,
    pub getter: Option<PropAccessor>,
    pub setter: Option<PropAccessor>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropAccessor {
    pub is_const: bool,
    pub body: Option<NodeStatBlock>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeVar {
    pub access: AccessModifier,
    pub ty: NodeType,
    pub declarators: Vec<VarDeclarator>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub ident: IdentToken,
    pub init: Option<VarInit>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VarInit {
    Expr(NodeExpr),
    /// Constructor-call initializer: `Obj o(a, b);`
    ArgList(Vec<NodeArg>),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    In,
    Out,
    InOut,
}

/// Scope qualifier preceding a name: `::`, `A::`, `A::B::`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeScopeQualifier {
    pub is_global: bool,
    pub segments: Vec<IdentToken>,
    pub range: TextRange,
}

/// A possibly-qualified name; a trailing `::` with no final identifier is
/// kept (empty ident text) so completion can see half-typed accesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeQualifiedIdent {
    pub scope: Option<NodeScopeQualifier>,
    pub ident: IdentToken,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeType {
    pub is_const: bool,
    /// `?` parameter type of registered functions
    pub is_any: bool,
    pub name: NodeQualifiedIdent,
    pub template_args: Vec<NodeType>,
    pub array_dims: u32,
    pub is_handle: bool,
    pub ref_kind: Option<RefKind>,
    pub range: TextRange,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStatBlock {
    pub statements: Vec<NodeStatement>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeStatement {
    Block(NodeStatBlock),
    If {
        cond: NodeExpr,
        then_branch: Box<NodeStatement>,
        else_branch: Option<Box<NodeStatement>>,
    },
    While {
        cond: NodeExpr,
        body: Box<NodeStatement>,
    },
    DoWhile {
        body: Box<NodeStatement>,
        cond: NodeExpr,
    },
    For {
        init: Option<Box<NodeStatement>>,
        cond: Option<NodeExpr>,
        update: Vec<NodeExpr>,
        body: Box<NodeStatement>,
    },
    Switch {
        cond: NodeExpr,
        cases: Vec<SwitchCase>,
    },
    Return {
        value: Option<NodeExpr>,
        range: TextRange,
    },
    Break(TextRange),
    Continue(TextRange),
    Var(Arc<NodeVar>),
    Expr(NodeExpr),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` marks the `default` label
    pub label: Option<NodeExpr>,
    pub statements: Vec<NodeStatement>,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Float,
    Double,
    Bool,
    String,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeArg {
    pub name: Option<IdentToken>,
    pub expr: NodeExpr,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeExpr {
    Literal {
        kind: LiteralKind,
        text: String,
        range: TextRange,
    },
    /// Variable / function / type access, possibly scoped and templated
    Ident {
        name: NodeQualifiedIdent,
        template_args: Vec<NodeType>,
    },
    Unary {
        op: String,
        op_range: TextRange,
        expr: Box<NodeExpr>,
    },
    PostIncDec {
        op: String,
        op_range: TextRange,
        expr: Box<NodeExpr>,
    },
    Binary {
        op: String,
        op_range: TextRange,
        lhs: Box<NodeExpr>,
        rhs: Box<NodeExpr>,
    },
    Assign {
        op: String,
        op_range: TextRange,
        lhs: Box<NodeExpr>,
        rhs: Box<NodeExpr>,
    },
    Ternary {
        cond: Box<NodeExpr>,
        then_expr: Box<NodeExpr>,
        else_expr: Box<NodeExpr>,
    },
    Call {
        callee: Box<NodeExpr>,
        args: Vec<NodeArg>,
        /// Range of the parenthesized argument list
        args_range: TextRange,
    },
    Index {
        base: Box<NodeExpr>,
        args: Vec<NodeArg>,
        args_range: TextRange,
    },
    /// `base.ident`; `ident.text` is empty for a trailing dot
    Member {
        base: Box<NodeExpr>,
        ident: IdentToken,
        template_args: Vec<NodeType>,
    },
    Cast {
        ty: NodeType,
        expr: Box<NodeExpr>,
        range: TextRange,
    },
    Paren(Box<NodeExpr>),
}

impl NodeExpr {
    pub fn range(&self) -> TextRange {
        match self {
            NodeExpr::Literal { range, .. } => *range,
            NodeExpr::Ident { name, .. } => name.range,
            NodeExpr::Unary { op_range, expr, .. } => op_range.merge(expr.range()),
            NodeExpr::PostIncDec { op_range, expr, .. } => expr.range().merge(*op_range),
            NodeExpr::Binary { lhs, rhs, .. } | NodeExpr::Assign { lhs, rhs, .. } => {
                lhs.range().merge(rhs.range())
            }
            NodeExpr::Ternary {
                cond, else_expr, ..
            } => cond.range().merge(else_expr.range()),
            NodeExpr::Call {
                callee, args_range, ..
            } => callee.range().merge(*args_range),
            NodeExpr::Index {
                base, args_range, ..
            } => base.range().merge(*args_range),
            NodeExpr::Member { base, ident, .. } => base.range().merge(ident.range),
            NodeExpr::Cast { range, .. } => *range,
            NodeExpr::Paren(inner) => inner.range(),
        }
    }
}
