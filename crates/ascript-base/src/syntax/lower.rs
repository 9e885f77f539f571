//! Manual lowering from pest pairs into the owned AST.

use crate::core::text_utils::LineIndex;
use crate::core::{TextPosition, TextRange};
use crate::parser::Rule;
use crate::syntax::ast::{
    AccessModifier, ClassMember, EnumMember, FuncHead, IdentToken, IncludeDirective, LiteralKind,
    NodeArg, NodeClass, NodeEnum, NodeExpr, NodeFunc, NodeFuncDef, NodeInterface, NodeNamespace,
    NodeParam, NodeQualifiedIdent, NodeScopeQualifier, NodeScript, NodeStatBlock, NodeStatement,
    NodeType, NodeTypedef, NodeVar, NodeVirtualProp, PropAccessor, RefKind, ScriptNode, SwitchCase,
    VarDeclarator, VarInit,
};
use pest::iterators::Pair;
use std::sync::Arc;

pub(super) struct Lower<'a> {
    index: &'a LineIndex,
    /// Byte offset of the parsed slice within the full document, so spans
    /// from chunked recovery parses land on the right lines.
    base: usize,
}

impl<'a> Lower<'a> {
    pub fn new(index: &'a LineIndex, base: usize) -> Self {
        Self { index, base }
    }

    fn range(&self, span: pest::Span) -> TextRange {
        TextRange::new(
            self.index.position(self.base + span.start()),
            self.index.position(self.base + span.end()),
        )
    }

    fn ident(&self, pair: Pair<Rule>) -> IdentToken {
        let range = self.range(pair.as_span());
        IdentToken::new(pair.as_str(), range)
    }

    fn empty_ident(at: TextPosition) -> IdentToken {
        IdentToken::new("", TextRange::new(at, at))
    }

    // -----------------------------------------------------------------------
    // Script items
    // -----------------------------------------------------------------------

    pub fn script(&self, pair: Pair<Rule>, out: &mut NodeScript) {
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::EOI {
                continue;
            }
            self.item(inner, out);
        }
    }

    fn item(&self, pair: Pair<Rule>, out: &mut NodeScript) {
        match pair.as_rule() {
            Rule::include_directive => {
                if let Some(lit) = pair.into_inner().find(|p| p.as_rule() == Rule::string_lit) {
                    let range = self.range(lit.as_span());
                    let text = lit.as_str();
                    let path = text[1..text.len().saturating_sub(1)].to_string();
                    out.includes.push(IncludeDirective { path, range });
                }
            }
            Rule::namespace_decl => {
                let node = self.namespace(pair, out);
                out.items.push(ScriptNode::Namespace(Arc::new(node)));
            }
            Rule::enum_decl => out.items.push(ScriptNode::Enum(Arc::new(self.enum_decl(pair)))),
            Rule::class_decl => out
                .items
                .push(ScriptNode::Class(Arc::new(self.class(pair, false)))),
            Rule::mixin_decl => {
                if let Some(class) = pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::class_decl)
                {
                    out.items
                        .push(ScriptNode::Class(Arc::new(self.class(class, true))));
                }
            }
            Rule::interface_decl => out
                .items
                .push(ScriptNode::Interface(Arc::new(self.interface(pair)))),
            Rule::typedef_decl => {
                if let Some(node) = self.typedef(pair) {
                    out.items.push(ScriptNode::Typedef(Arc::new(node)));
                }
            }
            Rule::funcdef_decl => {
                if let Some(node) = self.funcdef(pair) {
                    out.items.push(ScriptNode::FuncDef(Arc::new(node)));
                }
            }
            Rule::func_decl => {
                if let Some(node) = self.func(pair) {
                    out.items.push(ScriptNode::Func(Arc::new(node)));
                }
            }
            Rule::virtual_prop_decl => {
                if let Some(node) = self.virtual_prop(pair) {
                    out.items.push(ScriptNode::VirtualProp(Arc::new(node)));
                }
            }
            Rule::var_decl | Rule::var_decl_stat => {
                if let Some(node) = self.var(pair) {
                    out.items.push(ScriptNode::Var(Arc::new(node)));
                }
            }
            _ => {}
        }
    }

    fn namespace(&self, pair: Pair<Rule>, root: &mut NodeScript) -> NodeNamespace {
        let range = self.range(pair.as_span());
        let mut segments = Vec::new();
        let mut body = NodeScript::default();
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::identifier {
                segments.push(self.ident(inner));
            } else {
                self.item(inner, &mut body);
            }
        }
        // Includes are a file-level concern wherever they appear
        root.includes.append(&mut body.includes);
        NodeNamespace {
            segments,
            items: body.items,
            range,
        }
    }

    fn enum_decl(&self, pair: Pair<Rule>) -> NodeEnum {
        let range = self.range(pair.as_span());
        let mut ident = Self::empty_ident(range.start);
        let mut members = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::identifier => ident = self.ident(inner),
                Rule::enum_member => {
                    let mut member_ident = None;
                    let mut value = None;
                    for part in inner.into_inner() {
                        match part.as_rule() {
                            Rule::identifier => member_ident = Some(self.ident(part)),
                            Rule::assign => value = Some(self.expr(part)),
                            _ => {}
                        }
                    }
                    if let Some(ident) = member_ident {
                        members.push(EnumMember { ident, value });
                    }
                }
                _ => {}
            }
        }
        NodeEnum {
            ident,
            members,
            range,
        }
    }

    fn class(&self, pair: Pair<Rule>, is_mixin: bool) -> NodeClass {
        let range = self.range(pair.as_span());
        let mut ident = Self::empty_ident(range.start);
        let mut template_params = Vec::new();
        let mut bases = Vec::new();
        let mut members = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::identifier => ident = self.ident(inner),
                Rule::template_param_list => template_params = self.template_params(inner),
                Rule::base_list => {
                    bases = inner
                        .into_inner()
                        .filter(|p| p.as_rule() == Rule::qualified_ident)
                        .map(|p| self.qualified_ident(p))
                        .collect();
                }
                _ => self.class_member(inner, &mut members),
            }
        }
        NodeClass {
            ident,
            template_params,
            bases,
            members,
            is_mixin,
            range,
        }
    }

    fn interface(&self, pair: Pair<Rule>) -> NodeInterface {
        let range = self.range(pair.as_span());
        let mut ident = Self::empty_ident(range.start);
        let mut bases = Vec::new();
        let mut members = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::identifier => ident = self.ident(inner),
                Rule::base_list => {
                    bases = inner
                        .into_inner()
                        .filter(|p| p.as_rule() == Rule::qualified_ident)
                        .map(|p| self.qualified_ident(p))
                        .collect();
                }
                _ => self.class_member(inner, &mut members),
            }
        }
        NodeInterface {
            ident,
            bases,
            members,
            range,
        }
    }

    fn class_member(&self, pair: Pair<Rule>, members: &mut Vec<ClassMember>) {
        match pair.as_rule() {
            Rule::func_decl => {
                if let Some(node) = self.func(pair) {
                    members.push(ClassMember::Func(Arc::new(node)));
                }
            }
            Rule::virtual_prop_decl => {
                if let Some(node) = self.virtual_prop(pair) {
                    members.push(ClassMember::VirtualProp(Arc::new(node)));
                }
            }
            Rule::var_decl => {
                if let Some(node) = self.var(pair) {
                    members.push(ClassMember::Var(Arc::new(node)));
                }
            }
            Rule::funcdef_decl => {
                if let Some(node) = self.funcdef(pair) {
                    members.push(ClassMember::FuncDef(Arc::new(node)));
                }
            }
            _ => {}
        }
    }

    fn typedef(&self, pair: Pair<Rule>) -> Option<NodeTypedef> {
        let range = self.range(pair.as_span());
        let mut idents = pair
            .into_inner()
            .filter(|p| p.as_rule() == Rule::identifier);
        let primitive = self.ident(idents.next()?);
        let ident = self.ident(idents.next()?);
        Some(NodeTypedef {
            primitive,
            ident,
            range,
        })
    }

    fn funcdef(&self, pair: Pair<Rule>) -> Option<NodeFuncDef> {
        let range = self.range(pair.as_span());
        let mut return_type = None;
        let mut ident = None;
        let mut params = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::type_spec => return_type = Some(self.type_spec(inner)),
                Rule::identifier => ident = Some(self.ident(inner)),
                Rule::param_list => params = self.param_list(inner).0,
                _ => {}
            }
        }
        Some(NodeFuncDef {
            return_type: return_type?,
            ident: ident?,
            params,
            range,
        })
    }

    fn template_params(&self, pair: Pair<Rule>) -> Vec<IdentToken> {
        pair.into_inner()
            .filter(|p| p.as_rule() == Rule::template_param)
            .filter_map(|p| {
                p.into_inner()
                    .find(|inner| inner.as_rule() == Rule::identifier)
            })
            .map(|p| self.ident(p))
            .collect()
    }

    fn func(&self, pair: Pair<Rule>) -> Option<NodeFunc> {
        let range = self.range(pair.as_span());
        let mut access = AccessModifier::Public;
        let mut head = None;
        let mut ident = None;
        let mut template_params = Vec::new();
        let mut params = Vec::new();
        let mut is_variadic = false;
        let mut is_const = false;
        let mut is_property = false;
        let mut body = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::access_modifier => access = Self::access(inner.as_str()),
                Rule::destructor_sig => {
                    head = Some(FuncHead::Destructor);
                    if let Some(id) = inner
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::identifier)
                    {
                        ident = Some(self.ident(id));
                    }
                }
                Rule::regular_sig | Rule::ctor_sig => {
                    if inner.as_rule() == Rule::ctor_sig {
                        head = Some(FuncHead::Constructor);
                    }
                    let mut ref_kind = None;
                    for part in inner.into_inner() {
                        match part.as_rule() {
                            Rule::type_spec => {
                                head = Some(FuncHead::Returns(self.type_spec(part)));
                            }
                            Rule::ref_mod => ref_kind = Self::ref_kind(part.as_str()),
                            Rule::identifier => ident = Some(self.ident(part)),
                            Rule::template_param_list => {
                                template_params = self.template_params(part);
                            }
                            Rule::param_list => {
                                let (list, variadic) = self.param_list(part);
                                params = list;
                                is_variadic = variadic;
                            }
                            Rule::const_mod => is_const = true,
                            Rule::func_attr => {
                                if part.as_str() == "property" {
                                    is_property = true;
                                }
                            }
                            _ => {}
                        }
                    }
                    if let Some(FuncHead::Returns(ty)) = &mut head {
                        ty.ref_kind = ref_kind;
                    }
                }
                Rule::stat_block => body = Some(self.stat_block(inner)),
                _ => {}
            }
        }
        Some(NodeFunc {
            access,
            head: head?,
            ident: ident?,
            template_params,
            params,
            is_variadic,
            is_const,
            is_property,
            body,
            range,
        })
    }

    fn virtual_prop(&self, pair: Pair<Rule>) -> Option<NodeVirtualProp> {
        let range = self.range(pair.as_span());
        let mut access = AccessModifier::Public;
        let mut ty = None;
        let mut ident = None;
        let mut getter = None;
        let mut setter = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::access_modifier => access = Self::access(inner.as_str()),
                Rule::type_spec => ty = Some(self.type_spec(inner)),
                Rule::identifier => ident = Some(self.ident(inner)),
                Rule::prop_accessor => {
                    let accessor_range = self.range(inner.as_span());
                    let mut kind = "";
                    let mut is_const = false;
                    let mut body = None;
                    for part in inner.into_inner() {
                        match part.as_rule() {
                            Rule::prop_kind => kind = part.as_str(),
                            Rule::const_mod => is_const = true,
                            Rule::stat_block => body = Some(self.stat_block(part)),
                            _ => {}
                        }
                    }
                    let accessor = PropAccessor {
                        is_const,
                        body,
                        range: accessor_range,
                    };
                    if kind == "get" {
                        getter = Some(accessor);
                    } else {
                        setter = Some(accessor);
                    }
                }
                _ => {}
            }
        }
        Some(NodeVirtualProp {
            access,
            ty: ty?,
            ident: ident?,
            getter,
            setter,
            range,
        })
    }

    fn var(&self, pair: Pair<Rule>) -> Option<NodeVar> {
        let range = self.range(pair.as_span());
        let mut access = AccessModifier::Public;
        let mut ty = None;
        let mut declarators = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::access_modifier => access = Self::access(inner.as_str()),
                Rule::type_spec => ty = Some(self.type_spec(inner)),
                Rule::var_declarator => {
                    let mut ident = None;
                    let mut init = None;
                    for part in inner.into_inner() {
                        match part.as_rule() {
                            Rule::identifier => ident = Some(self.ident(part)),
                            Rule::assign => init = Some(VarInit::Expr(self.expr(part))),
                            Rule::arg_list => {
                                init = Some(VarInit::ArgList(self.args(inner_args(part))));
                            }
                            _ => {}
                        }
                    }
                    if let Some(ident) = ident {
                        declarators.push(VarDeclarator { ident, init });
                    }
                }
                _ => {}
            }
        }
        Some(NodeVar {
            access,
            ty: ty?,
            declarators,
            range,
        })
    }

    fn access(text: &str) -> AccessModifier {
        match text {
            "private" => AccessModifier::Private,
            "protected" => AccessModifier::Protected,
            _ => AccessModifier::Public,
        }
    }

    fn ref_kind(text: &str) -> Option<RefKind> {
        if text.contains("inout") {
            Some(RefKind::InOut)
        } else if text.contains("in") {
            Some(RefKind::In)
        } else if text.contains("out") {
            Some(RefKind::Out)
        } else {
            Some(RefKind::InOut)
        }
    }

    fn param_list(&self, pair: Pair<Rule>) -> (Vec<NodeParam>, bool) {
        let mut params = Vec::new();
        let mut is_variadic = false;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::variadic_param => is_variadic = true,
                Rule::param => {
                    let mut ty = None;
                    let mut ref_kind = None;
                    let mut ident = None;
                    let mut default_value = None;
                    for part in inner.into_inner() {
                        match part.as_rule() {
                            Rule::type_spec => ty = Some(self.type_spec(part)),
                            Rule::ref_mod => ref_kind = Self::ref_kind(part.as_str()),
                            Rule::identifier => ident = Some(self.ident(part)),
                            Rule::assign => default_value = Some(self.expr(part)),
                            _ => {}
                        }
                    }
                    let Some(mut ty) = ty else { continue };
                    ty.ref_kind = ref_kind;
                    // `f(void)` is an empty parameter list
                    if ident.is_none() && ty.name.ident.text == "void" && !ty.is_handle {
                        continue;
                    }
                    params.push(NodeParam {
                        ty,
                        ident,
                        has_default: default_value.is_some(),
                        default_value,
                    });
                }
                _ => {}
            }
        }
        (params, is_variadic)
    }

    // -----------------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------------

    fn qualified_ident(&self, pair: Pair<Rule>) -> NodeQualifiedIdent {
        let range = self.range(pair.as_span());
        let mut is_global = false;
        let mut has_trailing = false;
        let mut idents = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::global_scope => is_global = true,
                Rule::trailing_scope => has_trailing = true,
                Rule::identifier => idents.push(self.ident(inner)),
                _ => {}
            }
        }
        let ident = if has_trailing {
            Self::empty_ident(range.end)
        } else {
            idents.pop().unwrap_or_else(|| Self::empty_ident(range.end))
        };
        let scope = if is_global || !idents.is_empty() {
            let scope_end = if has_trailing { range.end } else { ident.range.start };
            Some(NodeScopeQualifier {
                is_global,
                segments: idents,
                range: TextRange::new(range.start, scope_end),
            })
        } else {
            None
        };
        NodeQualifiedIdent {
            scope,
            ident,
            range,
        }
    }

    fn type_spec(&self, pair: Pair<Rule>) -> NodeType {
        let range = self.range(pair.as_span());
        let mut ty = NodeType {
            is_const: false,
            is_any: false,
            name: NodeQualifiedIdent {
                scope: None,
                ident: Self::empty_ident(range.start),
                range,
            },
            template_args: Vec::new(),
            array_dims: 0,
            is_handle: false,
            ref_kind: None,
            range,
        };
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::const_mod => ty.is_const = true,
                Rule::any_type => {
                    ty.is_any = true;
                    ty.name.ident = IdentToken::new("?", self.range(inner.as_span()));
                }
                Rule::qualified_ident => ty.name = self.qualified_ident(inner),
                Rule::template_args => {
                    ty.template_args = inner
                        .into_inner()
                        .filter(|p| p.as_rule() == Rule::type_spec)
                        .map(|p| self.type_spec(p))
                        .collect();
                }
                Rule::type_suffix => {
                    for suffix in inner.into_inner() {
                        match suffix.as_rule() {
                            Rule::array_suffix => ty.array_dims += 1,
                            Rule::handle_suffix => ty.is_handle = true,
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        ty
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    fn stat_block(&self, pair: Pair<Rule>) -> NodeStatBlock {
        let range = self.range(pair.as_span());
        let statements = pair
            .into_inner()
            .map(|p| self.statement(p))
            .collect();
        NodeStatBlock { statements, range }
    }

    fn statement(&self, pair: Pair<Rule>) -> NodeStatement {
        let range = self.range(pair.as_span());
        match pair.as_rule() {
            Rule::stat_block => NodeStatement::Block(self.stat_block(pair)),
            Rule::if_stat => {
                let mut cond = None;
                let mut branches = Vec::new();
                for inner in pair.into_inner() {
                    match inner.as_rule() {
                        Rule::assign => cond = Some(self.expr(inner)),
                        Rule::kw_else => {}
                        _ => branches.push(self.statement(inner)),
                    }
                }
                let mut branches = branches.into_iter();
                NodeStatement::If {
                    cond: cond.unwrap_or_else(|| null_expr(range)),
                    then_branch: Box::new(branches.next().unwrap_or(NodeStatement::Empty)),
                    else_branch: branches.next().map(Box::new),
                }
            }
            Rule::while_stat => {
                let mut cond = None;
                let mut body = None;
                for inner in pair.into_inner() {
                    if inner.as_rule() == Rule::assign {
                        cond = Some(self.expr(inner));
                    } else {
                        body = Some(self.statement(inner));
                    }
                }
                NodeStatement::While {
                    cond: cond.unwrap_or_else(|| null_expr(range)),
                    body: Box::new(body.unwrap_or(NodeStatement::Empty)),
                }
            }
            Rule::dowhile_stat => {
                let mut cond = None;
                let mut body = None;
                for inner in pair.into_inner() {
                    if inner.as_rule() == Rule::assign {
                        cond = Some(self.expr(inner));
                    } else {
                        body = Some(self.statement(inner));
                    }
                }
                NodeStatement::DoWhile {
                    body: Box::new(body.unwrap_or(NodeStatement::Empty)),
                    cond: cond.unwrap_or_else(|| null_expr(range)),
                }
            }
            Rule::for_stat => {
                let mut init = None;
                let mut cond = None;
                let mut update = Vec::new();
                let mut body = None;
                for inner in pair.into_inner() {
                    match inner.as_rule() {
                        Rule::for_cond => {
                            cond = inner.into_inner().next().map(|p| self.expr(p));
                        }
                        Rule::for_update => {
                            update = inner.into_inner().map(|p| self.expr(p)).collect();
                        }
                        Rule::var_decl_stat | Rule::expr_stat | Rule::empty_stat
                            if init.is_none() && body.is_none() =>
                        {
                            init = Some(Box::new(self.statement(inner)));
                        }
                        _ => body = Some(self.statement(inner)),
                    }
                }
                NodeStatement::For {
                    init,
                    cond,
                    update,
                    body: Box::new(body.unwrap_or(NodeStatement::Empty)),
                }
            }
            Rule::switch_stat => {
                let mut cond = None;
                let mut cases = Vec::new();
                for inner in pair.into_inner() {
                    match inner.as_rule() {
                        Rule::assign => cond = Some(self.expr(inner)),
                        Rule::switch_case => {
                            let mut label = None;
                            let mut statements = Vec::new();
                            for part in inner.into_inner() {
                                if part.as_rule() == Rule::assign {
                                    label = Some(self.expr(part));
                                } else {
                                    statements.push(self.statement(part));
                                }
                            }
                            cases.push(SwitchCase { label, statements });
                        }
                        _ => {}
                    }
                }
                NodeStatement::Switch {
                    cond: cond.unwrap_or_else(|| null_expr(range)),
                    cases,
                }
            }
            Rule::return_stat => NodeStatement::Return {
                value: pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::assign)
                    .map(|p| self.expr(p)),
                range,
            },
            Rule::break_stat => NodeStatement::Break(range),
            Rule::continue_stat => NodeStatement::Continue(range),
            Rule::var_decl_stat => match self.var(pair) {
                Some(var) => NodeStatement::Var(Arc::new(var)),
                None => NodeStatement::Empty,
            },
            Rule::expr_stat => match pair.into_inner().next() {
                Some(inner) => NodeStatement::Expr(self.expr(inner)),
                None => NodeStatement::Empty,
            },
            _ => NodeStatement::Empty,
        }
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    pub fn expr(&self, pair: Pair<Rule>) -> NodeExpr {
        let range = self.range(pair.as_span());
        match pair.as_rule() {
            Rule::assign => {
                let mut inner = pair.into_inner();
                let Some(first) = inner.next() else {
                    return null_expr(range);
                };
                let lhs = self.expr(first);
                match (inner.next(), inner.next()) {
                    (Some(op), Some(rhs)) => NodeExpr::Assign {
                        op: op.as_str().to_string(),
                        op_range: self.range(op.as_span()),
                        lhs: Box::new(lhs),
                        rhs: Box::new(self.expr(rhs)),
                    },
                    _ => lhs,
                }
            }
            Rule::ternary => {
                let mut inner = pair.into_inner();
                let Some(first) = inner.next() else {
                    return null_expr(range);
                };
                let cond = self.expr(first);
                match (inner.next(), inner.next()) {
                    (Some(then_pair), Some(else_pair)) => NodeExpr::Ternary {
                        cond: Box::new(cond),
                        then_expr: Box::new(self.expr(then_pair)),
                        else_expr: Box::new(self.expr(else_pair)),
                    },
                    _ => cond,
                }
            }
            Rule::logic_or
            | Rule::logic_and
            | Rule::bit_or
            | Rule::bit_xor
            | Rule::bit_and
            | Rule::equality
            | Rule::relational
            | Rule::shift
            | Rule::additive
            | Rule::multiplicative
            | Rule::exponent => {
                let mut inner = pair.into_inner();
                let Some(first) = inner.next() else {
                    return null_expr(range);
                };
                let mut lhs = self.expr(first);
                while let (Some(op), Some(rhs)) = (inner.next(), inner.next()) {
                    lhs = NodeExpr::Binary {
                        op: op.as_str().to_string(),
                        op_range: self.range(op.as_span()),
                        lhs: Box::new(lhs),
                        rhs: Box::new(self.expr(rhs)),
                    };
                }
                lhs
            }
            Rule::unary => {
                let mut ops = Vec::new();
                let mut operand = None;
                for inner in pair.into_inner() {
                    if inner.as_rule() == Rule::op_unary {
                        ops.push((inner.as_str().to_string(), self.range(inner.as_span())));
                    } else {
                        operand = Some(self.expr(inner));
                    }
                }
                let mut expr = operand.unwrap_or_else(|| null_expr(range));
                for (op, op_range) in ops.into_iter().rev() {
                    expr = NodeExpr::Unary {
                        op,
                        op_range,
                        expr: Box::new(expr),
                    };
                }
                expr
            }
            Rule::postfix => self.postfix(pair),
            Rule::literal => self.literal(pair),
            Rule::cast_expr => self.cast(pair),
            Rule::paren_expr => match pair.into_inner().next() {
                Some(inner) => NodeExpr::Paren(Box::new(self.expr(inner))),
                None => null_expr(range),
            },
            Rule::var_access => self.var_access(pair),
            _ => null_expr(range),
        }
    }

    fn postfix(&self, pair: Pair<Rule>) -> NodeExpr {
        let range = self.range(pair.as_span());
        let mut inner = pair.into_inner();
        let Some(first) = inner.next() else {
            return null_expr(range);
        };
        let mut expr = self.expr(first);
        for op in inner {
            let op_range = self.range(op.as_span());
            match op.as_rule() {
                Rule::member_access => {
                    let mut ident = None;
                    let mut template_args = Vec::new();
                    for part in op.into_inner() {
                        match part.as_rule() {
                            Rule::identifier => ident = Some(self.ident(part)),
                            Rule::template_args => {
                                template_args = part
                                    .into_inner()
                                    .filter(|p| p.as_rule() == Rule::type_spec)
                                    .map(|p| self.type_spec(p))
                                    .collect();
                            }
                            _ => {}
                        }
                    }
                    expr = NodeExpr::Member {
                        base: Box::new(expr),
                        ident: ident.unwrap_or_else(|| Self::empty_ident(op_range.end)),
                        template_args,
                    };
                }
                Rule::arg_list => {
                    expr = NodeExpr::Call {
                        callee: Box::new(expr),
                        args: self.args(inner_args(op)),
                        args_range: op_range,
                    };
                }
                Rule::index_op => {
                    expr = NodeExpr::Index {
                        base: Box::new(expr),
                        args: self.args(inner_args(op)),
                        args_range: op_range,
                    };
                }
                Rule::op_postincdec => {
                    expr = NodeExpr::PostIncDec {
                        op: op.as_str().to_string(),
                        op_range,
                        expr: Box::new(expr),
                    };
                }
                _ => {}
            }
        }
        expr
    }

    fn literal(&self, pair: Pair<Rule>) -> NodeExpr {
        let range = self.range(pair.as_span());
        let Some(inner) = pair.into_inner().next() else {
            return null_expr(range);
        };
        let text = inner.as_str().to_string();
        let kind = match inner.as_rule() {
            Rule::number => classify_number(&text),
            Rule::string_lit => LiteralKind::String,
            Rule::bool_lit => LiteralKind::Bool,
            Rule::null_lit => LiteralKind::Null,
            _ => LiteralKind::Null,
        };
        NodeExpr::Literal { kind, text, range }
    }

    fn cast(&self, pair: Pair<Rule>) -> NodeExpr {
        let range = self.range(pair.as_span());
        let mut ty = None;
        let mut expr = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::type_spec => ty = Some(self.type_spec(inner)),
                Rule::assign => expr = Some(self.expr(inner)),
                _ => {}
            }
        }
        match (ty, expr) {
            (Some(ty), Some(expr)) => NodeExpr::Cast {
                ty,
                expr: Box::new(expr),
                range,
            },
            _ => null_expr(range),
        }
    }

    fn var_access(&self, pair: Pair<Rule>) -> NodeExpr {
        let mut name = None;
        let mut template_args = Vec::new();
        let range = self.range(pair.as_span());
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::qualified_ident => name = Some(self.qualified_ident(inner)),
                Rule::template_args => {
                    template_args = inner
                        .into_inner()
                        .filter(|p| p.as_rule() == Rule::type_spec)
                        .map(|p| self.type_spec(p))
                        .collect();
                }
                _ => {}
            }
        }
        match name {
            Some(name) => NodeExpr::Ident {
                name,
                template_args,
            },
            None => null_expr(range),
        }
    }

    fn args(&self, pairs: Vec<Pair<Rule>>) -> Vec<NodeArg> {
        pairs
            .into_iter()
            .map(|arg| {
                let range = self.range(arg.as_span());
                let mut name = None;
                let mut expr = None;
                for part in arg.into_inner() {
                    match part.as_rule() {
                        Rule::arg_name => {
                            if let Some(id) = part.into_inner().next() {
                                name = Some(self.ident(id));
                            }
                        }
                        Rule::assign => expr = Some(self.expr(part)),
                        _ => {}
                    }
                }
                NodeArg {
                    name,
                    expr: expr.unwrap_or_else(|| null_expr(range)),
                    range,
                }
            })
            .collect()
    }
}

fn inner_args(pair: Pair<Rule>) -> Vec<Pair<Rule>> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::argument)
        .collect()
}

fn null_expr(range: TextRange) -> NodeExpr {
    NodeExpr::Literal {
        kind: LiteralKind::Null,
        text: String::new(),
        range,
    }
}

fn classify_number(text: &str) -> LiteralKind {
    if text.starts_with("0x") || text.starts_with("0X") {
        return LiteralKind::Int;
    }
    let has_fraction = text.contains('.') || text.contains('e') || text.contains('E');
    if text.ends_with('f') || text.ends_with('F') {
        LiteralKind::Float
    } else if has_fraction {
        LiteralKind::Double
    } else {
        LiteralKind::Int
    }
}
