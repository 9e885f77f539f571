//! Expression evaluation: every expression yields an intermediate
//! [`ResolvedType`], recording references, diagnostics and complement
//! hints along the way. Unresolved values propagate silently so one
//! missing name does not cascade.

use crate::core::TextRange;
use crate::semantic::builtin;
use crate::semantic::context::AnalysisContext;
use crate::semantic::hints::ComplementHint;
use crate::semantic::operators::{
    INDEX_METHOD, assign_operator_method, binary_operator_method, postfix_operator_method,
    prefix_operator_method,
};
use crate::semantic::overload::{OverloadError, conversion_cost, derives_from, select_overload};
use crate::semantic::resolved_type::{ResolvedType, TemplateTranslator, TypeSource};
use crate::semantic::scope::{ScopeId, ScopeLinkedNode, SymbolGlobalScope};
use crate::semantic::symbol::{PrimitiveKind, Symbol, SymbolFunction, SymbolHolder, SymbolType, TypeKind};
use crate::semantic::typing::{analyze_type, resolve_qualifier};
use crate::syntax::ast::{
    AccessModifier, IdentToken, LiteralKind, NodeArg, NodeExpr, NodeQualifiedIdent, NodeType,
};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

pub(crate) fn analyze_expr(ctx: &mut AnalysisContext, scope: ScopeId, expr: &NodeExpr) -> ResolvedType {
    match expr {
        NodeExpr::Literal { kind, .. } => literal_type(ctx, scope, *kind),
        NodeExpr::Ident {
            name,
            template_args,
        } => ident_value(ctx, scope, name, template_args),
        NodeExpr::Paren(inner) => analyze_expr(ctx, scope, inner),
        NodeExpr::Cast { ty, expr, .. } => {
            let target = analyze_type(ctx, scope, ty);
            analyze_expr(ctx, scope, expr);
            target
        }
        NodeExpr::Unary {
            op,
            op_range,
            expr,
        } => {
            let operand = analyze_expr(ctx, scope, expr);
            unary_result(ctx, scope, op, *op_range, operand)
        }
        NodeExpr::PostIncDec {
            op,
            op_range,
            expr,
        } => {
            let operand = analyze_expr(ctx, scope, expr);
            postfix_result(ctx, scope, op, *op_range, operand)
        }
        NodeExpr::Binary {
            op,
            op_range,
            lhs,
            rhs,
        } => {
            let left = analyze_expr(ctx, scope, lhs);
            let right = analyze_expr(ctx, scope, rhs);
            binary_result(ctx, scope, op, *op_range, left, right)
        }
        NodeExpr::Assign {
            op,
            op_range,
            lhs,
            rhs,
        } => {
            let left = analyze_expr(ctx, scope, lhs);
            let right = analyze_expr(ctx, scope, rhs);
            assign_result(ctx, scope, op, *op_range, left, right)
        }
        NodeExpr::Ternary {
            cond,
            then_expr,
            else_expr,
        } => {
            analyze_expr(ctx, scope, cond);
            let then_ty = analyze_expr(ctx, scope, then_expr);
            let else_ty = analyze_expr(ctx, scope, else_expr);
            if then_ty.is_unresolved() { else_ty } else { then_ty }
        }
        NodeExpr::Member { base, ident, .. } => {
            let base_ty = analyze_expr(ctx, scope, base);
            member_value(ctx, scope, base.range(), &base_ty, ident)
        }
        NodeExpr::Call {
            callee,
            args,
            args_range,
        } => call_value(ctx, scope, callee, args, *args_range),
        NodeExpr::Index {
            base,
            args,
            args_range,
        } => {
            let base_ty = analyze_expr(ctx, scope, base);
            index_value(ctx, scope, base_ty, args, *args_range)
        }
    }
}

fn literal_type(ctx: &mut AnalysisContext, scope: ScopeId, kind: LiteralKind) -> ResolvedType {
    match kind {
        LiteralKind::Int => ResolvedType::of_type(builtin::primitive(PrimitiveKind::Int32)),
        LiteralKind::Float => ResolvedType::of_type(builtin::primitive(PrimitiveKind::Float)),
        LiteralKind::Double => ResolvedType::of_type(builtin::primitive(PrimitiveKind::Double)),
        LiteralKind::Bool => ResolvedType::of_type(builtin::primitive(PrimitiveKind::Bool)),
        LiteralKind::Null => ResolvedType::null_handle(),
        LiteralKind::String => string_type(ctx, scope),
    }
}

/// The first configured string type visible from `scope`.
pub(crate) fn string_type(ctx: &AnalysisContext, scope: ScopeId) -> ResolvedType {
    for name in &ctx.settings.builtin_string_types {
        if let Some(SymbolHolder::Type(symbol)) = ctx.global.lookup_symbol_with_parent(scope, name)
        {
            return ResolvedType::of_type(symbol.clone());
        }
    }
    ResolvedType::unresolved()
}

// ---------------------------------------------------------------------------
// Identifier access
// ---------------------------------------------------------------------------

enum IdentLookup {
    Found(SymbolHolder),
    NotFound,
    /// The qualifier already produced a diagnostic, or the identifier is an
    /// incomplete fragment kept for completion
    Silent,
}

fn lookup_ident(ctx: &mut AnalysisContext, scope: ScopeId, name: &NodeQualifiedIdent) -> IdentLookup {
    let (lookup_scope, shallow) = match &name.scope {
        Some(qualifier) => match resolve_qualifier(ctx, scope, qualifier) {
            Some(found) => (found, true),
            None => return IdentLookup::Silent,
        },
        None => (scope, false),
    };
    if name.ident.text.is_empty() {
        return IdentLookup::Silent;
    }
    let holder = if shallow {
        ctx.global.lookup_symbol(lookup_scope, &name.ident.text)
    } else {
        ctx.global.lookup_symbol_with_parent(lookup_scope, &name.ident.text)
    };
    match holder {
        Some(holder) => IdentLookup::Found(holder.clone()),
        None => IdentLookup::NotFound,
    }
}

fn ident_value(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    name: &NodeQualifiedIdent,
    _template_args: &[NodeType],
) -> ResolvedType {
    match lookup_ident(ctx, scope, name) {
        IdentLookup::Found(SymbolHolder::Variable(var)) => {
            ctx.record_reference(name.ident.range, &Symbol::Variable(var.clone()));
            var.ty.clone()
        }
        IdentLookup::Found(SymbolHolder::Type(symbol)) => {
            ctx.record_reference(name.ident.range, &Symbol::Type(symbol.clone()));
            ResolvedType::of_type(symbol)
        }
        IdentLookup::Found(SymbolHolder::Functions(overloads)) => {
            let func = overloads[0].clone();
            ctx.record_reference(name.ident.range, &Symbol::Function(func.clone()));
            ResolvedType::of_function(func)
        }
        IdentLookup::NotFound => {
            ctx.sink.error(
                format!("Unresolved identifier '{}'", name.ident.text),
                name.ident.range,
            );
            ResolvedType::unresolved()
        }
        IdentLookup::Silent => ResolvedType::unresolved(),
    }
}

// ---------------------------------------------------------------------------
// Member access
// ---------------------------------------------------------------------------

/// Shallow lookup in the members scope of `ty`, falling back through its
/// base list. Returns the holder and the members scope it was found in.
fn member_lookup(
    global: &SymbolGlobalScope,
    ty: &ResolvedType,
    name: &str,
) -> Option<(SymbolHolder, ScopeId)> {
    let symbol = ty.type_symbol()?;
    let mut visited = HashSet::new();
    member_lookup_in(global, symbol, name, &mut visited)
}

fn member_lookup_in(
    global: &SymbolGlobalScope,
    symbol: &Arc<SymbolType>,
    name: &str,
    visited: &mut HashSet<Vec<String>>,
) -> Option<(SymbolHolder, ScopeId)> {
    let members_path = symbol.members_scope.as_ref()?;
    if !visited.insert(members_path.clone()) {
        return None;
    }
    let members_scope = global.resolve_scope(members_path)?;
    if let Some(holder) = global.lookup_symbol(members_scope, name) {
        return Some((holder.clone(), members_scope));
    }
    for base in &symbol.bases {
        if let Some(TypeSource::Type(base_symbol)) = &base.source {
            if let Some(found) = member_lookup_in(global, base_symbol, name, visited) {
                return Some(found);
            }
        }
    }
    None
}

fn member_value(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    base_range: TextRange,
    base_ty: &ResolvedType,
    ident: &IdentToken,
) -> ResolvedType {
    push_member_hint(ctx, base_range, base_ty, ident);
    if ident.text.is_empty() || base_ty.is_unresolved() {
        return ResolvedType::unresolved();
    }
    match member_lookup(ctx.global, base_ty, &ident.text) {
        Some((SymbolHolder::Variable(var), owner)) => {
            ctx.record_reference(ident.range, &Symbol::Variable(var.clone()));
            check_member_access(ctx, scope, var.access, owner, &ident.text, ident.range);
            var.ty.apply_translator(base_ty.translator.as_ref())
        }
        Some((SymbolHolder::Functions(overloads), owner)) => {
            let func = overloads[0].clone();
            ctx.record_reference(ident.range, &Symbol::Function(func.clone()));
            check_member_access(ctx, scope, func.access, owner, &ident.text, ident.range);
            ResolvedType::of_function(func)
        }
        Some((SymbolHolder::Type(symbol), _)) => ResolvedType::of_type(symbol),
        None => {
            ctx.sink.error(
                format!(
                    "'{}' is not a member of '{}'",
                    ident.text,
                    base_ty.display_name()
                ),
                ident.range,
            );
            ResolvedType::unresolved()
        }
    }
}

fn push_member_hint(
    ctx: &mut AnalysisContext,
    base_range: TextRange,
    base_ty: &ResolvedType,
    ident: &IdentToken,
) {
    if base_ty.is_unresolved() {
        return;
    }
    ctx.global.hints.push(ComplementHint::AutocompleteInstanceMember {
        caret: TextRange::new(base_range.end, ident.range.end),
        target: base_ty.clone(),
    });
}

/// Private members are visible inside the declaring class body; protected
/// members also inside derived class bodies.
fn check_member_access(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    access: AccessModifier,
    owner_scope: ScopeId,
    name: &str,
    range: TextRange,
) {
    if access == AccessModifier::Public {
        return;
    }
    if scope_within(ctx.global, scope, owner_scope) {
        return;
    }
    if access == AccessModifier::Protected {
        if let (Some(current), Some(owner)) = (
            enclosing_class(ctx.global, scope),
            enclosing_class(ctx.global, owner_scope),
        ) {
            if derives_from(&current, &owner) {
                return;
            }
        }
        ctx.sink.error(
            format!("Cannot access protected member '{name}' from here"),
            range,
        );
        return;
    }
    ctx.sink.error(
        format!("Cannot access private member '{name}' from here"),
        range,
    );
}

fn scope_within(global: &SymbolGlobalScope, scope: ScopeId, ancestor: ScopeId) -> bool {
    let mut current = Some(scope);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = global.scope(id).parent;
    }
    false
}

/// The class whose member scope encloses `scope`, if any.
fn enclosing_class(global: &SymbolGlobalScope, scope: ScopeId) -> Option<Arc<SymbolType>> {
    let mut current = Some(scope);
    while let Some(id) = current {
        if matches!(
            global.scope(id).linked_node,
            Some(ScopeLinkedNode::Class(_)) | Some(ScopeLinkedNode::Interface(_))
        ) {
            let name = global.scope(id).path.last()?.clone();
            let parent = global.scope(id).parent?;
            if let Some(SymbolHolder::Type(symbol)) = global.lookup_symbol(parent, &name) {
                return Some(symbol.clone());
            }
            return None;
        }
        current = global.scope(id).parent;
    }
    None
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

fn call_value(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    callee: &NodeExpr,
    args: &[NodeArg],
    args_range: TextRange,
) -> ResolvedType {
    match callee {
        NodeExpr::Ident {
            name,
            template_args,
        } => call_on_ident(ctx, scope, name, template_args, args, args_range),
        NodeExpr::Member { base, ident, .. } => {
            let base_ty = analyze_expr(ctx, scope, base);
            call_on_member(ctx, scope, base.range(), &base_ty, ident, args, args_range)
        }
        other => {
            let callee_ty = analyze_expr(ctx, scope, other);
            analyze_args(ctx, scope, args);
            match callee_ty.function_symbol() {
                Some(func) => func.return_type.clone(),
                None => {
                    if !callee_ty.is_unresolved() {
                        ctx.sink
                            .error("Expression is not callable", other.range());
                    }
                    ResolvedType::unresolved()
                }
            }
        }
    }
}

fn call_on_ident(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    name: &NodeQualifiedIdent,
    template_args: &[NodeType],
    args: &[NodeArg],
    args_range: TextRange,
) -> ResolvedType {
    match lookup_ident(ctx, scope, name) {
        IdentLookup::Found(SymbolHolder::Functions(overloads)) => {
            let translator = call_site_translator(ctx, scope, &overloads, template_args);
            resolve_call(
                ctx,
                scope,
                &name.ident,
                overloads,
                translator,
                args,
                args_range,
            )
        }
        IdentLookup::Found(SymbolHolder::Type(symbol)) => {
            ctx.record_reference(name.ident.range, &Symbol::Type(symbol.clone()));
            let translator = type_args_translator(ctx, scope, &symbol, template_args);
            let mut constructed = construct_type(ctx, scope, &symbol, &name.ident, args, args_range);
            if translator.is_some() {
                constructed.translator = translator;
            }
            constructed
        }
        IdentLookup::Found(SymbolHolder::Variable(var)) => {
            ctx.record_reference(name.ident.range, &Symbol::Variable(var.clone()));
            analyze_args(ctx, scope, args);
            match var.ty.function_symbol() {
                Some(func) => func.return_type.clone(),
                None => {
                    if !var.ty.is_unresolved() {
                        ctx.sink.error(
                            format!("'{}' is not callable", name.ident.text),
                            name.ident.range,
                        );
                    }
                    ResolvedType::unresolved()
                }
            }
        }
        IdentLookup::NotFound => {
            ctx.sink.error(
                format!("Unresolved identifier '{}'", name.ident.text),
                name.ident.range,
            );
            analyze_args(ctx, scope, args);
            ResolvedType::unresolved()
        }
        IdentLookup::Silent => {
            analyze_args(ctx, scope, args);
            ResolvedType::unresolved()
        }
    }
}

fn call_on_member(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    base_range: TextRange,
    base_ty: &ResolvedType,
    ident: &IdentToken,
    args: &[NodeArg],
    args_range: TextRange,
) -> ResolvedType {
    push_member_hint(ctx, base_range, base_ty, ident);
    if ident.text.is_empty() || base_ty.is_unresolved() {
        analyze_args(ctx, scope, args);
        return ResolvedType::unresolved();
    }
    match member_lookup(ctx.global, base_ty, &ident.text) {
        Some((SymbolHolder::Functions(overloads), owner)) => {
            check_member_access(
                ctx,
                scope,
                overloads[0].access,
                owner,
                &ident.text,
                ident.range,
            );
            resolve_call(
                ctx,
                scope,
                ident,
                overloads,
                base_ty.translator.clone(),
                args,
                args_range,
            )
        }
        Some((SymbolHolder::Variable(var), owner)) => {
            ctx.record_reference(ident.range, &Symbol::Variable(var.clone()));
            check_member_access(ctx, scope, var.access, owner, &ident.text, ident.range);
            analyze_args(ctx, scope, args);
            match var.ty.function_symbol() {
                Some(func) => func.return_type.clone(),
                None => {
                    if !var.ty.is_unresolved() {
                        ctx.sink
                            .error(format!("'{}' is not callable", ident.text), ident.range);
                    }
                    ResolvedType::unresolved()
                }
            }
        }
        Some((SymbolHolder::Type(_), _)) => {
            analyze_args(ctx, scope, args);
            ctx.sink
                .error(format!("'{}' is not callable", ident.text), ident.range);
            ResolvedType::unresolved()
        }
        None => {
            ctx.sink.error(
                format!(
                    "'{}' is not a member of '{}'",
                    ident.text,
                    base_ty.display_name()
                ),
                ident.range,
            );
            analyze_args(ctx, scope, args);
            ResolvedType::unresolved()
        }
    }
}

/// Constructor call `Type(args)`; also covers primitive conversion calls
/// like `int(x)`.
fn construct_type(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    symbol: &Arc<SymbolType>,
    caller_ident: &IdentToken,
    args: &[NodeArg],
    args_range: TextRange,
) -> ResolvedType {
    if !matches!(symbol.kind, TypeKind::Class) {
        analyze_args(ctx, scope, args);
        return ResolvedType::of_type(symbol.clone());
    }
    let constructors = symbol
        .members_scope
        .as_ref()
        .and_then(|path| ctx.global.resolve_scope(path))
        .and_then(|members| ctx.global.lookup_symbol(members, &symbol.ident.text))
        .and_then(|holder| match holder {
            SymbolHolder::Functions(overloads) => Some(overloads.clone()),
            _ => None,
        });
    match constructors {
        Some(overloads) => {
            resolve_call(ctx, scope, caller_ident, overloads, None, args, args_range);
            ResolvedType::of_type(symbol.clone())
        }
        None => {
            analyze_args(ctx, scope, args);
            if !args.is_empty() {
                ctx.sink.error(
                    format!("'{}' has no matching constructor", symbol.ident.text),
                    caller_ident.range,
                );
            }
            ResolvedType::of_type(symbol.clone())
        }
    }
}

/// Constructor-call initializer `Obj o(a, b);`.
pub(crate) fn resolve_construction(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    ty: &ResolvedType,
    caller_ident: &IdentToken,
    args: &[NodeArg],
) -> ResolvedType {
    let args_range = args
        .iter()
        .map(|a| a.range)
        .reduce(TextRange::merge)
        .unwrap_or(caller_ident.range);
    match ty.type_symbol() {
        Some(symbol) => {
            let symbol = symbol.clone();
            construct_type(ctx, scope, &symbol, caller_ident, args, args_range)
        }
        None => {
            analyze_args(ctx, scope, args);
            ResolvedType::unresolved()
        }
    }
}

fn analyze_args(ctx: &mut AnalysisContext, scope: ScopeId, args: &[NodeArg]) -> Vec<ResolvedType> {
    args.iter()
        .map(|arg| analyze_expr(ctx, scope, &arg.expr))
        .collect()
}

/// Explicit template arguments at a call site, bound against the overload
/// set's template parameters.
fn call_site_translator(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    overloads: &[Arc<SymbolFunction>],
    template_args: &[NodeType],
) -> Option<Arc<TemplateTranslator>> {
    if template_args.is_empty() {
        return None;
    }
    let params = overloads
        .iter()
        .find(|f| !f.template_params.is_empty())
        .map(|f| f.template_params.clone())?;
    let mut bindings = IndexMap::new();
    for (param, arg) in params.iter().zip(template_args) {
        bindings.insert(param.clone(), analyze_type(ctx, scope, arg));
    }
    Some(Arc::new(TemplateTranslator { bindings }))
}

fn type_args_translator(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    symbol: &Arc<SymbolType>,
    template_args: &[NodeType],
) -> Option<Arc<TemplateTranslator>> {
    if template_args.is_empty() || symbol.template_params.is_empty() {
        return None;
    }
    let mut bindings = IndexMap::new();
    for (param, arg) in symbol.template_params.iter().zip(template_args) {
        bindings.insert(param.clone(), analyze_type(ctx, scope, arg));
    }
    Some(Arc::new(TemplateTranslator { bindings }))
}

/// Scores the overload set for a call site, emits the diagnostics and the
/// `FunctionCall` hint, and returns the chosen overload's return type.
fn resolve_call(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    caller_ident: &IdentToken,
    overloads: Vec<Arc<SymbolFunction>>,
    translator: Option<Arc<TemplateTranslator>>,
    args: &[NodeArg],
    args_range: TextRange,
) -> ResolvedType {
    let mut arg_names: Vec<Option<String>> = Vec::new();
    let mut arg_types = Vec::new();
    let mut arg_ranges = Vec::new();
    let mut seen_names: HashSet<&str> = HashSet::new();
    for arg in args {
        if let Some(name) = &arg.name {
            if !seen_names.insert(name.text.as_str()) {
                ctx.sink.error(
                    format!("Duplicate named argument '{}'", name.text),
                    name.range,
                );
            }
            if !overloads.iter().any(|f| {
                f.params
                    .iter()
                    .any(|p| p.name.as_deref() == Some(name.text.as_str()))
            }) {
                ctx.sink.error(
                    format!("Unknown named argument '{}'", name.text),
                    name.range,
                );
            }
        }
        arg_names.push(arg.name.as_ref().map(|n| n.text.clone()));
        arg_types.push(analyze_expr(ctx, scope, &arg.expr));
        arg_ranges.push(arg.range);
    }

    match select_overload(&overloads, &arg_names, &arg_types, translator.as_ref()) {
        Ok(chosen) => {
            ctx.record_reference(caller_ident.range, &Symbol::Function(chosen.func.clone()));
            let return_type = chosen.func.return_type.apply_translator(translator.as_ref());
            ctx.global.hints.push(ComplementHint::FunctionCall {
                caller_ident: caller_ident.clone(),
                arg_ranges,
                args_range,
                callee_holder: overloads,
                translator,
                selected: chosen.index,
            });
            return_type
        }
        Err(OverloadError::NoCandidate(dump)) => {
            let mut message = format!(
                "No matching overload for '{}({})'",
                caller_ident.text,
                arg_types
                    .iter()
                    .map(|t| t.display_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            for signature in dump {
                message.push_str("\n  candidate: ");
                message.push_str(&signature);
            }
            ctx.sink.error(message, caller_ident.range.merge(args_range));
            ResolvedType::unresolved()
        }
        Err(OverloadError::Ambiguous) => {
            ctx.sink.error(
                format!("Ambiguous call to '{}'", caller_ident.text),
                caller_ident.range.merge(args_range),
            );
            ResolvedType::unresolved()
        }
    }
}

fn index_value(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    base_ty: ResolvedType,
    args: &[NodeArg],
    args_range: TextRange,
) -> ResolvedType {
    let arg_types = analyze_args(ctx, scope, args);
    if base_ty.is_unresolved() {
        return ResolvedType::unresolved();
    }
    match member_lookup(ctx.global, &base_ty, INDEX_METHOD) {
        Some((SymbolHolder::Functions(overloads), _)) => {
            let names: Vec<Option<String>> = vec![None; arg_types.len()];
            match select_overload(&overloads, &names, &arg_types, base_ty.translator.as_ref()) {
                Ok(chosen) => chosen
                    .func
                    .return_type
                    .apply_translator(base_ty.translator.as_ref()),
                Err(_) => {
                    ctx.sink.error(
                        format!(
                            "No matching '{INDEX_METHOD}' on '{}'",
                            base_ty.display_name()
                        ),
                        args_range,
                    );
                    ResolvedType::unresolved()
                }
            }
        }
        _ => {
            ctx.sink.error(
                format!("Type '{}' does not support indexing", base_ty.display_name()),
                args_range,
            );
            ResolvedType::unresolved()
        }
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Quiet operator-method application: no diagnostics, no hint. Returns the
/// method's return type when an overload matches.
fn try_operator_method(
    ctx: &mut AnalysisContext,
    ty: &ResolvedType,
    method: &str,
    args: &[ResolvedType],
) -> Option<ResolvedType> {
    let (overloads, _) = match member_lookup(ctx.global, ty, method) {
        Some((SymbolHolder::Functions(overloads), owner)) => (overloads, owner),
        _ => return None,
    };
    let names: Vec<Option<String>> = vec![None; args.len()];
    select_overload(&overloads, &names, args, ty.translator.as_ref())
        .ok()
        .map(|chosen| {
            chosen
                .func
                .return_type
                .apply_translator(ty.translator.as_ref())
        })
}

fn unary_result(
    ctx: &mut AnalysisContext,
    _scope: ScopeId,
    op: &str,
    op_range: TextRange,
    operand: ResolvedType,
) -> ResolvedType {
    match op {
        "@" => operand.with_handle(true),
        "!" => ResolvedType::of_type(builtin::primitive(PrimitiveKind::Bool)),
        "+" | "-" | "~" | "++" | "--" => {
            if operand.is_unresolved() {
                return ResolvedType::unresolved();
            }
            if operand.primitive().is_some_and(|p| p.is_numeric()) {
                return operand;
            }
            if let Some(method) = prefix_operator_method(op) {
                if let Some(result) = try_operator_method(ctx, &operand, method, &[]) {
                    return result;
                }
            }
            ctx.sink.error(
                format!(
                    "Operator '{op}' is not defined for type '{}'",
                    operand.display_name()
                ),
                op_range,
            );
            ResolvedType::unresolved()
        }
        _ => ResolvedType::unresolved(),
    }
}

fn postfix_result(
    ctx: &mut AnalysisContext,
    _scope: ScopeId,
    op: &str,
    op_range: TextRange,
    operand: ResolvedType,
) -> ResolvedType {
    if operand.is_unresolved() {
        return ResolvedType::unresolved();
    }
    if operand.primitive().is_some_and(|p| p.is_numeric()) {
        return operand;
    }
    if let Some(method) = postfix_operator_method(op) {
        if let Some(result) = try_operator_method(ctx, &operand, method, &[]) {
            return result;
        }
    }
    ctx.sink.error(
        format!(
            "Operator '{op}' is not defined for type '{}'",
            operand.display_name()
        ),
        op_range,
    );
    ResolvedType::unresolved()
}

fn promote_numeric(a: PrimitiveKind, b: PrimitiveKind) -> PrimitiveKind {
    use PrimitiveKind as P;
    if a == P::Double || b == P::Double {
        P::Double
    } else if a == P::Float || b == P::Float {
        P::Float
    } else if a == P::Int64 || b == P::Int64 {
        P::Int64
    } else if a == P::Uint64 || b == P::Uint64 {
        P::Uint64
    } else {
        P::Int32
    }
}

fn binary_result(
    ctx: &mut AnalysisContext,
    _scope: ScopeId,
    op: &str,
    op_range: TextRange,
    lhs: ResolvedType,
    rhs: ResolvedType,
) -> ResolvedType {
    let bool_ty = || ResolvedType::of_type(builtin::primitive(PrimitiveKind::Bool));

    if op == "is" || op == "!is" || op == "&&" || op == "||" {
        return bool_ty();
    }
    if lhs.is_unresolved() || rhs.is_unresolved() {
        return if matches!(op, "==" | "!=" | "<" | "<=" | ">" | ">=") {
            bool_ty()
        } else {
            ResolvedType::unresolved()
        };
    }

    let numeric_pair = lhs
        .primitive()
        .zip(rhs.primitive())
        .filter(|(a, b)| a.is_numeric() && b.is_numeric());

    match op {
        "==" | "!=" => {
            if conversion_cost(&lhs, &rhs).is_some() || conversion_cost(&rhs, &lhs).is_some() {
                return bool_ty();
            }
            // `a == b` may resolve through `a.opEquals(b)`, then commuted
            // through `b.opEquals(a)`.
            if try_operator_method(ctx, &lhs, "opEquals", &[rhs.clone()]).is_some()
                || try_operator_method(ctx, &rhs, "opEquals", &[lhs.clone()]).is_some()
            {
                return bool_ty();
            }
            operator_mismatch(ctx, op, op_range, &lhs, &rhs);
            bool_ty()
        }
        "<" | "<=" | ">" | ">=" => {
            if numeric_pair.is_some() {
                return bool_ty();
            }
            if try_operator_method(ctx, &lhs, "opCmp", &[rhs.clone()]).is_some()
                || try_operator_method(ctx, &rhs, "opCmp", &[lhs.clone()]).is_some()
            {
                return bool_ty();
            }
            operator_mismatch(ctx, op, op_range, &lhs, &rhs);
            bool_ty()
        }
        _ => {
            if let Some((a, b)) = numeric_pair {
                return ResolvedType::of_type(builtin::primitive(promote_numeric(a, b)));
            }
            if let Some((direct, reversed)) = binary_operator_method(op) {
                if let Some(result) = try_operator_method(ctx, &lhs, direct, &[rhs.clone()]) {
                    return result;
                }
                if let Some(result) = try_operator_method(ctx, &rhs, reversed, &[lhs.clone()]) {
                    return result;
                }
            }
            operator_mismatch(ctx, op, op_range, &lhs, &rhs);
            ResolvedType::unresolved()
        }
    }
}

fn assign_result(
    ctx: &mut AnalysisContext,
    _scope: ScopeId,
    op: &str,
    op_range: TextRange,
    lhs: ResolvedType,
    rhs: ResolvedType,
) -> ResolvedType {
    if lhs.is_unresolved() || rhs.is_unresolved() {
        return lhs;
    }
    if op == "=" {
        if conversion_cost(&rhs, &lhs).is_some() {
            return lhs;
        }
        if try_operator_method(ctx, &lhs, "opAssign", &[rhs.clone()]).is_some() {
            return lhs;
        }
        ctx.sink.error(
            format!(
                "Type mismatch: cannot convert '{}' to '{}'",
                rhs.display_name(),
                lhs.display_name()
            ),
            op_range,
        );
        return lhs;
    }

    let numeric = lhs
        .primitive()
        .zip(rhs.primitive())
        .is_some_and(|(a, b)| a.is_numeric() && b.is_numeric());
    if numeric {
        return lhs;
    }
    if let Some(method) = assign_operator_method(op) {
        if let Some(result) = try_operator_method(ctx, &lhs, method, &[rhs.clone()]) {
            return result;
        }
    }
    operator_mismatch(ctx, op, op_range, &lhs, &rhs);
    lhs
}

fn operator_mismatch(
    ctx: &mut AnalysisContext,
    op: &str,
    op_range: TextRange,
    lhs: &ResolvedType,
    rhs: &ResolvedType,
) {
    ctx.sink.error(
        format!(
            "Operator '{op}' is not defined for types '{}' and '{}'",
            lhs.display_name(),
            rhs.display_name()
        ),
        op_range,
    );
}
