//! Analyze: the second semantic pass.
//!
//! Drains the analyze queue built during hoist. Each task owns a scope and
//! an AST fragment; tasks are independent of one another and run FIFO.

mod expr;

pub(crate) use expr::analyze_expr;

use crate::semantic::context::{AnalysisContext, AnalysisQueues, DeferredAnalyze};
use crate::semantic::diagnostics::{Diagnostic, DiagnosticSink};
use crate::semantic::hints::{ComplementHint, ScopeRegion};
use crate::semantic::hoist;
use crate::semantic::overload::conversion_cost;
use crate::semantic::resolved_type::ResolvedType;
use crate::semantic::scope::{ScopeId, ScopeLinkedNode, SymbolGlobalScope};
use crate::semantic::settings::AnalyzerSettings;
use crate::semantic::symbol::{PrimitiveKind, Symbol, SymbolFunction, SymbolHolder, SymbolVariable};
use crate::semantic::typing::analyze_type;
use crate::syntax::ast::{
    FuncHead, NodeEnum, NodeFunc, NodeScript, NodeStatement, NodeVar, NodeVirtualProp, VarInit,
};
use std::sync::Arc;

/// Result of one full hoist+analyze run over a file.
#[derive(Debug)]
pub struct AnalysisOutput {
    pub scope: SymbolGlobalScope,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs both passes over a parsed script. Include scopes (the analyzed
/// global scopes of dependencies) are merged into the fresh global scope
/// before hoisting, making cross-file lookup uniform.
pub fn analyze_script(
    uri: &str,
    script: &NodeScript,
    includes: &[Arc<SymbolGlobalScope>],
    settings: &AnalyzerSettings,
) -> AnalysisOutput {
    let mut global = SymbolGlobalScope::new(uri);
    for include in includes {
        global.include_scope(include);
    }
    let mut sink = DiagnosticSink::new();
    let mut queues = AnalysisQueues::default();
    {
        let mut ctx = AnalysisContext {
            global: &mut global,
            sink: &mut sink,
            settings,
        };
        hoist::run_hoist(&mut ctx, &mut queues, &script.items);
        while let Some(task) = queues.analyze.pop_front() {
            run_analyze_task(&mut ctx, task);
        }
    }
    AnalysisOutput {
        scope: global,
        diagnostics: sink.into_vec(),
    }
}

fn run_analyze_task(ctx: &mut AnalysisContext, task: DeferredAnalyze) {
    match task {
        DeferredAnalyze::FuncBody { scope, node } => analyze_func_body(ctx, scope, &node),
        DeferredAnalyze::VarInit { scope, node } => analyze_var_init(ctx, scope, &node),
        DeferredAnalyze::PropBody {
            scope,
            node,
            is_getter,
        } => analyze_prop_body(ctx, scope, &node, is_getter),
        DeferredAnalyze::EnumValues { scope, node } => analyze_enum_values(ctx, scope, &node),
    }
}

fn analyze_func_body(ctx: &mut AnalysisContext, scope: ScopeId, node: &Arc<NodeFunc>) {
    if let Some(body) = &node.body {
        analyze_statements(ctx, scope, &body.statements);
    }
}

fn analyze_prop_body(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    node: &Arc<NodeVirtualProp>,
    is_getter: bool,
) {
    let accessor = if is_getter { &node.getter } else { &node.setter };
    if let Some(body) = accessor.as_ref().and_then(|a| a.body.as_ref()) {
        analyze_statements(ctx, scope, &body.statements);
    }
}

fn analyze_enum_values(ctx: &mut AnalysisContext, scope: ScopeId, node: &Arc<NodeEnum>) {
    for member in &node.members {
        if let Some(value) = &member.value {
            analyze_expr(ctx, scope, value);
        }
    }
}

/// Script-level and member variable initializers (declared types were
/// resolved during hoist; `auto` resolves here from the initializer).
fn analyze_var_init(ctx: &mut AnalysisContext, scope: ScopeId, node: &Arc<NodeVar>) {
    let declared_auto = node.ty.name.ident.text == "auto";
    let mut auto_hinted = false;
    for declarator in &node.declarators {
        let declared = match ctx.global.lookup_symbol(scope, &declarator.ident.text) {
            // Skip declarators that lost a duplicate-declaration collision
            Some(SymbolHolder::Variable(var)) if var.ident.range == declarator.ident.range => {
                var.clone()
            }
            _ => continue,
        };
        match &declarator.init {
            Some(VarInit::Expr(init)) => {
                let init_ty = analyze_expr(ctx, scope, init);
                if declared_auto {
                    let rebuilt = Arc::new(SymbolVariable {
                        ty: init_ty.clone(),
                        ..(*declared).clone()
                    });
                    ctx.global.replace_variable(scope, rebuilt);
                    if !auto_hinted {
                        ctx.global.hints.push(ComplementHint::AutoTypeResolution {
                            auto_range: node.ty.name.ident.range,
                            ty: init_ty,
                        });
                        auto_hinted = true;
                    }
                } else {
                    check_assignable(ctx, &init_ty, &declared.ty, init.range());
                }
            }
            Some(VarInit::ArgList(args)) => {
                expr::resolve_construction(ctx, scope, &declared.ty, &node.ty.name.ident, args);
            }
            None => {
                if declared_auto {
                    ctx.sink.error(
                        format!("Unable to infer the type of '{}'", declarator.ident.text),
                        declarator.ident.range,
                    );
                }
            }
        }
    }
}

pub(crate) fn analyze_statements(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    statements: &[NodeStatement],
) {
    for statement in statements {
        analyze_statement(ctx, scope, statement);
    }
}

fn analyze_statement(ctx: &mut AnalysisContext, scope: ScopeId, statement: &NodeStatement) {
    match statement {
        NodeStatement::Block(block) => {
            let inner = ctx
                .global
                .insert_anonymous_scope(scope, Some(ScopeLinkedNode::Block));
            ctx.global.scope_regions.push(ScopeRegion {
                scope: inner,
                range: block.range,
            });
            analyze_statements(ctx, inner, &block.statements);
        }
        NodeStatement::If {
            cond,
            then_branch,
            else_branch,
        } => {
            check_condition(ctx, scope, cond);
            analyze_statement(ctx, scope, then_branch);
            if let Some(else_branch) = else_branch {
                analyze_statement(ctx, scope, else_branch);
            }
        }
        NodeStatement::While { cond, body } => {
            check_condition(ctx, scope, cond);
            analyze_statement(ctx, scope, body);
        }
        NodeStatement::DoWhile { body, cond } => {
            analyze_statement(ctx, scope, body);
            check_condition(ctx, scope, cond);
        }
        NodeStatement::For {
            init,
            cond,
            update,
            body,
        } => {
            let inner = ctx
                .global
                .insert_anonymous_scope(scope, Some(ScopeLinkedNode::Block));
            if let Some(init) = init {
                analyze_statement(ctx, inner, init);
            }
            if let Some(cond) = cond {
                check_condition(ctx, inner, cond);
            }
            for update in update {
                analyze_expr(ctx, inner, update);
            }
            analyze_statement(ctx, inner, body);
        }
        NodeStatement::Switch { cond, cases } => {
            analyze_expr(ctx, scope, cond);
            let inner = ctx
                .global
                .insert_anonymous_scope(scope, Some(ScopeLinkedNode::Block));
            for case in cases {
                if let Some(label) = &case.label {
                    analyze_expr(ctx, inner, label);
                }
                analyze_statements(ctx, inner, &case.statements);
            }
        }
        NodeStatement::Return { value, range } => analyze_return(ctx, scope, value, *range),
        NodeStatement::Var(node) => analyze_local_var(ctx, scope, node),
        NodeStatement::Expr(expr) => {
            analyze_expr(ctx, scope, expr);
        }
        NodeStatement::Break(_) | NodeStatement::Continue(_) | NodeStatement::Empty => {}
    }
}

fn check_condition(ctx: &mut AnalysisContext, scope: ScopeId, cond: &crate::syntax::ast::NodeExpr) {
    let ty = analyze_expr(ctx, scope, cond);
    if ty.is_unresolved() || ty.is_class_like() {
        return;
    }
    if ty.primitive() != Some(PrimitiveKind::Bool) {
        ctx.sink.error(
            format!(
                "Type mismatch: condition must be 'bool', not '{}'",
                ty.display_name()
            ),
            cond.range(),
        );
    }
}

fn analyze_return(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    value: &Option<crate::syntax::ast::NodeExpr>,
    range: crate::core::TextRange,
) {
    let func = enclosing_function(ctx.global, scope);
    match (func, value) {
        (Some(func), Some(value)) => {
            let ty = analyze_expr(ctx, scope, value);
            if is_constructor(&func) {
                ctx.sink
                    .error("A constructor cannot return a value", value.range());
            } else if func.return_type.is_void() {
                ctx.sink
                    .error("A void function cannot return a value", value.range());
            } else {
                check_assignable(ctx, &ty, &func.return_type, value.range());
            }
        }
        (Some(func), None) => {
            if !is_constructor(&func)
                && !func.return_type.is_void()
                && !func.return_type.is_unresolved()
            {
                ctx.sink.error(
                    format!(
                        "This function must return a value of type '{}'",
                        func.return_type.display_name()
                    ),
                    range,
                );
            }
        }
        (None, Some(value)) => {
            analyze_expr(ctx, scope, value);
        }
        (None, None) => {}
    }
}

fn is_constructor(func: &SymbolFunction) -> bool {
    func.node
        .as_ref()
        .is_some_and(|n| matches!(n.head, FuncHead::Constructor))
}

/// The function whose (possibly nested) body scope contains `scope`,
/// matched back to its overload through the holder-scope naming.
pub(crate) fn enclosing_function(
    global: &SymbolGlobalScope,
    scope: ScopeId,
) -> Option<Arc<SymbolFunction>> {
    let mut current = Some(scope);
    let mut body = None;
    while let Some(id) = current {
        if matches!(global.scope(id).linked_node, Some(ScopeLinkedNode::Func(_))) {
            body = Some(id);
            break;
        }
        current = global.scope(id).parent;
    }
    let body = body?;
    let holder_scope = global.scope(body).parent?;
    let outer = global.scope(holder_scope).parent?;
    let name = global.scope(holder_scope).path.last()?.clone();
    let SymbolHolder::Functions(overloads) = global.lookup_symbol(outer, &name)? else {
        return None;
    };
    let body_path = global.path_of(body);
    overloads
        .iter()
        .find(|f| f.body_scope.as_ref() == Some(body_path))
        .cloned()
}

fn analyze_local_var(ctx: &mut AnalysisContext, scope: ScopeId, node: &Arc<NodeVar>) {
    let declared_auto = node.ty.name.ident.text == "auto";
    let declared_ty = if declared_auto {
        ResolvedType::unresolved()
    } else {
        analyze_type(ctx, scope, &node.ty)
    };
    let mut auto_hinted = false;

    for declarator in &node.declarators {
        let (var_ty, check) = match (&declarator.init, declared_auto) {
            (Some(VarInit::Expr(init)), true) => {
                let init_ty = analyze_expr(ctx, scope, init);
                if !auto_hinted {
                    ctx.global.hints.push(ComplementHint::AutoTypeResolution {
                        auto_range: node.ty.name.ident.range,
                        ty: init_ty.clone(),
                    });
                    auto_hinted = true;
                }
                (init_ty, None)
            }
            (Some(VarInit::Expr(init)), false) => {
                let init_ty = analyze_expr(ctx, scope, init);
                (declared_ty.clone(), Some((init_ty, init.range())))
            }
            (Some(VarInit::ArgList(args)), _) => {
                expr::resolve_construction(ctx, scope, &declared_ty, &node.ty.name.ident, args);
                (declared_ty.clone(), None)
            }
            (None, true) => {
                ctx.sink.error(
                    format!("Unable to infer the type of '{}'", declarator.ident.text),
                    declarator.ident.range,
                );
                (ResolvedType::unresolved(), None)
            }
            (None, false) => (declared_ty.clone(), None),
        };

        let variable = Arc::new(SymbolVariable {
            ident: declarator.ident.clone(),
            uri: ctx.global.uri.clone(),
            scope_path: ctx.global.path_of(scope).clone(),
            ty: var_ty.clone(),
            is_instance_member: false,
            access: crate::syntax::ast::AccessModifier::Public,
        });
        ctx.global
            .insert_symbol_and_check(scope, Symbol::Variable(variable), ctx.sink);

        if let Some((init_ty, range)) = check {
            check_assignable(ctx, &init_ty, &var_ty, range);
        }
    }
}

/// Type-mismatch diagnostic when no implicit conversion exists.
pub(crate) fn check_assignable(
    ctx: &mut AnalysisContext,
    from: &ResolvedType,
    to: &ResolvedType,
    range: crate::core::TextRange,
) {
    if conversion_cost(from, to).is_none() {
        ctx.sink.error(
            format!(
                "Type mismatch: cannot convert '{}' to '{}'",
                from.display_name(),
                to.display_name()
            ),
            range,
        );
    }
}
