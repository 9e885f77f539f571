//! Hoist: the first semantic pass.
//!
//! Declares every named entity before any body is analyzed, so forward
//! references and mutual recursion resolve. Work that needs other
//! declarations to exist first (base lists, signatures, declared types) is
//! deferred onto the hoist queue and drained before the analyze pass.

use crate::semantic::builtin;
use crate::semantic::context::{AnalysisContext, AnalysisQueues, DeferredAnalyze, DeferredHoist};
use crate::semantic::hints::ScopeRegion;
use crate::semantic::resolved_type::ResolvedType;
use crate::semantic::scope::{ScopeId, ScopeLinkedNode};
use crate::semantic::symbol::{
    FunctionParam, Symbol, SymbolFunction, SymbolHolder, SymbolType, SymbolVariable, TypeKind,
};
use crate::semantic::typing::{analyze_type, resolve_type_name};
use crate::syntax::ast::{
    AccessModifier, ClassMember, FuncHead, IdentToken, NodeClass, NodeEnum, NodeFunc, NodeFuncDef,
    NodeInterface, NodeNamespace, NodeQualifiedIdent, NodeTypedef, NodeVar, NodeVirtualProp,
    ScriptNode,
};
use std::sync::Arc;

/// Runs the hoist pass to completion: the recursive walk, then the full
/// drain of the hoist queue (which may keep growing while draining).
pub(crate) fn run_hoist(ctx: &mut AnalysisContext, queues: &mut AnalysisQueues, items: &[ScriptNode]) {
    let root = ctx.global.root();
    hoist_items(ctx, queues, root, items);
    loop {
        if let Some(task) = queues.hoist.pop_front() {
            run_hoist_task(ctx, queues, task);
        } else if let Some(task) = queues.hoist_late.pop_front() {
            run_hoist_task(ctx, queues, task);
        } else {
            break;
        }
    }
}

pub(crate) fn hoist_items(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    scope: ScopeId,
    items: &[ScriptNode],
) {
    for item in items {
        match item {
            ScriptNode::Namespace(node) => hoist_namespace(ctx, queues, scope, node),
            ScriptNode::Enum(node) => hoist_enum(ctx, queues, scope, node),
            ScriptNode::Class(node) => hoist_class(ctx, queues, scope, node),
            ScriptNode::Interface(node) => hoist_interface(ctx, queues, scope, node),
            ScriptNode::Typedef(node) => hoist_typedef(ctx, scope, node),
            ScriptNode::FuncDef(node) => hoist_funcdef(ctx, queues, scope, node),
            ScriptNode::Func(node) => hoist_function(ctx, queues, scope, node, false),
            ScriptNode::VirtualProp(node) => hoist_virtual_prop(ctx, queues, scope, node, false),
            ScriptNode::Var(node) => hoist_var(ctx, queues, scope, node, false),
        }
    }
}

fn run_hoist_task(ctx: &mut AnalysisContext, queues: &mut AnalysisQueues, task: DeferredHoist) {
    match task {
        DeferredHoist::ClassSetup { scope, node } => class_setup(ctx, queues, scope, &node),
        DeferredHoist::ClassBaseCopy { scope, node } => {
            copy_base_members(ctx, scope, &node.ident, true);
        }
        DeferredHoist::InterfaceSetup { scope, node } => interface_setup(ctx, queues, scope, &node),
        DeferredHoist::InterfaceBaseCopy { scope, node } => {
            copy_base_members(ctx, scope, &node.ident, false);
        }
        DeferredHoist::FuncSignature {
            parent,
            body,
            node,
            overload_index,
            is_instance,
        } => func_signature(ctx, parent, body, &node, overload_index, is_instance),
        DeferredHoist::FuncDefSignature {
            scope,
            node,
            overload_index,
        } => funcdef_signature(ctx, scope, &node, overload_index),
        DeferredHoist::VarTypes {
            scope,
            node,
            is_instance,
        } => var_types(ctx, scope, &node, is_instance),
        DeferredHoist::VirtualPropTypes {
            scope,
            node,
            setter_scope,
        } => virtual_prop_types(ctx, scope, &node, setter_scope),
    }
}

// ---------------------------------------------------------------------------
// Namespaces
// ---------------------------------------------------------------------------

fn hoist_namespace(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    scope: ScopeId,
    node: &Arc<NodeNamespace>,
) {
    let mut current = scope;
    for segment in &node.segments {
        current = ctx.global.insert_scope(
            current,
            &segment.text,
            Some(ScopeLinkedNode::Namespace(node.clone())),
        );
    }
    ctx.global.scope_regions.push(ScopeRegion {
        scope: current,
        range: node.range,
    });
    hoist_items(ctx, queues, current, &node.items);
}

// ---------------------------------------------------------------------------
// Enums and typedefs
// ---------------------------------------------------------------------------

fn hoist_enum(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    scope: ScopeId,
    node: &Arc<NodeEnum>,
) {
    if node.ident.text.is_empty() {
        return;
    }
    // Unchecked insertion: an enum may share its member scope with a
    // namespace of the same name, and members then live side by side.
    let member_scope = ctx.global.insert_scope(
        scope,
        &node.ident.text,
        Some(ScopeLinkedNode::Enum(node.clone())),
    );
    let enum_symbol = Arc::new(SymbolType {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(scope).clone(),
        members_scope: Some(ctx.global.path_of(member_scope).clone()),
        template_params: Vec::new(),
        bases: Vec::new(),
        kind: TypeKind::Enum,
    });
    ctx.global
        .insert_symbol_and_check(scope, Symbol::Type(enum_symbol.clone()), ctx.sink);
    ctx.global.scope_regions.push(ScopeRegion {
        scope: member_scope,
        range: node.range,
    });

    for member in &node.members {
        let variable = Arc::new(SymbolVariable {
            ident: member.ident.clone(),
            uri: ctx.global.uri.clone(),
            scope_path: ctx.global.path_of(member_scope).clone(),
            ty: ResolvedType::of_type(enum_symbol.clone()),
            is_instance_member: false,
            access: AccessModifier::Public,
        });
        ctx.global.insert_symbol_and_check(
            member_scope,
            Symbol::Variable(variable.clone()),
            ctx.sink,
        );
        if ctx.settings.hoist_enum_parent_scope {
            let _ = ctx.global.insert_symbol(scope, Symbol::Variable(variable));
        }
    }

    queues.analyze.push_back(DeferredAnalyze::EnumValues {
        scope: member_scope,
        node: node.clone(),
    });
}

fn hoist_typedef(ctx: &mut AnalysisContext, scope: ScopeId, node: &Arc<NodeTypedef>) {
    let Some(primitive) = builtin::lookup_primitive(&node.primitive.text) else {
        ctx.sink.error(
            format!("'{}' is not a primitive type", node.primitive.text),
            node.primitive.range,
        );
        return;
    };
    let TypeKind::Primitive(kind) = primitive.kind else {
        return;
    };
    let symbol = Arc::new(SymbolType {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(scope).clone(),
        members_scope: None,
        template_params: Vec::new(),
        bases: Vec::new(),
        kind: TypeKind::Typedef(kind),
    });
    ctx.global
        .insert_symbol_and_check(scope, Symbol::Type(symbol), ctx.sink);
}

// ---------------------------------------------------------------------------
// Classes and interfaces
// ---------------------------------------------------------------------------

fn hoist_class(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    scope: ScopeId,
    node: &Arc<NodeClass>,
) {
    if node.ident.text.is_empty() {
        return;
    }
    let member_scope = ctx.global.insert_scope_and_check(
        scope,
        &node.ident,
        Some(ScopeLinkedNode::Class(node.clone())),
        ctx.sink,
    );
    let class_symbol = Arc::new(SymbolType {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(scope).clone(),
        members_scope: Some(ctx.global.path_of(member_scope).clone()),
        template_params: node.template_params.iter().map(|t| t.text.clone()).collect(),
        bases: Vec::new(),
        kind: TypeKind::Class,
    });
    let inserted = ctx.global.insert_symbol_and_check(
        scope,
        Symbol::Type(class_symbol.clone()),
        ctx.sink,
    );
    insert_this(ctx, member_scope, &class_symbol);
    for param in &node.template_params {
        let template_symbol = Arc::new(SymbolType {
            ident: param.clone(),
            uri: ctx.global.uri.clone(),
            scope_path: ctx.global.path_of(member_scope).clone(),
            members_scope: None,
            template_params: Vec::new(),
            bases: Vec::new(),
            kind: TypeKind::TemplateParam,
        });
        ctx.global
            .insert_symbol_and_check(member_scope, Symbol::Type(template_symbol), ctx.sink);
    }
    ctx.global.scope_regions.push(ScopeRegion {
        scope: member_scope,
        range: node.range,
    });
    if inserted {
        queues.hoist.push_back(DeferredHoist::ClassSetup {
            scope: member_scope,
            node: node.clone(),
        });
    }
}

fn insert_this(ctx: &mut AnalysisContext, member_scope: ScopeId, class_symbol: &Arc<SymbolType>) {
    let this_var = Arc::new(SymbolVariable {
        ident: IdentToken::new("this", class_symbol.ident.range),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(member_scope).clone(),
        ty: ResolvedType::of_type(class_symbol.clone()),
        is_instance_member: false,
        access: AccessModifier::Private,
    });
    match ctx.global.insert_symbol(member_scope, Symbol::Variable(this_var.clone())) {
        Ok(()) => {}
        Err(_) => ctx.global.replace_variable(member_scope, this_var),
    }
}

fn class_setup(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    member_scope: ScopeId,
    node: &Arc<NodeClass>,
) {
    let Some(parent) = ctx.global.scope(member_scope).parent else {
        return;
    };
    let bases = resolve_bases(ctx, parent, &node.bases, true);
    let class_symbol = Arc::new(SymbolType {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(parent).clone(),
        members_scope: Some(ctx.global.path_of(member_scope).clone()),
        template_params: node.template_params.iter().map(|t| t.text.clone()).collect(),
        bases,
        kind: TypeKind::Class,
    });
    ctx.global.replace_type(parent, class_symbol.clone());
    insert_this(ctx, member_scope, &class_symbol);

    hoist_class_members(ctx, queues, member_scope, &node.members);

    if !node.bases.is_empty() {
        queues.hoist_late.push_back(DeferredHoist::ClassBaseCopy {
            scope: member_scope,
            node: node.clone(),
        });
    }
}

fn hoist_interface(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    scope: ScopeId,
    node: &Arc<NodeInterface>,
) {
    if node.ident.text.is_empty() {
        return;
    }
    let member_scope = ctx.global.insert_scope_and_check(
        scope,
        &node.ident,
        Some(ScopeLinkedNode::Interface(node.clone())),
        ctx.sink,
    );
    let symbol = Arc::new(SymbolType {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(scope).clone(),
        members_scope: Some(ctx.global.path_of(member_scope).clone()),
        template_params: Vec::new(),
        bases: Vec::new(),
        kind: TypeKind::Interface,
    });
    let inserted =
        ctx.global
            .insert_symbol_and_check(scope, Symbol::Type(symbol), ctx.sink);
    ctx.global.scope_regions.push(ScopeRegion {
        scope: member_scope,
        range: node.range,
    });
    if inserted {
        queues.hoist.push_back(DeferredHoist::InterfaceSetup {
            scope: member_scope,
            node: node.clone(),
        });
    }
}

fn interface_setup(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    member_scope: ScopeId,
    node: &Arc<NodeInterface>,
) {
    let Some(parent) = ctx.global.scope(member_scope).parent else {
        return;
    };
    let bases = resolve_bases(ctx, parent, &node.bases, false);
    let symbol = Arc::new(SymbolType {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(parent).clone(),
        members_scope: Some(ctx.global.path_of(member_scope).clone()),
        template_params: Vec::new(),
        bases,
        kind: TypeKind::Interface,
    });
    ctx.global.replace_type(parent, symbol);

    hoist_class_members(ctx, queues, member_scope, &node.members);

    if !node.bases.is_empty() {
        queues.hoist_late.push_back(DeferredHoist::InterfaceBaseCopy {
            scope: member_scope,
            node: node.clone(),
        });
    }
}

fn hoist_class_members(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    member_scope: ScopeId,
    members: &[ClassMember],
) {
    for member in members {
        match member {
            ClassMember::Func(func) => hoist_function(ctx, queues, member_scope, func, true),
            ClassMember::Var(var) => hoist_var(ctx, queues, member_scope, var, true),
            ClassMember::VirtualProp(prop) => {
                hoist_virtual_prop(ctx, queues, member_scope, prop, true);
            }
            ClassMember::FuncDef(funcdef) => hoist_funcdef(ctx, queues, member_scope, funcdef),
        }
    }
}

fn resolve_bases(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    bases: &[NodeQualifiedIdent],
    allow_class: bool,
) -> Vec<ResolvedType> {
    let mut resolved = Vec::new();
    for base in bases {
        let Some(symbol) = resolve_type_name(ctx, scope, base) else {
            continue;
        };
        let acceptable = match symbol.kind {
            TypeKind::Class => allow_class,
            TypeKind::Interface => true,
            _ => false,
        };
        if !acceptable {
            let expected = if allow_class { "a class or interface" } else { "an interface" };
            ctx.sink.error(
                format!("'{}' is not {expected}", base.ident.text),
                base.ident.range,
            );
            continue;
        }
        resolved.push(ResolvedType::of_type(symbol));
    }
    resolved
}

/// Copies base members into a derived members scope: `private` members and
/// the base's `this` stay behind, constructors are represented by the
/// injected `super` instead, and collisions are diagnosed at the derived
/// declaration.
fn copy_base_members(
    ctx: &mut AnalysisContext,
    member_scope: ScopeId,
    ident: &IdentToken,
    with_super: bool,
) {
    let Some(parent) = ctx.global.scope(member_scope).parent else {
        return;
    };
    let Some(SymbolHolder::Type(class_symbol)) = ctx.global.lookup_symbol(parent, &ident.text)
    else {
        return;
    };
    let class_symbol = class_symbol.clone();

    for base in &class_symbol.bases {
        let Some(base_symbol) = base.type_symbol() else {
            continue;
        };
        let Some(base_scope) = base_symbol
            .members_scope
            .as_ref()
            .and_then(|path| ctx.global.resolve_scope(path))
        else {
            continue;
        };

        let mut copies: Vec<Symbol> = Vec::new();
        for (name, holder) in &ctx.global.scope(base_scope).symbols {
            // `this`, constructors and the base's own `super` stay behind
            if name == "this" || name == "super" || name == &base_symbol.ident.text {
                continue;
            }
            match holder {
                SymbolHolder::Type(_) => {}
                SymbolHolder::Variable(var) => {
                    if var.access != AccessModifier::Private {
                        copies.push(Symbol::Variable(var.clone()));
                    }
                }
                SymbolHolder::Functions(overloads) => {
                    for func in overloads {
                        if func.access != AccessModifier::Private {
                            copies.push(Symbol::Function(func.clone()));
                        }
                    }
                }
            }
        }
        for symbol in copies {
            let name = symbol.name().to_string();
            if ctx.global.insert_symbol(member_scope, symbol).is_err() {
                ctx.sink.error(
                    format!(
                        "Member '{}' inherited from '{}' conflicts with an existing member",
                        name, base_symbol.ident.text
                    ),
                    ident.range,
                );
            }
        }
    }

    if with_super {
        inject_super(ctx, member_scope, &class_symbol);
    }
}

/// Clones each constructor of the first base class as an overload of a
/// synthetic `super`.
fn inject_super(ctx: &mut AnalysisContext, member_scope: ScopeId, class_symbol: &Arc<SymbolType>) {
    let Some(base_symbol) = class_symbol
        .bases
        .iter()
        .filter_map(|b| b.type_symbol())
        .find(|b| b.kind == TypeKind::Class)
    else {
        return;
    };
    let Some(base_scope) = base_symbol
        .members_scope
        .as_ref()
        .and_then(|path| ctx.global.resolve_scope(path))
    else {
        return;
    };
    let Some(SymbolHolder::Functions(constructors)) =
        ctx.global.lookup_symbol(base_scope, &base_symbol.ident.text)
    else {
        return;
    };
    let clones: Vec<Arc<SymbolFunction>> = constructors
        .iter()
        .filter(|c| c.access != AccessModifier::Private)
        .map(|c| {
            Arc::new(SymbolFunction {
                ident: IdentToken::new("super", c.ident.range),
                ..(**c).clone()
            })
        })
        .collect();
    for clone in clones {
        let _ = ctx
            .global
            .insert_symbol(member_scope, Symbol::Function(clone));
    }
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

fn hoist_function(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    scope: ScopeId,
    node: &Arc<NodeFunc>,
    is_instance: bool,
) {
    // Destructors declare nothing
    if matches!(node.head, FuncHead::Destructor) {
        return;
    }
    if node.ident.text.is_empty() {
        return;
    }
    if node.is_property
        && !(node.ident.text.starts_with("get_") || node.ident.text.starts_with("set_"))
    {
        ctx.sink.error(
            "A property accessor must be named 'get_<name>' or 'set_<name>'",
            node.ident.range,
        );
    }

    // Two-level nesting keeps overload identity: a holder scope keyed by
    // the function name, one anonymous body scope per overload inside it.
    let holder_scope = ctx.global.insert_scope(scope, &node.ident.text, None);
    let body_scope = ctx
        .global
        .insert_anonymous_scope(holder_scope, Some(ScopeLinkedNode::Func(node.clone())));

    for param in &node.template_params {
        let template_symbol = Arc::new(SymbolType {
            ident: param.clone(),
            uri: ctx.global.uri.clone(),
            scope_path: ctx.global.path_of(body_scope).clone(),
            members_scope: None,
            template_params: Vec::new(),
            bases: Vec::new(),
            kind: TypeKind::TemplateParam,
        });
        ctx.global
            .insert_symbol_and_check(body_scope, Symbol::Type(template_symbol), ctx.sink);
    }

    let symbol = Arc::new(SymbolFunction {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(scope).clone(),
        return_type: ResolvedType::unresolved(),
        params: Vec::new(),
        is_variadic: node.is_variadic,
        body_scope: Some(ctx.global.path_of(body_scope).clone()),
        is_instance_member: is_instance,
        access: node.access,
        template_params: node.template_params.iter().map(|t| t.text.clone()).collect(),
        node: Some(node.clone()),
    });
    if !ctx
        .global
        .insert_symbol_and_check(scope, Symbol::Function(symbol), ctx.sink)
    {
        return;
    }
    let overload_index = match ctx.global.lookup_symbol(scope, &node.ident.text) {
        Some(SymbolHolder::Functions(overloads)) => overloads.len() - 1,
        _ => return,
    };

    if let Some(body) = &node.body {
        ctx.global.scope_regions.push(ScopeRegion {
            scope: body_scope,
            range: body.range,
        });
        queues.analyze.push_back(DeferredAnalyze::FuncBody {
            scope: body_scope,
            node: node.clone(),
        });
    }
    queues.hoist.push_back(DeferredHoist::FuncSignature {
        parent: scope,
        body: body_scope,
        node: node.clone(),
        overload_index,
        is_instance,
    });
}

fn func_signature(
    ctx: &mut AnalysisContext,
    parent: ScopeId,
    body: ScopeId,
    node: &Arc<NodeFunc>,
    overload_index: usize,
    is_instance: bool,
) {
    let return_type = match &node.head {
        FuncHead::Returns(ty) => analyze_type(ctx, body, ty),
        // The class symbol lives in the member scope's parent; a lookup in
        // the member scope itself would find this very constructor holder.
        FuncHead::Constructor => match ctx
            .global
            .scope(parent)
            .parent
            .and_then(|outer| ctx.global.lookup_symbol(outer, &node.ident.text))
        {
            Some(SymbolHolder::Type(class_symbol)) => {
                ResolvedType::of_type(class_symbol.clone())
            }
            _ => ResolvedType::unresolved(),
        },
        FuncHead::Destructor => return,
    };

    let params = resolve_params(ctx, body, node);

    let rebuilt = Arc::new(SymbolFunction {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(parent).clone(),
        return_type: return_type.clone(),
        params: params.clone(),
        is_variadic: node.is_variadic,
        body_scope: Some(ctx.global.path_of(body).clone()),
        is_instance_member: is_instance,
        access: node.access,
        template_params: node.template_params.iter().map(|t| t.text.clone()).collect(),
        node: Some(node.clone()),
    });
    ctx.global
        .replace_overload(parent, &node.ident.text, overload_index, rebuilt);

    synthesize_property(ctx, parent, node, &return_type, &params, is_instance);
}

fn resolve_params(
    ctx: &mut AnalysisContext,
    body: ScopeId,
    node: &NodeFunc,
) -> Vec<FunctionParam> {
    let mut params = Vec::new();
    for param in &node.params {
        let ty = analyze_type(ctx, body, &param.ty);
        if let Some(ident) = &param.ident {
            let variable = Arc::new(SymbolVariable {
                ident: ident.clone(),
                uri: ctx.global.uri.clone(),
                scope_path: ctx.global.path_of(body).clone(),
                ty: ty.clone(),
                is_instance_member: false,
                access: AccessModifier::Public,
            });
            ctx.global
                .insert_symbol_and_check(body, Symbol::Variable(variable), ctx.sink);
        }
        params.push(FunctionParam {
            name: param.ident.as_ref().map(|i| i.text.clone()),
            ty,
            has_default: param.has_default,
        });
    }
    params
}

/// `get_x`/`set_x` accessors surface a synthetic variable `x` when the
/// function carries `property` or the explicit-accessor requirement is off.
fn synthesize_property(
    ctx: &mut AnalysisContext,
    parent: ScopeId,
    node: &NodeFunc,
    return_type: &ResolvedType,
    params: &[FunctionParam],
    is_instance: bool,
) {
    let name = &node.ident.text;
    let is_getter = name.starts_with("get_");
    let is_setter = name.starts_with("set_");
    if !is_getter && !is_setter {
        return;
    }
    if ctx.settings.explicit_property_accessor && !node.is_property {
        return;
    }
    let prop_name = &name[4..];
    if prop_name.is_empty() {
        return;
    }
    let ty = if is_getter {
        return_type.clone()
    } else {
        params
            .first()
            .map(|p| p.ty.clone())
            .unwrap_or_else(ResolvedType::unresolved)
    };
    let variable = Arc::new(SymbolVariable {
        ident: IdentToken::new(prop_name, node.ident.range),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(parent).clone(),
        ty,
        is_instance_member: is_instance,
        access: node.access,
    });
    // Getter and setter both land here; the first one wins
    let _ = ctx.global.insert_symbol(parent, Symbol::Variable(variable));
}

fn hoist_funcdef(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    scope: ScopeId,
    node: &Arc<NodeFuncDef>,
) {
    let symbol = Arc::new(SymbolFunction {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(scope).clone(),
        return_type: ResolvedType::unresolved(),
        params: Vec::new(),
        is_variadic: false,
        body_scope: None,
        is_instance_member: false,
        access: AccessModifier::Public,
        template_params: Vec::new(),
        node: None,
    });
    if !ctx
        .global
        .insert_symbol_and_check(scope, Symbol::Function(symbol), ctx.sink)
    {
        return;
    }
    let overload_index = match ctx.global.lookup_symbol(scope, &node.ident.text) {
        Some(SymbolHolder::Functions(overloads)) => overloads.len() - 1,
        _ => return,
    };
    queues.hoist.push_back(DeferredHoist::FuncDefSignature {
        scope,
        node: node.clone(),
        overload_index,
    });
}

fn funcdef_signature(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    node: &Arc<NodeFuncDef>,
    overload_index: usize,
) {
    let return_type = analyze_type(ctx, scope, &node.return_type);
    let params = node
        .params
        .iter()
        .map(|param| FunctionParam {
            name: param.ident.as_ref().map(|i| i.text.clone()),
            ty: analyze_type(ctx, scope, &param.ty),
            has_default: param.has_default,
        })
        .collect();
    let rebuilt = Arc::new(SymbolFunction {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(scope).clone(),
        return_type,
        params,
        is_variadic: false,
        body_scope: None,
        is_instance_member: false,
        access: AccessModifier::Public,
        template_params: Vec::new(),
        node: None,
    });
    ctx.global
        .replace_overload(scope, &node.ident.text, overload_index, rebuilt);
}

// ---------------------------------------------------------------------------
// Variables and virtual properties
// ---------------------------------------------------------------------------

fn hoist_var(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    scope: ScopeId,
    node: &Arc<NodeVar>,
    is_instance: bool,
) {
    for declarator in &node.declarators {
        let variable = Arc::new(SymbolVariable {
            ident: declarator.ident.clone(),
            uri: ctx.global.uri.clone(),
            scope_path: ctx.global.path_of(scope).clone(),
            ty: ResolvedType::unresolved(),
            is_instance_member: is_instance,
            access: node.access,
        });
        ctx.global
            .insert_symbol_and_check(scope, Symbol::Variable(variable), ctx.sink);
    }
    queues.hoist.push_back(DeferredHoist::VarTypes {
        scope,
        node: node.clone(),
        is_instance,
    });
    queues.analyze.push_back(DeferredAnalyze::VarInit {
        scope,
        node: node.clone(),
    });
}

fn var_types(ctx: &mut AnalysisContext, scope: ScopeId, node: &Arc<NodeVar>, is_instance: bool) {
    if node.ty.name.ident.text == "auto" {
        // Left to the analyze pass, which sees the initializer type
        return;
    }
    let ty = analyze_type(ctx, scope, &node.ty);
    for declarator in &node.declarators {
        // A colliding declarator never replaces the symbol that won
        if !owns_variable_slot(ctx, scope, &declarator.ident) {
            continue;
        }
        let variable = Arc::new(SymbolVariable {
            ident: declarator.ident.clone(),
            uri: ctx.global.uri.clone(),
            scope_path: ctx.global.path_of(scope).clone(),
            ty: ty.clone(),
            is_instance_member: is_instance,
            access: node.access,
        });
        ctx.global.replace_variable(scope, variable);
    }
}

/// True when the variable holder under this identifier belongs to this
/// very declaration (and not to an earlier one it collided with).
pub(crate) fn owns_variable_slot(
    ctx: &AnalysisContext,
    scope: ScopeId,
    ident: &IdentToken,
) -> bool {
    matches!(
        ctx.global.lookup_symbol(scope, &ident.text),
        Some(SymbolHolder::Variable(existing)) if existing.ident.range == ident.range
    )
}

fn hoist_virtual_prop(
    ctx: &mut AnalysisContext,
    queues: &mut AnalysisQueues,
    scope: ScopeId,
    node: &Arc<NodeVirtualProp>,
    is_instance: bool,
) {
    if node.ident.text.is_empty() {
        return;
    }
    let variable = Arc::new(SymbolVariable {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(scope).clone(),
        ty: ResolvedType::unresolved(),
        is_instance_member: is_instance,
        access: node.access,
    });
    ctx.global
        .insert_symbol_and_check(scope, Symbol::Variable(variable), ctx.sink);

    let mut setter_scope = None;
    if let Some(getter) = &node.getter {
        let name = format!("get_{}", node.ident.text);
        let accessor_scope = ctx.global.insert_scope(scope, &name, None);
        if let Some(body) = &getter.body {
            ctx.global.scope_regions.push(ScopeRegion {
                scope: accessor_scope,
                range: body.range,
            });
            queues.analyze.push_back(DeferredAnalyze::PropBody {
                scope: accessor_scope,
                node: node.clone(),
                is_getter: true,
            });
        }
    }
    if let Some(setter) = &node.setter {
        let name = format!("set_{}", node.ident.text);
        let accessor_scope = ctx.global.insert_scope(scope, &name, None);
        setter_scope = Some(accessor_scope);
        if let Some(body) = &setter.body {
            ctx.global.scope_regions.push(ScopeRegion {
                scope: accessor_scope,
                range: body.range,
            });
            queues.analyze.push_back(DeferredAnalyze::PropBody {
                scope: accessor_scope,
                node: node.clone(),
                is_getter: false,
            });
        }
    }

    queues.hoist.push_back(DeferredHoist::VirtualPropTypes {
        scope,
        node: node.clone(),
        setter_scope,
    });
}

fn virtual_prop_types(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    node: &Arc<NodeVirtualProp>,
    setter_scope: Option<ScopeId>,
) {
    let ty = analyze_type(ctx, scope, &node.ty);
    if !owns_variable_slot(ctx, scope, &node.ident) {
        return;
    }
    let variable = Arc::new(SymbolVariable {
        ident: node.ident.clone(),
        uri: ctx.global.uri.clone(),
        scope_path: ctx.global.path_of(scope).clone(),
        ty: ty.clone(),
        is_instance_member: ctx
            .global
            .lookup_symbol(scope, &node.ident.text)
            .and_then(|h| match h {
                SymbolHolder::Variable(v) => Some(v.is_instance_member),
                _ => None,
            })
            .unwrap_or(false),
        access: node.access,
    });
    ctx.global.replace_variable(scope, variable);

    if let Some(setter_scope) = setter_scope {
        let value = Arc::new(SymbolVariable {
            ident: IdentToken::new("value", node.ident.range),
            uri: ctx.global.uri.clone(),
            scope_path: ctx.global.path_of(setter_scope).clone(),
            ty,
            is_instance_member: false,
            access: AccessModifier::Public,
        });
        let _ = ctx
            .global
            .insert_symbol(setter_scope, Symbol::Variable(value));
    }
}
