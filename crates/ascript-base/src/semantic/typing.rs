//! Type resolution: scope-qualifier walking and `analyze_type`.

use crate::semantic::builtin;
use crate::semantic::context::AnalysisContext;
use crate::semantic::hints::ComplementHint;
use crate::semantic::resolved_type::{ResolvedType, TemplateTranslator, TypeSource};
use crate::semantic::scope::ScopeId;
use crate::semantic::symbol::{Symbol, SymbolHolder, SymbolType};
use crate::syntax::ast::{NodeQualifiedIdent, NodeScopeQualifier, NodeType};
use indexmap::IndexMap;
use std::sync::Arc;

/// Walks a `A::B::` qualifier from `scope` (or the root for a leading
/// `::`), recording a reference and a namespace-access hint per segment.
/// Returns the scope the final segment names, or `None` after diagnosing
/// the failing segment.
pub(crate) fn resolve_qualifier(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    qualifier: &NodeScopeQualifier,
) -> Option<ScopeId> {
    let mut current = if qualifier.is_global {
        ctx.global.root()
    } else {
        scope
    };
    for (i, segment) in qualifier.segments.iter().enumerate() {
        let next = if i == 0 && !qualifier.is_global {
            ctx.global.find_child_scope_with_parent(current, &segment.text)
        } else {
            ctx.global
                .scope(current)
                .children
                .get(&segment.text)
                .copied()
        };
        let Some(next) = next else {
            ctx.sink.error(
                format!("Unresolved namespace '{}'", segment.text),
                segment.range,
            );
            return None;
        };

        // The segment may name a type (enum or class used as a qualifier);
        // prefer its symbol as the reference target.
        let symbol = ctx
            .global
            .scope(next)
            .parent
            .and_then(|parent| ctx.global.lookup_symbol(parent, &segment.text))
            .and_then(|holder| match holder {
                SymbolHolder::Type(t) => Some(Symbol::Type(t.clone())),
                _ => None,
            });
        match symbol {
            Some(symbol) => ctx.record_reference(segment.range, &symbol),
            None => ctx.record_scope_reference(segment.range, next),
        }

        let caret_end = qualifier
            .segments
            .get(i + 1)
            .map(|s| s.range.end)
            .unwrap_or(qualifier.range.end);
        ctx.global.hints.push(ComplementHint::AutocompleteNamespaceAccess {
            caret: crate::core::TextRange::new(segment.range.end, caret_end),
            access_scope: next,
        });

        current = next;
    }
    Some(current)
}

/// Resolves a possibly-qualified name to a type symbol; used for base
/// lists. Diagnoses names that are missing or not types.
pub(crate) fn resolve_type_name(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    name: &NodeQualifiedIdent,
) -> Option<Arc<SymbolType>> {
    let (lookup_scope, shallow) = match &name.scope {
        Some(qualifier) => (resolve_qualifier(ctx, scope, qualifier)?, true),
        None => (scope, false),
    };
    if name.ident.text.is_empty() {
        return None;
    }
    let holder = if shallow {
        ctx.global.lookup_symbol(lookup_scope, &name.ident.text)
    } else {
        ctx.global.lookup_symbol_with_parent(lookup_scope, &name.ident.text)
    };
    match holder {
        Some(SymbolHolder::Type(symbol)) => {
            let symbol = symbol.clone();
            ctx.record_reference(name.ident.range, &Symbol::Type(symbol.clone()));
            Some(symbol)
        }
        Some(_) => {
            ctx.sink.error(
                format!("'{}' is not a type", name.ident.text),
                name.ident.range,
            );
            None
        }
        None => {
            ctx.sink.error(
                format!("Unresolved type '{}'", name.ident.text),
                name.ident.range,
            );
            None
        }
    }
}

/// Resolves a type AST into a [`ResolvedType`] value.
pub(crate) fn analyze_type(ctx: &mut AnalysisContext, scope: ScopeId, node: &NodeType) -> ResolvedType {
    let mut resolved = resolve_data_type(ctx, scope, node);
    for _ in 0..node.array_dims {
        resolved = wrap_array(ctx, scope, resolved, node);
    }
    resolved.modifiers.is_const = node.is_const;
    resolved.modifiers.is_handle = node.is_handle;
    resolved.modifiers.ref_kind = node.ref_kind;
    resolved
}

fn resolve_data_type(ctx: &mut AnalysisContext, scope: ScopeId, node: &NodeType) -> ResolvedType {
    if node.is_any {
        return ResolvedType::of_type(builtin::primitive(
            crate::semantic::symbol::PrimitiveKind::Any,
        ));
    }
    let name = &node.name.ident;
    if name.text.is_empty() || name.text == "auto" {
        // `auto` resolves from the initializer, in the analyze pass
        return ResolvedType::unresolved();
    }

    let (lookup_scope, shallow) = match &node.name.scope {
        Some(qualifier) => match resolve_qualifier(ctx, scope, qualifier) {
            Some(found) => (found, true),
            None => return ResolvedType::unresolved(),
        },
        None => (scope, false),
    };

    if !shallow {
        if let Some(primitive) = builtin::lookup_primitive(&name.text) {
            return ResolvedType::of_type(primitive);
        }
    }

    let holder = if shallow {
        ctx.global.lookup_symbol(lookup_scope, &name.text)
    } else {
        ctx.global.lookup_symbol_with_parent(lookup_scope, &name.text)
    };
    match holder {
        Some(SymbolHolder::Type(symbol)) => {
            let symbol = symbol.clone();
            ctx.record_reference(name.range, &Symbol::Type(symbol.clone()));
            let translator = bind_template_args(ctx, scope, &symbol, node);
            ResolvedType {
                source: Some(TypeSource::Type(symbol)),
                translator,
                modifiers: Default::default(),
            }
        }
        Some(SymbolHolder::Functions(overloads)) => {
            // A funcdef used as a handle type
            let func = overloads[0].clone();
            ctx.record_reference(name.range, &Symbol::Function(func.clone()));
            ResolvedType::of_function(func)
        }
        Some(SymbolHolder::Variable(_)) => {
            ctx.sink
                .error(format!("'{}' is not a type", name.text), name.range);
            ResolvedType::unresolved()
        }
        None => {
            ctx.sink
                .error(format!("Unresolved type '{}'", name.text), name.range);
            ResolvedType::unresolved()
        }
    }
}

fn bind_template_args(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    symbol: &Arc<SymbolType>,
    node: &NodeType,
) -> Option<Arc<TemplateTranslator>> {
    if node.template_args.is_empty() {
        return None;
    }
    if node.template_args.len() != symbol.template_params.len() {
        ctx.sink.warning(
            format!(
                "'{}' expects {} template argument(s), got {}",
                symbol.ident.text,
                symbol.template_params.len(),
                node.template_args.len()
            ),
            node.name.ident.range,
        );
    }
    let mut bindings = IndexMap::new();
    for (param, arg) in symbol.template_params.iter().zip(&node.template_args) {
        bindings.insert(param.clone(), analyze_type(ctx, scope, arg));
    }
    Some(Arc::new(TemplateTranslator { bindings }))
}

/// Wraps `T` into the configured array type for a `[]` suffix.
fn wrap_array(
    ctx: &mut AnalysisContext,
    scope: ScopeId,
    element: ResolvedType,
    node: &NodeType,
) -> ResolvedType {
    let array_name = ctx.settings.builtin_array_type.clone();
    match ctx.global.lookup_symbol_with_parent(scope, &array_name) {
        Some(SymbolHolder::Type(symbol)) => {
            let symbol = symbol.clone();
            let param = symbol
                .template_params
                .first()
                .cloned()
                .unwrap_or_else(|| "T".to_string());
            let mut bindings = IndexMap::new();
            bindings.insert(param, element);
            ResolvedType {
                source: Some(TypeSource::Type(symbol)),
                translator: Some(Arc::new(TemplateTranslator { bindings })),
                modifiers: Default::default(),
            }
        }
        _ => {
            ctx.sink.warning(
                format!("Array type '{array_name}' is not defined"),
                node.range,
            );
            ResolvedType::unresolved()
        }
    }
}
