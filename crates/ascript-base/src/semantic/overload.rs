//! Overload selection: score every overload by the implicit conversions a
//! call would need, reject the incompatible ones, then tie-break.

use crate::semantic::resolved_type::{ResolvedType, TemplateTranslator, TypeSource};
use crate::semantic::symbol::{PrimitiveKind, SymbolFunction, SymbolType, TypeKind, function_signature};
use std::sync::Arc;

const COST_EXACT: u32 = 0;
const COST_NUMERIC: u32 = 1;
const COST_HANDLE: u32 = 2;
const COST_ANY: u32 = 3;

#[derive(Debug)]
pub(crate) enum OverloadError {
    /// No overload accepts the arguments; carries the candidate signatures
    /// for the diagnostic dump.
    NoCandidate(Vec<String>),
    Ambiguous,
}

#[derive(Debug)]
pub(crate) struct CallMatch {
    pub index: usize,
    pub func: Arc<SymbolFunction>,
}

/// Cost of implicitly converting `from` into `to`; `None` rejects.
pub(crate) fn conversion_cost(from: &ResolvedType, to: &ResolvedType) -> Option<u32> {
    // Best-effort values flow silently: an unresolved operand never fails a
    // call, so one missing name does not cascade.
    if from.is_unresolved() {
        if from.modifiers.is_handle {
            // `null` converts to any handle
            return to.modifiers.is_handle.then_some(COST_HANDLE);
        }
        return Some(COST_EXACT);
    }
    if to.is_unresolved() {
        return Some(COST_EXACT);
    }
    if to.primitive() == Some(PrimitiveKind::Any) {
        return Some(COST_ANY);
    }
    if from.equals_nominal(to) {
        return Some(COST_EXACT);
    }
    // Primitive identity ignoring handle flags and spelling (int == int32)
    if let (Some(a), Some(b)) = (strict_primitive(from), strict_primitive(to)) {
        if a == b {
            return Some(COST_EXACT);
        }
    }
    // Numeric conversions, widening or otherwise, rank below exact
    if let (Some(a), Some(b)) = (from.primitive(), to.primitive()) {
        if a.is_numeric() && b.is_numeric() {
            return Some(COST_NUMERIC);
        }
        return None;
    }
    // Taking or dereferencing a handle of the same type
    if from.modifiers.is_handle != to.modifiers.is_handle
        && from
            .clone()
            .with_handle(to.modifiers.is_handle)
            .equals_nominal(to)
    {
        return Some(COST_HANDLE);
    }
    // Derived class or implemented interface to base
    if let (Some(from_sym), Some(to_sym)) = (from.type_symbol(), to.type_symbol()) {
        if derives_from(from_sym, to_sym) {
            return Some(COST_HANDLE);
        }
    }
    // A function binds to a funcdef handle with the same shape
    if let (Some(from_fn), Some(to_fn)) = (from.function_symbol(), to.function_symbol()) {
        if same_signature(from_fn, to_fn)
            && conversion_cost(&from_fn.return_type, &to_fn.return_type) == Some(COST_EXACT)
        {
            return Some(COST_HANDLE);
        }
    }
    None
}

/// Primitive kind when the type really is a primitive or a typedef of one
/// (enums are excluded so two enums never compare equal through `int`).
fn strict_primitive(ty: &ResolvedType) -> Option<PrimitiveKind> {
    match ty.type_symbol()?.kind {
        TypeKind::Primitive(kind) | TypeKind::Typedef(kind) => Some(kind),
        _ => None,
    }
}

fn same_type_symbol(a: &SymbolType, b: &SymbolType) -> bool {
    a.uri == b.uri && a.scope_path == b.scope_path && a.ident.text == b.ident.text
}

/// Walks the base list transitively.
pub(crate) fn derives_from(from: &Arc<SymbolType>, to: &Arc<SymbolType>) -> bool {
    if same_type_symbol(from, to) {
        return false;
    }
    let mut pending: Vec<Arc<SymbolType>> = vec![from.clone()];
    let mut seen: Vec<Arc<SymbolType>> = Vec::new();
    while let Some(current) = pending.pop() {
        if seen.iter().any(|s| same_type_symbol(s, &current)) {
            continue;
        }
        for base in &current.bases {
            if let Some(TypeSource::Type(base_sym)) = &base.source {
                if same_type_symbol(base_sym, to) {
                    return true;
                }
                pending.push(base_sym.clone());
            }
        }
        seen.push(current);
    }
    false
}

struct Candidate {
    index: usize,
    cost: u32,
    is_variadic: bool,
    is_template: bool,
}

/// Binds arguments to parameters (positional first, then by name) and sums
/// conversion costs. `None` rejects the overload.
fn score_overload(
    func: &SymbolFunction,
    arg_names: &[Option<String>],
    arg_types: &[ResolvedType],
    translator: Option<&Arc<TemplateTranslator>>,
) -> Option<u32> {
    let mut bound: Vec<Option<usize>> = vec![None; func.params.len()];
    let mut variadic_args = 0usize;

    for (arg_index, name) in arg_names.iter().enumerate() {
        match name {
            None => {
                if arg_index < func.params.len() {
                    if bound[arg_index].is_some() {
                        return None;
                    }
                    bound[arg_index] = Some(arg_index);
                } else if func.is_variadic {
                    variadic_args += 1;
                } else {
                    return None;
                }
            }
            Some(name) => {
                let param_index = func
                    .params
                    .iter()
                    .position(|p| p.name.as_deref() == Some(name.as_str()))?;
                if bound[param_index].is_some() {
                    return None;
                }
                bound[param_index] = Some(arg_index);
            }
        }
    }

    let mut cost = variadic_args as u32 * COST_ANY;
    for (param, slot) in func.params.iter().zip(&bound) {
        match slot {
            Some(arg_index) => {
                let target = param.ty.apply_translator(translator);
                cost += conversion_cost(&arg_types[*arg_index], &target)?;
            }
            None => {
                if !param.has_default {
                    return None;
                }
            }
        }
    }
    Some(cost)
}

fn same_signature(a: &SymbolFunction, b: &SymbolFunction) -> bool {
    a.params.len() == b.params.len()
        && a.params
            .iter()
            .zip(&b.params)
            .all(|(x, y)| x.ty.equals_nominal(&y.ty))
}

/// Picks the overload for a call site.
///
/// Tie-breaks in order: fewer conversions, non-variadic over variadic,
/// non-template over template, declaration order. Declaration order only
/// settles candidates with identical signatures (an override and its
/// base-copied original); otherwise two survivors are an ambiguity.
pub(crate) fn select_overload(
    overloads: &[Arc<SymbolFunction>],
    arg_names: &[Option<String>],
    arg_types: &[ResolvedType],
    translator: Option<&Arc<TemplateTranslator>>,
) -> Result<CallMatch, OverloadError> {
    let mut candidates: Vec<Candidate> = overloads
        .iter()
        .enumerate()
        .filter_map(|(index, func)| {
            score_overload(func, arg_names, arg_types, translator).map(|cost| Candidate {
                index,
                cost,
                is_variadic: func.is_variadic,
                is_template: !func.template_params.is_empty(),
            })
        })
        .collect();

    if candidates.is_empty() {
        let dump = overloads.iter().map(|f| function_signature(f)).collect();
        return Err(OverloadError::NoCandidate(dump));
    }

    candidates.sort_by_key(|c| (c.cost, c.is_variadic, c.is_template, c.index));
    let best = &candidates[0];
    let rivals: Vec<&Candidate> = candidates
        .iter()
        .skip(1)
        .take_while(|c| {
            c.cost == best.cost
                && c.is_variadic == best.is_variadic
                && c.is_template == best.is_template
        })
        .collect();
    if rivals
        .iter()
        .any(|c| !same_signature(&overloads[c.index], &overloads[best.index]))
    {
        return Err(OverloadError::Ambiguous);
    }

    Ok(CallMatch {
        index: best.index,
        func: overloads[best.index].clone(),
    })
}

#[cfg(test)]
#[path = "overload/tests.rs"]
mod tests;
