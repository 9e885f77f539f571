#![allow(clippy::unwrap_used)]

use super::*;
use crate::core::TextRange;
use crate::semantic::builtin;
use crate::syntax::ast::{AccessModifier, IdentToken};

fn prim(kind: PrimitiveKind) -> ResolvedType {
    ResolvedType::of_type(builtin::primitive(kind))
}

fn class_symbol(name: &str, bases: Vec<ResolvedType>) -> Arc<SymbolType> {
    Arc::new(SymbolType {
        ident: IdentToken::new(name, TextRange::default()),
        uri: "/test.as".to_string(),
        scope_path: Vec::new(),
        members_scope: Some(vec![name.to_string()]),
        template_params: Vec::new(),
        bases,
        kind: TypeKind::Class,
    })
}

fn function(name: &str, params: &[(&str, ResolvedType)]) -> Arc<SymbolFunction> {
    function_full(name, params, false)
}

fn function_full(
    name: &str,
    params: &[(&str, ResolvedType)],
    is_variadic: bool,
) -> Arc<SymbolFunction> {
    Arc::new(SymbolFunction {
        ident: IdentToken::new(name, TextRange::default()),
        uri: "/test.as".to_string(),
        scope_path: Vec::new(),
        return_type: prim(PrimitiveKind::Void),
        params: params
            .iter()
            .map(|(n, ty)| crate::semantic::symbol::FunctionParam {
                name: Some((*n).to_string()),
                ty: ty.clone(),
                has_default: false,
            })
            .collect(),
        is_variadic,
        body_scope: None,
        is_instance_member: false,
        access: AccessModifier::Public,
        template_params: Vec::new(),
        node: None,
    })
}

#[test]
fn test_conversion_cost_ranks_tiers() {
    let int = prim(PrimitiveKind::Int32);
    let float = prim(PrimitiveKind::Float);
    let any = prim(PrimitiveKind::Any);
    let boolean = prim(PrimitiveKind::Bool);

    assert_eq!(conversion_cost(&int, &int), Some(0));
    // `int` and `int32` are the same primitive under different spellings
    let int32 = ResolvedType::of_type(builtin::lookup_primitive("int32").unwrap());
    assert_eq!(conversion_cost(&int, &int32), Some(0));
    assert_eq!(conversion_cost(&int, &float), Some(1));
    assert_eq!(conversion_cost(&int, &any), Some(3));
    assert_eq!(conversion_cost(&boolean, &int), None);
}

#[test]
fn test_conversion_cost_null_to_handle() {
    let null = ResolvedType::null_handle();
    let base = class_symbol("Base", Vec::new());
    let handle = ResolvedType::of_type(base).with_handle(true);
    assert_eq!(conversion_cost(&null, &handle), Some(2));
    assert_eq!(conversion_cost(&null, &prim(PrimitiveKind::Int32)), None);
}

#[test]
fn test_conversion_cost_derived_to_base() {
    let base = class_symbol("Base", Vec::new());
    let derived = class_symbol("Derived", vec![ResolvedType::of_type(base.clone())]);
    let grand = class_symbol("Grand", vec![ResolvedType::of_type(derived.clone())]);

    assert!(derives_from(&grand, &base));
    assert!(!derives_from(&base, &grand));
    assert_eq!(
        conversion_cost(&ResolvedType::of_type(grand), &ResolvedType::of_type(base)),
        Some(2)
    );
}

#[test]
fn test_select_prefers_fewest_conversions() {
    let overloads = vec![
        function("f", &[("a", prim(PrimitiveKind::Float))]),
        function("f", &[("a", prim(PrimitiveKind::Int32))]),
    ];
    let chosen = select_overload(&overloads, &[None], &[prim(PrimitiveKind::Int32)], None).unwrap();
    assert_eq!(chosen.index, 1);
}

#[test]
fn test_select_non_variadic_wins_tie() {
    let overloads = vec![
        function_full("f", &[("a", prim(PrimitiveKind::Int32))], true),
        function_full("f", &[("a", prim(PrimitiveKind::Int32))], false),
    ];
    let chosen = select_overload(&overloads, &[None], &[prim(PrimitiveKind::Int32)], None).unwrap();
    assert_eq!(chosen.index, 1);
}

#[test]
fn test_select_rejects_arity_mismatch() {
    let overloads = vec![function("f", &[("a", prim(PrimitiveKind::Int32))])];
    let result = select_overload(&overloads, &[], &[], None);
    let Err(OverloadError::NoCandidate(dump)) = result else {
        panic!("expected no candidate");
    };
    assert_eq!(dump.len(), 1);
}

#[test]
fn test_select_named_arguments_bind_by_name() {
    let overloads = vec![function(
        "f",
        &[
            ("first", prim(PrimitiveKind::Int32)),
            ("second", prim(PrimitiveKind::Bool)),
        ],
    )];
    // Named out of order
    let names = [Some("second".to_string()), Some("first".to_string())];
    let types = [prim(PrimitiveKind::Bool), prim(PrimitiveKind::Int32)];
    assert!(select_overload(&overloads, &names, &types, None).is_ok());

    // The same parameter bound twice fails
    let names = [None, Some("first".to_string())];
    let types = [prim(PrimitiveKind::Int32), prim(PrimitiveKind::Int32)];
    assert!(select_overload(&overloads, &names, &types, None).is_err());
}

#[test]
fn test_select_ambiguous_on_distinct_signatures() {
    let overloads = vec![
        function(
            "g",
            &[
                ("a", prim(PrimitiveKind::Int32)),
                ("b", prim(PrimitiveKind::Float)),
            ],
        ),
        function(
            "g",
            &[
                ("a", prim(PrimitiveKind::Float)),
                ("b", prim(PrimitiveKind::Int32)),
            ],
        ),
    ];
    let types = [prim(PrimitiveKind::Int32), prim(PrimitiveKind::Int32)];
    assert!(matches!(
        select_overload(&overloads, &[None, None], &types, None),
        Err(OverloadError::Ambiguous)
    ));
}

#[test]
fn test_select_identical_signatures_take_declaration_order() {
    // An override and its base-copied original tie on everything; the
    // earlier insertion wins silently
    let overloads = vec![
        function("m", &[("a", prim(PrimitiveKind::Int32))]),
        function("m", &[("a", prim(PrimitiveKind::Int32))]),
    ];
    let chosen = select_overload(&overloads, &[None], &[prim(PrimitiveKind::Int32)], None).unwrap();
    assert_eq!(chosen.index, 0);
}
