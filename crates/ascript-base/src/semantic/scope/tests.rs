#![allow(clippy::unwrap_used)]

use super::*;
use crate::core::TextRange;
use crate::semantic::resolved_type::ResolvedType;
use crate::syntax::ast::AccessModifier;

fn variable(global: &SymbolGlobalScope, scope: ScopeId, name: &str) -> Symbol {
    Symbol::Variable(Arc::new(SymbolVariable {
        ident: IdentToken::new(name, TextRange::default()),
        uri: global.uri.clone(),
        scope_path: global.path_of(scope).clone(),
        ty: ResolvedType::unresolved(),
        is_instance_member: false,
        access: AccessModifier::Public,
    }))
}

fn function(global: &SymbolGlobalScope, scope: ScopeId, name: &str) -> Symbol {
    Symbol::Function(Arc::new(SymbolFunction {
        ident: IdentToken::new(name, TextRange::default()),
        uri: global.uri.clone(),
        scope_path: global.path_of(scope).clone(),
        return_type: ResolvedType::unresolved(),
        params: Vec::new(),
        is_variadic: false,
        body_scope: None,
        is_instance_member: false,
        access: AccessModifier::Public,
        template_params: Vec::new(),
        node: None,
    }))
}

/// Scope paths are extended segment by segment and resolve back from root
#[test]
fn test_scope_paths_resolve_from_root() {
    let mut global = SymbolGlobalScope::new("file:///a.as");
    let root = global.root();
    let a = global.insert_scope(root, "A", None);
    let b = global.insert_scope(a, "B", None);

    assert_eq!(global.path_of(b), &vec!["A".to_string(), "B".to_string()]);
    assert_eq!(global.resolve_scope(global.path_of(b).clone().as_slice()), Some(b));
    assert_eq!(global.resolve_scope(&["A".to_string()]), Some(a));
    assert_eq!(global.resolve_scope(&["missing".to_string()]), None);
}

/// Inserting a scope twice returns the same id
#[test]
fn test_insert_scope_is_idempotent() {
    let mut global = SymbolGlobalScope::new("file:///a.as");
    let root = global.root();
    let first = global.insert_scope(root, "ns", None);
    let second = global.insert_scope(root, "ns", None);
    assert_eq!(first, second);
    assert_eq!(global.scope_count(), 2);
}

/// A second variable under one name collides; the existing holder comes back
#[test]
fn test_insert_symbol_collision_returns_existing() {
    let mut global = SymbolGlobalScope::new("file:///a.as");
    let root = global.root();
    let var = variable(&global, root, "x");
    assert!(global.insert_symbol(root, var.clone()).is_ok());
    let existing = global.insert_symbol(root, var).unwrap_err();
    assert!(matches!(existing, SymbolHolder::Variable(_)));
}

/// Functions aggregate into one overload holder
#[test]
fn test_function_overloads_extend_holder() {
    let mut global = SymbolGlobalScope::new("file:///a.as");
    let root = global.root();
    assert!(global.insert_symbol(root, function(&global, root, "f")).is_ok());
    assert!(global.insert_symbol(root, function(&global, root, "f")).is_ok());

    let Some(SymbolHolder::Functions(overloads)) = global.lookup_symbol(root, "f") else {
        panic!("expected function holder");
    };
    assert_eq!(overloads.len(), 2);
}

/// A variable and a function under one identifier collide
#[test]
fn test_function_does_not_extend_variable() {
    let mut global = SymbolGlobalScope::new("file:///a.as");
    let root = global.root();
    assert!(global.insert_symbol(root, variable(&global, root, "x")).is_ok());
    assert!(global.insert_symbol(root, function(&global, root, "x")).is_err());
}

/// Parent-chain lookup walks outward until it finds the name
#[test]
fn test_lookup_with_parent_walks_up() {
    let mut global = SymbolGlobalScope::new("file:///a.as");
    let root = global.root();
    let outer = global.insert_scope(root, "outer", None);
    let inner = global.insert_scope(outer, "inner", None);
    let var = variable(&global, root, "g");
    global.insert_symbol(root, var).unwrap();

    assert!(global.lookup_symbol(inner, "g").is_none());
    let (found, defined_in) = global.find_symbol_with_parent(inner, "g").unwrap();
    assert_eq!(found.name(), "g");
    assert_eq!(defined_in, root);
}

/// Anonymous scopes get unique names and are flagged as anonymous
#[test]
fn test_anonymous_scopes_are_unique() {
    let mut global = SymbolGlobalScope::new("file:///a.as");
    let root = global.root();
    let a = global.insert_anonymous_scope(root, Some(ScopeLinkedNode::Block));
    let b = global.insert_anonymous_scope(root, Some(ScopeLinkedNode::Block));
    assert_ne!(global.path_of(a), global.path_of(b));
    assert!(global.scope(a).is_anonymous());
}

/// Include merging shares symbols, merges namespaces and skips anonymous
/// scopes
#[test]
fn test_include_scope_merges_namespaces() {
    let mut lib = SymbolGlobalScope::new("file:///lib.as");
    let lib_root = lib.root();
    let ns = lib.insert_scope(lib_root, "util", None);
    let var = variable(&lib, ns, "counter");
    lib.insert_symbol(ns, var).unwrap();
    lib.insert_anonymous_scope(lib_root, Some(ScopeLinkedNode::Block));

    let mut main = SymbolGlobalScope::new("file:///main.as");
    let main_root = main.root();
    main.include_scope(&lib);

    let merged_ns = main.resolve_scope(&["util".to_string()]).unwrap();
    assert!(main.lookup_symbol(merged_ns, "counter").is_some());
    assert_eq!(main.scope(merged_ns).uri, "file:///lib.as");
    // Anonymous scope stayed behind
    assert_eq!(
        main.scope(main_root)
            .children
            .keys()
            .filter(|k| k.starts_with(ANONYMOUS_PREFIX))
            .count(),
        0
    );
}

/// Function holders from two files merge into one overload set
#[test]
fn test_include_scope_extends_function_holders() {
    let mut lib = SymbolGlobalScope::new("file:///lib.as");
    let lib_root = lib.root();
    lib.insert_symbol(lib_root, function(&lib, lib_root, "log")).unwrap();

    let mut main = SymbolGlobalScope::new("file:///main.as");
    let main_root = main.root();
    main.insert_symbol(main_root, function(&main, main_root, "log"))
        .unwrap();
    main.include_scope(&lib);

    let Some(SymbolHolder::Functions(overloads)) = main.lookup_symbol(main_root, "log") else {
        panic!("expected function holder");
    };
    assert_eq!(overloads.len(), 2);
}
