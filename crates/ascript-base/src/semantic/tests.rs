#![allow(clippy::unwrap_used)]

use super::analyzer::{AnalysisOutput, analyze_script};
use super::hints::ComplementHint;
use super::scope::SymbolGlobalScope;
use super::settings::AnalyzerSettings;
use super::symbol::SymbolHolder;
use crate::core::TextPosition;
use crate::syntax::parse_script;
use std::sync::Arc;

const TEST_URI: &str = "/test/main.as";

fn analyze_with(source: &str, settings: &AnalyzerSettings) -> AnalysisOutput {
    let parsed = parse_script(source);
    assert!(
        parsed.errors.is_empty(),
        "parse errors in test source: {:?}",
        parsed.errors
    );
    analyze_script(TEST_URI, &parsed.script, &[], settings)
}

fn analyze(source: &str) -> AnalysisOutput {
    analyze_with(source, &AnalyzerSettings::default())
}

fn assert_clean(output: &AnalysisOutput) {
    assert!(
        output.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        output.diagnostics
    );
}

fn messages(output: &AnalysisOutput) -> Vec<&str> {
    output.diagnostics.iter().map(|d| d.message.as_str()).collect()
}

fn root_symbols<'a>(scope: &'a SymbolGlobalScope) -> Vec<&'a str> {
    scope
        .scope(scope.root())
        .symbols
        .keys()
        .map(String::as_str)
        .collect()
}

// ---------------------------------------------------------------------------
// Hoisting basics
// ---------------------------------------------------------------------------

/// Forward references resolve because hoisting declares before analyzing
#[test]
fn test_forward_references() {
    let output = analyze(
        r#"
        void main() { helper(later); }
        void helper(Config c) {}
        Config later;
        class Config { int value; }
        "#,
    );
    assert_clean(&output);
}

#[test]
fn test_enum_members_and_values() {
    let output = analyze("enum Color { Red, Green = 2, Blue }");
    assert_clean(&output);
    let scope = output.scope.resolve_scope(&["Color".to_string()]).unwrap();
    let members: Vec<_> = output.scope.scope(scope).symbols.keys().cloned().collect();
    assert_eq!(members, ["Red", "Green", "Blue"]);
}

/// Enum members mirror into the parent scope only with the setting on
#[test]
fn test_hoist_enum_parent_scope_setting() {
    let source = "enum Color { Red }\nvoid main() { int x = Red; }";

    let output = analyze(source);
    assert_eq!(messages(&output), ["Unresolved identifier 'Red'"]);

    let settings = AnalyzerSettings {
        hoist_enum_parent_scope: true,
        ..AnalyzerSettings::default()
    };
    let output = analyze_with(source, &settings);
    assert_clean(&output);
}

#[test]
fn test_typedef_aliases_primitive() {
    let output = analyze("typedef int cell_t;\nvoid main() { cell_t c = 3; c = c + 1; }");
    assert_clean(&output);
}

#[test]
fn test_duplicate_declaration_diagnosed() {
    let output = analyze("int x;\nfloat x;");
    assert_eq!(messages(&output), ["Duplicate declaration of 'x'"]);
}

// ---------------------------------------------------------------------------
// End-to-end scenario: namespaced enum access
// ---------------------------------------------------------------------------

#[test]
fn test_namespaced_enum_access() {
    let output = analyze(
        r#"
        namespace A { namespace B { namespace C_0 { int c_0; } } }
        enum A { Red }
        void main() { A::B::C_0::c_0 = 1; int v = A::Red; }
        "#,
    );
    assert_clean(&output);

    // c_0 and Red resolve to their declarations
    let find_target = |name: &str| {
        output
            .scope
            .references
            .iter()
            .find(|r| r.to.name == name)
            .unwrap_or_else(|| panic!("no reference to {name}"))
    };
    assert_eq!(
        find_target("c_0").to.scope_path,
        vec!["A".to_string(), "B".to_string(), "C_0".to_string()]
    );
    assert_eq!(find_target("Red").to.scope_path, vec!["A".to_string()]);
    // Qualifier segments are referenced too
    assert!(output.scope.references.iter().any(|r| r.to.name == "B"));
}

// ---------------------------------------------------------------------------
// End-to-end scenario: overload resolution
// ---------------------------------------------------------------------------

#[test]
fn test_overload_resolution_prefers_exact() {
    let output = analyze("void f(int a) {}\nvoid f(float a) {}\nvoid main() { f(1); }");
    assert_clean(&output);

    let call = output
        .scope
        .hints
        .iter()
        .find_map(|h| match h {
            ComplementHint::FunctionCall {
                callee_holder,
                selected,
                ..
            } => Some((callee_holder.len(), *selected)),
            _ => None,
        })
        .expect("function call hint");
    // The hint carries both signatures; the int overload was chosen
    assert_eq!(call, (2, 0));
}

#[test]
fn test_overload_no_candidate_dumps_signatures() {
    let output = analyze("void f(int a) {}\nvoid main() { f(true); }");
    let all = messages(&output).join("\n");
    assert!(all.contains("No matching overload"), "{all}");
    assert!(all.contains("candidate:"), "{all}");
}

#[test]
fn test_overload_ambiguous_call() {
    let output = analyze(
        "void g(int a, float b) {}\nvoid g(float a, int b) {}\nvoid main() { g(1, 1); }",
    );
    assert!(
        messages(&output).iter().any(|m| m.contains("Ambiguous call")),
        "{:?}",
        messages(&output)
    );
}

#[test]
fn test_named_arguments() {
    let output = analyze(
        "void spawn(int count, bool fast = false) {}\nvoid main() { spawn(count: 3, fast: true); spawn(3); }",
    );
    assert_clean(&output);

    let output = analyze("void spawn(int count) {}\nvoid main() { spawn(nope: 3); }");
    assert!(
        messages(&output)
            .iter()
            .any(|m| m.contains("Unknown named argument 'nope'")),
        "{:?}",
        messages(&output)
    );
}

#[test]
fn test_default_arguments_fill_missing_params() {
    let output = analyze("void f(int a, int b = 2) {}\nvoid main() { f(1); f(1, 3); }");
    assert_clean(&output);
}

// ---------------------------------------------------------------------------
// End-to-end scenario: base class private filtering
// ---------------------------------------------------------------------------

#[test]
fn test_base_private_members_not_copied() {
    let output = analyze("class B { private int x; int y; }\nclass C : B {}");
    assert_clean(&output);

    let members = output.scope.resolve_scope(&["C".to_string()]).unwrap();
    let scope = output.scope.scope(members);
    assert!(scope.symbols.contains_key("y"), "y copied from base");
    assert!(!scope.symbols.contains_key("x"), "private x must not leak");
    // `this` belongs to C itself, never the base
    let Some(SymbolHolder::Variable(this_var)) = scope.symbols.get("this") else {
        panic!("missing this");
    };
    assert_eq!(
        this_var.ty.type_symbol().unwrap().ident.text,
        "C",
        "this must have the derived type"
    );
}

#[test]
fn test_base_members_usable_through_derived() {
    let output = analyze(
        r#"
        class B { int y; void ping() {} }
        class C : B {}
        void main() { C c; c.y = 1; c.ping(); }
        "#,
    );
    assert_clean(&output);
}

#[test]
fn test_inherited_member_collision_diagnosed() {
    let output = analyze("class B { int n; }\nclass D : B { bool n; }");
    assert!(
        messages(&output)
            .iter()
            .any(|m| m.contains("inherited from 'B'")),
        "{:?}",
        messages(&output)
    );
}

#[test]
fn test_super_injected_from_first_base() {
    let output = analyze(
        r#"
        class B { B(int x) {} B() {} }
        class D : B { D() { super(1); super(); } }
        "#,
    );
    assert_clean(&output);

    let members = output.scope.resolve_scope(&["D".to_string()]).unwrap();
    let Some(SymbolHolder::Functions(supers)) = output.scope.scope(members).symbols.get("super")
    else {
        panic!("super not injected");
    };
    // Each base constructor is cloned
    assert_eq!(supers.len(), 2);
}

#[test]
fn test_interface_base_and_implementation() {
    let output = analyze(
        r#"
        interface Walker { void walk(); }
        class Robot : Walker { void walk() {} }
        void use_it(Walker@ w) {}
        void main() { Robot r; use_it(r); }
        "#,
    );
    assert_clean(&output);
}

// ---------------------------------------------------------------------------
// End-to-end scenario: property synthesis
// ---------------------------------------------------------------------------

#[test]
fn test_property_synthesis_implicit() {
    let settings = AnalyzerSettings {
        explicit_property_accessor: false,
        ..AnalyzerSettings::default()
    };
    let output = analyze_with(
        r#"
        class P { int get_v() { return 1; } void set_v(int value) {} }
        void main() { P p; p.v = 3; int w = p.v; }
        "#,
        &settings,
    );
    assert_clean(&output);

    // Property parity: the synthetic variable sits next to the accessors
    let members = output.scope.resolve_scope(&["P".to_string()]).unwrap();
    let Some(SymbolHolder::Variable(v)) = output.scope.scope(members).symbols.get("v") else {
        panic!("synthetic property variable missing");
    };
    assert_eq!(v.ty.display_name(), "int");
}

#[test]
fn test_property_requires_attribute_by_default() {
    // Without the `property` attribute and with explicit accessors
    // required, no variable is synthesized
    let output = analyze(
        r#"
        class P { int get_v() { return 1; } }
        void main() { P p; int w = p.v; }
        "#,
    );
    assert!(
        messages(&output).iter().any(|m| m.contains("not a member")),
        "{:?}",
        messages(&output)
    );
}

#[test]
fn test_property_attribute_synthesizes() {
    let output = analyze(
        r#"
        class P { int get_v() property { return 1; } }
        void main() { P p; int w = p.v; }
        "#,
    );
    assert_clean(&output);
}

#[test]
fn test_property_attribute_on_bad_name_diagnosed() {
    let output = analyze("class P { int width() property { return 1; } }");
    assert!(
        messages(&output)
            .iter()
            .any(|m| m.contains("get_<name>' or 'set_<name>")),
        "{:?}",
        messages(&output)
    );
}

#[test]
fn test_virtual_property_scopes() {
    let output = analyze(
        r#"
        class T {
            int backing;
            int hp { get { return backing; } set { backing = value; } }
        }
        void main() { T t; t.hp = 5; int h = t.hp; }
        "#,
    );
    assert_clean(&output);
}

// ---------------------------------------------------------------------------
// Statements and expressions
// ---------------------------------------------------------------------------

#[test]
fn test_auto_type_resolution_hint() {
    let output = analyze("void main() { auto x = 1.5; x = 2.0; }");
    assert_clean(&output);
    let ty = output
        .scope
        .hints
        .iter()
        .find_map(|h| match h {
            ComplementHint::AutoTypeResolution { ty, .. } => Some(ty.display_name()),
            _ => None,
        })
        .expect("auto hint");
    assert_eq!(ty, "double");
}

#[test]
fn test_auto_without_initializer_diagnosed() {
    let output = analyze("void main() { auto x; }");
    assert!(
        messages(&output)
            .iter()
            .any(|m| m.contains("Unable to infer")),
        "{:?}",
        messages(&output)
    );
}

#[test]
fn test_return_type_conformance() {
    let output = analyze("float f() { return true; }");
    assert!(
        messages(&output)
            .iter()
            .any(|m| m.contains("cannot convert 'bool' to 'float'")),
        "{:?}",
        messages(&output)
    );

    let output = analyze("void f() { return 1; }");
    assert!(
        messages(&output)
            .iter()
            .any(|m| m.contains("void function cannot return")),
        "{:?}",
        messages(&output)
    );

    let output = analyze("int f() { return; }");
    assert!(
        messages(&output)
            .iter()
            .any(|m| m.contains("must return a value")),
        "{:?}",
        messages(&output)
    );
}

#[test]
fn test_condition_must_be_bool() {
    let output = analyze("void main() { while (1) {} }");
    assert!(
        messages(&output)
            .iter()
            .any(|m| m.contains("condition must be 'bool'")),
        "{:?}",
        messages(&output)
    );
    assert_clean(&analyze("void main() { while (true) {} }"));
}

#[test]
fn test_access_violation_private_member() {
    let output = analyze(
        "class A { private int secret; void ok() { secret = 1; } }\nvoid main() { A a; a.secret = 2; }",
    );
    assert_eq!(
        messages(&output),
        ["Cannot access private member 'secret' from here"]
    );
}

#[test]
fn test_protected_member_visible_in_derived() {
    let output = analyze(
        r#"
        class B { protected int hp; }
        class D : B { void heal() { hp = 10; } }
        void main() { D d; d.hp = 1; }
        "#,
    );
    assert_eq!(
        messages(&output),
        ["Cannot access protected member 'hp' from here"]
    );
}

#[test]
fn test_operator_overload_on_classes() {
    let output = analyze(
        r#"
        class Vec { Vec opAdd(Vec other) { return this; } bool opEquals(Vec other) { return true; } }
        void main() { Vec a; Vec b; Vec c = a + b; bool e = a == b; }
        "#,
    );
    assert_clean(&output);
}

#[test]
fn test_commuted_op_equals() {
    // Only the right-hand side defines opEquals; the comparison still
    // resolves through the commuted form
    let output = analyze(
        r#"
        class Id { bool opEquals(int other) { return true; } }
        void main() { Id v; bool b = 1 == v; }
        "#,
    );
    assert_clean(&output);
}

#[test]
fn test_operator_mismatch_diagnosed() {
    let output = analyze("class Bare {}\nvoid main() { Bare b; Bare c; b = b + c; }");
    assert!(
        messages(&output)
            .iter()
            .any(|m| m.contains("Operator '+' is not defined")),
        "{:?}",
        messages(&output)
    );
}

#[test]
fn test_index_operator_with_template_translation() {
    let output = analyze(
        r#"
        class array<T> { T opIndex(uint index) { return value; } T value; void insertLast(T item) {} }
        void main() { array<int> xs; int x = xs[0]; xs.insertLast(4); int[] ys; int y = ys[1]; }
        "#,
    );
    assert_clean(&output);
}

#[test]
fn test_funcdef_handle_binding() {
    let output = analyze(
        r#"
        funcdef void Callback(int code);
        void run(Callback@ cb) {}
        void on_done(int code) {}
        void main() { run(on_done); }
        "#,
    );
    assert_clean(&output);
}

#[test]
fn test_unresolved_identifier_diagnosed_once() {
    let output = analyze("void main() { missing_fn(); }");
    assert_eq!(messages(&output), ["Unresolved identifier 'missing_fn'"]);
}

#[test]
fn test_unresolved_type_propagates_silently() {
    // One bad type, not a cascade: the variable's uses stay quiet
    let output = analyze("void main() { Mystery m; m.poke(); m = m; }");
    assert_eq!(messages(&output), ["Unresolved type 'Mystery'"]);
}

#[test]
fn test_constructor_call_initializer() {
    let output = analyze(
        "class Vec { Vec(int x, int y) {} }\nvoid main() { Vec v(1, 2); Vec w = Vec(3, 4); }",
    );
    assert_clean(&output);

    let output = analyze("class Vec { Vec(int x) {} }\nvoid main() { Vec v(true); }");
    assert!(
        messages(&output)
            .iter()
            .any(|m| m.contains("No matching overload")),
        "{:?}",
        messages(&output)
    );
}

#[test]
fn test_string_literal_uses_builtin_string_type() {
    let output = analyze(
        r#"
        class string { string opAdd(string other) { return this; } }
        void greet(string s) {}
        void main() { greet("hello" + "!"); }
        "#,
    );
    assert_clean(&output);
}

// ---------------------------------------------------------------------------
// Hints and references
// ---------------------------------------------------------------------------

#[test]
fn test_member_completion_hint_after_dot() {
    let output = analyze("class E { int field; }\nvoid main() { E e; e.field = 1; }");
    assert_clean(&output);
    let hint = output
        .scope
        .hints
        .iter()
        .find_map(|h| match h {
            ComplementHint::AutocompleteInstanceMember { caret, target } => {
                Some((*caret, target.display_name()))
            }
            _ => None,
        })
        .expect("instance member hint");
    assert_eq!(hint.1, "E");
    // The caret range covers positions right after the dot
    assert!(hint.0.contains(TextPosition::new(1, 21)));
}

#[test]
fn test_namespace_completion_hint_after_colons() {
    let output = analyze("namespace ui { int width; }\nvoid main() { ui::width = 1; }");
    assert_clean(&output);
    assert!(
        output
            .scope
            .hints
            .iter()
            .any(|h| matches!(h, ComplementHint::AutocompleteNamespaceAccess { .. })),
        "missing namespace access hint"
    );
}

#[test]
fn test_goto_definition_round_trip() {
    let output = analyze("int counter;\nvoid main() { counter = 1; }");
    assert_clean(&output);
    let reference = output
        .scope
        .references
        .iter()
        .find(|r| r.to.name == "counter")
        .expect("reference to counter");
    // The definition location is the declaring identifier token
    assert_eq!(reference.to_definition.uri, TEST_URI);
    assert_eq!(reference.to_definition.range.start, TextPosition::new(0, 4));
    // And the key resolves through the global scope
    let holder = output
        .scope
        .resolve_symbol(&reference.to.scope_path, &reference.to.name)
        .expect("symbol reachable via path");
    assert_eq!(holder.name(), "counter");
}

#[test]
fn test_scope_regions_recorded() {
    let output = analyze("namespace ns { void f() { { int x; } } }");
    assert_clean(&output);
    // namespace, function body and inner block each get a region
    assert!(output.scope.scope_regions.len() >= 3);
}

// ---------------------------------------------------------------------------
// Include-scope merging
// ---------------------------------------------------------------------------

#[test]
fn test_cross_file_symbols_via_include_scope() {
    let lib = analyze_script(
        "/test/lib.as",
        &parse_script("namespace util { int twice(int x) { return x + x; } }").script,
        &[],
        &AnalyzerSettings::default(),
    );
    assert_clean(&lib);

    let parsed = parse_script("void main() { int y = util::twice(21); }");
    let main = analyze_script(
        TEST_URI,
        &parsed.script,
        &[Arc::new(lib.scope)],
        &AnalyzerSettings::default(),
    );
    assert_clean(&main);
    // The reference points back into the declaring file
    let reference = main
        .scope
        .references
        .iter()
        .find(|r| r.to.name == "twice")
        .expect("cross-file reference");
    assert_eq!(reference.to.uri, "/test/lib.as");
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

/// Hoist+analyze twice over one AST produces the same structure
#[test]
fn test_analysis_is_idempotent() {
    let parsed = parse_script(
        r#"
        class B { int y; }
        class C : B { void m() { y = 2; } }
        enum K { One, Two }
        void main() { C c; c.m(); int v = K::Two; }
        "#,
    );
    let settings = AnalyzerSettings::default();
    let first = analyze_script(TEST_URI, &parsed.script, &[], &settings);
    let second = analyze_script(TEST_URI, &parsed.script, &[], &settings);

    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.scope.scope_count(), second.scope.scope_count());
    assert_eq!(first.scope.references.len(), second.scope.references.len());
    assert_eq!(root_symbols(&first.scope), root_symbols(&second.scope));
}
