#![allow(clippy::unwrap_used)]

use super::*;
use crate::syntax::ast::{
    ClassMember, FuncHead, LiteralKind, NodeExpr, NodeStatement, ScriptNode, VarInit,
};
use rstest::rstest;

#[rstest]
#[case::empty("")]
#[case::global_var("int counter = 0;")]
#[case::multi_declarator("int a = 1, b = 2;")]
#[case::prototype("void update(float dt);")]
#[case::const_ref_param("void log(const string &in message) {}")]
#[case::default_param("void fade(float alpha = 1.0f) {}")]
#[case::forward_class("class Later;")]
#[case::shared_class("shared class Net {}")]
#[case::interface_only("interface Ticker { void tick(); }")]
#[case::nested_calls("void main() { a(b(c(1)), d()); }")]
#[case::chained_members("void main() { world.player.stats.hp = 3; }")]
#[case::handle_compare("void main() { if (target !is null) { target = null; } }")]
#[case::ternary("void main() { int x = ok ? 1 : 2; }")]
#[case::bit_ops("void main() { flags = (flags | 0x10) & ~mask; }")]
#[case::exponent("void main() { double d = x ** 2; }")]
fn test_parse_accepts(#[case] source: &str) {
    let parsed = parse_script(source);
    assert!(parsed.errors.is_empty(), "{source}: {:?}", parsed.errors);
}

fn single_item(source: &str) -> ScriptNode {
    let parsed = parse_script(source);
    assert!(parsed.errors.is_empty(), "unexpected errors: {:?}", parsed.errors);
    assert_eq!(parsed.script.items.len(), 1, "items: {:?}", parsed.script.items);
    parsed.script.items.into_iter().next().unwrap()
}

#[test]
fn test_parse_function_with_body() {
    let ScriptNode::Func(func) = single_item("int add(int a, int b) { return a + b; }") else {
        panic!("expected function");
    };
    assert_eq!(func.ident.text, "add");
    assert_eq!(func.params.len(), 2);
    assert!(matches!(func.head, FuncHead::Returns(_)));
    let body = func.body.as_ref().unwrap();
    assert!(matches!(body.statements[0], NodeStatement::Return { .. }));
}

#[test]
fn test_parse_class_with_members() {
    let source = r#"
        class Dog : Animal {
            private int age;
            Dog() { age = 0; }
            ~Dog() {}
            void bark() const {}
        }
    "#;
    let ScriptNode::Class(class) = single_item(source) else {
        panic!("expected class");
    };
    assert_eq!(class.ident.text, "Dog");
    assert_eq!(class.bases.len(), 1);
    assert_eq!(class.bases[0].ident.text, "Animal");
    assert_eq!(class.members.len(), 4);
    let ClassMember::Func(ctor) = &class.members[1] else {
        panic!("expected constructor");
    };
    assert!(matches!(ctor.head, FuncHead::Constructor));
    let ClassMember::Func(dtor) = &class.members[2] else {
        panic!("expected destructor");
    };
    assert!(matches!(dtor.head, FuncHead::Destructor));
}

#[test]
fn test_parse_namespace_nesting() {
    let ScriptNode::Namespace(ns) = single_item("namespace A::B { int x; }") else {
        panic!("expected namespace");
    };
    let segments: Vec<_> = ns.segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(segments, ["A", "B"]);
    assert_eq!(ns.items.len(), 1);
}

#[test]
fn test_parse_enum_members() {
    let ScriptNode::Enum(decl) = single_item("enum Color { Red, Green = 2, Blue }") else {
        panic!("expected enum");
    };
    assert_eq!(decl.ident.text, "Color");
    let names: Vec<_> = decl.members.iter().map(|m| m.ident.text.as_str()).collect();
    assert_eq!(names, ["Red", "Green", "Blue"]);
    assert!(decl.members[1].value.is_some());
}

#[test]
fn test_parse_virtual_property() {
    let ScriptNode::VirtualProp(prop) = single_item("int value { get { return 1; } set {} }")
    else {
        panic!("expected virtual property");
    };
    assert_eq!(prop.ident.text, "value");
    assert!(prop.getter.is_some());
    assert!(prop.setter.is_some());
}

#[test]
fn test_parse_typedef_and_funcdef() {
    let parsed = parse_script("typedef int id_t;\nfuncdef void Callback(int code);");
    assert!(parsed.errors.is_empty());
    assert_eq!(parsed.script.items.len(), 2);
    assert!(matches!(parsed.script.items[0], ScriptNode::Typedef(_)));
    assert!(matches!(parsed.script.items[1], ScriptNode::FuncDef(_)));
}

#[test]
fn test_parse_include_directives() {
    let parsed = parse_script("#include \"util.as\"\nvoid main() {}");
    assert!(parsed.errors.is_empty());
    assert_eq!(parsed.script.includes.len(), 1);
    assert_eq!(parsed.script.includes[0].path, "util.as");
}

#[test]
fn test_parse_handle_and_array_types() {
    let ScriptNode::Var(var) = single_item("array<int> numbers;") else {
        panic!("expected var");
    };
    assert_eq!(var.ty.name.ident.text, "array");
    assert_eq!(var.ty.template_args.len(), 1);

    let ScriptNode::Var(var) = single_item("Entity@ target;") else {
        panic!("expected var");
    };
    assert!(var.ty.is_handle);

    let ScriptNode::Var(var) = single_item("int[] values;") else {
        panic!("expected var");
    };
    assert_eq!(var.ty.array_dims, 1);
}

#[test]
fn test_parse_constructor_call_initializer() {
    let ScriptNode::Func(func) = single_item("void main() { Vec3 v(1, 2, 3); }") else {
        panic!("expected function");
    };
    let body = func.body.as_ref().unwrap();
    let NodeStatement::Var(var) = &body.statements[0] else {
        panic!("expected var statement");
    };
    assert!(matches!(var.declarators[0].init, Some(VarInit::ArgList(ref args)) if args.len() == 3));
}

#[test]
fn test_parse_scoped_access_expression() {
    let ScriptNode::Func(func) = single_item("void main() { A::B::c = 1; }") else {
        panic!("expected function");
    };
    let body = func.body.as_ref().unwrap();
    let NodeStatement::Expr(NodeExpr::Assign { lhs, .. }) = &body.statements[0] else {
        panic!("expected assignment");
    };
    let NodeExpr::Ident { name, .. } = lhs.as_ref() else {
        panic!("expected scoped identifier");
    };
    let scope = name.scope.as_ref().unwrap();
    let segments: Vec<_> = scope.segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(segments, ["A", "B"]);
    assert_eq!(name.ident.text, "c");
}

#[test]
fn test_parse_named_arguments() {
    let ScriptNode::Func(func) = single_item("void main() { spawn(count: 3, fast: true); }")
    else {
        panic!("expected function");
    };
    let body = func.body.as_ref().unwrap();
    let NodeStatement::Expr(NodeExpr::Call { args, .. }) = &body.statements[0] else {
        panic!("expected call");
    };
    assert_eq!(args[0].name.as_ref().unwrap().text, "count");
    assert_eq!(args[1].name.as_ref().unwrap().text, "fast");
}

#[test]
fn test_parse_operators_and_precedence() {
    let ScriptNode::Func(func) = single_item("void main() { int x = 1 + 2 * 3; }") else {
        panic!("expected function");
    };
    let body = func.body.as_ref().unwrap();
    let NodeStatement::Var(var) = &body.statements[0] else {
        panic!("expected var");
    };
    let Some(VarInit::Expr(NodeExpr::Binary { op, rhs, .. })) = &var.declarators[0].init else {
        panic!("expected binary initializer");
    };
    assert_eq!(op, "+");
    assert!(matches!(rhs.as_ref(), NodeExpr::Binary { op, .. } if op == "*"));
}

#[test]
fn test_parse_literals() {
    let source = "void main() { a = 0x10; b = 1.5; c = 2.0f; d = true; e = null; f = \"hi\"; }";
    let ScriptNode::Func(func) = single_item(source) else {
        panic!("expected function");
    };
    let body = func.body.as_ref().unwrap();
    let kinds: Vec<_> = body
        .statements
        .iter()
        .filter_map(|s| match s {
            NodeStatement::Expr(NodeExpr::Assign { rhs, .. }) => match rhs.as_ref() {
                NodeExpr::Literal { kind, .. } => Some(*kind),
                _ => None,
            },
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        [
            LiteralKind::Int,
            LiteralKind::Double,
            LiteralKind::Float,
            LiteralKind::Bool,
            LiteralKind::Null,
            LiteralKind::String,
        ]
    );
}

#[test]
fn test_parse_control_flow_statements() {
    let source = r#"
        void main() {
            if (a > 0) { b = 1; } else b = 2;
            while (a < 10) a++;
            do { a--; } while (a > 0);
            for (int i = 0; i < 3; i++) sum += i;
            switch (a) { case 1: b = 1; break; default: b = 0; }
        }
    "#;
    let ScriptNode::Func(func) = single_item(source) else {
        panic!("expected function");
    };
    let statements = &func.body.as_ref().unwrap().statements;
    assert!(matches!(statements[0], NodeStatement::If { .. }));
    assert!(matches!(statements[1], NodeStatement::While { .. }));
    assert!(matches!(statements[2], NodeStatement::DoWhile { .. }));
    assert!(matches!(statements[3], NodeStatement::For { .. }));
    assert!(matches!(statements[4], NodeStatement::Switch { .. }));
}

#[test]
fn test_recovery_keeps_valid_declarations() {
    let source = "int good = 1;\nclass Broken {\nvoid also_good() {}";
    let parsed = parse_script(source);
    assert!(!parsed.errors.is_empty());
    // The leading variable survives even though the class never closes
    assert!(parsed
        .script
        .items
        .iter()
        .any(|item| matches!(item, ScriptNode::Var(v) if v.declarators[0].ident.text == "good")));
}

#[test]
fn test_parse_trailing_member_dot_kept_for_completion() {
    let parsed = parse_script("void main() { obj. ; }");
    // Tolerant member access: the trailing dot lowers to an empty member
    let ScriptNode::Func(func) = &parsed.script.items[0] else {
        panic!("expected function");
    };
    let body = func.body.as_ref().unwrap();
    let NodeStatement::Expr(NodeExpr::Member { ident, .. }) = &body.statements[0] else {
        panic!("expected member access, got {:?}", body.statements[0]);
    };
    assert!(ident.text.is_empty());
}

/// Identifiers that merely start with a keyword must not be split
#[test]
fn test_parse_keyword_prefixed_identifiers() {
    let source = r#"
        void main() {
            int returnValue = 1;
            return;
        }
        void elsewhere() {}
        void f(int &in value, const string &in name) {}
        class constant {}
    "#;
    let parsed = parse_script(source);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);

    let ScriptNode::Func(func) = &parsed.script.items[0] else {
        panic!("expected function");
    };
    let body = func.body.as_ref().unwrap();
    assert!(
        matches!(&body.statements[0], NodeStatement::Var(v) if v.declarators[0].ident.text == "returnValue")
    );
    assert!(matches!(body.statements[1], NodeStatement::Return { value: None, .. }));

    let ScriptNode::Func(f) = &parsed.script.items[2] else {
        panic!("expected function");
    };
    let names: Vec<_> = f
        .params
        .iter()
        .map(|p| p.ident.as_ref().unwrap().text.as_str())
        .collect();
    assert_eq!(names, ["value", "name"]);
}

#[test]
fn test_parse_cast_and_handle_expressions() {
    let source = "void main() { Entity@ e = cast<Entity>(obj); @e = null; }";
    let parsed = parse_script(source);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
}
