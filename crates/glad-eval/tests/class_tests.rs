//! Integration tests for classes: inheritance, MRO, access control,
//! statics, constructors and `SUPER`.

mod common;

use common::*;
use glad_eval::Value;
use glad_types::ast::{BinOp, Visibility};
use glad_types::ErrorKind;
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// `CLASS name [INHERITS parents] DEF speak() RETURN word ENDDEF ENDCLASS`
fn speaker(name: &str, parents: &[&str], word: &str) -> glad_types::ast::Node {
    class(name, parents, vec![], vec![method("speak", &[], vec![ret(s(word))])])
}

/// A `Point(x, y)` class with a `sum()` method.
fn point_class() -> glad_types::ast::Node {
    class(
        "Point",
        &[],
        vec![],
        vec![
            method(
                "Point",
                &["x", "y"],
                vec![set_attr(this(), "x", var("x")), set_attr(this(), "y", var("y"))],
            ),
            method("sum", &[], vec![ret(bin(attr(this(), "x"), BinOp::Add, attr(this(), "y")))]),
        ],
    )
}

// ══════════════════════════════════════════════════════════════════════════════
// Construction & methods
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn constructor_sets_fields() {
    let value = eval_ok(vec![point_class(), call_method(new("Point", vec![int(2), int(3)]), "sum", vec![])]);
    assert_eq!(value, Value::from(5));
}

#[test]
fn bound_method_keeps_receiver() {
    let value = eval_ok(vec![
        point_class(),
        let_("m", attr(new("Point", vec![int(4), int(1)]), "sum")),
        call_fn("m", vec![]),
    ]);
    assert_eq!(value, Value::from(5));
}

#[test]
fn explicit_this_parameter_is_not_counted() {
    let value = eval_ok(vec![
        class(
            "Box",
            &[],
            vec![],
            vec![method("get", &["THIS"], vec![ret(s("boxed"))])],
        ),
        call_method(new("Box", vec![]), "get", vec![]),
    ]);
    assert_eq!(value, Value::from("boxed"));
}

#[test]
fn fields_can_be_added_from_outside() {
    let value = eval_ok(vec![
        class("Bag", &[], vec![], vec![]),
        let_("b", new("Bag", vec![])),
        set_attr(var("b"), "item", s("apple")),
        attr(var("b"), "item"),
    ]);
    assert_eq!(value, Value::from("apple"));
}

#[test]
fn instances_render_with_class_name() {
    let out = output_of(vec![class("Bag", &[], vec![], vec![]), print(vec![new("Bag", vec![]), var("Bag")])]);
    assert_eq!(out, "<Bag instance> <class Bag>");
}

#[test]
fn missing_member() {
    let err = eval_err(vec![point_class(), attr(new("Point", vec![int(1), int(2)]), "z")]);
    assert_eq!(err.kind, ErrorKind::UndefinedMember);
    assert_eq!(err.message, "Class 'Point' has no member 'z'");
}

#[test]
fn arguments_without_constructor() {
    let err = eval_err(vec![class("Empty", &[], vec![], vec![]), new("Empty", vec![int(1)])]);
    assert_eq!(err.kind, ErrorKind::CallArity);
    assert_eq!(err.message, "'Empty' does not have a constructor that accepts arguments");
}

#[test]
fn new_requires_a_class() {
    let err = eval_err(vec![new("Ghost", vec![])]);
    assert_eq!(err.kind, ErrorKind::UndefinedName);
    assert_eq!(err.message, "Class 'Ghost' is not defined");

    let err = eval_err(vec![let_("n", int(1)), new("n", vec![])]);
    assert_eq!(err.kind, ErrorKind::NotAClass);
}

#[test]
fn calling_a_class_requires_new() {
    let err = eval_err(vec![class("C", &[], vec![], vec![]), call_fn("C", vec![])]);
    assert_eq!(err.kind, ErrorKind::IllegalOperation);
    assert_eq!(err.message, "Class 'C' must be instantiated using 'NEW'");
}

#[test]
fn method_overloads() {
    let value = eval_ok(vec![
        class(
            "Shape",
            &[],
            vec![],
            vec![
                method("area", &["r"], vec![ret(bin(var("r"), BinOp::Mul, var("r")))]),
                method("area", &["w", "h"], vec![ret(bin(var("w"), BinOp::Mul, var("h")))]),
            ],
        ),
        let_("sh", new("Shape", vec![])),
        list(vec![
            call_method(var("sh"), "area", vec![int(3)]),
            call_method(var("sh"), "area", vec![int(2), int(5)]),
        ]),
    ]);
    assert_eq!(value, Value::list(vec![Value::from(9), Value::from(10)]));
}

#[test]
fn overloads_must_share_visibility() {
    let err = eval_err(vec![class(
        "Shape",
        &[],
        vec![],
        vec![
            method("area", &["r"], vec![]),
            method_with("area", &["w", "h"], Visibility::Private, false, vec![]),
        ],
    )]);
    assert_eq!(err.kind, ErrorKind::OverloadConflict);
    assert_eq!(err.message, "All overloads of 'area' must have the same visibility");
}

#[test]
fn overloads_must_share_static_modifier() {
    let err = eval_err(vec![class(
        "Shape",
        &[],
        vec![],
        vec![
            method("area", &["r"], vec![]),
            method_with("area", &["w", "h"], Visibility::Public, true, vec![]),
        ],
    )]);
    assert_eq!(err.kind, ErrorKind::OverloadConflict);
    assert_eq!(err.message, "All overloads of 'area' must have the same static modifier");
}

// ══════════════════════════════════════════════════════════════════════════════
// Inheritance
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn override_and_super_call() {
    let value = eval_ok(vec![
        speaker("Animal", &[], "..."),
        class(
            "Dog",
            &["Animal"],
            vec![],
            vec![method(
                "speak",
                &[],
                vec![ret(bin(s("Woof "), BinOp::Add, call_method(var("SUPER"), "speak", vec![])))],
            )],
        ),
        call_method(new("Dog", vec![]), "speak", vec![]),
    ]);
    assert_eq!(value, Value::from("Woof ..."));
}

#[test]
fn inherited_method_runs_on_subclass() {
    let value = eval_ok(vec![
        speaker("Animal", &[], "..."),
        class("Cat", &["Animal"], vec![], vec![]),
        call_method(new("Cat", vec![]), "speak", vec![]),
    ]);
    assert_eq!(value, Value::from("..."));
}

#[test]
fn diamond_inheritance_uses_c3_order() {
    let value = eval_ok(vec![
        speaker("A", &[], "A"),
        speaker("B", &["A"], "B"),
        speaker("C", &["A"], "C"),
        class("D", &["B", "C"], vec![], vec![]),
        call_method(new("D", vec![]), "speak", vec![]),
    ]);
    assert_eq!(value, Value::from("B"));
}

#[test]
fn super_walks_the_mro_not_the_parent() {
    // D(B, C): SUPER from B continues at C, not at A.
    let value = eval_ok(vec![
        speaker("A", &[], "A"),
        class(
            "B",
            &["A"],
            vec![],
            vec![method(
                "speak",
                &[],
                vec![ret(bin(s("B"), BinOp::Add, call_method(var("SUPER"), "speak", vec![])))],
            )],
        ),
        speaker("C", &["A"], "C"),
        class("D", &["B", "C"], vec![], vec![]),
        call_method(new("D", vec![]), "speak", vec![]),
    ]);
    assert_eq!(value, Value::from("BC"));
}

#[test]
fn super_constructor() {
    let value = eval_ok(vec![
        class(
            "Base",
            &[],
            vec![],
            vec![method("Base", &["n"], vec![set_attr(this(), "n", var("n"))])],
        ),
        class(
            "Child",
            &["Base"],
            vec![],
            vec![method(
                "Child",
                &["n"],
                vec![call(var("SUPER"), vec![bin(var("n"), BinOp::Mul, int(2))])],
            )],
        ),
        attr(new("Child", vec![int(4)]), "n"),
    ]);
    assert_eq!(value, Value::from(8));
}

#[test]
fn inherited_constructor() {
    let value = eval_ok(vec![
        point_class(),
        class("Point3", &["Point"], vec![], vec![]),
        call_method(new("Point3", vec![int(1), int(1)]), "sum", vec![]),
    ]);
    assert_eq!(value, Value::from(2));
}

#[test]
fn super_outside_method() {
    let err = eval_err(vec![var("SUPER")]);
    assert_eq!(err.kind, ErrorKind::InvalidTarget);
}

#[test]
fn instanceof_follows_mro() {
    let value = eval_ok(vec![
        speaker("Animal", &[], "..."),
        class("Dog", &["Animal"], vec![], vec![]),
        let_("d", new("Dog", vec![])),
        list(vec![
            bin(var("d"), BinOp::InstanceOf, var("Animal")),
            bin(var("d"), BinOp::InstanceOf, var("Object")),
            bin(new("Animal", vec![]), BinOp::InstanceOf, var("Dog")),
            bin(int(1), BinOp::InstanceOf, var("Dog")),
        ]),
    ]);
    assert_eq!(value.to_string(), "[1, 1, 0, 0]");
}

#[test]
fn inconsistent_hierarchy_is_rejected() {
    let err = eval_err(vec![
        class("A", &[], vec![], vec![]),
        class("B", &[], vec![], vec![]),
        class("X", &["A", "B"], vec![], vec![]),
        class("Y", &["B", "A"], vec![], vec![]),
        class("Z", &["X", "Y"], vec![], vec![]),
    ]);
    assert_eq!(err.kind, ErrorKind::InconsistentHierarchy);
    assert_eq!(err.message, "Inconsistent inheritance hierarchy (Cycle or bad MRO)");
}

#[test]
fn class_cannot_inherit_from_itself() {
    let err = eval_err(vec![class("A", &[], vec![], vec![]), class("A", &["A"], vec![], vec![])]);
    assert_eq!(err.message, "Class 'A' cannot inherit from itself");
}

#[test]
fn class_can_only_inherit_from_class() {
    let err = eval_err(vec![let_("n", int(1)), class("B", &["n"], vec![], vec![])]);
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(err.message, "A class can only inherit from another class");
}

#[test]
fn override_cannot_narrow_visibility() {
    let err = eval_err(vec![
        speaker("Animal", &[], "..."),
        class(
            "Mute",
            &["Animal"],
            vec![],
            vec![method_with("speak", &[], Visibility::Private, false, vec![])],
        ),
    ]);
    assert_eq!(err.kind, ErrorKind::AccessViolation);
    assert_eq!(
        err.message,
        "Method 'speak' cannot be more restrictive than parent method (LSP Violation)"
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Access control
// ══════════════════════════════════════════════════════════════════════════════

fn account_class() -> glad_types::ast::Node {
    class(
        "Account",
        &[],
        vec![],
        vec![
            method(
                "Account",
                &[],
                vec![qualified(
                    Visibility::Private,
                    false,
                    set_attr(this(), "balance", int(100)),
                )],
            ),
            method("get", &[], vec![ret(attr(this(), "balance"))]),
            method_with("audit", &[], Visibility::Private, false, vec![ret(s("ok"))]),
        ],
    )
}

#[test]
fn private_field_visible_inside_class() {
    let value = eval_ok(vec![account_class(), call_method(new("Account", vec![]), "get", vec![])]);
    assert_eq!(value, Value::from(100));
}

#[test]
fn private_field_hidden_outside_class() {
    let err = eval_err(vec![account_class(), attr(new("Account", vec![]), "balance")]);
    assert_eq!(err.kind, ErrorKind::AccessViolation);
    assert_eq!(err.message, "Cannot access private member 'balance'");
}

#[test]
fn private_method_hidden_outside_class() {
    let err = eval_err(vec![account_class(), call_method(new("Account", vec![]), "audit", vec![])]);
    assert_eq!(err.kind, ErrorKind::AccessViolation);
    assert_eq!(err.message, "Cannot access private member 'audit'");
}

#[test]
fn private_fields_are_per_class() {
    let value = eval_ok(vec![
        class(
            "Base",
            &[],
            vec![],
            vec![
                method(
                    "Base",
                    &[],
                    vec![qualified(Visibility::Private, false, set_attr(this(), "x", s("base")))],
                ),
                method("base_x", &[], vec![ret(attr(this(), "x"))]),
            ],
        ),
        class(
            "Child",
            &["Base"],
            vec![],
            vec![
                method(
                    "Child",
                    &[],
                    vec![
                        call(var("SUPER"), vec![]),
                        qualified(Visibility::Private, false, set_attr(this(), "x", s("child"))),
                    ],
                ),
                method("child_x", &[], vec![ret(attr(this(), "x"))]),
            ],
        ),
        let_("c", new("Child", vec![])),
        list(vec![call_method(var("c"), "base_x", vec![]), call_method(var("c"), "child_x", vec![])]),
    ]);
    assert_eq!(value.to_string(), "[base, child]");
}

#[test]
fn protected_method_reachable_from_subclass() {
    let program = |outside: bool| {
        let call_site = if outside {
            call_method(new("Child", vec![]), "helper", vec![])
        } else {
            call_method(new("Child", vec![]), "use", vec![])
        };
        vec![
            class(
                "Base",
                &[],
                vec![],
                vec![method_with("helper", &[], Visibility::Protected, false, vec![ret(int(7))])],
            ),
            class(
                "Child",
                &["Base"],
                vec![],
                vec![method("use", &[], vec![ret(call_method(this(), "helper", vec![]))])],
            ),
            call_site,
        ]
    };
    assert_eq!(eval_ok(program(false)), Value::from(7));

    let err = eval_err(program(true));
    assert_eq!(err.kind, ErrorKind::AccessViolation);
    assert_eq!(err.message, "Cannot access protected member 'helper'");
}

#[test]
fn final_field_cannot_change() {
    let err = eval_err(vec![
        class(
            "Ticket",
            &[],
            vec![],
            vec![method(
                "Ticket",
                &[],
                vec![qualified(Visibility::Public, true, set_attr(this(), "id", int(1)))],
            )],
        ),
        let_("t", new("Ticket", vec![])),
        set_attr(var("t"), "id", int(2)),
    ]);
    assert_eq!(err.kind, ErrorKind::ConstantReassignment);
    assert_eq!(err.message, "Cannot reassign constant 'id'");
}

// ══════════════════════════════════════════════════════════════════════════════
// Statics
// ══════════════════════════════════════════════════════════════════════════════

fn counter_class() -> glad_types::ast::Node {
    let count = || attr(var("Counter"), "count");
    class(
        "Counter",
        &[],
        vec![let_("count", int(0)), final_("MAX", int(10))],
        vec![method_with(
            "inc",
            &[],
            Visibility::Public,
            true,
            vec![
                set_attr(var("Counter"), "count", bin(count(), BinOp::Add, int(1))),
                ret(count()),
            ],
        )],
    )
}

#[test]
fn static_method_updates_static_field() {
    let value = eval_ok(vec![
        counter_class(),
        call_method(var("Counter"), "inc", vec![]),
        call_method(var("Counter"), "inc", vec![]),
    ]);
    assert_eq!(value, Value::from(2));
}

#[test]
fn statics_visible_through_instances_and_subclasses() {
    let value = eval_ok(vec![
        counter_class(),
        class("Sub", &["Counter"], vec![], vec![]),
        call_method(var("Counter"), "inc", vec![]),
        list(vec![attr(new("Counter", vec![]), "count"), attr(var("Sub"), "MAX")]),
    ]);
    assert_eq!(value.to_string(), "[1, 10]");
}

#[test]
fn static_constant_cannot_change() {
    let err = eval_err(vec![counter_class(), set_attr(var("Counter"), "MAX", int(5))]);
    assert_eq!(err.kind, ErrorKind::ConstantReassignment);
    assert_eq!(err.message, "Cannot reassign static constant 'MAX'");
}

#[test]
fn unknown_static_field() {
    let err = eval_err(vec![counter_class(), set_attr(var("Counter"), "nope", int(5))]);
    assert_eq!(err.kind, ErrorKind::UndefinedMember);
}

#[test]
fn instance_cannot_shadow_static_constant() {
    let err = eval_err(vec![counter_class(), set_attr(new("Counter", vec![]), "MAX", int(1))]);
    assert_eq!(err.kind, ErrorKind::ConstantReassignment);
    assert_eq!(err.message, "Cannot shadow static constant 'MAX' with an instance variable");
}

#[test]
fn private_static_field_hidden_outside() {
    let err = eval_err(vec![
        class(
            "Vault",
            &[],
            vec![qualified(Visibility::Private, false, let_("code", int(1234)))],
            vec![],
        ),
        attr(var("Vault"), "code"),
    ]);
    assert_eq!(err.kind, ErrorKind::AccessViolation);
    assert_eq!(err.message, "Cannot access private static field 'code'");
}
