//! AST builders shared by the integration tests.
//!
//! Programs are assembled directly as trees; every node gets a span on
//! line 1 unless a test places it with [`at`].

#![allow(dead_code)]

use glad_eval::{Interpreter, IoHandler, Limits, RuntimeError, Value};
use glad_types::ast::*;
use glad_types::Span;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Running
// ══════════════════════════════════════════════════════════════════════════════

/// A fresh interpreter with captured output.
pub fn interpreter() -> Interpreter {
    Interpreter::default().with_io(IoHandler::buffer())
}

pub fn interpreter_with(limits: Limits) -> Interpreter {
    Interpreter::new(limits).with_io(IoHandler::buffer())
}

/// Run statements and return the program value plus captured output.
pub fn run(stmts: Vec<Node>) -> (Result<Value, RuntimeError>, String) {
    let mut interp = interpreter();
    let result = interp.run(&block(stmts));
    let output = interp.io_mut().take_output();
    (result, output)
}

/// Run statements that must succeed.
pub fn eval_ok(stmts: Vec<Node>) -> Value {
    match run(stmts).0 {
        Ok(value) => value,
        Err(err) => panic!("unexpected runtime error: [{}] {}", err.kind, err.message),
    }
}

/// Run statements that must fail.
pub fn eval_err(stmts: Vec<Node>) -> RuntimeError {
    match run(stmts).0 {
        Ok(value) => panic!("expected a runtime error, got {value:?}"),
        Err(err) => err,
    }
}

/// Output of statements that must succeed.
pub fn output_of(stmts: Vec<Node>) -> String {
    let (result, output) = run(stmts);
    if let Err(err) = result {
        panic!("unexpected runtime error: [{}] {}", err.kind, err.message);
    }
    output
}

// ══════════════════════════════════════════════════════════════════════════════
// Nodes
// ══════════════════════════════════════════════════════════════════════════════

fn node(kind: NodeKind) -> Node {
    Node::new(kind, Span::point(1, 1))
}

fn id(name: &str) -> Ident {
    Ident::new(name, Span::point(1, 1))
}

/// Place a node on `line`.
pub fn at(mut n: Node, line: u32) -> Node {
    n.span = Span::new(line, 1, line, 20);
    n
}

pub fn block(stmts: Vec<Node>) -> Node {
    node(NodeKind::Statements(stmts))
}

// ── Literals ──

pub fn int(i: i64) -> Node {
    node(NodeKind::Int(i))
}

pub fn float(f: f64) -> Node {
    node(NodeKind::Float(f))
}

pub fn s(text: &str) -> Node {
    node(NodeKind::Str(text.to_string()))
}

pub fn list(items: Vec<Node>) -> Node {
    node(NodeKind::List(items))
}

pub fn dict(pairs: Vec<(Node, Node)>) -> Node {
    node(NodeKind::Dict(pairs))
}

pub fn spec(targets: &[&str], iterable: Node, filter: Option<Node>) -> IterSpec {
    IterSpec {
        targets: targets.iter().map(|t| id(t)).collect(),
        iterable,
        filter,
    }
}

pub fn list_comp(element: Node, specs: Vec<IterSpec>) -> Node {
    node(NodeKind::ListComp {
        element: Box::new(element),
        specs,
    })
}

pub fn dict_comp(key: Node, value: Node, specs: Vec<IterSpec>) -> Node {
    node(NodeKind::DictComp {
        key: Box::new(key),
        value: Box::new(value),
        specs,
    })
}

// ── Variables ──

pub fn var(name: &str) -> Node {
    node(NodeKind::VarAccess(id(name)))
}

pub fn let_(name: &str, value: Node) -> Node {
    node(NodeKind::VarAssign {
        name: id(name),
        value: Box::new(value),
        declare: true,
    })
}

pub fn assign(name: &str, value: Node) -> Node {
    node(NodeKind::VarAssign {
        name: id(name),
        value: Box::new(value),
        declare: false,
    })
}

pub fn final_(name: &str, value: Node) -> Node {
    node(NodeKind::FinalAssign {
        name: id(name),
        value: Box::new(value),
    })
}

pub fn qualified(visibility: Visibility, is_final: bool, target: Node) -> Node {
    node(NodeKind::Qualified {
        visibility,
        is_final,
        target: Box::new(target),
    })
}

pub fn multi_assign(targets: &[&str], value: Node) -> Node {
    node(NodeKind::MultiAssign {
        targets: targets.iter().map(|t| id(t)).collect(),
        value: Box::new(value),
    })
}

pub fn print(args: Vec<Node>) -> Node {
    node(NodeKind::Print {
        args,
        newline: false,
    })
}

pub fn println(args: Vec<Node>) -> Node {
    node(NodeKind::Print {
        args,
        newline: true,
    })
}

// ── Control flow ──

pub fn if_(cond: Node, then: Vec<Node>, otherwise: Option<Vec<Node>>) -> Node {
    node(NodeKind::If {
        cases: vec![(cond, block(then))],
        else_case: otherwise.map(|b| Box::new(block(b))),
    })
}

pub fn for_(targets: &[&str], iterable: Node, body: Vec<Node>) -> Node {
    node(NodeKind::For {
        targets: targets.iter().map(|t| id(t)).collect(),
        iterable: Box::new(iterable),
        body: Box::new(block(body)),
    })
}

pub fn while_(cond: Node, body: Vec<Node>) -> Node {
    node(NodeKind::While {
        condition: Box::new(cond),
        body: Box::new(block(body)),
    })
}

pub fn brk() -> Node {
    node(NodeKind::Break)
}

pub fn cont() -> Node {
    node(NodeKind::Continue)
}

pub fn ret(value: Node) -> Node {
    node(NodeKind::Return(Some(Box::new(value))))
}

pub fn try_(body: Vec<Node>, catch: Option<(Option<&str>, Vec<Node>)>, finally: Option<Vec<Node>>) -> Node {
    node(NodeKind::Try(TryCatch {
        body: Box::new(block(body)),
        catch: catch.map(|(binding, body)| CatchClause {
            binding: binding.map(id),
            body: Box::new(block(body)),
        }),
        finally: finally.map(|b| Box::new(block(b))),
    }))
}

pub fn throw(value: Node) -> Node {
    node(NodeKind::Throw(Box::new(value)))
}

pub fn switch(subject: Node, cases: Vec<(Vec<Node>, Vec<Node>)>, default: Option<Vec<Node>>) -> Node {
    node(NodeKind::Switch(Switch {
        subject: Box::new(subject),
        cases: cases
            .into_iter()
            .map(|(values, body)| SwitchCase {
                values,
                body: block(body),
            })
            .collect(),
        default: default.map(|b| Box::new(block(b))),
    }))
}

// ── Functions ──

fn fun_def(name: Option<&str>, params: &[&str], body: Vec<Node>) -> FunDef {
    FunDef {
        name: name.map(id),
        params: params.iter().map(|p| id(p)).collect(),
        body: Rc::new(block(body)),
        visibility: Visibility::Public,
        is_static: false,
        span: Span::point(1, 1),
    }
}

pub fn def(name: &str, params: &[&str], body: Vec<Node>) -> Node {
    node(NodeKind::FunDef(fun_def(Some(name), params, body)))
}

pub fn lambda(params: &[&str], body: Vec<Node>) -> Node {
    node(NodeKind::FunDef(fun_def(None, params, body)))
}

pub fn call(callee: Node, args: Vec<Node>) -> Node {
    node(NodeKind::Call {
        callee: Box::new(callee),
        args,
    })
}

/// `name(args)`
pub fn call_fn(name: &str, args: Vec<Node>) -> Node {
    call(var(name), args)
}

// ── Classes ──

/// A public instance method.
pub fn method(name: &str, params: &[&str], body: Vec<Node>) -> FunDef {
    fun_def(Some(name), params, body)
}

pub fn method_with(name: &str, params: &[&str], visibility: Visibility, is_static: bool, body: Vec<Node>) -> FunDef {
    FunDef {
        visibility,
        is_static,
        ..fun_def(Some(name), params, body)
    }
}

pub fn class(name: &str, parents: &[&str], static_fields: Vec<Node>, methods: Vec<FunDef>) -> Node {
    node(NodeKind::Class(ClassDef {
        name: id(name),
        superclasses: parents.iter().map(|p| var(p)).collect(),
        static_fields,
        methods,
    }))
}

pub fn enum_(name: &str, cases: Vec<(&str, Option<Node>)>) -> Node {
    node(NodeKind::Enum {
        name: id(name),
        cases: cases.into_iter().map(|(c, v)| (id(c), v)).collect(),
    })
}

pub fn new(class: &str, args: Vec<Node>) -> Node {
    node(NodeKind::New {
        class: id(class),
        args,
    })
}

pub fn this() -> Node {
    var("THIS")
}

pub fn attr(object: Node, name: &str) -> Node {
    node(NodeKind::GetAttr {
        object: Box::new(object),
        name: id(name),
    })
}

pub fn set_attr(object: Node, name: &str, value: Node) -> Node {
    node(NodeKind::SetAttr {
        object: Box::new(object),
        name: id(name),
        value: Box::new(value),
    })
}

/// `object.name(args)`
pub fn call_method(object: Node, name: &str, args: Vec<Node>) -> Node {
    call(attr(object, name), args)
}

// ── Element access ──

pub fn index(target: Node, i: Node) -> Node {
    node(NodeKind::Index {
        target: Box::new(target),
        index: Box::new(i),
    })
}

pub fn index_set(target: Node, i: Node, value: Node) -> Node {
    node(NodeKind::IndexSet {
        target: Box::new(target),
        index: Box::new(i),
        value: Box::new(value),
    })
}

pub fn slice(target: Node, start: Node, end: Option<Node>) -> Node {
    node(NodeKind::Slice {
        target: Box::new(target),
        start: Box::new(start),
        end: end.map(Box::new),
    })
}

// ── Operators ──

pub fn bin(left: Node, op: BinOp, right: Node) -> Node {
    node(NodeKind::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

pub fn chain(first: Node, links: Vec<(BinOp, Node)>) -> Node {
    node(NodeKind::Chain {
        first: Box::new(first),
        links,
    })
}

pub fn unary(op: UnaryOp, operand: Node) -> Node {
    node(NodeKind::Unary {
        op,
        operand: Box::new(operand),
    })
}

pub fn post(step: Step, target: Node) -> Node {
    node(NodeKind::PostOp {
        step,
        target: Box::new(target),
    })
}

pub fn ternary(cond: Node, then: Node, otherwise: Node) -> Node {
    node(NodeKind::Ternary {
        condition: Box::new(cond),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    })
}
