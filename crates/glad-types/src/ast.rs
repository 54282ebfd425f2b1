//! AST node types for GladLang.
//!
//! The evaluator only relies on each node's kind and [`Span`]; grammar is
//! validated upstream by the parser. Recursive children are boxed, function
//! bodies are reference-counted so closures can outlive the tree they were
//! parsed from (a REPL evaluates one tree per input line).

use crate::Span;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers & modifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Member visibility, ordered from most to least restrictive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    Private,
    Protected,
    #[default]
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "PRIVATE",
            Visibility::Protected => "PROTECTED",
            Visibility::Public => "PUBLIC",
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Nodes
// ══════════════════════════════════════════════════════════════════════════════

/// An AST node: a kind plus the source span it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Short name of the node kind, for diagnostics and tracing.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Statements(_) => "statements",
            NodeKind::Int(_) => "int",
            NodeKind::Float(_) => "float",
            NodeKind::Str(_) => "string",
            NodeKind::List(_) => "list",
            NodeKind::Dict(_) => "dict",
            NodeKind::ListComp { .. } => "list comprehension",
            NodeKind::DictComp { .. } => "dict comprehension",
            NodeKind::MultiAssign { .. } => "destructuring assignment",
            NodeKind::Slice { .. } => "slice",
            NodeKind::VarAccess(_) => "variable",
            NodeKind::VarAssign { .. } => "assignment",
            NodeKind::FinalAssign { .. } => "final assignment",
            NodeKind::Qualified { .. } => "qualified declaration",
            NodeKind::Print { .. } => "print",
            NodeKind::If { .. } => "if",
            NodeKind::For { .. } => "for",
            NodeKind::While { .. } => "while",
            NodeKind::Break => "break",
            NodeKind::Continue => "continue",
            NodeKind::FunDef(_) => "function definition",
            NodeKind::Call { .. } => "call",
            NodeKind::Return(_) => "return",
            NodeKind::Class(_) => "class definition",
            NodeKind::Enum { .. } => "enum definition",
            NodeKind::GetAttr { .. } => "attribute access",
            NodeKind::SetAttr { .. } => "attribute assignment",
            NodeKind::New { .. } => "instance construction",
            NodeKind::Index { .. } => "element access",
            NodeKind::IndexSet { .. } => "element assignment",
            NodeKind::Binary { .. } => "binary operation",
            NodeKind::Ternary { .. } => "ternary",
            NodeKind::Chain { .. } => "chained comparison",
            NodeKind::Unary { .. } => "unary operation",
            NodeKind::PostOp { .. } => "postfix operation",
            NodeKind::Try(_) => "try",
            NodeKind::Throw(_) => "throw",
            NodeKind::Switch(_) => "switch",
        }
    }
}

/// The kind of node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A sequence of statements; its value is the last statement's value.
    Statements(Vec<Node>),

    // ── Literals ──
    /// `42`
    Int(i64),
    /// `3.14`
    Float(f64),
    /// `"hello"`
    Str(String),
    /// `[a, b, c]`
    List(Vec<Node>),
    /// `{k: v, ...}`
    Dict(Vec<(Node, Node)>),
    /// `[expr FOR x IN xs IF cond ...]`
    ListComp {
        element: Box<Node>,
        specs: Vec<IterSpec>,
    },
    /// `{k: v FOR x IN xs IF cond ...}`
    DictComp {
        key: Box<Node>,
        value: Box<Node>,
        specs: Vec<IterSpec>,
    },

    // ── Variables ──
    /// `[a, b] = expr`
    MultiAssign {
        targets: Vec<Ident>,
        value: Box<Node>,
    },
    /// `expr[start:end]`
    Slice {
        target: Box<Node>,
        start: Box<Node>,
        end: Option<Box<Node>>,
    },
    /// `name` (including the special names `THIS` and `SUPER`)
    VarAccess(Ident),
    /// `LET name = expr` (`declare`) or `name = expr`
    VarAssign {
        name: Ident,
        value: Box<Node>,
        declare: bool,
    },
    /// `FINAL name = expr`
    FinalAssign { name: Ident, value: Box<Node> },
    /// `PRIVATE name = expr`, `PROTECTED FINAL THIS.x = expr`, ...
    ///
    /// `target` is a `VarAssign` or `SetAttr` node.
    Qualified {
        visibility: Visibility,
        is_final: bool,
        target: Box<Node>,
    },

    /// `PRINT a, b` / `PRINTLN a, b`
    Print { args: Vec<Node>, newline: bool },

    // ── Control flow ──
    /// `IF c THEN ... ELSE IF c2 THEN ... ELSE ... ENDIF`
    If {
        cases: Vec<(Node, Node)>,
        else_case: Option<Box<Node>>,
    },
    /// `FOR a, b IN expr ... ENDFOR`
    For {
        targets: Vec<Ident>,
        iterable: Box<Node>,
        body: Box<Node>,
    },
    /// `WHILE c ... ENDWHILE`
    While {
        condition: Box<Node>,
        body: Box<Node>,
    },
    Break,
    Continue,

    // ── Functions & classes ──
    /// `DEF name(params) ... ENDDEF` or an anonymous `DEF(params)`.
    FunDef(FunDef),
    /// `callee(args)`
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    /// `RETURN [expr]`
    Return(Option<Box<Node>>),
    /// `CLASS Name INHERITS A, B ... ENDCLASS`
    Class(ClassDef),
    /// `ENUM Name { A, B = 5, C }`
    Enum {
        name: Ident,
        cases: Vec<(Ident, Option<Node>)>,
    },
    /// `object.name`
    GetAttr { object: Box<Node>, name: Ident },
    /// `object.name = value`
    SetAttr {
        object: Box<Node>,
        name: Ident,
        value: Box<Node>,
    },
    /// `NEW Name(args)`
    New { class: Ident, args: Vec<Node> },
    /// `target[index]`
    Index {
        target: Box<Node>,
        index: Box<Node>,
    },
    /// `target[index] = value`
    IndexSet {
        target: Box<Node>,
        index: Box<Node>,
        value: Box<Node>,
    },

    // ── Operators ──
    /// `a + b`, `a AND b`, `a INSTANCEOF C`, ...
    Binary {
        left: Box<Node>,
        op: BinOp,
        right: Box<Node>,
    },
    /// `cond ? a : b`
    Ternary {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    /// `a < b <= c`
    Chain {
        first: Box<Node>,
        links: Vec<(BinOp, Node)>,
    },
    /// `-x`, `NOT x`, `~x`, `++x`, `--x`
    Unary { op: UnaryOp, operand: Box<Node> },
    /// `x++`, `x--`
    PostOp { step: Step, target: Box<Node> },

    // ── Exceptions ──
    /// `TRY ... CATCH e ... FINALLY ... ENDTRY`
    Try(TryCatch),
    /// `THROW expr`
    Throw(Box<Node>),
    /// `SWITCH v CASE 1, 2: ... DEFAULT: ... ENDSWITCH`
    Switch(Switch),
}

/// One `FOR targets IN iterable [IF filter]` clause of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct IterSpec {
    pub targets: Vec<Ident>,
    pub iterable: Node,
    pub filter: Option<Node>,
}

/// A function or method definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FunDef {
    /// `None` for anonymous functions.
    pub name: Option<Ident>,
    pub params: Vec<Ident>,
    pub body: Rc<Node>,
    /// Only meaningful for methods.
    pub visibility: Visibility,
    pub is_static: bool,
    pub span: Span,
}

/// A class definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: Ident,
    pub superclasses: Vec<Node>,
    /// Assignment statements evaluated in the class's static frame.
    pub static_fields: Vec<Node>,
    pub methods: Vec<FunDef>,
}

/// `TRY body [CATCH [binding] handler] [FINALLY finally]`
#[derive(Debug, Clone, PartialEq)]
pub struct TryCatch {
    pub body: Box<Node>,
    pub catch: Option<CatchClause>,
    pub finally: Option<Box<Node>>,
}

/// The `CATCH` clause of a try statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub binding: Option<Ident>,
    pub body: Box<Node>,
}

/// `SWITCH subject ... ENDSWITCH`
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub subject: Box<Node>,
    pub cases: Vec<SwitchCase>,
    pub default: Option<Box<Node>>,
}

/// `CASE v1, v2: body`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub values: Vec<Node>,
    pub body: Node,
}

// ── Operators ─────────────────────────────────────────────────────────────────

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    FloorDiv,
    Pow,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    // Comparison
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Is,
    InstanceOf,
    // Logical (short-circuit)
    And,
    Or,
}

impl BinOp {
    /// Returns the operator symbol for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::FloorDiv => "//",
            BinOp::Pow => "**",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::Is => "IS",
            BinOp::InstanceOf => "INSTANCEOF",
            BinOp::And => "AND",
            BinOp::Or => "OR",
        }
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `NOT x`
    Not,
    /// `~x`
    BitNot,
    /// `++x`
    PreIncrement,
    /// `--x`
    PreDecrement,
}

/// Direction of an increment/decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Increment,
    Decrement,
}
