//! User functions, overload groups and bound methods.

use super::{ClassId, InstanceRef, Value};
use crate::error::{OpError, OpResult};
use crate::scope::ScopePin;
use glad_types::ast::{Node, Visibility};
use glad_types::{ErrorKind, Span};
use std::collections::BTreeMap;
use std::rc::Rc;

/// A user-defined function or method.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Rc<str>,
    pub params: Vec<String>,
    pub body: Rc<Node>,
    /// The frame the function was defined in, held for the function's lifetime.
    pub closure: ScopePin,
    pub visibility: Visibility,
    /// The class whose private and protected members the body may touch.
    pub defining_class: Option<ClassId>,
    pub is_method: bool,
    pub is_static: bool,
    pub span: Span,
}

impl Function {
    /// The parameters a caller supplies. A method's explicit leading `THIS`
    /// is bound from the receiver instead.
    pub fn arity_params(&self) -> &[String] {
        match self.params.split_first() {
            Some((first, rest)) if self.is_method && first == "THIS" => rest,
            _ => &self.params,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity_params().len()
    }
}

/// Same-named functions dispatched by argument count.
///
/// Groups are immutable; adding a variant builds a new group.
#[derive(Debug, Clone)]
pub struct FunctionGroup {
    pub name: Rc<str>,
    pub variants: BTreeMap<usize, Rc<Function>>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub defining_class: Option<ClassId>,
}

impl FunctionGroup {
    fn single(func: Rc<Function>) -> Self {
        FunctionGroup {
            name: Rc::clone(&func.name),
            visibility: func.visibility,
            is_static: func.is_static,
            defining_class: func.defining_class,
            variants: BTreeMap::from([(func.arity(), func)]),
        }
    }

    pub fn from_pair(first: Rc<Function>, second: Rc<Function>) -> OpResult<Self> {
        Self::single(first).with_variant(second)
    }

    /// A copy of this group with one more variant.
    pub fn with_variant(&self, func: Rc<Function>) -> OpResult<Self> {
        let arity = func.arity();
        if self.variants.contains_key(&arity) {
            return Err(OpError::new(
                ErrorKind::OverloadConflict,
                format!(
                    "Overload conflict: '{}' already has a variant with {arity} argument(s)",
                    self.name
                ),
            ));
        }
        if func.visibility != self.visibility {
            return Err(OpError::new(
                ErrorKind::OverloadConflict,
                format!("All overloads of '{}' must have the same visibility", self.name),
            ));
        }
        if func.is_static != self.is_static {
            return Err(OpError::new(
                ErrorKind::OverloadConflict,
                format!(
                    "All overloads of '{}' must have the same static modifier",
                    self.name
                ),
            ));
        }
        let mut group = self.clone();
        group.variants.insert(arity, func);
        Ok(group)
    }

    /// The variant taking `argc` arguments.
    pub fn resolve(&self, argc: usize) -> OpResult<&Rc<Function>> {
        self.variants.get(&argc).ok_or_else(|| {
            OpError::new(
                ErrorKind::CallArity,
                format!(
                    "No variant of function '{}' found that accepts {argc} arguments",
                    self.name
                ),
            )
        })
    }
}

/// Something a method table or name can hold and dispatch to.
#[derive(Debug, Clone)]
pub enum Callable {
    Function(Rc<Function>),
    Group(Rc<FunctionGroup>),
}

impl Callable {
    /// The callable part of a value, if it has one.
    pub fn from_value(value: &Value) -> Option<Callable> {
        match value {
            Value::Function(f) => Some(Callable::Function(Rc::clone(f))),
            Value::Group(g) => Some(Callable::Group(Rc::clone(g))),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Callable::Function(f) => &f.name,
            Callable::Group(g) => &g.name,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            Callable::Function(f) => f.visibility,
            Callable::Group(g) => g.visibility,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            Callable::Function(f) => f.is_static,
            Callable::Group(g) => g.is_static,
        }
    }

    pub fn defining_class(&self) -> Option<ClassId> {
        match self {
            Callable::Function(f) => f.defining_class,
            Callable::Group(g) => g.defining_class,
        }
    }

    /// Merge another same-named function into an overload group.
    pub fn add_variant(&self, func: Rc<Function>) -> OpResult<Callable> {
        let group = match self {
            Callable::Function(existing) => FunctionGroup::from_pair(Rc::clone(existing), func)?,
            Callable::Group(group) => group.with_variant(func)?,
        };
        Ok(Callable::Group(Rc::new(group)))
    }

    pub fn into_value(self) -> Value {
        match self {
            Callable::Function(f) => Value::Function(f),
            Callable::Group(g) => Value::Group(g),
        }
    }
}

/// A method bound to its receiver.
#[derive(Debug)]
pub struct BoundMethod {
    pub callable: Callable,
    pub receiver: InstanceRef,
}
