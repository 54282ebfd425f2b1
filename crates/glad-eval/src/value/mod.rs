//! The GladLang value model.
//!
//! `Value` is a closed enum. Lists, dicts and instances are shared by
//! reference, so aliasing through variables is observable; functions,
//! classes, instances and enums compare by identity.

mod builtins;
mod class;
mod collections;
mod function;
mod number;
mod ops;

pub use builtins::Builtin;
pub use class::{
    linearize, ClassId, ClassObj, ClassRef, ClassTable, FieldKey, InstanceObj, InstanceRef,
    SuperProxy,
};
pub use collections::{
    equals, get_index, iterate, set_index, slice, DictKey, DictRef, ListRef, MAX_LIST_SIZE,
};
pub use function::{BoundMethod, Callable, Function, FunctionGroup};
pub use number::{Number, MAX_EXPONENT};
pub use ops::{binary, identical};

use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Built-in type tags usable with `INSTANCEOF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Number,
    String,
    List,
    Dict,
    Function,
    Object,
}

impl TypeTag {
    pub const ALL: [TypeTag; 6] = [
        TypeTag::Number,
        TypeTag::String,
        TypeTag::List,
        TypeTag::Dict,
        TypeTag::Function,
        TypeTag::Object,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Number => "Number",
            TypeTag::String => "String",
            TypeTag::List => "List",
            TypeTag::Dict => "Dict",
            TypeTag::Function => "Function",
            TypeTag::Object => "Object",
        }
    }
}

/// An enum definition: named cases with fixed values.
#[derive(Debug)]
pub struct EnumObj {
    pub name: Rc<str>,
    pub cases: IndexMap<String, Value>,
}

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Number(Number),
    Str(Rc<str>),
    List(ListRef),
    Dict(DictRef),
    Function(Rc<Function>),
    Group(Rc<FunctionGroup>),
    BoundMethod(Rc<BoundMethod>),
    Builtin(Builtin),
    Class(ClassRef),
    Instance(InstanceRef),
    Super(Rc<SuperProxy>),
    Type(TypeTag),
    Enum(Rc<EnumObj>),
}

impl Value {
    /// Null is the number zero.
    pub fn null() -> Value {
        Value::Number(Number::Int(0))
    }

    pub fn bool(b: bool) -> Value {
        Value::Number(Number::Int(b as i64))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn dict(entries: IndexMap<DictKey, Value>) -> Value {
        Value::Dict(Rc::new(RefCell::new(entries)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Str(_) => "String",
            Value::List(_) => "List",
            Value::Dict(_) => "Dict",
            Value::Function(_) => "Function",
            Value::Group(_) => "FunctionGroup",
            Value::BoundMethod(_) => "BoundMethod",
            Value::Builtin(_) => "BuiltInFunction",
            Value::Class(_) => "Class",
            Value::Instance(_) => "Instance",
            Value::Super(_) => "Super",
            Value::Type(_) => "Type",
            Value::Enum(_) => "Enum",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => n.is_truthy(),
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Dict(entries) => !entries.borrow().is_empty(),
            _ => true,
        }
    }

    /// Whether the value belongs to the callable family (functions,
    /// builtins and classes).
    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            Value::Function(_)
                | Value::Group(_)
                | Value::BoundMethod(_)
                | Value::Builtin(_)
                | Value::Class(_)
        )
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, seen: &mut Vec<usize>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                let addr = Rc::as_ptr(items) as *const () as usize;
                if seen.contains(&addr) {
                    return f.write_str("[...]");
                }
                seen.push(addr);
                f.write_str("[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.render(f, seen)?;
                }
                seen.pop();
                f.write_str("]")
            }
            Value::Dict(entries) => {
                let addr = Rc::as_ptr(entries) as *const () as usize;
                if seen.contains(&addr) {
                    return f.write_str("{...}");
                }
                seen.push(addr);
                f.write_str("{")?;
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: ", key.repr())?;
                    value.render(f, seen)?;
                }
                seen.pop();
                f.write_str("}")
            }
            Value::Function(func) => write!(f, "<function {}>", func.name),
            Value::Group(group) => write!(f, "<function group {}>", group.name),
            Value::BoundMethod(bound) => write!(f, "<function {}>", bound.callable.name()),
            Value::Builtin(b) => write!(f, "<built-in function {}>", b.name()),
            Value::Class(class) => write!(f, "<class {}>", class.name),
            Value::Instance(inst) => write!(f, "<{} instance>", inst.borrow().class.name),
            Value::Super(_) => f.write_str("<super>"),
            Value::Type(tag) => write!(f, "<type {}>", tag.name()),
            Value::Enum(e) => write!(f, "<enum {}>", e.name),
        }
    }
}

/// The text form used by `PRINT`, `STR` and `THROW`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "Str({s:?})"),
            other => write!(f, "{}({other})", other.type_name()),
        }
    }
}

/// Structural equality where defined, identity otherwise.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equals(self, other).unwrap_or_else(|_| identical(self, other))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::Int(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::Float(n))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::null().is_truthy());
        assert!(Value::from(-1).is_truthy());
        assert!(!Value::from(0.0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(!Value::list(vec![]).is_truthy());
        assert!(Value::Type(TypeTag::Object).is_truthy());
    }

    #[test]
    fn test_render_nested_collections() {
        let list = Value::list(vec![Value::from(1), Value::from("a"), Value::from(2.5)]);
        assert_eq!(list.to_string(), "[1, a, 2.5]");

        let mut entries = IndexMap::new();
        entries.insert(DictKey::from("k"), list);
        entries.insert(DictKey::Int(2), Value::from("v"));
        assert_eq!(Value::dict(entries).to_string(), "{'k': [1, a, 2.5], 2: v}");
    }

    #[test]
    fn test_render_self_referential_list() {
        let list = Value::list(vec![Value::from(1)]);
        if let Value::List(items) = &list {
            items.borrow_mut().push(list.clone());
        }
        assert_eq!(list.to_string(), "[1, [...]]");
    }

    #[test]
    fn test_render_tags() {
        assert_eq!(Value::Type(TypeTag::Dict).to_string(), "<type Dict>");
        assert_eq!(Value::Builtin(Builtin::Len).to_string(), "<built-in function LEN>");
        assert_eq!(Value::bool(true).to_string(), "1");
    }
}
