//! Binary operators over values.
//!
//! `AND`, `OR` and `INSTANCEOF` need the evaluator (short-circuiting and the
//! class table) and are handled there.

use super::collections::repeat;
use super::{equals, Number, Value};
use crate::error::{OpError, OpResult};
use glad_types::ast::BinOp;
use std::cmp::Ordering;
use std::rc::Rc;

/// Evaluate `left op right`.
pub fn binary(op: BinOp, left: &Value, right: &Value) -> OpResult<Value> {
    use Value::{Number as N, Str as S};
    match op {
        BinOp::Add => add(left, right),
        BinOp::Sub => arith(left, right, |a, b| Ok(a.sub(b))),
        BinOp::Mul => match (left, right) {
            (Value::List(items), N(times)) => repeat(&items.borrow(), *times),
            _ => arith(left, right, |a, b| Ok(a.mul(b))),
        },
        BinOp::Div => arith(left, right, Number::div),
        BinOp::Mod => arith(left, right, Number::rem),
        BinOp::FloorDiv => arith(left, right, Number::floor_div),
        BinOp::Pow => arith(left, right, Number::pow),
        BinOp::BitAnd => arith(left, right, |a, b| Ok(a.bit_and(b))),
        BinOp::BitOr => arith(left, right, |a, b| Ok(a.bit_or(b))),
        BinOp::BitXor => arith(left, right, |a, b| Ok(a.bit_xor(b))),
        BinOp::Shl => arith(left, right, Number::shl),
        BinOp::Shr => arith(left, right, Number::shr),
        BinOp::Eq => equals(left, right).map(Value::bool),
        BinOp::NotEq => equals(left, right).map(|eq| Value::bool(!eq)),
        BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => {
            let ordering = match (left, right) {
                (N(a), N(b)) => a.compare(*b),
                (S(a), S(b)) => Some(a.cmp(b)),
                _ => return Err(OpError::illegal()),
            };
            Ok(Value::bool(ordering.is_some_and(|ord| holds(op, ord))))
        }
        BinOp::Is => Ok(Value::bool(identical(left, right))),
        BinOp::And | BinOp::Or | BinOp::InstanceOf => Err(OpError::illegal()),
    }
}

fn holds(op: BinOp, ord: Ordering) -> bool {
    match op {
        BinOp::Less => ord == Ordering::Less,
        BinOp::Greater => ord == Ordering::Greater,
        BinOp::LessEq => ord != Ordering::Greater,
        BinOp::GreaterEq => ord != Ordering::Less,
        _ => false,
    }
}

fn arith(
    left: &Value,
    right: &Value,
    f: impl FnOnce(Number, Number) -> OpResult<Number>,
) -> OpResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => f(*a, *b).map(Value::Number),
        _ => Err(OpError::illegal()),
    }
}

fn add(left: &Value, right: &Value) -> OpResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.add(*b))),
        (Value::Number(a), Value::Str(b)) => Ok(Value::from(format!("{a}{b}"))),
        (Value::Str(a), Value::Number(b)) => Ok(Value::from(format!("{a}{b}"))),
        (Value::Str(a), Value::Str(b)) => Ok(Value::from(format!("{a}{b}"))),
        (Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (Value::Dict(a), Value::Dict(b)) => {
            let mut entries = a.borrow().clone();
            for (key, value) in b.borrow().iter() {
                entries.insert(key.clone(), value.clone());
            }
            Ok(Value::dict(entries))
        }
        _ => Err(OpError::illegal()),
    }
}

/// `IS`: identity for reference values, value equality for numbers,
/// strings and type tags.
pub fn identical(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.num_eq(*y),
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Type(x), Value::Type(y)) => x == y,
        (Value::List(x), Value::List(y)) => Rc::ptr_eq(x, y),
        (Value::Dict(x), Value::Dict(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Group(x), Value::Group(y)) => Rc::ptr_eq(x, y),
        (Value::BoundMethod(x), Value::BoundMethod(y)) => Rc::ptr_eq(x, y),
        (Value::Builtin(x), Value::Builtin(y)) => x == y,
        (Value::Class(x), Value::Class(y)) => x == y,
        (Value::Instance(x), Value::Instance(y)) => Rc::ptr_eq(x, y),
        (Value::Super(x), Value::Super(y)) => Rc::ptr_eq(x, y),
        (Value::Enum(x), Value::Enum(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}
