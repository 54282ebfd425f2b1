//! List and dict semantics: keys, element access, slicing, iteration and
//! cycle-safe structural equality.

use super::{identical, Number, Value};
use crate::error::{OpError, OpResult};
use glad_types::ErrorKind;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Largest list that `list * n` may produce.
pub const MAX_LIST_SIZE: usize = 1_000_000;

pub type ListRef = Rc<RefCell<Vec<Value>>>;
pub type DictRef = Rc<RefCell<IndexMap<DictKey, Value>>>;

/// A dict key. Integral floats are stored as integers so `1` and `1.0`
/// name the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DictKey {
    Int(i64),
    /// Bit pattern of a non-integral float.
    Float(u64),
    Str(Rc<str>),
}

impl DictKey {
    pub fn from_value(value: &Value) -> OpResult<DictKey> {
        match value {
            Value::Number(n) => Ok(Self::from_number(*n)),
            Value::Str(s) => Ok(DictKey::Str(Rc::clone(s))),
            _ => Err(OpError::type_error("Key must be a Number or String")),
        }
    }

    pub fn from_number(n: Number) -> DictKey {
        match n.as_exact_int() {
            Some(i) => DictKey::Int(i),
            None => DictKey::Float(n.as_f64().to_bits()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            DictKey::Int(i) => Value::from(*i),
            DictKey::Float(bits) => Value::from(f64::from_bits(*bits)),
            DictKey::Str(s) => Value::Str(Rc::clone(s)),
        }
    }

    /// The quoted form used inside rendered dicts.
    pub fn repr(&self) -> String {
        match self {
            DictKey::Str(s) => format!("'{s}'"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for DictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictKey::Int(i) => write!(f, "{i}"),
            DictKey::Float(bits) => write!(f, "{}", Number::Float(f64::from_bits(*bits))),
            DictKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DictKey {
    fn from(s: &str) -> Self {
        DictKey::Str(Rc::from(s))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Element access
// ══════════════════════════════════════════════════════════════════════════════

/// Resolve a possibly negative index against `len`.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let i = if index < 0 { index + len } else { index };
    (0..len).contains(&i).then_some(i as usize)
}

fn index_number(index: &Value, what: &str) -> OpResult<Number> {
    index
        .as_number()
        .ok_or_else(|| OpError::type_error(format!("{what} index must be a Number")))
}

/// `target[index]`
pub fn get_index(target: &Value, index: &Value) -> OpResult<Value> {
    match target {
        Value::Str(s) => {
            let n = index_number(index, "String")?;
            let len = s.chars().count();
            resolve_index(n.truncate(), len)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::from(c.to_string()))
                .ok_or_else(|| OpError::bounds(format!("String index {n} out of bounds")))
        }
        Value::List(items) => {
            let n = index_number(index, "List")?;
            let items = items.borrow();
            resolve_index(n.truncate(), items.len())
                .map(|i| items[i].clone())
                .ok_or_else(|| OpError::bounds(format!("List index {n} out of bounds")))
        }
        Value::Dict(entries) => {
            let key = DictKey::from_value(index)?;
            entries
                .borrow()
                .get(&key)
                .cloned()
                .ok_or_else(|| OpError::bounds(format!("Key '{key}' not found")))
        }
        _ => Err(OpError::illegal()),
    }
}

/// `target[index] = value`
pub fn set_index(target: &Value, index: &Value, value: Value) -> OpResult<()> {
    match target {
        Value::List(items) => {
            let n = index_number(index, "List")?;
            let mut items = items.borrow_mut();
            let i = resolve_index(n.truncate(), items.len())
                .ok_or_else(|| OpError::bounds(format!("List index {n} out of bounds")))?;
            items[i] = value;
            Ok(())
        }
        Value::Dict(entries) => {
            let key = DictKey::from_value(index)?;
            entries.borrow_mut().insert(key, value);
            Ok(())
        }
        _ => Err(OpError::illegal()),
    }
}

/// Clamp slice bounds the way negative-index slicing does.
fn slice_bounds(len: usize, start: i64, end: Option<i64>) -> (usize, usize) {
    let len_i = len as i64;
    let clamp = |i: i64| -> usize {
        if i < 0 {
            (i + len_i).max(0) as usize
        } else {
            i.min(len_i) as usize
        }
    };
    let s = clamp(start);
    let e = end.map_or(len, clamp);
    (s, e.max(s))
}

/// `target[start:end]`
pub fn slice(target: &Value, start: &Value, end: Option<&Value>) -> OpResult<Value> {
    let start = start
        .as_number()
        .ok_or_else(|| OpError::type_error("Start index must be a number"))?
        .truncate();
    let end = match end {
        Some(v) => Some(
            v.as_number()
                .ok_or_else(|| OpError::type_error("End index must be a number"))?
                .truncate(),
        ),
        None => None,
    };
    match target {
        Value::List(items) => {
            let items = items.borrow();
            let (s, e) = slice_bounds(items.len(), start, end);
            Ok(Value::list(items[s..e].to_vec()))
        }
        Value::Str(text) => {
            let chars: Vec<char> = text.chars().collect();
            let (s, e) = slice_bounds(chars.len(), start, end);
            Ok(Value::from(chars[s..e].iter().collect::<String>()))
        }
        other => Err(OpError::type_error(format!(
            "Type {} is not sliceable",
            other.type_name()
        ))),
    }
}

/// The elements a `FOR` loop or comprehension visits: list elements,
/// string characters or dict keys. Lists are snapshotted first.
pub fn iterate(value: &Value) -> OpResult<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items.borrow().clone()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::from(c.to_string())).collect()),
        Value::Dict(entries) => Ok(entries.borrow().keys().map(DictKey::to_value).collect()),
        other => Err(OpError::new(
            ErrorKind::NotIterable,
            format!(
                "Type '{}' is not iterable (Expected List, String, or Dict)",
                other.type_name()
            ),
        )),
    }
}

/// `list * n`
pub(crate) fn repeat(items: &[Value], times: Number) -> OpResult<Value> {
    let times = times.truncate();
    if times <= 0 || items.is_empty() {
        return Ok(Value::list(Vec::new()));
    }
    let total = (items.len() as u128) * (times as u128);
    if total > MAX_LIST_SIZE as u128 {
        return Err(OpError::new(
            ErrorKind::IllegalOperation,
            format!(
                "List repetition result ({total}) exceeds maximum allowed size ({MAX_LIST_SIZE})"
            ),
        ));
    }
    let mut out = Vec::with_capacity(total as usize);
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    Ok(Value::list(out))
}

// ══════════════════════════════════════════════════════════════════════════════
// Equality
// ══════════════════════════════════════════════════════════════════════════════

type Visited = FxHashSet<(usize, usize)>;

/// `==` semantics. Comparing values of unrelated kinds is an illegal
/// operation; self-referential containers compare without looping.
pub fn equals(a: &Value, b: &Value) -> OpResult<bool> {
    equals_in(a, b, &mut Visited::default())
}

fn addr<T>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc) as *const () as usize
}

fn equals_in(a: &Value, b: &Value, visited: &mut Visited) -> OpResult<bool> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(x.num_eq(*y)),
        (Value::Str(x), Value::Str(y)) => Ok(x == y),
        (Value::List(x), Value::List(y)) => {
            let pair = (addr(x), addr(y));
            let (xs, ys) = (x.borrow(), y.borrow());
            if xs.len() != ys.len() {
                return Ok(false);
            }
            if !visited.insert(pair) {
                return Ok(true);
            }
            let result = lists_equal(&xs, &ys, visited);
            visited.remove(&pair);
            result
        }
        (Value::Dict(x), Value::Dict(y)) => {
            let pair = (addr(x), addr(y));
            let (xs, ys) = (x.borrow(), y.borrow());
            if xs.len() != ys.len() {
                return Ok(false);
            }
            if !visited.insert(pair) {
                return Ok(true);
            }
            let result = dicts_equal(&xs, &ys, visited);
            visited.remove(&pair);
            result
        }
        (Value::Instance(x), Value::Instance(y)) => Ok(Rc::ptr_eq(x, y)),
        (Value::Enum(x), Value::Enum(y)) => Ok(Rc::ptr_eq(x, y)),
        (Value::Type(x), Value::Type(y)) => Ok(x == y),
        _ if a.is_function_like() && b.is_function_like() => Ok(identical(a, b)),
        _ => Err(OpError::illegal()),
    }
}

fn lists_equal(xs: &[Value], ys: &[Value], visited: &mut Visited) -> OpResult<bool> {
    for (x, y) in xs.iter().zip(ys) {
        if !equals_in(x, y, visited)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn dicts_equal(
    xs: &IndexMap<DictKey, Value>,
    ys: &IndexMap<DictKey, Value>,
    visited: &mut Visited,
) -> OpResult<bool> {
    for (key, x) in xs {
        match ys.get(key) {
            Some(y) if equals_in(x, y, visited)? => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: Vec<Value>) -> Value {
        Value::list(items)
    }

    fn n(i: i64) -> Value {
        Value::from(i)
    }

    #[test]
    fn test_negative_indexing() {
        let l = list(vec![n(1), n(2), n(3)]);
        assert_eq!(get_index(&l, &n(-1)).unwrap(), n(3));
        assert_eq!(get_index(&Value::from("hey"), &n(-3)).unwrap(), Value::from("h"));
        let err = get_index(&l, &n(3)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexOutOfBounds);
        assert_eq!(err.message, "List index 3 out of bounds");
    }

    #[test]
    fn test_index_type_errors() {
        let l = list(vec![n(1)]);
        assert_eq!(
            get_index(&l, &Value::from("0")).unwrap_err().message,
            "List index must be a Number"
        );
        assert_eq!(get_index(&n(5), &n(0)).unwrap_err().kind, ErrorKind::IllegalOperation);
        assert!(set_index(&Value::from("abc"), &n(0), n(1)).is_err());
    }

    #[test]
    fn test_dict_keys_normalize_integral_floats() {
        let d = Value::dict(IndexMap::new());
        set_index(&d, &Value::from(1.0), Value::from("one")).unwrap();
        assert_eq!(get_index(&d, &n(1)).unwrap(), Value::from("one"));
        let err = get_index(&d, &Value::from("k")).unwrap_err();
        assert_eq!(err.message, "Key 'k' not found");
        assert_eq!(
            set_index(&d, &list(vec![]), n(0)).unwrap_err().message,
            "Key must be a Number or String"
        );
    }

    #[test]
    fn test_slice_clamps_bounds() {
        let l = list(vec![n(1), n(2), n(3), n(4)]);
        assert_eq!(slice(&l, &n(1), Some(&n(3))).unwrap(), list(vec![n(2), n(3)]));
        assert_eq!(slice(&l, &n(-2), None).unwrap(), list(vec![n(3), n(4)]));
        assert_eq!(slice(&l, &n(3), Some(&n(1))).unwrap(), list(vec![]));
        assert_eq!(slice(&l, &n(0), Some(&n(99))).unwrap(), l);
        assert_eq!(
            slice(&Value::from("hello"), &n(1), Some(&n(-1))).unwrap(),
            Value::from("ell")
        );
        assert_eq!(
            slice(&n(5), &n(0), None).unwrap_err().message,
            "Type Number is not sliceable"
        );
    }

    #[test]
    fn test_iterate_kinds() {
        assert_eq!(iterate(&Value::from("ab")).unwrap(), vec![Value::from("a"), Value::from("b")]);
        let mut entries = IndexMap::new();
        entries.insert(DictKey::from("x"), n(1));
        entries.insert(DictKey::Int(2), n(2));
        assert_eq!(iterate(&Value::dict(entries)).unwrap(), vec![Value::from("x"), n(2)]);
        assert_eq!(iterate(&n(3)).unwrap_err().kind, ErrorKind::NotIterable);
    }

    #[test]
    fn test_repeat_cap() {
        assert_eq!(repeat(&[n(0)], Number::Int(3)).unwrap(), list(vec![n(0), n(0), n(0)]));
        assert_eq!(repeat(&[n(0)], Number::Int(-2)).unwrap(), list(vec![]));
        assert_eq!(repeat(&[], Number::Int(3_000_000_000)).unwrap(), list(vec![]));
        let err = repeat(&[n(0), n(1)], Number::Int(600_000)).unwrap_err();
        assert_eq!(
            err.message,
            "List repetition result (1200000) exceeds maximum allowed size (1000000)"
        );
    }

    #[test]
    fn test_structural_equality() {
        let a = list(vec![n(1), list(vec![n(2)])]);
        let b = list(vec![n(1), list(vec![n(2)])]);
        assert!(equals(&a, &b).unwrap());
        assert!(!equals(&a, &list(vec![n(1)])).unwrap());
        assert!(equals(&n(1), &Value::from("1")).is_err());
    }

    #[test]
    fn test_self_referential_equality_terminates() {
        let a = list(vec![n(1)]);
        let b = list(vec![n(1)]);
        if let (Value::List(x), Value::List(y)) = (&a, &b) {
            x.borrow_mut().push(a.clone());
            y.borrow_mut().push(b.clone());
        }
        assert!(equals(&a, &b).unwrap());
        assert!(equals(&a, &a).unwrap());
    }

    #[test]
    fn test_self_referential_dict_equality_terminates() {
        let a = Value::dict(IndexMap::new());
        let b = Value::dict(IndexMap::new());
        set_index(&a, &Value::from("self"), a.clone()).unwrap();
        set_index(&b, &Value::from("self"), b.clone()).unwrap();
        assert!(equals(&a, &b).unwrap());
        assert_eq!(a.to_string(), "{'self': {...}}");
    }
}
