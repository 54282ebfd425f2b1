//! Built-in functions.

use super::{Number, Value};
use crate::error::{OpError, OpResult};
use crate::io::IoHandler;
use glad_types::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Input,
    Str,
    Int,
    Float,
    Bool,
    Len,
}

impl Builtin {
    pub const ALL: [Builtin; 6] = [
        Builtin::Input,
        Builtin::Str,
        Builtin::Int,
        Builtin::Float,
        Builtin::Bool,
        Builtin::Len,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Input => "INPUT",
            Builtin::Str => "STR",
            Builtin::Int => "INT",
            Builtin::Float => "FLOAT",
            Builtin::Bool => "BOOL",
            Builtin::Len => "LEN",
        }
    }

    /// Look up a builtin by its global name. `LENGTH` is `LEN`.
    pub fn from_name(name: &str) -> Option<Builtin> {
        match name {
            "LENGTH" => Some(Builtin::Len),
            _ => Self::ALL.into_iter().find(|b| b.name() == name),
        }
    }

    pub fn call(self, args: &[Value], io: &mut IoHandler) -> OpResult {
        match self {
            Builtin::Input => input(args, io),
            Builtin::Str => Ok(Value::from(self.single(args)?.to_string())),
            Builtin::Int => {
                let text = numeric_text(self, self.single(args)?)?;
                parse_int(&text)
                    .map(Value::from)
                    .ok_or_else(|| conversion_error(&text, "INT"))
            }
            Builtin::Float => {
                let text = numeric_text(self, self.single(args)?)?;
                parse_float(&text)
                    .map(Value::from)
                    .ok_or_else(|| conversion_error(&text, "FLOAT"))
            }
            Builtin::Bool => Ok(Value::bool(self.single(args)?.is_truthy())),
            Builtin::Len => Ok(Value::from(len(self.single(args)?) as i64)),
        }
    }

    fn single(self, args: &[Value]) -> OpResult<&Value> {
        match args {
            [arg] => Ok(arg),
            _ => Err(OpError::arity(self.name(), 1, args.len())),
        }
    }
}

fn input(args: &[Value], io: &mut IoHandler) -> OpResult {
    if args.len() > 1 {
        return Err(OpError::new(
            ErrorKind::CallArity,
            "INPUT takes at most 1 argument",
        ));
    }
    if let Some(prompt) = args.first().map(Value::to_string) {
        if !prompt.is_empty() {
            io.print(&prompt).map_err(OpError::io)?;
            io.flush().map_err(OpError::io)?;
        }
    }
    Ok(Value::from(io.read_line()))
}

/// The text a numeric conversion parses.
fn numeric_text(builtin: Builtin, arg: &Value) -> OpResult<String> {
    match arg {
        Value::Number(n) => Ok(n.to_string()),
        Value::Str(s) => Ok(s.to_string()),
        other => Err(OpError::type_error(format!(
            "Argument for {} must be a Number or String, got {}",
            builtin.name(),
            other.type_name()
        ))),
    }
}

fn conversion_error(text: &str, target: &str) -> OpError {
    OpError::type_error(format!("Cannot convert '{text}' to {target}"))
}

/// Accepts what a float literal accepts, plus `inf`, `nan` and digit
/// separators.
fn parse_float(text: &str) -> Option<f64> {
    text.trim().replace('_', "").parse().ok()
}

/// Integers parse exactly; anything else goes through a float and is
/// truncated toward zero.
fn parse_int(text: &str) -> Option<Number> {
    if let Ok(i) = text.trim().parse::<i64>() {
        return Some(Number::Int(i));
    }
    let f = parse_float(text).filter(|f| f.is_finite())?;
    Some(Number::Int(Number::Float(f).truncate()))
}

fn len(arg: &Value) -> usize {
    match arg {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.borrow().len(),
        Value::Dict(entries) => entries.borrow().len(),
        Value::Number(n) => n.to_string().chars().count(),
        Value::Function(_) | Value::Builtin(_) | Value::Class(_) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypeTag;

    fn call(b: Builtin, args: &[Value]) -> OpResult {
        b.call(args, &mut IoHandler::buffer())
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Builtin::from_name("LEN"), Some(Builtin::Len));
        assert_eq!(Builtin::from_name("LENGTH"), Some(Builtin::Len));
        assert_eq!(Builtin::from_name("PRINT"), None);
    }

    #[test]
    fn test_int_conversion() {
        assert_eq!(call(Builtin::Int, &[Value::from("42")]).unwrap(), Value::from(42));
        assert_eq!(call(Builtin::Int, &[Value::from("3.9")]).unwrap(), Value::from(3));
        assert_eq!(call(Builtin::Int, &[Value::from(-2.7)]).unwrap(), Value::from(-2));
        let err = call(Builtin::Int, &[Value::from("abc")]).unwrap_err();
        assert_eq!(err.message, "Cannot convert 'abc' to INT");
        let err = call(Builtin::Int, &[Value::list(vec![])]).unwrap_err();
        assert_eq!(err.message, "Argument for INT must be a Number or String, got List");
    }

    #[test]
    fn test_float_conversion() {
        assert_eq!(call(Builtin::Float, &[Value::from("2.5")]).unwrap(), Value::from(2.5));
        assert_eq!(call(Builtin::Float, &[Value::from(3)]).unwrap().to_string(), "3.0");
        assert!(call(Builtin::Float, &[Value::from("x1")]).is_err());
    }

    #[test]
    fn test_len_of_each_kind() {
        assert_eq!(call(Builtin::Len, &[Value::from("héllo")]).unwrap(), Value::from(5));
        assert_eq!(call(Builtin::Len, &[Value::from(1234)]).unwrap(), Value::from(4));
        assert_eq!(call(Builtin::Len, &[Value::from(1.5)]).unwrap(), Value::from(3));
        assert_eq!(call(Builtin::Len, &[Value::Builtin(Builtin::Str)]).unwrap(), Value::from(1));
        assert_eq!(call(Builtin::Len, &[Value::Type(TypeTag::List)]).unwrap(), Value::from(0));
    }

    #[test]
    fn test_exactly_one_argument() {
        let err = call(Builtin::Str, &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CallArity);
        assert_eq!(err.message, "Incorrect argument count for 'STR'. Expected 1, got 0");
    }

    #[test]
    fn test_input_prompts_and_reads() {
        let mut io = IoHandler::scripted(["Ada\n"]);
        let name = Builtin::Input.call(&[Value::from("name? ")], &mut io).unwrap();
        assert_eq!(name, Value::from("Ada"));
        assert_eq!(io.output(), "name? ");
        let err = Builtin::Input.call(&[Value::null(), Value::null()], &mut io).unwrap_err();
        assert_eq!(err.message, "INPUT takes at most 1 argument");
    }
}
