//! Runtime error types for the GladLang evaluator.

use crate::value::Value;
use glad_types::{Diagnostic, ErrorKind, Span, TraceFrame};

/// A fatal runtime failure with its position and the frames it unwound.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    /// Outermost frame first.
    pub traceback: Vec<TraceFrame>,
    /// The value passed to `THROW`, if this error came from one.
    pub thrown: Option<Value>,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            traceback: Vec::new(),
            thrown: None,
        }
    }

    /// The value a `CATCH` clause binds: the thrown value, or the message.
    pub fn catch_value(&self) -> Value {
        match &self.thrown {
            Some(value) => value.clone(),
            None => Value::from(self.message.as_str()),
        }
    }

    /// Convert to the serializable boundary form.
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        Diagnostic::new(file, self.kind, self.message.clone(), self.span)
            .with_traceback(self.traceback.clone())
    }
}

/// How evaluation of a node stopped short of producing a value.
///
/// Errors and the three control signals travel on the same channel so that
/// `?` stops every enclosing sibling from running.
#[derive(Debug, Clone)]
pub enum Unwind {
    Error(Box<RuntimeError>),
    Return(Value),
    Break,
    Continue,
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Unwind::Error(Box::new(err))
    }
}

/// Result alias for evaluator operations.
pub type RtResult<T = Value> = Result<T, Unwind>;

/// A value-level failure, before a position and frame are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct OpError {
    pub kind: ErrorKind,
    pub message: String,
}

impl OpError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn illegal() -> Self {
        Self::new(ErrorKind::IllegalOperation, "Illegal operation")
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn bounds(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IndexOutOfBounds, message)
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "Division by zero")
    }

    pub fn math_domain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MathDomain, message)
    }

    /// A failed write to or read from the host streams.
    pub fn io(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, format!("I/O error: {err}"))
    }

    pub fn arity(name: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::CallArity,
            format!("Incorrect argument count for '{name}'. Expected {expected}, got {got}"),
        )
    }
}

/// Result alias for value-level operations.
pub type OpResult<T = Value> = Result<T, OpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_display_is_message() {
        let err = RuntimeError::new(ErrorKind::DivisionByZero, "Division by zero", Span::point(1, 1));
        assert_eq!(err.to_string(), "Division by zero");
    }

    #[test]
    fn test_catch_value_prefers_thrown() {
        let mut err = RuntimeError::new(ErrorKind::UserThrown, "42", Span::point(1, 1));
        assert_eq!(err.catch_value(), Value::from("42"));
        err.thrown = Some(Value::from(42));
        assert_eq!(err.catch_value(), Value::from(42));
    }

    #[test]
    fn test_to_diagnostic_keeps_traceback() {
        let mut err = RuntimeError::new(ErrorKind::UndefinedName, "'x' is not defined", Span::new(3, 1, 3, 2));
        err.traceback = vec![TraceFrame::new("<program>", Span::new(3, 1, 3, 2))];
        let diag = err.to_diagnostic("main.glad");
        assert_eq!(diag.kind, ErrorKind::UndefinedName);
        assert_eq!(diag.file, "main.glad");
        assert_eq!(diag.traceback.len(), 1);
    }

    #[test]
    fn test_arity_message() {
        let err = OpError::arity("add", 2, 3);
        assert_eq!(err.kind, ErrorKind::CallArity);
        assert_eq!(err.message, "Incorrect argument count for 'add'. Expected 2, got 3");
    }
}
