use crate::{SourceFile, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a runtime failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    IllegalOperation,
    DivisionByZero,
    MathDomain,
    IndexOutOfBounds,
    UndefinedName,
    ConstantReassignment,
    DestructuringMismatch,
    NotIterable,
    AccessViolation,
    InconsistentHierarchy,
    OverloadConflict,
    CallArity,
    NotAClass,
    RecursionLimit,
    InstructionBudget,
    UserThrown,
    TypeError,
    AlreadyDefined,
    UndefinedMember,
    InvalidTarget,
    Io,
}

impl ErrorKind {
    /// The heading printed above an uncaught error.
    pub fn title(self) -> &'static str {
        match self {
            ErrorKind::UserThrown => "Thrown Error",
            ErrorKind::RecursionLimit | ErrorKind::InstructionBudget => "Resource Error",
            _ => "Runtime Error",
        }
    }

    /// Whether the error aborts evaluation because a resource limit was hit.
    pub fn is_limit(self) -> bool {
        matches!(self, ErrorKind::RecursionLimit | ErrorKind::InstructionBudget)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::IllegalOperation => "illegal operation",
            ErrorKind::DivisionByZero => "division by zero",
            ErrorKind::MathDomain => "math domain",
            ErrorKind::IndexOutOfBounds => "index out of bounds",
            ErrorKind::UndefinedName => "undefined name",
            ErrorKind::ConstantReassignment => "constant reassignment",
            ErrorKind::DestructuringMismatch => "destructuring mismatch",
            ErrorKind::NotIterable => "not iterable",
            ErrorKind::AccessViolation => "access violation",
            ErrorKind::InconsistentHierarchy => "inconsistent hierarchy",
            ErrorKind::OverloadConflict => "overload conflict",
            ErrorKind::CallArity => "call arity",
            ErrorKind::NotAClass => "not a class",
            ErrorKind::RecursionLimit => "recursion limit",
            ErrorKind::InstructionBudget => "instruction budget",
            ErrorKind::UserThrown => "user thrown",
            ErrorKind::TypeError => "type error",
            ErrorKind::AlreadyDefined => "already defined",
            ErrorKind::UndefinedMember => "undefined member",
            ErrorKind::InvalidTarget => "invalid target",
            ErrorKind::Io => "i/o",
        };
        f.write_str(s)
    }
}

/// One entry of a runtime traceback: the frame's display name and the
/// position at which that frame was entered or failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub name: String,
    #[serde(flatten)]
    pub span: Span,
}

impl TraceFrame {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A runtime failure in the serializable form handed to drivers.
///
/// `traceback` runs from the outermost frame to the one that failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Source file name.
    pub file: String,
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The source line the error points at, with a caret underline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    pub traceback: Vec<TraceFrame>,
}

impl Diagnostic {
    pub fn new(
        file: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            file: file.into(),
            kind,
            message: message.into(),
            span,
            snippet: None,
            traceback: Vec::new(),
        }
    }

    pub fn with_traceback(mut self, traceback: Vec<TraceFrame>) -> Self {
        self.traceback = traceback;
        self
    }

    /// Attach the underlined source line from `source`.
    pub fn with_source(mut self, source: &SourceFile) -> Self {
        self.snippet = source.snippet(self.span);
        self
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Traceback (most recent call last):")?;
        for frame in &self.traceback {
            writeln!(
                f,
                "  File {}, line {}, in {}",
                self.file, frame.span.start_line, frame.name
            )?;
        }
        write!(f, "{}: {}", self.kind.title(), self.message)?;
        if let Some(snippet) = &self.snippet {
            write!(f, "\n\n{snippet}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}
