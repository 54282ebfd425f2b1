//! Shared types for the GladLang runtime.
//!
//! This crate defines the AST consumed by the evaluator, source spans,
//! and the diagnostic form in which runtime failures leave the core.

mod error;
mod span;
pub mod ast;

pub use error::{Diagnostic, ErrorKind, TraceFrame};
pub use span::{SourceFile, Span};
