//! GladLang runtime core: the value model, scope frames and the
//! tree-walking evaluator.
//!
//! The evaluator consumes a parsed [`glad_types::ast::Node`] tree. A driver
//! creates an [`Interpreter`], optionally with [`Limits`] and an
//! [`IoHandler`], and calls [`Interpreter::run`] once per program (or once per
//! REPL input, reusing the same interpreter).

mod config;
mod context;
mod error;
mod globals;
mod interpreter;
mod io;
mod scope;
mod stack;
pub mod value;

pub use config::{Limits, DEFAULT_MAX_CALL_DEPTH, SCRIPT_INSTRUCTION_BUDGET};
pub use context::Context;
pub use error::{OpError, OpResult, RtResult, RuntimeError, Unwind};
pub use interpreter::Interpreter;
pub use io::{BufferIo, IoHandler};
pub use scope::{Binding, ScopeArena, ScopeError, ScopeId, ScopePin, SymbolTable};
pub use value::Value;
