//! Execution frames.

use crate::error::{OpError, RtResult, RuntimeError, Unwind};
use crate::scope::ScopeId;
use crate::value::ClassId;
use glad_types::{ErrorKind, Span, TraceFrame};
use std::rc::Rc;

/// One execution frame: a named activation with its own variable frame.
///
/// The parent link is dynamic (the caller for function calls) and is used
/// for call depth and tracebacks; name resolution follows the scope chain
/// instead, which for calls starts at the closure's captured frame.
#[derive(Debug)]
pub struct Context<'a> {
    pub name: Rc<str>,
    pub parent: Option<&'a Context<'a>>,
    /// Where the parent entered this frame.
    pub entry: Span,
    pub scope: ScopeId,
    pub depth: usize,
    pub active_class: Option<ClassId>,
}

impl<'a> Context<'a> {
    /// The root frame of a run.
    pub fn root(name: &str, scope: ScopeId) -> Context<'static> {
        Context {
            name: Rc::from(name),
            parent: None,
            entry: Span::default(),
            scope,
            depth: 0,
            active_class: None,
        }
    }

    /// A child frame one level deeper that inherits the active class.
    pub fn child<'b>(&'b self, name: Rc<str>, entry: Span, scope: ScopeId) -> Context<'b>
    where
        'a: 'b,
    {
        Context {
            name,
            parent: Some(self),
            entry,
            scope,
            depth: self.depth + 1,
            active_class: self.active_class,
        }
    }

    pub fn with_active_class(mut self, class: Option<ClassId>) -> Self {
        self.active_class = class;
        self
    }

    /// Frames from the outermost to this one. The innermost frame reports
    /// `span`; each outer frame reports where it entered its child.
    pub fn traceback(&self, span: Span) -> Vec<TraceFrame> {
        let mut frames = Vec::with_capacity(self.depth + 1);
        let mut pos = span;
        let mut cur = Some(self);
        while let Some(ctx) = cur {
            frames.push(TraceFrame::new(ctx.name.as_ref(), pos));
            pos = ctx.entry;
            cur = ctx.parent;
        }
        frames.reverse();
        frames
    }

    /// Build a runtime error raised in this frame.
    pub fn error(&self, kind: ErrorKind, message: impl Into<String>, span: Span) -> Unwind {
        let mut err = RuntimeError::new(kind, message, span);
        err.traceback = self.traceback(span);
        err.into()
    }

    pub fn fail<T>(&self, kind: ErrorKind, message: impl Into<String>, span: Span) -> RtResult<T> {
        Err(self.error(kind, message, span))
    }
}

/// Attach a position and frame to value-level failures.
pub(crate) trait OpResultExt<T> {
    fn at(self, ctx: &Context<'_>, span: Span) -> RtResult<T>;
}

impl<T> OpResultExt<T> for Result<T, OpError> {
    fn at(self, ctx: &Context<'_>, span: Span) -> RtResult<T> {
        self.map_err(|e| ctx.error(e.kind, e.message, span))
    }
}
