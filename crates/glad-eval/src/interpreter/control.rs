//! Control flow: conditionals, loops, switch, exceptions and printing.

use super::Interpreter;
use crate::context::{Context, OpResultExt};
use crate::error::{OpError, RtResult, RuntimeError, Unwind};
use crate::value::{equals, iterate, Value};
use glad_types::ast::{Ident, Node, Switch, TryCatch};
use glad_types::ErrorKind;

impl Interpreter {
    pub(super) fn exec_print(
        &mut self,
        node: &Node,
        args: &[Node],
        newline: bool,
        ctx: &Context<'_>,
    ) -> RtResult {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(self.visit(arg, ctx)?.to_string());
        }
        let text = parts.join(" ");
        let written = if newline {
            self.io.println(&text)
        } else {
            self.io.print(&text).and_then(|()| self.io.flush())
        };
        written.map_err(OpError::io).at(ctx, node.span)?;
        Ok(Value::null())
    }

    pub(super) fn exec_if(
        &mut self,
        cases: &[(Node, Node)],
        else_case: Option<&Node>,
        ctx: &Context<'_>,
    ) -> RtResult {
        for (condition, body) in cases {
            if self.visit(condition, ctx)?.is_truthy() {
                return self.visit(body, ctx);
            }
        }
        match else_case {
            Some(body) => self.visit(body, ctx),
            None => Ok(Value::null()),
        }
    }

    // ── Loops ─────────────────────────────────────────────────────────────

    /// `WHILE` runs its body in the enclosing frame.
    pub(super) fn exec_while(&mut self, condition: &Node, body: &Node, ctx: &Context<'_>) -> RtResult {
        while self.visit(condition, ctx)?.is_truthy() {
            match self.visit(body, ctx) {
                Ok(_) | Err(Unwind::Continue) => {}
                Err(Unwind::Break) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(Value::null())
    }

    /// `FOR` binds each element in a fresh child frame.
    pub(super) fn exec_for(
        &mut self,
        node: &Node,
        targets: &[Ident],
        iterable: &Node,
        body: &Node,
        ctx: &Context<'_>,
    ) -> RtResult {
        let source = self.visit(iterable, ctx)?;
        let items = iterate(&source).at(ctx, iterable.span)?;
        for item in items {
            let flow = self.in_child_frame(ctx, "FOR", node.span, |this, frame| {
                this.bind_targets(targets, item, frame)?;
                this.visit(body, frame)
            });
            match flow {
                Ok(_) | Err(Unwind::Continue) => {}
                Err(Unwind::Break) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(Value::null())
    }

    /// The first case with a value equal to the subject runs; otherwise the
    /// default, if any.
    pub(super) fn exec_switch(&mut self, stmt: &Switch, ctx: &Context<'_>) -> RtResult {
        let subject = self.visit(&stmt.subject, ctx)?;
        for case in &stmt.cases {
            for candidate in &case.values {
                let value = self.visit(candidate, ctx)?;
                if equals(&subject, &value).at(ctx, candidate.span)? {
                    return self.visit(&case.body, ctx);
                }
            }
        }
        match &stmt.default {
            Some(body) => self.visit(body, ctx),
            None => Ok(Value::null()),
        }
    }

    // ── Exceptions ────────────────────────────────────────────────────────

    pub(super) fn exec_try(&mut self, node: &Node, stmt: &TryCatch, ctx: &Context<'_>) -> RtResult {
        let pending = match self.visit(&stmt.body, ctx) {
            Ok(_) => Ok(Value::null()),
            Err(Unwind::Error(err)) => match &stmt.catch {
                Some(clause) => {
                    tracing::debug!(kind = %err.kind, message = %err.message, "caught runtime error");
                    self.in_child_frame(ctx, "CATCH", node.span, |this, frame| {
                        if let Some(binding) = &clause.binding {
                            this.scopes.set(frame.scope, &binding.name, err.catch_value());
                        }
                        this.visit(&clause.body, frame)
                    })
                    .map(|_| Value::null())
                }
                None => Err(Unwind::Error(err)),
            },
            Err(signal) => Err(signal),
        };
        if let Some(finally) = &stmt.finally {
            self.visit(finally, ctx)?;
        }
        pending
    }

    pub(super) fn exec_throw(&mut self, node: &Node, value: &Node, ctx: &Context<'_>) -> RtResult {
        let value = self.visit(value, ctx)?;
        let mut err = RuntimeError::new(ErrorKind::UserThrown, value.to_string(), node.span);
        err.traceback = ctx.traceback(node.span);
        err.thrown = Some(value);
        Err(err.into())
    }
}
