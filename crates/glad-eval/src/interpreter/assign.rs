//! Variable access, assignment and destructuring.

use super::classes::Declaration;
use super::Interpreter;
use crate::context::Context;
use crate::error::RtResult;
use crate::value::{SuperProxy, Value};
use glad_types::ast::{Ident, Node, NodeKind, Visibility};
use glad_types::ErrorKind;
use std::rc::Rc;

impl Interpreter {
    pub(super) fn eval_var(&mut self, name: &Ident, ctx: &Context<'_>) -> RtResult {
        if name.name == "SUPER" {
            return self.eval_super(name, ctx);
        }
        match self.scopes.get(ctx.scope, &name.name) {
            Some(value) => Ok(value),
            None => ctx.fail(
                ErrorKind::UndefinedName,
                format!("'{}' is not defined", name.name),
                name.span,
            ),
        }
    }

    fn eval_super(&mut self, name: &Ident, ctx: &Context<'_>) -> RtResult {
        let Some(Value::Instance(receiver)) = self.scopes.get(ctx.scope, "THIS") else {
            return ctx.fail(
                ErrorKind::InvalidTarget,
                "'SUPER' can only be used inside an instance method",
                name.span,
            );
        };
        let Some(after) = ctx.active_class else {
            return ctx.fail(
                ErrorKind::InvalidTarget,
                "'SUPER' cannot be used outside of a class context",
                name.span,
            );
        };
        Ok(Value::Super(Rc::new(SuperProxy { receiver, after })))
    }

    /// `LET name = value` binds in the current frame; `name = value`
    /// rebinds the nearest existing binding.
    pub(super) fn exec_assign(
        &mut self,
        node: &Node,
        name: &Ident,
        value: &Node,
        declare: bool,
        ctx: &Context<'_>,
    ) -> RtResult {
        let value = self.visit(value, ctx)?;
        if declare {
            if self.scopes.table(ctx.scope).is_final(name.name.as_str()) {
                return ctx.fail(
                    ErrorKind::ConstantReassignment,
                    format!("Cannot reassign constant '{}'", name.name),
                    name.span,
                );
            }
            self.scopes.set(ctx.scope, &name.name, value.clone());
        } else if let Err(err) = self.scopes.update(ctx.scope, &name.name, value.clone()) {
            return ctx.fail(err.kind(), err.message(&name.name), node.span);
        }
        Ok(value)
    }

    pub(super) fn exec_final(
        &mut self,
        node: &Node,
        name: &Ident,
        value: &Node,
        ctx: &Context<'_>,
    ) -> RtResult {
        if self.scopes.table(ctx.scope).contains(name.name.as_str()) {
            return ctx.fail(
                ErrorKind::AlreadyDefined,
                format!("Variable '{}' is already defined", name.name),
                node.span,
            );
        }
        let value = self.visit(value, ctx)?;
        self.scopes
            .table_mut(ctx.scope)
            .set(name.name.clone(), value.clone(), Visibility::Public, true);
        Ok(value)
    }

    /// `PRIVATE x = v`, `PROTECTED FINAL THIS.x = v`, ...
    pub(super) fn exec_qualified(
        &mut self,
        node: &Node,
        visibility: Visibility,
        is_final: bool,
        target: &Node,
        ctx: &Context<'_>,
    ) -> RtResult {
        match &target.kind {
            NodeKind::SetAttr {
                object,
                name,
                value,
            } => {
                let object = self.visit(object, ctx)?;
                let value = self.visit(value, ctx)?;
                let decl = Declaration {
                    visibility,
                    is_final,
                };
                self.set_attr(&object, name, value.clone(), Some(decl), ctx)?;
                Ok(value)
            }
            NodeKind::VarAssign { name, value, .. } => {
                let value = self.visit(value, ctx)?;
                let table = self.scopes.table(ctx.scope);
                if is_final && table.contains(name.name.as_str()) {
                    return ctx.fail(
                        ErrorKind::AlreadyDefined,
                        format!("Variable '{}' is already defined", name.name),
                        node.span,
                    );
                }
                if table.is_final(name.name.as_str()) {
                    return ctx.fail(
                        ErrorKind::ConstantReassignment,
                        format!("Cannot reassign constant '{}'", name.name),
                        name.span,
                    );
                }
                self.scopes.table_mut(ctx.scope).set(
                    name.name.clone(),
                    value.clone(),
                    visibility,
                    is_final,
                );
                Ok(value)
            }
            _ => ctx.fail(
                ErrorKind::InvalidTarget,
                "Invalid visibility statement",
                node.span,
            ),
        }
    }

    /// `[a, b] = list` binds each element in the current frame.
    pub(super) fn exec_multi_assign(
        &mut self,
        node: &Node,
        targets: &[Ident],
        value: &Node,
        ctx: &Context<'_>,
    ) -> RtResult {
        let value = self.visit(value, ctx)?;
        let Value::List(items) = &value else {
            return ctx.fail(
                ErrorKind::DestructuringMismatch,
                format!("Cannot unpack type '{}' (expected List)", value.type_name()),
                node.span,
            );
        };
        let items = items.borrow().clone();
        if items.len() != targets.len() {
            return ctx.fail(
                ErrorKind::DestructuringMismatch,
                format!(
                    "too many/not enough values to unpack (expected {}, got {})",
                    targets.len(),
                    items.len()
                ),
                node.span,
            );
        }
        for (target, item) in targets.iter().zip(items) {
            if self.scopes.table(ctx.scope).is_final(target.name.as_str()) {
                return ctx.fail(
                    ErrorKind::ConstantReassignment,
                    format!("Cannot reassign constant '{}'", target.name),
                    target.span,
                );
            }
            self.scopes.set(ctx.scope, &target.name, item);
        }
        Ok(value)
    }

    /// Bind a loop or comprehension element to its targets. Several targets
    /// unpack a list element.
    pub(super) fn bind_targets(
        &mut self,
        targets: &[Ident],
        element: Value,
        ctx: &Context<'_>,
    ) -> RtResult<()> {
        if let [target] = targets {
            self.check_loop_target(target, ctx)?;
            self.scopes.set(ctx.scope, &target.name, element);
            return Ok(());
        }
        let span = match (targets.first(), targets.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => return Ok(()),
        };
        let Value::List(items) = &element else {
            return ctx.fail(
                ErrorKind::DestructuringMismatch,
                format!("Cannot unpack type '{}' (expected List)", element.type_name()),
                span,
            );
        };
        let items = items.borrow().clone();
        if items.len() != targets.len() {
            return ctx.fail(
                ErrorKind::DestructuringMismatch,
                format!(
                    "expected {} values to unpack, got {}",
                    targets.len(),
                    items.len()
                ),
                span,
            );
        }
        for (target, item) in targets.iter().zip(items) {
            self.check_loop_target(target, ctx)?;
            self.scopes.set(ctx.scope, &target.name, item);
        }
        Ok(())
    }

    fn check_loop_target(&self, target: &Ident, ctx: &Context<'_>) -> RtResult<()> {
        if self.scopes.is_final_in_chain(ctx.scope, &target.name) {
            return ctx.fail(
                ErrorKind::ConstantReassignment,
                format!("Cannot use constant '{}' as loop variable", target.name),
                target.span,
            );
        }
        Ok(())
    }
}
