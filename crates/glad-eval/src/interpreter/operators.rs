//! Binary, chained, unary and increment/decrement operators.

use super::Interpreter;
use crate::context::{Context, OpResultExt};
use crate::error::RtResult;
use crate::value::{binary, get_index, set_index, Number, TypeTag, Value};
use glad_types::ast::{BinOp, Ident, Node, NodeKind, Step, UnaryOp};
use glad_types::{ErrorKind, Span};

/// Where an increment or decrement writes its result.
enum Place<'n> {
    Var(&'n Ident),
    Attr(Value, &'n Ident),
    Index(Value, Value),
}

impl Interpreter {
    pub(super) fn eval_binary(
        &mut self,
        node: &Node,
        left: &Node,
        op: BinOp,
        right: &Node,
        ctx: &Context<'_>,
    ) -> RtResult {
        let lhs = self.visit(left, ctx)?;
        match op {
            BinOp::And if !lhs.is_truthy() => return Ok(Value::bool(false)),
            BinOp::Or if lhs.is_truthy() => return Ok(Value::bool(true)),
            BinOp::And | BinOp::Or => {
                let rhs = self.visit(right, ctx)?;
                return Ok(Value::bool(rhs.is_truthy()));
            }
            _ => {}
        }
        let rhs = self.visit(right, ctx)?;
        if op == BinOp::InstanceOf {
            return self.instance_of(&lhs, &rhs, node.span, ctx);
        }
        binary(op, &lhs, &rhs).at(ctx, node.span)
    }

    /// `a < b <= c`: every link must hold; stops at the first that fails.
    pub(super) fn eval_chain(
        &mut self,
        first: &Node,
        links: &[(BinOp, Node)],
        ctx: &Context<'_>,
    ) -> RtResult {
        let mut left = self.visit(first, ctx)?;
        let mut span = first.span;
        for (op, operand) in links {
            let right = self.visit(operand, ctx)?;
            span = span.merge(operand.span);
            if !binary(*op, &left, &right).at(ctx, span)?.is_truthy() {
                return Ok(Value::bool(false));
            }
            left = right;
        }
        Ok(Value::bool(true))
    }

    fn instance_of(&self, value: &Value, kind: &Value, span: Span, ctx: &Context<'_>) -> RtResult {
        let matched = match (value, kind) {
            (Value::Instance(instance), Value::Class(class)) => {
                self.classes.is_subclass(instance.borrow().class.id, class.id)
            }
            (_, Value::Class(_)) => false,
            (_, Value::Type(TypeTag::Object)) => true,
            (Value::Number(_), Value::Type(TypeTag::Number))
            | (Value::Str(_), Value::Type(TypeTag::String))
            | (Value::List(_), Value::Type(TypeTag::List))
            | (Value::Dict(_), Value::Type(TypeTag::Dict)) => true,
            (
                Value::Function(_) | Value::Group(_) | Value::BoundMethod(_) | Value::Builtin(_),
                Value::Type(TypeTag::Function),
            ) => true,
            (_, Value::Type(_)) => false,
            _ => {
                return ctx.fail(
                    ErrorKind::TypeError,
                    "Right operand of INSTANCEOF must be a Class or Type",
                    span,
                );
            }
        };
        Ok(Value::bool(matched))
    }

    pub(super) fn eval_unary(
        &mut self,
        node: &Node,
        op: UnaryOp,
        operand: &Node,
        ctx: &Context<'_>,
    ) -> RtResult {
        match op {
            UnaryOp::PreIncrement => return self.eval_step(Step::Increment, operand, true, ctx),
            UnaryOp::PreDecrement => return self.eval_step(Step::Decrement, operand, true, ctx),
            _ => {}
        }
        let value = self.visit(operand, ctx)?;
        match (op, value) {
            (UnaryOp::Not, value) => Ok(Value::bool(!value.is_truthy())),
            (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(n.neg())),
            (UnaryOp::Neg, _) => ctx.fail(
                ErrorKind::TypeError,
                "Unary '-' can only be applied to numbers",
                node.span,
            ),
            (UnaryOp::BitNot, Value::Number(n)) => Ok(Value::Number(n.bit_not())),
            _ => ctx.fail(ErrorKind::IllegalOperation, "Illegal operation", node.span),
        }
    }

    // ── Increment / decrement ─────────────────────────────────────────────

    /// `++x` / `x++` and their decrements. Prefix forms yield the new
    /// value, postfix forms the old one.
    pub(super) fn eval_step(
        &mut self,
        step: Step,
        target: &Node,
        prefix: bool,
        ctx: &Context<'_>,
    ) -> RtResult {
        let place = match &target.kind {
            NodeKind::VarAccess(name) => Place::Var(name),
            NodeKind::GetAttr { object, name } => Place::Attr(self.visit(object, ctx)?, name),
            NodeKind::Index { target, index } => {
                let container = self.visit(target, ctx)?;
                let index = self.visit(index, ctx)?;
                Place::Index(container, index)
            }
            _ => {
                return ctx.fail(
                    ErrorKind::InvalidTarget,
                    "Invalid target for increment/decrement",
                    target.span,
                );
            }
        };

        let old = match &place {
            Place::Var(name) => self.eval_var(name, ctx)?,
            Place::Attr(object, name) => self.get_attr(object, name, ctx)?,
            Place::Index(container, index) => get_index(container, index).at(ctx, target.span)?,
        };
        let Value::Number(n) = old else {
            return ctx.fail(ErrorKind::TypeError, "Operand must be a number", target.span);
        };
        let new = match step {
            Step::Increment => n.add(Number::Int(1)),
            Step::Decrement => n.sub(Number::Int(1)),
        };

        match place {
            Place::Var(name) => {
                if let Err(err) = self.scopes.update(ctx.scope, &name.name, Value::Number(new)) {
                    return ctx.fail(err.kind(), err.message(&name.name), target.span);
                }
            }
            Place::Attr(object, name) => {
                self.set_attr(&object, name, Value::Number(new), None, ctx)?;
            }
            Place::Index(container, index) => {
                set_index(&container, &index, Value::Number(new)).at(ctx, target.span)?;
            }
        }
        Ok(Value::Number(if prefix { new } else { n }))
    }
}
