//! List and dict literals, comprehensions, indexing and slicing.

use super::Interpreter;
use crate::context::{Context, OpResultExt};
use crate::error::RtResult;
use crate::value::{get_index, iterate, set_index, slice, DictKey, Value};
use glad_types::ast::{IterSpec, Node};
use glad_types::{ErrorKind, Span};
use indexmap::IndexMap;

/// Called once per innermost comprehension iteration.
type Emit<'e> = dyn FnMut(&mut Interpreter, &Context<'_>) -> RtResult<()> + 'e;

impl Interpreter {
    pub(super) fn eval_list(&mut self, items: &[Node], ctx: &Context<'_>) -> RtResult {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(self.visit(item, ctx)?);
        }
        Ok(Value::list(values))
    }

    pub(super) fn eval_dict(&mut self, pairs: &[(Node, Node)], ctx: &Context<'_>) -> RtResult {
        let mut entries = IndexMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            let k = self.visit(key, ctx)?;
            let k = dict_key(&k, key.span, ctx)?;
            let v = self.visit(value, ctx)?;
            entries.insert(k, v);
        }
        Ok(Value::dict(entries))
    }

    // ── Comprehensions ────────────────────────────────────────────────────

    pub(super) fn eval_list_comp(
        &mut self,
        node: &Node,
        element: &Node,
        specs: &[IterSpec],
        ctx: &Context<'_>,
    ) -> RtResult {
        let mut out = Vec::new();
        self.in_child_frame(ctx, "COMPREHENSION", node.span, |this, frame| {
            this.comprehend(specs, frame, &mut |this, frame| {
                out.push(this.visit(element, frame)?);
                Ok(())
            })
        })?;
        Ok(Value::list(out))
    }

    pub(super) fn eval_dict_comp(
        &mut self,
        node: &Node,
        key: &Node,
        value: &Node,
        specs: &[IterSpec],
        ctx: &Context<'_>,
    ) -> RtResult {
        let mut out = IndexMap::new();
        self.in_child_frame(ctx, "COMPREHENSION", node.span, |this, frame| {
            this.comprehend(specs, frame, &mut |this, frame| {
                let k = this.visit(key, frame)?;
                let k = dict_key(&k, key.span, frame)?;
                let v = this.visit(value, frame)?;
                out.insert(k, v);
                Ok(())
            })
        })?;
        Ok(Value::dict(out))
    }

    /// Walk the nested `FOR` clauses left to right, all in one frame.
    fn comprehend(&mut self, specs: &[IterSpec], frame: &Context<'_>, emit: &mut Emit<'_>) -> RtResult<()> {
        let Some((spec, rest)) = specs.split_first() else {
            return emit(self, frame);
        };
        let source = self.visit(&spec.iterable, frame)?;
        let items = iterate(&source).at(frame, spec.iterable.span)?;
        for item in items {
            self.bind_targets(&spec.targets, item, frame)?;
            if let Some(filter) = &spec.filter {
                if !self.visit(filter, frame)?.is_truthy() {
                    continue;
                }
            }
            self.comprehend(rest, frame, emit)?;
        }
        Ok(())
    }

    // ── Element access ────────────────────────────────────────────────────

    pub(super) fn eval_index(
        &mut self,
        node: &Node,
        target: &Node,
        index: &Node,
        ctx: &Context<'_>,
    ) -> RtResult {
        let target = self.visit(target, ctx)?;
        let index = self.visit(index, ctx)?;
        get_index(&target, &index).at(ctx, node.span)
    }

    pub(super) fn exec_index_set(
        &mut self,
        node: &Node,
        target: &Node,
        index: &Node,
        value: &Node,
        ctx: &Context<'_>,
    ) -> RtResult {
        let target = self.visit(target, ctx)?;
        let index = self.visit(index, ctx)?;
        let value = self.visit(value, ctx)?;
        set_index(&target, &index, value.clone()).at(ctx, node.span)?;
        Ok(value)
    }

    pub(super) fn eval_slice(
        &mut self,
        node: &Node,
        target: &Node,
        start: &Node,
        end: Option<&Node>,
        ctx: &Context<'_>,
    ) -> RtResult {
        let target = self.visit(target, ctx)?;
        let start = self.visit(start, ctx)?;
        let end = match end {
            Some(expr) => Some(self.visit(expr, ctx)?),
            None => None,
        };
        slice(&target, &start, end.as_ref()).at(ctx, node.span)
    }
}

fn dict_key(value: &Value, span: Span, ctx: &Context<'_>) -> RtResult<DictKey> {
    match value {
        Value::Number(_) | Value::Str(_) => DictKey::from_value(value).at(ctx, span),
        _ => ctx.fail(
            ErrorKind::TypeError,
            "Dictionary key must be a Number or String",
            span,
        ),
    }
}
