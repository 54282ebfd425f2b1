//! Function definition and invocation.

use super::Interpreter;
use crate::context::{Context, OpResultExt};
use crate::error::{OpError, RtResult, Unwind};
use crate::value::{Callable, Function, InstanceRef, SuperProxy, Value};
use glad_types::ast::{FunDef, Node};
use glad_types::{ErrorKind, Span};
use std::rc::Rc;

impl Interpreter {
    /// A named definition binds in the current frame, merging into an
    /// overload group when the name already holds a function.
    pub(super) fn eval_fun_def(&mut self, def: &FunDef, ctx: &Context<'_>) -> RtResult {
        let name = def.name.as_ref().map_or("<anonymous>", |n| n.name.as_str());
        let func = Rc::new(Function {
            name: Rc::from(name),
            params: def.params.iter().map(|p| p.name.clone()).collect(),
            body: Rc::clone(&def.body),
            closure: self.scopes.capture(ctx.scope),
            visibility: def.visibility,
            defining_class: ctx.active_class,
            is_method: false,
            is_static: def.is_static,
            span: def.span,
        });

        let Some(ident) = &def.name else {
            return Ok(Value::Function(func));
        };
        let existing = self
            .scopes
            .table(ctx.scope)
            .get(ident.name.as_str())
            .as_ref()
            .and_then(Callable::from_value);
        let value = match existing {
            Some(callable) => callable.add_variant(func).at(ctx, def.span)?.into_value(),
            None => Value::Function(func),
        };
        self.scopes.set(ctx.scope, &ident.name, value.clone());
        Ok(value)
    }

    pub(super) fn eval_call(
        &mut self,
        node: &Node,
        callee: &Node,
        args: &[Node],
        ctx: &Context<'_>,
    ) -> RtResult {
        let target = self.visit(callee, ctx)?;
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.visit(arg, ctx)?);
        }
        self.call_value(&target, values, node.span, ctx)
    }

    pub(super) fn call_value(
        &mut self,
        target: &Value,
        args: Vec<Value>,
        span: Span,
        ctx: &Context<'_>,
    ) -> RtResult {
        match target {
            Value::Function(func) => self.call_function(func, None, args, span, ctx),
            Value::Group(group) => {
                let func = Rc::clone(group.resolve(args.len()).at(ctx, span)?);
                self.call_function(&func, None, args, span, ctx)
            }
            Value::BoundMethod(bound) => {
                let receiver = Rc::clone(&bound.receiver);
                self.call_callable(&bound.callable, Some(receiver), args, span, ctx)
            }
            Value::Builtin(builtin) => builtin.call(&args, &mut self.io).at(ctx, span),
            Value::Super(proxy) => self.call_super(proxy, args, span, ctx),
            Value::Class(class) => ctx.fail(
                ErrorKind::IllegalOperation,
                format!("Class '{}' must be instantiated using 'NEW'", class.name),
                span,
            ),
            _ => ctx.fail(ErrorKind::IllegalOperation, "Illegal operation", span),
        }
    }

    /// Dispatch a method-table entry, resolving overloads by argument count.
    pub(super) fn call_callable(
        &mut self,
        callable: &Callable,
        receiver: Option<InstanceRef>,
        args: Vec<Value>,
        span: Span,
        ctx: &Context<'_>,
    ) -> RtResult {
        let func = match callable {
            Callable::Function(func) => Rc::clone(func),
            Callable::Group(group) => Rc::clone(group.resolve(args.len()).at(ctx, span)?),
        };
        let receiver = if func.is_static { None } else { receiver };
        self.call_function(&func, receiver, args, span, ctx)
    }

    /// Run a function body in a fresh frame chained to its closure.
    fn call_function(
        &mut self,
        func: &Rc<Function>,
        receiver: Option<InstanceRef>,
        args: Vec<Value>,
        span: Span,
        ctx: &Context<'_>,
    ) -> RtResult {
        if ctx.depth + 1 > self.limits.max_call_depth {
            tracing::warn!(function = %func.name, depth = ctx.depth, "call depth limit reached");
            return ctx.fail(
                ErrorKind::RecursionLimit,
                format!(
                    "Maximum recursion depth exceeded ({})",
                    self.limits.max_call_depth
                ),
                span,
            );
        }
        let params = func.arity_params();
        if params.len() != args.len() {
            return Err(OpError::arity(&func.name, params.len(), args.len())).at(ctx, span);
        }

        let scope = self.scopes.alloc(Some(func.closure.id()));
        if let Some(receiver) = receiver {
            self.scopes.set(scope, "THIS", Value::Instance(receiver));
        }
        for (param, arg) in params.iter().zip(args) {
            self.scopes.set(scope, param, arg);
        }

        tracing::trace!(function = %func.name, argc = params.len(), depth = ctx.depth + 1, "call");
        let frame = ctx
            .child(Rc::clone(&func.name), span, scope)
            .with_active_class(func.defining_class);
        let result = self.visit(&func.body, &frame);
        self.scopes.release(scope);

        match result {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Break | Unwind::Continue) => Ok(Value::null()),
            Err(err) => Err(err),
        }
    }

    /// `SUPER(args)`: the first constructor after the active class in the
    /// receiver's MRO.
    fn call_super(
        &mut self,
        proxy: &SuperProxy,
        args: Vec<Value>,
        span: Span,
        ctx: &Context<'_>,
    ) -> RtResult {
        let class_id = proxy.receiver.borrow().class.id;
        let start = self.super_start(proxy);
        match self.classes.find_constructor(class_id, start).cloned() {
            Some(ctor) => {
                let receiver = Rc::clone(&proxy.receiver);
                self.call_callable(&ctor, Some(receiver), args, span, ctx)
            }
            None if args.is_empty() => Ok(Value::null()),
            None => ctx.fail(
                ErrorKind::CallArity,
                "No constructor found in superclasses",
                span,
            ),
        }
    }
}
