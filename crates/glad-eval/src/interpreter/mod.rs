//! The tree-walking evaluator.
//!
//! [`Interpreter`] owns the scope arena, the class table and the host I/O.
//! Every node visit first spends one unit of the instruction budget, then
//! dispatches on the node kind. Errors and control signals travel back up
//! as [`Unwind`] values.

mod assign;
mod calls;
mod classes;
mod collections;
mod control;
mod operators;

use crate::config::Limits;
use crate::context::Context;
use crate::error::{RtResult, RuntimeError, Unwind};
use crate::globals;
use crate::io::IoHandler;
use crate::scope::{ScopeArena, ScopeId};
use crate::stack::ensure_sufficient_stack;
use crate::value::{ClassTable, Value};
use glad_types::ast::{Node, NodeKind};
use glad_types::{ErrorKind, Span};
use std::rc::Rc;

/// Executes GladLang programs.
pub struct Interpreter {
    scopes: ScopeArena,
    classes: ClassTable,
    globals: ScopeId,
    limits: Limits,
    /// Visits left in the current run, when budgeted.
    budget: Option<u64>,
    io: IoHandler,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl Interpreter {
    /// Create an interpreter with a fresh global frame, writing to stdout.
    pub fn new(limits: Limits) -> Self {
        let mut scopes = ScopeArena::new();
        let globals = scopes.alloc(None);
        globals::install(&mut scopes, globals);
        Self {
            scopes,
            classes: ClassTable::new(),
            globals,
            budget: limits.instruction_budget,
            limits,
            io: IoHandler::default(),
        }
    }

    pub fn with_io(mut self, io: IoHandler) -> Self {
        self.io = io;
        self
    }

    /// Run a program against the global frame.
    ///
    /// The program's value is its last statement's value, or the value of a
    /// top-level `RETURN`. Globals persist across runs.
    pub fn run(&mut self, program: &Node) -> Result<Value, RuntimeError> {
        self.budget = self.limits.instruction_budget;
        let root = Context::root("<program>", self.globals);
        match self.visit(program, &root) {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Break | Unwind::Continue) => Ok(Value::null()),
            Err(Unwind::Error(err)) => {
                tracing::debug!(kind = %err.kind, message = %err.message, "run failed");
                Err(*err)
            }
        }
    }

    pub fn io(&self) -> &IoHandler {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IoHandler {
        &mut self.io
    }

    /// Look up a global binding.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.scopes.get(self.globals, name)
    }

    pub fn scopes(&self) -> &ScopeArena {
        &self.scopes
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    // ══════════════════════════════════════════════════════════════════════
    // Dispatch
    // ══════════════════════════════════════════════════════════════════════

    pub(crate) fn visit(&mut self, node: &Node, ctx: &Context<'_>) -> RtResult {
        self.tick(node, ctx)?;
        ensure_sufficient_stack(|| self.dispatch(node, ctx))
    }

    /// Spend one unit of the instruction budget.
    fn tick(&mut self, node: &Node, ctx: &Context<'_>) -> RtResult<()> {
        let Some(remaining) = self.budget.as_mut() else {
            return Ok(());
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            tracing::warn!(node = node.kind_name(), frame = %ctx.name, "instruction budget exceeded");
            return ctx.fail(
                ErrorKind::InstructionBudget,
                "Instruction budget exceeded",
                node.span,
            );
        }
        Ok(())
    }

    fn dispatch(&mut self, node: &Node, ctx: &Context<'_>) -> RtResult {
        match &node.kind {
            NodeKind::Statements(stmts) => self.exec_block(stmts, ctx),

            // ── Literals ──
            NodeKind::Int(i) => Ok(Value::from(*i)),
            NodeKind::Float(f) => Ok(Value::from(*f)),
            NodeKind::Str(s) => Ok(Value::from(s.as_str())),
            NodeKind::List(items) => self.eval_list(items, ctx),
            NodeKind::Dict(pairs) => self.eval_dict(pairs, ctx),
            NodeKind::ListComp { element, specs } => self.eval_list_comp(node, element, specs, ctx),
            NodeKind::DictComp { key, value, specs } => {
                self.eval_dict_comp(node, key, value, specs, ctx)
            }

            // ── Variables ──
            NodeKind::MultiAssign { targets, value } => {
                self.exec_multi_assign(node, targets, value, ctx)
            }
            NodeKind::Slice { target, start, end } => {
                self.eval_slice(node, target, start, end.as_deref(), ctx)
            }
            NodeKind::VarAccess(name) => self.eval_var(name, ctx),
            NodeKind::VarAssign {
                name,
                value,
                declare,
            } => self.exec_assign(node, name, value, *declare, ctx),
            NodeKind::FinalAssign { name, value } => self.exec_final(node, name, value, ctx),
            NodeKind::Qualified {
                visibility,
                is_final,
                target,
            } => self.exec_qualified(node, *visibility, *is_final, target, ctx),
            NodeKind::Print { args, newline } => self.exec_print(node, args, *newline, ctx),

            // ── Control flow ──
            NodeKind::If { cases, else_case } => self.exec_if(cases, else_case.as_deref(), ctx),
            NodeKind::For {
                targets,
                iterable,
                body,
            } => self.exec_for(node, targets, iterable, body, ctx),
            NodeKind::While { condition, body } => self.exec_while(condition, body, ctx),
            NodeKind::Break => Err(Unwind::Break),
            NodeKind::Continue => Err(Unwind::Continue),
            NodeKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.visit(expr, ctx)?,
                    None => Value::null(),
                };
                Err(Unwind::Return(value))
            }

            // ── Functions & classes ──
            NodeKind::FunDef(def) => self.eval_fun_def(def, ctx),
            NodeKind::Call { callee, args } => self.eval_call(node, callee, args, ctx),
            NodeKind::Class(def) => self.exec_class(node, def, ctx),
            NodeKind::Enum { name, cases } => self.exec_enum(name, cases, ctx),
            NodeKind::GetAttr { object, name } => {
                let object = self.visit(object, ctx)?;
                self.get_attr(&object, name, ctx)
            }
            NodeKind::SetAttr {
                object,
                name,
                value,
            } => {
                let object = self.visit(object, ctx)?;
                let value = self.visit(value, ctx)?;
                self.set_attr(&object, name, value.clone(), None, ctx)?;
                Ok(value)
            }
            NodeKind::New { class, args } => self.eval_new(node, class, args, ctx),
            NodeKind::Index { target, index } => self.eval_index(node, target, index, ctx),
            NodeKind::IndexSet {
                target,
                index,
                value,
            } => self.exec_index_set(node, target, index, value, ctx),

            // ── Operators ──
            NodeKind::Binary { left, op, right } => self.eval_binary(node, left, *op, right, ctx),
            NodeKind::Ternary {
                condition,
                then,
                otherwise,
            } => {
                if self.visit(condition, ctx)?.is_truthy() {
                    self.visit(then, ctx)
                } else {
                    self.visit(otherwise, ctx)
                }
            }
            NodeKind::Chain { first, links } => self.eval_chain(first, links, ctx),
            NodeKind::Unary { op, operand } => self.eval_unary(node, *op, operand, ctx),
            NodeKind::PostOp { step, target } => self.eval_step(*step, target, false, ctx),

            // ── Exceptions ──
            NodeKind::Try(stmt) => self.exec_try(node, stmt, ctx),
            NodeKind::Throw(value) => self.exec_throw(node, value, ctx),
            NodeKind::Switch(stmt) => self.exec_switch(stmt, ctx),
        }
    }

    fn exec_block(&mut self, stmts: &[Node], ctx: &Context<'_>) -> RtResult {
        let mut last = Value::null();
        for stmt in stmts {
            last = self.visit(stmt, ctx)?;
        }
        Ok(last)
    }

    /// Run `f` in a child frame with a fresh scope chained to the current
    /// one. The scope is released when `f` returns.
    fn in_child_frame<T>(
        &mut self,
        ctx: &Context<'_>,
        name: &str,
        entry: Span,
        f: impl FnOnce(&mut Self, &Context<'_>) -> RtResult<T>,
    ) -> RtResult<T> {
        let scope = self.scopes.alloc(Some(ctx.scope));
        let frame = ctx.child(Rc::from(name), entry, scope);
        let result = f(self, &frame);
        self.scopes.release(scope);
        result
    }
}
