//! Class and enum definitions, member access and instantiation.

use super::Interpreter;
use crate::context::{Context, OpResultExt};
use crate::error::RtResult;
use crate::scope::Binding;
use crate::value::{
    linearize, BoundMethod, Callable, ClassId, ClassObj, EnumObj, FieldKey, Function, InstanceObj,
    InstanceRef, Number, SuperProxy, Value,
};
use glad_types::ast::{ClassDef, Ident, Node, Visibility};
use glad_types::ErrorKind;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Modifiers of a qualified declaration (`PRIVATE`, `FINAL`, ...).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Declaration {
    pub visibility: Visibility,
    pub is_final: bool,
}

impl Interpreter {
    // ══════════════════════════════════════════════════════════════════════
    // Definitions
    // ══════════════════════════════════════════════════════════════════════

    pub(super) fn exec_class(&mut self, node: &Node, def: &ClassDef, ctx: &Context<'_>) -> RtResult {
        let name = def.name.name.as_str();

        let mut parents = Vec::with_capacity(def.superclasses.len());
        for parent in &def.superclasses {
            match self.visit(parent, ctx)? {
                Value::Class(class) if class.name.as_ref() == name => {
                    return ctx.fail(
                        ErrorKind::InconsistentHierarchy,
                        format!("Class '{name}' cannot inherit from itself"),
                        parent.span,
                    );
                }
                Value::Class(class) => parents.push(class.id),
                _ => {
                    return ctx.fail(
                        ErrorKind::TypeError,
                        "A class can only inherit from another class",
                        parent.span,
                    );
                }
            }
        }

        let id = self.classes.next_id();
        let classes = &self.classes;
        let Some(mro) = linearize(id, &parents, |p| classes.mro(p).to_vec()) else {
            return ctx.fail(
                ErrorKind::InconsistentHierarchy,
                "Inconsistent inheritance hierarchy (Cycle or bad MRO)",
                node.span,
            );
        };

        // Static initializers see the enclosing scope; afterwards the
        // statics frame stands alone. It is never released.
        let statics = self.scopes.alloc(Some(ctx.scope));
        let class = self.classes.push(ClassObj {
            name: Rc::from(name),
            superclasses: parents,
            mro,
            methods: FxHashMap::default(),
            statics,
        });
        {
            let class_ctx = ctx
                .child(Rc::from(format!("<class {name}>")), node.span, statics)
                .with_active_class(Some(class.id));
            for field in &def.static_fields {
                self.visit(field, &class_ctx)?;
            }
        }
        self.scopes.detach(statics);

        let mut methods: FxHashMap<String, Callable> = FxHashMap::default();
        for method in &def.methods {
            let Some(method_name) = &method.name else {
                return ctx.fail(ErrorKind::InvalidTarget, "Methods must be named", method.span);
            };
            let func = Rc::new(Function {
                name: Rc::from(method_name.name.as_str()),
                params: method.params.iter().map(|p| p.name.clone()).collect(),
                body: Rc::clone(&method.body),
                closure: self.scopes.capture(ctx.scope),
                visibility: method.visibility,
                defining_class: Some(class.id),
                is_method: true,
                is_static: method.is_static,
                span: method.span,
            });

            if let Some(inherited) = self.classes.find_method(class.id, &method_name.name, 1) {
                if method.visibility < inherited.visibility() {
                    return ctx.fail(
                        ErrorKind::AccessViolation,
                        format!(
                            "Method '{}' cannot be more restrictive than parent method (LSP Violation)",
                            method_name.name
                        ),
                        method.span,
                    );
                }
            }

            let entry = match methods.get(&method_name.name) {
                Some(existing) => existing.add_variant(func).at(ctx, method.span)?,
                None => Callable::Function(func),
            };
            methods.insert(method_name.name.clone(), entry);
        }

        let method_count = methods.len();
        self.classes.get_mut(class.id).methods = methods;
        self.scopes.set(ctx.scope, name, Value::Class(class.clone()));
        tracing::debug!(
            class = name,
            mro_len = self.classes.mro(class.id).len(),
            methods = method_count,
            "defined class"
        );
        Ok(Value::Class(class))
    }

    /// Cases without a value continue counting from the previous number.
    pub(super) fn exec_enum(
        &mut self,
        name: &Ident,
        cases: &[(Ident, Option<Node>)],
        ctx: &Context<'_>,
    ) -> RtResult {
        let mut values = IndexMap::with_capacity(cases.len());
        let mut next = Number::Int(0);
        for (case, explicit) in cases {
            let value = match explicit {
                Some(expr) => self.visit(expr, ctx)?,
                None => Value::Number(next),
            };
            if let Value::Number(n) = value {
                next = n.add(Number::Int(1));
            }
            if values.insert(case.name.clone(), value).is_some() {
                return ctx.fail(
                    ErrorKind::AlreadyDefined,
                    format!("Enum case '{}' is already defined", case.name),
                    case.span,
                );
            }
        }
        let value = Value::Enum(Rc::new(EnumObj {
            name: Rc::from(name.name.as_str()),
            cases: values,
        }));
        self.scopes.set(ctx.scope, &name.name, value.clone());
        tracing::debug!(name = %name.name, cases = cases.len(), "defined enum");
        Ok(value)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Member access
    // ══════════════════════════════════════════════════════════════════════

    pub(super) fn get_attr(&mut self, object: &Value, name: &Ident, ctx: &Context<'_>) -> RtResult {
        match object {
            Value::Instance(instance) => self.instance_get(instance, name, ctx),
            Value::Class(class) => self.class_get(class.id, name, ctx),
            Value::Super(proxy) => self.super_get(proxy, name, ctx),
            Value::Enum(e) => match e.cases.get(&name.name) {
                Some(value) => Ok(value.clone()),
                None => ctx.fail(
                    ErrorKind::UndefinedMember,
                    format!("Enum '{}' has no case '{}'", e.name, name.name),
                    name.span,
                ),
            },
            _ => ctx.fail(ErrorKind::IllegalOperation, "Illegal operation", name.span),
        }
    }

    /// Private slot of the active class, own field, methods along the MRO,
    /// then static fields along the MRO.
    fn instance_get(&mut self, instance: &InstanceRef, name: &Ident, ctx: &Context<'_>) -> RtResult {
        let class_id = instance.borrow().class.id;
        if let Some(active) = ctx.active_class {
            if let Some(value) = instance.borrow().field(&FieldKey::private(active, &name.name)) {
                return Ok(value);
            }
        }

        let own = instance
            .borrow()
            .fields
            .binding(&FieldKey::public(&name.name))
            .cloned();
        if let Some(field) = own {
            self.check_access(field.visibility, Some(class_id), "member", name, ctx)?;
            return Ok(field.value);
        }

        if let Some(method) = self.classes.find_method(class_id, &name.name, 0).cloned() {
            self.check_access(method.visibility(), method.defining_class(), "member", name, ctx)?;
            if method.is_static() {
                return Ok(method.into_value());
            }
            return Ok(Value::BoundMethod(Rc::new(BoundMethod {
                callable: method,
                receiver: Rc::clone(instance),
            })));
        }

        if let Some((owner, field)) = self.find_static(class_id, &name.name) {
            self.check_access(field.visibility, Some(owner), "static field", name, ctx)?;
            return Ok(field.value);
        }

        let hidden = self
            .classes
            .mro(class_id)
            .iter()
            .any(|&c| instance.borrow().fields.contains(&FieldKey::private(c, &name.name)));
        if hidden {
            return ctx.fail(
                ErrorKind::AccessViolation,
                format!("Cannot access private member '{}'", name.name),
                name.span,
            );
        }

        let class_name = Rc::clone(&instance.borrow().class.name);
        ctx.fail(
            ErrorKind::UndefinedMember,
            format!("Class '{class_name}' has no member '{}'", name.name),
            name.span,
        )
    }

    /// `ClassName.member`: static fields, then methods, class by class
    /// along the MRO.
    fn class_get(&mut self, class_id: ClassId, name: &Ident, ctx: &Context<'_>) -> RtResult {
        let mro = self.classes.mro(class_id).to_vec();
        for class in mro {
            let statics = self.classes.get(class).statics;
            if let Some(field) = self.scopes.table(statics).binding(name.name.as_str()).cloned() {
                self.check_access(field.visibility, Some(class), "static field", name, ctx)?;
                return Ok(field.value);
            }
            let Some(method) = self.classes.get(class).methods.get(&name.name).cloned() else {
                continue;
            };
            self.check_access(method.visibility(), method.defining_class(), "method", name, ctx)?;
            if !method.is_static() {
                if let Some(Value::Instance(this)) = self.scopes.get(ctx.scope, "THIS") {
                    let this_class = this.borrow().class.id;
                    if self.classes.is_subclass(this_class, class_id) {
                        return Ok(Value::BoundMethod(Rc::new(BoundMethod {
                            callable: method,
                            receiver: this,
                        })));
                    }
                }
            }
            return Ok(method.into_value());
        }
        ctx.fail(
            ErrorKind::UndefinedMember,
            format!(
                "Class '{}' has no member '{}'",
                self.classes.get(class_id).name,
                name.name
            ),
            name.span,
        )
    }

    fn super_get(&mut self, proxy: &SuperProxy, name: &Ident, ctx: &Context<'_>) -> RtResult {
        let class_id = proxy.receiver.borrow().class.id;
        let start = self.super_start(proxy);
        let Some(method) = self.classes.find_method(class_id, &name.name, start).cloned() else {
            return ctx.fail(
                ErrorKind::UndefinedMember,
                format!("Method '{}' not found in superclasses", name.name),
                name.span,
            );
        };
        self.check_access(method.visibility(), method.defining_class(), "member", name, ctx)?;
        if method.is_static() {
            return Ok(method.into_value());
        }
        Ok(Value::BoundMethod(Rc::new(BoundMethod {
            callable: method,
            receiver: Rc::clone(&proxy.receiver),
        })))
    }

    /// Position in the receiver's MRO where `SUPER` lookup starts.
    pub(super) fn super_start(&self, proxy: &SuperProxy) -> usize {
        let mro = self.classes.mro(proxy.receiver.borrow().class.id);
        mro.iter()
            .position(|&c| c == proxy.after)
            .map_or(mro.len(), |i| i + 1)
    }

    /// The first static field named `name` along the MRO, with the class
    /// that declares it.
    fn find_static(&self, class_id: ClassId, name: &str) -> Option<(ClassId, Binding)> {
        self.classes.mro(class_id).iter().find_map(|&class| {
            let statics = self.classes.get(class).statics;
            self.scopes
                .table(statics)
                .binding(name)
                .map(|b| (class, b.clone()))
        })
    }

    fn check_access(
        &self,
        visibility: Visibility,
        defining: Option<ClassId>,
        what: &str,
        name: &Ident,
        ctx: &Context<'_>,
    ) -> RtResult<()> {
        if self.classes.can_access(visibility, defining, ctx.active_class) {
            return Ok(());
        }
        ctx.fail(
            ErrorKind::AccessViolation,
            format!(
                "Cannot access {} {what} '{}'",
                visibility.as_str().to_lowercase(),
                name.name
            ),
            name.span,
        )
    }

    // ══════════════════════════════════════════════════════════════════════
    // Member assignment
    // ══════════════════════════════════════════════════════════════════════

    /// Assign `object.name`. With a declaration the member is created and
    /// must not exist yet; without one an existing member is updated.
    pub(super) fn set_attr(
        &mut self,
        object: &Value,
        name: &Ident,
        value: Value,
        decl: Option<Declaration>,
        ctx: &Context<'_>,
    ) -> RtResult<()> {
        match object {
            Value::Instance(instance) => self.instance_set(instance, name, value, decl, ctx),
            Value::Class(class) => self.class_set(class.id, name, value, decl, ctx),
            Value::Enum(_) => ctx.fail(
                ErrorKind::ConstantReassignment,
                format!("Cannot reassign enum case '{}'", name.name),
                name.span,
            ),
            _ => ctx.fail(ErrorKind::IllegalOperation, "Illegal operation", name.span),
        }
    }

    fn instance_set(
        &mut self,
        instance: &InstanceRef,
        name: &Ident,
        value: Value,
        decl: Option<Declaration>,
        ctx: &Context<'_>,
    ) -> RtResult<()> {
        let field = name.name.as_str();
        let public = FieldKey::public(field);

        if let Some(decl) = decl {
            let key = match (decl.visibility, ctx.active_class) {
                (Visibility::Private, Some(active)) => FieldKey::private(active, field),
                _ => public.clone(),
            };
            let mut obj = instance.borrow_mut();
            if obj.fields.contains(&key) {
                return ctx.fail(
                    ErrorKind::AlreadyDefined,
                    format!("Attribute '{field}' is already defined"),
                    name.span,
                );
            }
            if key.owner.is_some() {
                if obj.fields.is_final(&public) {
                    return ctx.fail(
                        ErrorKind::ConstantReassignment,
                        format!("Cannot shadow constant '{field}' with a private variable"),
                        name.span,
                    );
                }
                obj.fields.remove(&public);
            }
            obj.fields.set(key, value, decl.visibility, decl.is_final);
            return Ok(());
        }

        if let Some(active) = ctx.active_class {
            let key = FieldKey::private(active, field);
            let slot = instance.borrow().fields.binding(&key).map(|b| b.is_final);
            match slot {
                Some(true) => {
                    return ctx.fail(
                        ErrorKind::ConstantReassignment,
                        format!("Cannot reassign constant '{field}'"),
                        name.span,
                    );
                }
                Some(false) => {
                    instance
                        .borrow_mut()
                        .fields
                        .set(key, value, Visibility::Private, false);
                    return Ok(());
                }
                None => {}
            }
        }

        let class_id = instance.borrow().class.id;
        let existing = instance
            .borrow()
            .fields
            .binding(&public)
            .map(|b| (b.visibility, b.is_final));
        if let Some((visibility, is_final)) = existing {
            self.check_access(visibility, Some(class_id), "member", name, ctx)?;
            if is_final {
                return ctx.fail(
                    ErrorKind::ConstantReassignment,
                    format!("Cannot reassign constant '{field}'"),
                    name.span,
                );
            }
            instance
                .borrow_mut()
                .fields
                .set(public, value, visibility, false);
            return Ok(());
        }

        if let Some((_, binding)) = self.find_static(class_id, field) {
            if binding.is_final {
                return ctx.fail(
                    ErrorKind::ConstantReassignment,
                    format!("Cannot shadow static constant '{field}' with an instance variable"),
                    name.span,
                );
            }
        }
        instance
            .borrow_mut()
            .fields
            .set(public, value, Visibility::Public, false);
        Ok(())
    }

    /// Class-level assignment touches the class's own static fields only.
    fn class_set(
        &mut self,
        class_id: ClassId,
        name: &Ident,
        value: Value,
        decl: Option<Declaration>,
        ctx: &Context<'_>,
    ) -> RtResult<()> {
        let field = name.name.as_str();
        let statics = self.classes.get(class_id).statics;

        if let Some(decl) = decl {
            let table = self.scopes.table_mut(statics);
            if table.contains(field) {
                return ctx.fail(
                    ErrorKind::AlreadyDefined,
                    format!("Static field '{field}' is already defined"),
                    name.span,
                );
            }
            table.set(field.to_string(), value, decl.visibility, decl.is_final);
            return Ok(());
        }

        let existing = self
            .scopes
            .table(statics)
            .binding(field)
            .map(|b| (b.visibility, b.is_final));
        match existing {
            Some((_, true)) => ctx.fail(
                ErrorKind::ConstantReassignment,
                format!("Cannot reassign static constant '{field}'"),
                name.span,
            ),
            Some((visibility, false)) => {
                self.check_access(visibility, Some(class_id), "static field", name, ctx)?;
                self.scopes
                    .table_mut(statics)
                    .set(field.to_string(), value, visibility, false);
                Ok(())
            }
            None => ctx.fail(
                ErrorKind::UndefinedMember,
                format!(
                    "Class '{}' has no static field '{field}'",
                    self.classes.get(class_id).name
                ),
                name.span,
            ),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Instantiation
    // ══════════════════════════════════════════════════════════════════════

    /// `NEW C(args)`: create an instance and run the first constructor
    /// along `C`'s MRO.
    pub(super) fn eval_new(
        &mut self,
        node: &Node,
        class: &Ident,
        args: &[Node],
        ctx: &Context<'_>,
    ) -> RtResult {
        let class_ref = match self.scopes.get(ctx.scope, &class.name) {
            Some(Value::Class(class_ref)) => class_ref,
            Some(_) => {
                return ctx.fail(
                    ErrorKind::NotAClass,
                    format!("'{}' is not a class", class.name),
                    class.span,
                );
            }
            None => {
                return ctx.fail(
                    ErrorKind::UndefinedName,
                    format!("Class '{}' is not defined", class.name),
                    class.span,
                );
            }
        };
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.visit(arg, ctx)?);
        }

        let instance = InstanceObj::new_ref(class_ref.clone());
        match self.classes.find_constructor(class_ref.id, 0).cloned() {
            Some(ctor) => {
                self.check_access(ctor.visibility(), ctor.defining_class(), "member", class, ctx)?;
                self.call_callable(&ctor, Some(Rc::clone(&instance)), values, node.span, ctx)?;
            }
            None if !values.is_empty() => {
                return ctx.fail(
                    ErrorKind::CallArity,
                    format!(
                        "'{}' does not have a constructor that accepts arguments",
                        class_ref.name
                    ),
                    node.span,
                );
            }
            None => {}
        }
        Ok(Value::Instance(instance))
    }
}
