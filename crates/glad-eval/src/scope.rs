//! Scoped bindings for the GladLang evaluator.
//!
//! A [`SymbolTable`] is one flat frame of bindings. The interpreter keeps its
//! frames in a [`ScopeArena`] and links them by [`ScopeId`], so closures and
//! class statics can refer to a frame without owning it.

use crate::value::{Function, Value};
use glad_types::{ast::Visibility, ErrorKind};
use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::hash::Hash;
use std::rc::{Rc, Weak};

/// A bound value with its access metadata.
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub visibility: Visibility,
    pub is_final: bool,
}

/// Why a scope operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeError {
    AlreadyDefined,
    Constant,
    Undefined,
}

impl ScopeError {
    pub fn kind(self) -> ErrorKind {
        match self {
            ScopeError::AlreadyDefined => ErrorKind::AlreadyDefined,
            ScopeError::Constant => ErrorKind::ConstantReassignment,
            ScopeError::Undefined => ErrorKind::UndefinedName,
        }
    }

    pub fn message(self, name: &str) -> String {
        match self {
            ScopeError::AlreadyDefined => format!("Variable '{name}' is already defined"),
            ScopeError::Constant => format!("Cannot reassign constant '{name}'"),
            ScopeError::Undefined => format!("'{name}' is not defined"),
        }
    }
}

/// One frame of bindings, keyed by `K`.
///
/// Variable frames key by name; instance field tables key by
/// [`FieldKey`](crate::value::FieldKey).
#[derive(Debug, Clone)]
pub struct SymbolTable<K = String> {
    bindings: FxHashMap<K, Binding>,
}

impl<K: Eq + Hash> Default for SymbolTable<K> {
    fn default() -> Self {
        Self {
            bindings: FxHashMap::default(),
        }
    }
}

impl<K: Eq + Hash> SymbolTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key`, replacing any existing binding.
    pub fn set(&mut self, key: K, value: Value, visibility: Visibility, is_final: bool) {
        self.bindings.insert(
            key,
            Binding {
                value,
                visibility,
                is_final,
            },
        );
    }

    /// Bind `key` only if it is not bound yet.
    pub fn define(
        &mut self,
        key: K,
        value: Value,
        visibility: Visibility,
        is_final: bool,
    ) -> Result<(), ScopeError> {
        if self.bindings.contains_key(&key) {
            return Err(ScopeError::AlreadyDefined);
        }
        self.set(key, value, visibility, is_final);
        Ok(())
    }

    pub fn binding<Q>(&self, key: &Q) -> Option<&Binding>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.bindings.get(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<Value>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.bindings.get(key).map(|b| b.value.clone())
    }

    /// Rebind an existing, non-final binding in this frame only.
    pub fn update<Q>(&mut self, key: &Q, value: Value) -> Result<(), ScopeError>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        match self.bindings.get_mut(key) {
            Some(b) if b.is_final => Err(ScopeError::Constant),
            Some(b) => {
                b.value = value;
                Ok(())
            }
            None => Err(ScopeError::Undefined),
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<Binding>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.bindings.remove(key)
    }

    /// Visibility of `key`; unbound names are public.
    pub fn visibility<Q>(&self, key: &Q) -> Visibility
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.bindings
            .get(key)
            .map(|b| b.visibility)
            .unwrap_or_default()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.bindings.contains_key(key)
    }

    pub fn is_final<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.bindings.get(key).is_some_and(|b| b.is_final)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<K: Eq + Hash + Clone> SymbolTable<K> {
    /// A detached copy of this frame's bindings.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Frame arena
// ══════════════════════════════════════════════════════════════════════════════

/// Index of a frame in a [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct PinNode {
    _parent: Option<ScopePin>,
}

/// A counted hold on a captured frame and, through it, its parent chain.
///
/// The frame stays in the arena while any clone of its pin is alive.
#[derive(Debug, Clone)]
pub struct ScopePin {
    id: ScopeId,
    node: Rc<PinNode>,
}

impl ScopePin {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    fn is_for(&self, node: &Weak<PinNode>) -> bool {
        std::ptr::eq(Rc::as_ptr(&self.node), node.as_ptr())
    }
}

#[derive(Debug)]
struct Frame {
    table: SymbolTable,
    parent: Option<ScopeId>,
    live: bool,
    pin: Weak<PinNode>,
}

impl Frame {
    /// A released frame can go once no pin is held outside its own table.
    fn reclaimable(&self) -> bool {
        if self.live {
            return false;
        }
        let holders = self.pin.strong_count();
        holders == 0 || holders == self.self_pins()
    }

    /// Pins on this frame held only by functions bound in the frame itself.
    fn self_pins(&self) -> usize {
        self.table
            .bindings
            .values()
            .map(|binding| pins_in(&binding.value, &self.pin))
            .sum()
    }
}

/// Pins on `node` from functions that only `value` refers to.
fn pins_in(value: &Value, node: &Weak<PinNode>) -> usize {
    let sole = |func: &Rc<Function>| Rc::strong_count(func) == 1 && func.closure.is_for(node);
    match value {
        Value::Function(func) => usize::from(sole(func)),
        Value::Group(group) if Rc::strong_count(group) == 1 => {
            group.variants.values().filter(|&f| sole(f)).count()
        }
        _ => 0,
    }
}

/// All variable frames of one interpreter.
///
/// Frames are allocated on entry to a call, loop iteration or block and
/// released on exit. Released frames at the tail of the arena are reclaimed
/// unless something outside the frame still holds a [`ScopePin`] on it. A
/// pin on a frame also holds its parent chain.
#[derive(Debug, Default)]
pub struct ScopeArena {
    frames: Vec<Frame>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh frame chained to `parent`.
    pub fn alloc(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.frames.len() as u32);
        self.frames.push(Frame {
            table: SymbolTable::new(),
            parent,
            live: true,
            pin: Weak::new(),
        });
        id
    }

    /// Mark a frame as exited and reclaim dead frames from the tail.
    pub fn release(&mut self, id: ScopeId) {
        if let Some(frame) = self.frames.get_mut(id.index()) {
            frame.live = false;
        }
        let before = self.frames.len();
        while self.frames.last().is_some_and(Frame::reclaimable) {
            self.frames.pop();
        }
        let reclaimed = before - self.frames.len();
        if reclaimed > 0 {
            tracing::trace!(reclaimed, remaining = self.frames.len(), "released scope frames");
        }
    }

    /// Pin `id` and its ancestors for as long as the returned pin lives.
    #[must_use]
    pub fn capture(&mut self, id: ScopeId) -> ScopePin {
        if let Some(node) = self.frames[id.index()].pin.upgrade() {
            return ScopePin { id, node };
        }
        let parent = self.frames[id.index()].parent;
        let parent = parent.map(|p| self.capture(p));
        let node = Rc::new(PinNode { _parent: parent });
        self.frames[id.index()].pin = Rc::downgrade(&node);
        ScopePin { id, node }
    }

    /// Cut a frame loose from its parent chain.
    pub fn detach(&mut self, id: ScopeId) {
        self.frames[id.index()].parent = None;
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.frames[id.index()].parent
    }

    /// The frame's own bindings.
    pub fn table(&self, id: ScopeId) -> &SymbolTable {
        &self.frames[id.index()].table
    }

    pub fn table_mut(&mut self, id: ScopeId) -> &mut SymbolTable {
        &mut self.frames[id.index()].table
    }

    /// Bind `name` in frame `id`.
    pub fn set(&mut self, id: ScopeId, name: &str, value: Value) {
        self.table_mut(id)
            .set(name.to_string(), value, Visibility::Public, false);
    }

    /// Find the binding for `name` along the parent chain.
    pub fn lookup(&self, id: ScopeId, name: &str) -> Option<&Binding> {
        let mut cur = Some(id);
        while let Some(id) = cur {
            let frame = &self.frames[id.index()];
            if let Some(binding) = frame.table.binding(name) {
                return Some(binding);
            }
            cur = frame.parent;
        }
        None
    }

    pub fn get(&self, id: ScopeId, name: &str) -> Option<Value> {
        self.lookup(id, name).map(|b| b.value.clone())
    }

    /// Rebind `name` in the nearest frame that binds it.
    pub fn update(&mut self, id: ScopeId, name: &str, value: Value) -> Result<(), ScopeError> {
        let mut cur = Some(id);
        while let Some(id) = cur {
            let frame = &mut self.frames[id.index()];
            if frame.table.contains(name) {
                return frame.table.update(name, value);
            }
            cur = frame.parent;
        }
        Err(ScopeError::Undefined)
    }

    /// Whether `name` is final in any frame along the chain.
    pub fn is_final_in_chain(&self, id: ScopeId, name: &str) -> bool {
        let mut cur = Some(id);
        while let Some(id) = cur {
            let frame = &self.frames[id.index()];
            if frame.table.is_final(name) {
                return true;
            }
            cur = frame.parent;
        }
        false
    }

    /// Number of frames currently held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
