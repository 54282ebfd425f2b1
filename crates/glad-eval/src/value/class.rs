//! Classes, instances and method resolution order.
//!
//! Classes live in a [`ClassTable`] owned by the interpreter and are referred
//! to by [`ClassId`]. Values carry a [`ClassRef`] (id plus name) so they can
//! render themselves without reaching into the table.

use super::{Callable, Value};
use crate::scope::{ScopeId, SymbolTable};
use glad_types::ast::Visibility;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Index of a class in a [`ClassTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub fn new(index: usize) -> Self {
        ClassId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A class value: its id plus its name.
#[derive(Debug, Clone)]
pub struct ClassRef {
    pub id: ClassId,
    pub name: Rc<str>,
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Debug)]
pub struct ClassObj {
    pub name: Rc<str>,
    pub superclasses: Vec<ClassId>,
    /// Linearization, this class first.
    pub mro: Vec<ClassId>,
    pub methods: FxHashMap<String, Callable>,
    /// Static fields, in a detached frame of the scope arena.
    pub statics: ScopeId,
}

/// Every class defined by one interpreter.
#[derive(Debug, Default)]
pub struct ClassTable {
    classes: Vec<ClassObj>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next pushed class will get.
    pub fn next_id(&self) -> ClassId {
        ClassId::new(self.classes.len())
    }

    pub fn push(&mut self, class: ClassObj) -> ClassRef {
        let id = self.next_id();
        let name = Rc::clone(&class.name);
        self.classes.push(class);
        ClassRef { id, name }
    }

    pub fn get(&self, id: ClassId) -> &ClassObj {
        &self.classes[id.index()]
    }

    pub fn get_mut(&mut self, id: ClassId) -> &mut ClassObj {
        &mut self.classes[id.index()]
    }

    pub fn class_ref(&self, id: ClassId) -> ClassRef {
        ClassRef {
            id,
            name: Rc::clone(&self.get(id).name),
        }
    }

    pub fn mro(&self, id: ClassId) -> &[ClassId] {
        &self.get(id).mro
    }

    /// Whether `ancestor` appears in `class`'s MRO.
    pub fn is_subclass(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.mro(class).contains(&ancestor)
    }

    /// Whether code running in `active` may touch a member with
    /// `visibility` declared by `defining`.
    pub fn can_access(
        &self,
        visibility: Visibility,
        defining: Option<ClassId>,
        active: Option<ClassId>,
    ) -> bool {
        match visibility {
            Visibility::Public => true,
            Visibility::Private => active == defining,
            Visibility::Protected => match (active, defining) {
                (Some(active), Some(defining)) => {
                    self.is_subclass(active, defining) || self.is_subclass(defining, active)
                }
                _ => false,
            },
        }
    }

    /// The first method named `name` along `class`'s MRO, starting at
    /// position `skip`.
    pub fn find_method(&self, class: ClassId, name: &str, skip: usize) -> Option<&Callable> {
        self.mro(class)
            .iter()
            .skip(skip)
            .find_map(|&c| self.get(c).methods.get(name))
    }

    /// The first constructor along `class`'s MRO from position `skip`: a
    /// method named after the class that declares it.
    pub fn find_constructor(&self, class: ClassId, skip: usize) -> Option<&Callable> {
        self.mro(class).iter().skip(skip).find_map(|&c| {
            let cls = self.get(c);
            cls.methods.get(cls.name.as_ref())
        })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// C3 linearization of `head` with direct `parents`, given each parent's
/// own linearization. `None` when the hierarchy is inconsistent.
pub fn linearize<T, F>(head: T, parents: &[T], mro_of: F) -> Option<Vec<T>>
where
    T: Copy + Eq,
    F: Fn(T) -> Vec<T>,
{
    let mut seqs: Vec<VecDeque<T>> = Vec::with_capacity(parents.len() + 2);
    seqs.push(VecDeque::from([head]));
    seqs.extend(parents.iter().map(|&p| VecDeque::from(mro_of(p))));
    seqs.push(parents.iter().copied().collect());

    let mut out = Vec::new();
    loop {
        seqs.retain(|s| !s.is_empty());
        if seqs.is_empty() {
            return Some(out);
        }
        let next = seqs.iter().filter_map(|s| s.front().copied()).find(|candidate| {
            !seqs
                .iter()
                .any(|s| s.iter().skip(1).any(|item| item == candidate))
        })?;
        out.push(next);
        for seq in &mut seqs {
            if seq.front() == Some(&next) {
                seq.pop_front();
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Instances
// ══════════════════════════════════════════════════════════════════════════════

/// Key of an instance field. Private fields carry the class that declared
/// them, so a subclass's private field never collides with its parent's.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub owner: Option<ClassId>,
    pub name: String,
}

impl FieldKey {
    pub fn public(name: &str) -> Self {
        Self {
            owner: None,
            name: name.to_string(),
        }
    }

    pub fn private(owner: ClassId, name: &str) -> Self {
        Self {
            owner: Some(owner),
            name: name.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct InstanceObj {
    pub class: ClassRef,
    pub fields: SymbolTable<FieldKey>,
}

pub type InstanceRef = Rc<RefCell<InstanceObj>>;

impl InstanceObj {
    pub fn new_ref(class: ClassRef) -> InstanceRef {
        Rc::new(RefCell::new(InstanceObj {
            class,
            fields: SymbolTable::new(),
        }))
    }

    pub fn field(&self, key: &FieldKey) -> Option<Value> {
        self.fields.get(key)
    }
}

/// `SUPER` inside a method: the receiver plus the class after which
/// lookup resumes.
#[derive(Debug)]
pub struct SuperProxy {
    pub receiver: InstanceRef,
    pub after: ClassId,
}
