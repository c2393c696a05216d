//! Heap objects and object arrays.
//!
//! Both are shared by reference (`Arc`) and mutated in place behind a
//! `parking_lot::RwLock`, so a concurrent write can race another write but
//! never tear a slot.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Slot, StructValue, Value};
use crate::types::TypeRef;

/// Shared reference to a heap object.
pub type ObjectRef = Arc<Object>;

/// A class instance or a boxed struct.
pub struct Object {
    ty: TypeRef,
    fields: RwLock<Vec<Slot>>,
}

impl Object {
    /// Allocate an instance of `ty` with every field at its default value.
    pub fn alloc(ty: TypeRef) -> ObjectRef {
        let fields = ty
            .instance_layout()
            .iter()
            .map(|t| t.default_slot())
            .collect();
        Arc::new(Object {
            ty,
            fields: RwLock::new(fields),
        })
    }

    /// Box a struct value.
    pub fn from_struct(value: StructValue) -> ObjectRef {
        let ty = value.ty();
        Arc::new(Object {
            ty,
            fields: RwLock::new(value.into_fields()),
        })
    }

    /// Runtime type of the instance.
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    /// Copy of the slot at `index`.
    pub fn load(&self, index: usize) -> Option<Slot> {
        self.fields.read().get(index).cloned()
    }

    /// Overwrite the slot at `index`. Returns `false` if out of range.
    pub fn store(&self, index: usize, value: Slot) -> bool {
        match self.fields.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Copy the fields out as an unboxed struct of the object's type.
    pub fn to_struct(&self) -> StructValue {
        StructValue::from_parts(self.ty, self.fields.read().clone())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.ty.name())
            .field("fields", &*self.fields.read())
            .finish()
    }
}

/// Shared, mutable array of boxed values.
#[derive(Clone, Default)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

impl ArrayRef {
    pub fn new(items: Vec<Value>) -> Self {
        ArrayRef(Arc::new(RwLock::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Overwrite the element at `index`. Returns `false` if out of range.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.0.write().get_mut(index) {
            Some(item) => {
                *item = value;
                true
            }
            None => false,
        }
    }

    /// Copy of the current contents.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.read().iter()).finish()
    }
}
