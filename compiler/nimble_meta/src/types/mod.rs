//! Type descriptors.
//!
//! Every type known to the host is a [`TypeInfo`] with `'static` lifetime.
//! Built-in types are plain `static`s in [`builtins`]; user types are
//! created by [`TypeBuilder`](crate::TypeBuilder), which leaks the
//! descriptor so that members can refer back to their declaring type.
//! Identity is pointer identity: two descriptors are the same type only
//! if they are the same allocation.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;
use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::members::{CtorRef, FieldRef, MethodRef, PropertyRef};
use crate::value::{Slot, StructValue};

/// Reference to a type descriptor owned by the host.
pub type TypeRef = &'static TypeInfo;

/// Primitive value types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int32,
    Int64,
    Float64,
    Char,
}

impl Primitive {
    /// The zero value of this primitive.
    pub fn default_slot(self) -> Slot {
        match self {
            Primitive::Bool => Slot::Bool(false),
            Primitive::Int32 => Slot::Int32(0),
            Primitive::Int64 => Slot::Int64(0),
            Primitive::Float64 => Slot::Float64(0.0),
            Primitive::Char => Slot::Char('\0'),
        }
    }
}

/// What kind of type a descriptor describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// The absence of a value (method return type only).
    Void,
    /// Built-in value type.
    Primitive(Primitive),
    /// Built-in immutable string (reference type).
    String,
    /// Built-in array of boxed values (reference type).
    Array,
    /// Root of every reference type.
    Object,
    /// User-defined value type, copied on load and boxed on escape.
    Struct,
    /// User-defined reference type.
    Class,
}

/// Built-in type descriptors.
pub mod builtins {
    use super::{Primitive, TypeInfo, TypeKind};

    pub static VOID: TypeInfo = TypeInfo::builtin("Void", TypeKind::Void);
    pub static BOOL: TypeInfo = TypeInfo::builtin("Boolean", TypeKind::Primitive(Primitive::Bool));
    pub static INT32: TypeInfo = TypeInfo::builtin("Int32", TypeKind::Primitive(Primitive::Int32));
    pub static INT64: TypeInfo = TypeInfo::builtin("Int64", TypeKind::Primitive(Primitive::Int64));
    pub static FLOAT64: TypeInfo =
        TypeInfo::builtin("Double", TypeKind::Primitive(Primitive::Float64));
    pub static CHAR: TypeInfo = TypeInfo::builtin("Char", TypeKind::Primitive(Primitive::Char));
    pub static STRING: TypeInfo = TypeInfo::builtin("String", TypeKind::String);
    pub static ARRAY: TypeInfo = TypeInfo::builtin("Object[]", TypeKind::Array);
    pub static OBJECT: TypeInfo = TypeInfo::builtin("Object", TypeKind::Object);
}

/// Member tables installed once by [`TypeBuilder::finish`](crate::TypeBuilder::finish).
pub(crate) struct Members {
    pub(crate) fields: Vec<FieldRef>,
    pub(crate) constructors: Vec<CtorRef>,
    pub(crate) methods: Vec<MethodRef>,
    pub(crate) properties: Vec<PropertyRef>,
    /// Types of every instance slot, base-class slots first.
    pub(crate) layout: Vec<TypeRef>,
    pub(crate) field_index: FxHashMap<String, usize>,
    pub(crate) method_index: FxHashMap<String, Vec<usize>>,
    pub(crate) property_index: FxHashMap<String, usize>,
}

/// Descriptor of one type.
pub struct TypeInfo {
    name: Cow<'static, str>,
    kind: TypeKind,
    base: Option<TypeRef>,
    members: OnceLock<Members>,
}

impl TypeInfo {
    const fn builtin(name: &'static str, kind: TypeKind) -> Self {
        TypeInfo {
            name: Cow::Borrowed(name),
            kind,
            base: None,
            members: OnceLock::new(),
        }
    }

    pub(crate) fn user(name: Cow<'static, str>, kind: TypeKind, base: Option<TypeRef>) -> Self {
        TypeInfo {
            name,
            kind,
            base,
            members: OnceLock::new(),
        }
    }

    /// Install the member tables. Returns `false` if they were already set.
    pub(crate) fn install(&self, members: Members) -> bool {
        self.members.set(members).is_ok()
    }

    /// Whether the member tables have been installed.
    pub fn is_finished(&self) -> bool {
        self.members.get().is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Direct base type, if any. Built-in types report none.
    pub fn base(&self) -> Option<TypeRef> {
        self.base
    }

    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Void
    }

    /// Value types are copied by value and must be boxed to become an `object`.
    pub fn is_value_type(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_) | TypeKind::Struct)
    }

    pub fn is_reference_type(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::String | TypeKind::Array | TypeKind::Object | TypeKind::Class
        )
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Whether a value of runtime type `other` may be viewed as `self`.
    ///
    /// `Object` accepts every non-void type (boxed values included);
    /// otherwise `other` must be `self` or derive from it.
    pub fn is_assignable_from(&self, other: &TypeInfo) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        if self.kind == TypeKind::Object {
            return !other.is_void();
        }
        let mut current = other.base;
        while let Some(ty) = current {
            if ptr::eq(self, ty) {
                return true;
            }
            current = ty.base;
        }
        false
    }

    /// The value a fresh local, field or argument of this type holds.
    pub fn default_slot(&'static self) -> Slot {
        match self.kind {
            TypeKind::Primitive(p) => p.default_slot(),
            TypeKind::Struct => Slot::Struct(StructValue::new_default(self)),
            TypeKind::Void
            | TypeKind::String
            | TypeKind::Array
            | TypeKind::Object
            | TypeKind::Class => Slot::NULL,
        }
    }

    /// Types of every instance slot, base-class slots first.
    pub fn instance_layout(&self) -> &[TypeRef] {
        self.members.get().map_or(&[], |m| m.layout.as_slice())
    }

    /// Fields declared on this type (not inherited ones).
    pub fn fields(&self) -> &[FieldRef] {
        self.members.get().map_or(&[], |m| m.fields.as_slice())
    }

    pub fn constructors(&self) -> &[CtorRef] {
        self.members.get().map_or(&[], |m| m.constructors.as_slice())
    }

    /// Methods declared on this type (not inherited ones).
    pub fn methods(&self) -> &[MethodRef] {
        self.members.get().map_or(&[], |m| m.methods.as_slice())
    }

    pub fn properties(&self) -> &[PropertyRef] {
        self.members.get().map_or(&[], |m| m.properties.as_slice())
    }

    /// Find a field by name, searching base types after this one.
    pub fn field(&self, name: &str) -> Option<FieldRef> {
        self.lookup(|m| m.field_index.get(name).map(|&i| m.fields[i]))
    }

    /// Find the first method with this name, searching base types after this one.
    pub fn method(&self, name: &str) -> Option<MethodRef> {
        self.lookup(|m| {
            m.method_index
                .get(name)
                .and_then(|ids| ids.first())
                .map(|&i| m.methods[i])
        })
    }

    /// Find a method by name and exact parameter types.
    pub fn method_with(&self, name: &str, params: &[TypeRef]) -> Option<MethodRef> {
        self.lookup(|m| {
            m.method_index.get(name).and_then(|ids| {
                ids.iter()
                    .map(|&i| m.methods[i])
                    .find(|method| method.has_param_types(params))
            })
        })
    }

    /// Find a property by name, searching base types after this one.
    pub fn property(&self, name: &str) -> Option<PropertyRef> {
        self.lookup(|m| m.property_index.get(name).map(|&i| m.properties[i]))
    }

    /// Find a constructor declared on this type with exact parameter types.
    pub fn constructor(&self, params: &[TypeRef]) -> Option<CtorRef> {
        self.constructors()
            .iter()
            .copied()
            .find(|ctor| ctor.has_param_types(params))
    }

    fn lookup<T>(&self, find: impl Fn(&Members) -> Option<T>) -> Option<T> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(found) = ty.members.get().and_then(&find) {
                return Some(found);
            }
            current = ty.base;
        }
        None
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self, state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInfo({})", self.name)
    }
}
