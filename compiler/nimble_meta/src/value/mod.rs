//! Runtime values.
//!
//! Two representations coexist, mirroring a managed runtime:
//!
//! - [`Value`] is a boxed `object`: what crosses the uniform calling
//!   convention. Value types appear here only in boxed form.
//! - [`Slot`] is an unboxed, typed cell: evaluation-stack entries, locals,
//!   instance fields and static fields. Structs live here by value.
//!
//! Boxing and unboxing between the two is done by [`crate::coerce`].

mod convert;
mod object;

use std::fmt;
use std::sync::Arc;

use crate::errors::{invalid_cast, null_reference, InvokeError};
use crate::types::{builtins, Primitive, TypeKind, TypeRef};

pub use convert::FromValue;
pub use object::{ArrayRef, Object, ObjectRef};

// Value

/// A boxed value: the `object` of the calling convention.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Char(char),
    Str(Arc<str>),
    Array(ArrayRef),
    /// A class instance or a boxed struct.
    Object(ObjectRef),
}

impl Value {
    /// Create a string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Create a new object array holding `items`.
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(ArrayRef::new(items))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The runtime type of the value, or `None` for null.
    pub fn runtime_type(&self) -> Option<TypeRef> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(&builtins::BOOL),
            Value::Int32(_) => Some(&builtins::INT32),
            Value::Int64(_) => Some(&builtins::INT64),
            Value::Float64(_) => Some(&builtins::FLOAT64),
            Value::Char(_) => Some(&builtins::CHAR),
            Value::Str(_) => Some(&builtins::STRING),
            Value::Array(_) => Some(&builtins::ARRAY),
            Value::Object(obj) => Some(obj.ty()),
        }
    }

    /// Name of the runtime type, `"null"` for null. Used in error messages.
    pub fn type_name(&self) -> &str {
        self.runtime_type().map_or("null", |ty| ty.name())
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Boxed primitives and strings compare by content; objects and arrays by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int32(n) => write!(f, "{n}i32"),
            Value::Int64(n) => write!(f, "{n}i64"),
            Value::Float64(n) => write!(f, "{n:?}f64"),
            Value::Char(c) => write!(f, "{c:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Array(items) => write!(f, "Object[{}]", items.len()),
            Value::Object(obj) => write!(f, "{}{{..}}", obj.ty()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v.into())
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl From<ArrayRef> for Value {
    fn from(v: ArrayRef) -> Self {
        Value::Array(v)
    }
}

// StructValue

/// An unboxed struct: its type plus field slots in layout order.
#[derive(Clone, Debug, PartialEq)]
pub struct StructValue {
    ty: TypeRef,
    fields: Vec<Slot>,
}

impl StructValue {
    /// A struct with every field at its default value.
    pub fn new_default(ty: TypeRef) -> Self {
        StructValue {
            ty,
            fields: ty.instance_layout().iter().map(|t| t.default_slot()).collect(),
        }
    }

    pub(crate) fn from_parts(ty: TypeRef, fields: Vec<Slot>) -> Self {
        StructValue { ty, fields }
    }

    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn fields(&self) -> &[Slot] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Slot> {
        self.fields.get(index)
    }

    pub(crate) fn into_fields(self) -> Vec<Slot> {
        self.fields
    }
}

// Slot

/// An unboxed, typed cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Char(char),
    Struct(StructValue),
    /// Any reference, including null and boxed values.
    Ref(Value),
}

impl Slot {
    /// The null reference.
    pub const NULL: Slot = Slot::Ref(Value::Null);

    /// Short description of what the slot holds, for error messages.
    pub fn kind_name(&self) -> &str {
        match self {
            Slot::Bool(_) => builtins::BOOL.name(),
            Slot::Int32(_) => builtins::INT32.name(),
            Slot::Int64(_) => builtins::INT64.name(),
            Slot::Float64(_) => builtins::FLOAT64.name(),
            Slot::Char(_) => builtins::CHAR.name(),
            Slot::Struct(s) => s.ty().name(),
            Slot::Ref(v) => v.type_name(),
        }
    }

    /// Whether the slot may be stored in a location of type `ty`.
    pub fn conforms_to(&self, ty: TypeRef) -> bool {
        match (self, ty.kind()) {
            (Slot::Bool(_), TypeKind::Primitive(p)) => p == Primitive::Bool,
            (Slot::Int32(_), TypeKind::Primitive(p)) => p == Primitive::Int32,
            (Slot::Int64(_), TypeKind::Primitive(p)) => p == Primitive::Int64,
            (Slot::Float64(_), TypeKind::Primitive(p)) => p == Primitive::Float64,
            (Slot::Char(_), TypeKind::Primitive(p)) => p == Primitive::Char,
            (Slot::Struct(s), TypeKind::Struct) => s.ty() == ty,
            (Slot::Ref(v), _) if ty.is_reference_type() => {
                v.runtime_type().map_or(true, |rt| ty.is_assignable_from(rt))
            }
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Result<bool, InvokeError> {
        match self {
            Slot::Bool(v) => Ok(*v),
            other => Err(invalid_cast(&builtins::BOOL, other.kind_name())),
        }
    }

    pub fn as_i32(&self) -> Result<i32, InvokeError> {
        match self {
            Slot::Int32(v) => Ok(*v),
            other => Err(invalid_cast(&builtins::INT32, other.kind_name())),
        }
    }

    pub fn as_i64(&self) -> Result<i64, InvokeError> {
        match self {
            Slot::Int64(v) => Ok(*v),
            other => Err(invalid_cast(&builtins::INT64, other.kind_name())),
        }
    }

    pub fn as_f64(&self) -> Result<f64, InvokeError> {
        match self {
            Slot::Float64(v) => Ok(*v),
            other => Err(invalid_cast(&builtins::FLOAT64, other.kind_name())),
        }
    }

    pub fn as_char(&self) -> Result<char, InvokeError> {
        match self {
            Slot::Char(v) => Ok(*v),
            other => Err(invalid_cast(&builtins::CHAR, other.kind_name())),
        }
    }

    /// The referenced value, null included.
    pub fn as_value(&self) -> Result<&Value, InvokeError> {
        match self {
            Slot::Ref(v) => Ok(v),
            other => Err(invalid_cast(&builtins::OBJECT, other.kind_name())),
        }
    }

    /// The referenced string; null is an error.
    pub fn as_str(&self) -> Result<&Arc<str>, InvokeError> {
        match self.as_value()? {
            Value::Str(s) => Ok(s),
            Value::Null => Err(null_reference("expected a string")),
            other => Err(invalid_cast(&builtins::STRING, other.type_name())),
        }
    }

    /// The referenced object; null is an error.
    pub fn as_object(&self) -> Result<&ObjectRef, InvokeError> {
        match self.as_value()? {
            Value::Object(obj) => Ok(obj),
            Value::Null => Err(null_reference("expected an object")),
            other => Err(invalid_cast(&builtins::OBJECT, other.type_name())),
        }
    }

    /// The referenced array; null is an error.
    pub fn as_array(&self) -> Result<&ArrayRef, InvokeError> {
        match self.as_value()? {
            Value::Array(items) => Ok(items),
            Value::Null => Err(null_reference("expected an array")),
            other => Err(invalid_cast(&builtins::ARRAY, other.type_name())),
        }
    }
}

impl From<Value> for Slot {
    fn from(v: Value) -> Self {
        Slot::Ref(v)
    }
}

#[cfg(test)]
mod tests;
