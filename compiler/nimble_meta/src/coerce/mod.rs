//! Boxing, unboxing and reference casts.
//!
//! These three functions are the whole conversion vocabulary between
//! [`Value`] and [`Slot`]. Conversions are exact: a boxed `Int64` never
//! unboxes as `Int32`, and a boxed struct only unboxes as its own type.

use crate::errors::{invalid_cast, null_reference, InvokeError};
use crate::types::{Primitive, TypeKind, TypeRef};
use crate::value::{Object, Slot, Value};

/// Take a boxed value to the unboxed form of `ty`.
///
/// Value types unbox (null is a null-reference error); reference types
/// behave like [`cast_class`].
pub fn unbox_any(value: &Value, ty: TypeRef) -> Result<Slot, InvokeError> {
    match ty.kind() {
        TypeKind::Primitive(p) => match (p, value) {
            (Primitive::Bool, Value::Bool(v)) => Ok(Slot::Bool(*v)),
            (Primitive::Int32, Value::Int32(v)) => Ok(Slot::Int32(*v)),
            (Primitive::Int64, Value::Int64(v)) => Ok(Slot::Int64(*v)),
            (Primitive::Float64, Value::Float64(v)) => Ok(Slot::Float64(*v)),
            (Primitive::Char, Value::Char(v)) => Ok(Slot::Char(*v)),
            (_, Value::Null) => Err(null_reference(format_args!("cannot unbox null as {ty}"))),
            (_, other) => Err(invalid_cast(ty, other.type_name())),
        },
        TypeKind::Struct => match value {
            Value::Object(obj) if obj.ty() == ty => Ok(Slot::Struct(obj.to_struct())),
            Value::Null => Err(null_reference(format_args!("cannot unbox null as {ty}"))),
            other => Err(invalid_cast(ty, other.type_name())),
        },
        TypeKind::Void => Err(invalid_cast(ty, value.type_name())),
        TypeKind::String | TypeKind::Array | TypeKind::Object | TypeKind::Class => {
            cast_class(value, ty).map(Slot::Ref)
        }
    }
}

/// Checked reference cast. Null passes through unchanged.
pub fn cast_class(value: &Value, ty: TypeRef) -> Result<Value, InvokeError> {
    match value.runtime_type() {
        None => Ok(Value::Null),
        Some(runtime) if ty.is_assignable_from(runtime) => Ok(value.clone()),
        Some(runtime) => Err(invalid_cast(ty, runtime)),
    }
}

/// Box an unboxed slot of type `ty`.
///
/// Boxing a reference-typed slot is the identity.
pub fn box_slot(slot: Slot, ty: TypeRef) -> Result<Value, InvokeError> {
    match (ty.kind(), slot) {
        (TypeKind::Primitive(Primitive::Bool), Slot::Bool(v)) => Ok(Value::Bool(v)),
        (TypeKind::Primitive(Primitive::Int32), Slot::Int32(v)) => Ok(Value::Int32(v)),
        (TypeKind::Primitive(Primitive::Int64), Slot::Int64(v)) => Ok(Value::Int64(v)),
        (TypeKind::Primitive(Primitive::Float64), Slot::Float64(v)) => Ok(Value::Float64(v)),
        (TypeKind::Primitive(Primitive::Char), Slot::Char(v)) => Ok(Value::Char(v)),
        (TypeKind::Struct, Slot::Struct(s)) if s.ty() == ty => {
            Ok(Value::Object(Object::from_struct(s)))
        }
        (_, Slot::Ref(v)) if ty.is_reference_type() => Ok(v),
        (_, other) => Err(invalid_cast(ty, other.kind_name())),
    }
}

#[cfg(test)]
mod tests;
