//! Runtime metadata for Nimble.
//!
//! This crate is the host facility the thunk compilers build on:
//!
//! - **Type descriptors** ([`TypeInfo`], [`builtins`]): value vs reference
//!   kind, base chain, member tables.
//! - **Member descriptors** ([`FieldInfo`], [`MethodInfo`],
//!   [`ConstructorInfo`], [`PropertyInfo`]): signatures plus native bodies.
//! - **Values** ([`Value`], [`Slot`], [`Object`]): the boxed `object` of the
//!   calling convention and the unboxed cells thunks operate on.
//! - **Coercion** ([`coerce`]): boxing, unboxing and checked casts.
//! - **Reflective invocation**: `invoke` / `get_value` / `set_value` on the
//!   descriptors; the validating slow path thunks replace.
//!
//! Types are defined through [`TypeBuilder`]:
//!
//! ```text
//! let mut b = TypeBuilder::class("Counter");
//! let count = b.field("count", &builtins::INT32, MemberFlags::PUBLIC);
//! b.constructor(vec![], MemberFlags::PUBLIC, |_| Ok(()));
//! let counter = b.finish()?;
//! ```

mod builder;
pub mod coerce;
mod errors;
mod members;
mod types;
mod value;

#[cfg(test)]
mod test_helpers;

pub use builder::TypeBuilder;
pub use errors::{
    index_out_of_range, invalid_cast, invalid_program, missing_accessor, native, null_reference,
    wrong_arg_count, Accessor, DefineError, InvokeError,
};
pub use members::{
    ConstructorInfo, CtorBody, CtorRef, FieldInfo, FieldRef, Frame, MemberFlags, MethodBody,
    MethodInfo, MethodRef, ParamInfo, PropertyInfo, PropertyRef,
};
pub use types::{builtins, Primitive, TypeInfo, TypeKind, TypeRef};
pub use value::{ArrayRef, FromValue, Object, ObjectRef, Slot, StructValue, Value};
