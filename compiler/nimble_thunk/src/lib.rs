//! Thunk compilers for Nimble.
//!
//! Each compiler takes a member descriptor and produces a callable with a
//! uniform boxed calling convention, so callers can invoke members whose
//! types are only known at run time without paying for reflective
//! validation on every call.
//!
//! | Compiler | Thunk | Call |
//! |---|---|---|
//! | [`compile_constructor`] | [`ConstructorThunk`] | `invoke(args)` |
//! | [`compile_method`] | [`MethodThunk`] | `invoke(instance, args)` |
//! | [`compile_field_getter`] | [`FieldGetter`] | `get(instance)` |
//! | [`compile_field_setter`] | [`FieldSetter`] | `set(instance, value)` |
//!
//! A thunk holds no mutable state. Compile once, share it between threads,
//! and call it as often as needed.

mod config;
mod constructor;
mod errors;
mod field;
mod kind;
mod method;

pub use config::{CompileConfig, ReceiverPolicy};
pub use constructor::{compile_constructor, ConstructorThunk};
pub use errors::{member_not_found, no_public_constructor, CompileError, MemberKind};
pub use field::{
    compile_field_getter, compile_field_getter_with, compile_field_setter,
    compile_field_setter_with, FieldGetter, FieldSetter,
};
pub use kind::ThunkKind;
pub use method::{compile_method, compile_method_with, MethodThunk};
