//! Member descriptors: fields, parameters, methods, constructors, properties.
//!
//! Descriptors are created by [`TypeBuilder`](crate::TypeBuilder) and live
//! for the rest of the process (`&'static`). They carry the raw,
//! already-typed access paths (`load_from`, `store_into`, `call`,
//! `construct`) that compiled thunks use; the validating reflective entry
//! points are in `reflect.rs`.

mod reflect;

use std::borrow::Cow;
use std::fmt;
use std::ptr;
use std::sync::{Arc, OnceLock};

use bitflags::bitflags;
use parking_lot::RwLock;

use crate::errors::{
    index_out_of_range, invalid_cast, invalid_program, null_reference, wrong_arg_count,
    InvokeError,
};
use crate::types::TypeRef;
use crate::value::{Object, ObjectRef, Slot, StructValue, Value};

pub type FieldRef = &'static FieldInfo;
pub type MethodRef = &'static MethodInfo;
pub type CtorRef = &'static ConstructorInfo;
pub type PropertyRef = &'static PropertyInfo;

bitflags! {
    /// Member attributes.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct MemberFlags: u8 {
        /// Visible to callers outside the declaring type.
        const PUBLIC = 1 << 0;
        /// Belongs to the type rather than an instance.
        const STATIC = 1 << 1;
        /// Instance method resolved against the receiver's runtime type.
        const VIRTUAL = 1 << 2;
    }
}

/// Native implementation of a method.
pub type MethodBody = Box<dyn Fn(&Frame<'_>) -> Result<Slot, InvokeError> + Send + Sync>;

/// Native initializer run on a freshly allocated instance.
pub type CtorBody = Box<dyn Fn(&Frame<'_>) -> Result<(), InvokeError> + Send + Sync>;

// Frame

/// Receiver and typed arguments handed to a native member body.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    this: &'a Value,
    args: &'a [Slot],
}

impl<'a> Frame<'a> {
    pub fn new(this: &'a Value, args: &'a [Slot]) -> Self {
        Frame { this, args }
    }

    /// The receiver; null for static members.
    pub fn this(&self) -> &'a Value {
        self.this
    }

    pub fn this_object(&self) -> Result<&'a ObjectRef, InvokeError> {
        match self.this {
            Value::Object(obj) => Ok(obj),
            Value::Null => Err(null_reference("member body requires an instance")),
            other => Err(invalid_cast("an object instance", other.type_name())),
        }
    }

    pub fn args(&self) -> &'a [Slot] {
        self.args
    }

    pub fn arg(&self, index: usize) -> Result<&'a Slot, InvokeError> {
        self.args.get(index).ok_or_else(|| {
            index_out_of_range(i64::try_from(index).unwrap_or(i64::MAX), self.args.len())
        })
    }
}

// ParamInfo

/// A declared parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamInfo {
    name: Cow<'static, str>,
    ty: TypeRef,
    by_ref: bool,
}

impl ParamInfo {
    pub fn new(name: impl Into<Cow<'static, str>>, ty: TypeRef) -> Self {
        ParamInfo {
            name: name.into(),
            ty,
            by_ref: false,
        }
    }

    /// A pass-by-reference parameter. Thunk compilers reject these.
    pub fn by_ref(name: impl Into<Cow<'static, str>>, ty: TypeRef) -> Self {
        ParamInfo {
            name: name.into(),
            ty,
            by_ref: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn is_by_ref(&self) -> bool {
        self.by_ref
    }
}

fn same_param_types(params: &[ParamInfo], types: &[TypeRef]) -> bool {
    params.len() == types.len() && params.iter().zip(types).all(|(p, &t)| ptr::eq(p.ty, t))
}

// FieldInfo

pub(crate) enum FieldStorage {
    /// Index into the instance slot vector.
    Instance(usize),
    /// Filled with the field type's default on first access, once every
    /// type the field can name has its final layout.
    Static(OnceLock<RwLock<Slot>>),
}

/// A field descriptor.
pub struct FieldInfo {
    pub(crate) name: String,
    pub(crate) declaring: TypeRef,
    pub(crate) ty: TypeRef,
    pub(crate) flags: MemberFlags,
    pub(crate) storage: FieldStorage,
}

impl FieldInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> TypeRef {
        self.declaring
    }

    pub fn field_type(&self) -> TypeRef {
        self.ty
    }

    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    pub fn is_public(&self) -> bool {
        self.flags.contains(MemberFlags::PUBLIC)
    }

    /// Slot index of an instance field; `None` for static fields.
    pub fn slot_index(&self) -> Option<usize> {
        match self.storage {
            FieldStorage::Instance(index) => Some(index),
            FieldStorage::Static(_) => None,
        }
    }

    /// Read the field. Static fields ignore `receiver`.
    pub fn load_from(&self, receiver: &Value) -> Result<Slot, InvokeError> {
        match &self.storage {
            FieldStorage::Static(cell) => Ok(self.static_cell(cell).read().clone()),
            FieldStorage::Instance(index) => self
                .receiver_object(receiver)?
                .load(*index)
                .ok_or_else(|| invalid_program(format!("slot {index} missing for field {self}"))),
        }
    }

    /// Read the field out of an unboxed struct, as `ldfld` does after
    /// `unbox.any`.
    pub fn load_from_struct(&self, value: &StructValue) -> Result<Slot, InvokeError> {
        match &self.storage {
            FieldStorage::Static(cell) => Ok(self.static_cell(cell).read().clone()),
            FieldStorage::Instance(index) => {
                if value.ty() != self.declaring {
                    return Err(invalid_cast(self.declaring, value.ty()));
                }
                value.field(*index).cloned().ok_or_else(|| {
                    invalid_program(format!("slot {index} missing for field {self}"))
                })
            }
        }
    }

    /// Write the field. Static fields ignore `receiver`.
    ///
    /// `value` must already have the field's type; no conversion happens here.
    pub fn store_into(&self, receiver: &Value, value: Slot) -> Result<(), InvokeError> {
        if !value.conforms_to(self.ty) {
            return Err(invalid_cast(self.ty, value.kind_name()));
        }
        match &self.storage {
            FieldStorage::Static(cell) => {
                *self.static_cell(cell).write() = value;
                Ok(())
            }
            FieldStorage::Instance(index) => {
                if self.receiver_object(receiver)?.store(*index, value) {
                    Ok(())
                } else {
                    Err(invalid_program(format!("slot {index} missing for field {self}")))
                }
            }
        }
    }

    fn static_cell<'c>(&self, cell: &'c OnceLock<RwLock<Slot>>) -> &'c RwLock<Slot> {
        cell.get_or_init(|| RwLock::new(self.ty.default_slot()))
    }

    fn receiver_object<'v>(&self, receiver: &'v Value) -> Result<&'v ObjectRef, InvokeError> {
        match receiver {
            Value::Object(obj) if self.declaring.is_assignable_from(obj.ty()) => Ok(obj),
            Value::Null => Err(null_reference(format_args!("instance for field {self}"))),
            other => Err(invalid_cast(self.declaring, other.type_name())),
        }
    }
}

impl fmt::Display for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring, self.name)
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldInfo({self}: {})", self.ty)
    }
}

impl PartialEq for FieldInfo {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

// MethodInfo

/// A method descriptor.
pub struct MethodInfo {
    pub(crate) name: String,
    pub(crate) declaring: TypeRef,
    pub(crate) params: Vec<ParamInfo>,
    pub(crate) ret: TypeRef,
    pub(crate) flags: MemberFlags,
    pub(crate) body: MethodBody,
}

impl MethodInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> TypeRef {
        self.declaring
    }

    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    /// Return type; `builtins::VOID` when the method returns nothing.
    pub fn return_type(&self) -> TypeRef {
        self.ret
    }

    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    pub fn is_public(&self) -> bool {
        self.flags.contains(MemberFlags::PUBLIC)
    }

    pub fn is_virtual(&self) -> bool {
        self.flags.contains(MemberFlags::VIRTUAL)
    }

    pub fn has_param_types(&self, types: &[TypeRef]) -> bool {
        same_param_types(&self.params, types)
    }

    /// Run this exact method body (no virtual dispatch).
    ///
    /// Instance methods require a non-null receiver; static methods ignore it.
    pub fn call(&self, this: &Value, args: &[Slot]) -> Result<Slot, InvokeError> {
        if args.len() != self.params.len() {
            return Err(wrong_arg_count(self, self.params.len(), args.len()));
        }
        if !self.is_static() && this.is_null() {
            return Err(null_reference(format_args!("receiver of {self}")));
        }
        (self.body)(&Frame::new(this, args))
    }

    /// Call through the receiver's runtime type.
    ///
    /// Non-virtual methods are called directly after the null check.
    pub fn call_virtual(&'static self, this: &Value, args: &[Slot]) -> Result<Slot, InvokeError> {
        let Some(runtime) = this.runtime_type() else {
            return Err(null_reference(format_args!("receiver of {self}")));
        };
        let target = if self.is_virtual() {
            self.resolve_override(runtime)
        } else {
            self
        };
        target.call(this, args)
    }

    /// The most-derived override of this method visible from `runtime`.
    pub fn resolve_override(&'static self, runtime: TypeRef) -> MethodRef {
        let mut current = Some(runtime);
        while let Some(ty) = current {
            if ptr::eq(ty, self.declaring) {
                break;
            }
            if let Some(found) = ty.methods().iter().copied().find(|m| m.overrides(self)) {
                return found;
            }
            current = ty.base();
        }
        self
    }

    fn overrides(&self, base: &MethodInfo) -> bool {
        self.is_virtual()
            && !self.is_static()
            && self.name == base.name
            && ptr::eq(self.ret, base.ret)
            && base.params.len() == self.params.len()
            && base
                .params
                .iter()
                .zip(&self.params)
                .all(|(a, b)| ptr::eq(a.ty, b.ty))
    }
}

impl fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring, self.name)
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodInfo({self}(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if param.by_ref {
                f.write_str("ref ")?;
            }
            write!(f, "{}", param.ty)?;
        }
        write!(f, ") -> {})", self.ret)
    }
}

impl PartialEq for MethodInfo {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

// ConstructorInfo

/// A constructor descriptor.
pub struct ConstructorInfo {
    pub(crate) declaring: TypeRef,
    pub(crate) params: Vec<ParamInfo>,
    pub(crate) flags: MemberFlags,
    pub(crate) init: CtorBody,
}

impl ConstructorInfo {
    pub fn declaring_type(&self) -> TypeRef {
        self.declaring
    }

    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    pub fn is_public(&self) -> bool {
        self.flags.contains(MemberFlags::PUBLIC)
    }

    pub fn has_param_types(&self, types: &[TypeRef]) -> bool {
        same_param_types(&self.params, types)
    }

    /// Allocate and initialise a new instance.
    ///
    /// Value types come back unboxed as [`Slot::Struct`], reference types as
    /// [`Slot::Ref`].
    pub fn construct(&self, args: &[Slot]) -> Result<Slot, InvokeError> {
        if args.len() != self.params.len() {
            return Err(wrong_arg_count(self, self.params.len(), args.len()));
        }
        let obj = Object::alloc(self.declaring);
        let this = Value::Object(Arc::clone(&obj));
        (self.init)(&Frame::new(&this, args))?;
        if self.declaring.is_value_type() {
            Ok(Slot::Struct(obj.to_struct()))
        } else {
            Ok(Slot::Ref(this))
        }
    }
}

impl fmt::Display for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::.ctor", self.declaring)
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstructorInfo({self}/{})", self.params.len())
    }
}

impl PartialEq for ConstructorInfo {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

// PropertyInfo

/// A property: a pair of optional accessor methods, possibly indexed.
pub struct PropertyInfo {
    pub(crate) name: String,
    pub(crate) declaring: TypeRef,
    pub(crate) ty: TypeRef,
    pub(crate) index_params: Vec<ParamInfo>,
    pub(crate) getter: Option<MethodRef>,
    pub(crate) setter: Option<MethodRef>,
}

impl PropertyInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> TypeRef {
        self.declaring
    }

    pub fn property_type(&self) -> TypeRef {
        self.ty
    }

    /// Index parameters; empty for a plain property.
    pub fn index_params(&self) -> &[ParamInfo] {
        &self.index_params
    }

    pub fn getter(&self) -> Option<MethodRef> {
        self.getter
    }

    pub fn setter(&self) -> Option<MethodRef> {
        self.setter
    }

    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }
}

impl fmt::Display for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring, self.name)
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyInfo({self}: {})", self.ty)
    }
}

impl PartialEq for PropertyInfo {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}
