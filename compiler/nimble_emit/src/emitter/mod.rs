//! The instruction emitter used by the thunk compilers.
//!
//! Wraps a [`MethodBuilder`] with operations phrased in terms of what a
//! thunk needs (load argument `i`, coerce to a type, call a method) and
//! picks the encoding for each. Misuse is not reported where it happens:
//! the first defect is remembered and returned by [`Emitter::finalize`],
//! so a compiler never sees a half-built body succeed.

use nimble_meta::{CtorRef, FieldRef, MethodRef, TypeRef};

use crate::builder::{MethodBuilder, ThunkSignature};
use crate::errors::EmitError;
use crate::machine::CompiledBody;
use crate::opcode::Instr;

pub struct Emitter {
    builder: MethodBuilder,
    locals_declared: bool,
    defect: Option<EmitError>,
}

impl Emitter {
    pub fn new(name: impl Into<String>, signature: ThunkSignature) -> Self {
        Emitter {
            builder: MethodBuilder::new(name, signature),
            locals_declared: false,
            defect: None,
        }
    }

    fn record(&mut self, defect: EmitError) {
        if self.defect.is_none() {
            self.defect = Some(defect);
        }
    }

    /// Declare the local slot table, slot `i` having type `types[i]`.
    ///
    /// Allowed once per body.
    pub fn declare_locals(&mut self, types: &[TypeRef]) {
        if self.locals_declared {
            self.record(EmitError::LocalsRedeclared);
            return;
        }
        self.locals_declared = true;
        for &ty in types {
            if let Err(defect) = self.builder.declare_local(ty) {
                self.record(defect);
                return;
            }
        }
    }

    pub fn load_argument(&mut self, index: u16) {
        self.builder.emit(Instr::load_arg(index));
    }

    pub fn load_constant_int(&mut self, value: i32) {
        self.builder.emit(Instr::load_int(value));
    }

    pub fn load_local(&mut self, index: u16) {
        self.builder.emit(Instr::load_local(index));
    }

    pub fn store_local(&mut self, index: u16) {
        self.builder.emit(Instr::store_local(index));
    }

    pub fn load_null(&mut self) {
        self.builder.emit(Instr::LdNull);
    }

    pub fn load_element_ref(&mut self) {
        self.builder.emit(Instr::LdElemRef);
    }

    pub fn load_field(&mut self, field: FieldRef) {
        self.builder.emit(Instr::LdFld(field));
    }

    pub fn store_field(&mut self, field: FieldRef) {
        self.builder.emit(Instr::StFld(field));
    }

    /// Convert the boxed value on top of the stack to `ty`: unbox value
    /// types, cast reference types.
    pub fn coerce(&mut self, ty: TypeRef) {
        if ty.is_value_type() {
            self.builder.emit(Instr::UnboxAny(ty));
        } else {
            self.builder.emit(Instr::CastClass(ty));
        }
    }

    pub fn cast_class(&mut self, ty: TypeRef) {
        self.builder.emit(Instr::CastClass(ty));
    }

    pub fn box_if_value_type(&mut self, ty: TypeRef) {
        if ty.is_value_type() {
            self.builder.emit(Instr::Box(ty));
        }
    }

    /// `call` for static methods, `callvirt` for instance methods.
    pub fn emit_call(&mut self, method: MethodRef) {
        if method.is_static() {
            self.builder.emit(Instr::Call(method));
        } else {
            self.builder.emit(Instr::CallVirt(method));
        }
    }

    pub fn emit_construct(&mut self, ctor: CtorRef) {
        self.builder.emit(Instr::NewObj(ctor));
    }

    pub fn ret(&mut self) {
        self.builder.emit(Instr::Ret);
    }

    /// The body emitted so far.
    pub fn builder(&self) -> &MethodBuilder {
        &self.builder
    }

    /// Report the first recorded defect, or verify and lower the body.
    pub fn finalize(self) -> Result<CompiledBody, EmitError> {
        match self.defect {
            Some(defect) => Err(defect),
            None => self.builder.finalize(),
        }
    }
}
