//! Field accessor thunks.
//!
//! ```text
//! getter (object instance) -> object     setter (object instance, object value) -> void
//! .locals (F)
//! ldarg.0                                ldarg.0
//! castclass T      // instance, checked  castclass T      // instance, checked
//! ldfld F T::f                           ldarg.1
//! stloc.0; ldloc.0                       coerce F
//! box F            // value types        stfld F T::f
//! ret                                    ret
//! ```
//!
//! Static fields still load the instance argument; `ldfld`/`stfld` discard
//! it, so the instance is ignored.

use nimble_emit::{CompiledBody, Emitter, ThunkArg};
use nimble_meta::{invalid_program, FieldRef, InvokeError, Value};

use crate::config::CompileConfig;
use crate::errors::CompileError;
use crate::kind::ThunkKind;

/// A compiled field read.
#[derive(Debug)]
pub struct FieldGetter {
    field: FieldRef,
    body: CompiledBody,
}

impl FieldGetter {
    pub fn field(&self) -> FieldRef {
        self.field
    }

    pub fn body(&self) -> &CompiledBody {
        &self.body
    }

    /// Read the field of `instance`, boxed.
    pub fn get(&self, instance: &Value) -> Result<Value, InvokeError> {
        self.body
            .run(&[ThunkArg::Value(instance)])?
            .ok_or_else(|| invalid_program(format!("{} produced no value", self.field)))
    }
}

/// A compiled field write.
#[derive(Debug)]
pub struct FieldSetter {
    field: FieldRef,
    body: CompiledBody,
}

impl FieldSetter {
    pub fn field(&self) -> FieldRef {
        self.field
    }

    pub fn body(&self) -> &CompiledBody {
        &self.body
    }

    /// Coerce `value` to the field type and store it into `instance`.
    pub fn set(&self, instance: &Value, value: &Value) -> Result<(), InvokeError> {
        self.body
            .run(&[ThunkArg::Value(instance), ThunkArg::Value(value)])
            .map(drop)
    }
}

pub fn compile_field_getter(field: FieldRef) -> Result<FieldGetter, CompileError> {
    compile_field_getter_with(field, CompileConfig::default())
}

pub fn compile_field_getter_with(
    field: FieldRef,
    config: CompileConfig,
) -> Result<FieldGetter, CompileError> {
    let ty = field.field_type();
    let mut e = ThunkKind::FieldGetter.emitter(field);
    e.declare_locals(&[ty]);
    load_receiver(&mut e, field, config);
    e.load_field(field);
    e.store_local(0);
    e.load_local(0);
    e.box_if_value_type(ty);
    e.ret();

    let body = ThunkKind::FieldGetter.finish(e, field)?;
    Ok(FieldGetter { field, body })
}

pub fn compile_field_setter(field: FieldRef) -> Result<FieldSetter, CompileError> {
    compile_field_setter_with(field, CompileConfig::default())
}

pub fn compile_field_setter_with(
    field: FieldRef,
    config: CompileConfig,
) -> Result<FieldSetter, CompileError> {
    let mut e = ThunkKind::FieldSetter.emitter(field);
    load_receiver(&mut e, field, config);
    e.load_argument(1);
    e.coerce(field.field_type());
    e.store_field(field);
    e.ret();

    let body = ThunkKind::FieldSetter.finish(e, field)?;
    Ok(FieldSetter { field, body })
}

fn load_receiver(e: &mut Emitter, field: FieldRef, config: CompileConfig) {
    e.load_argument(0);
    if !field.is_static() && config.casts_receiver() {
        e.cast_class(field.declaring_type());
    }
}
