//! Method thunks: `(object instance, object[] args) -> object`.
//!
//! Arguments are unpacked into typed locals before the receiver is pushed,
//! so every coercion failure is raised before the call is made.
//!
//! ```text
//! .locals (P1, .., Pn)
//! for i in 0..n:  ldarg.1; ldc.i4 i; ldelem.ref; coerce Pi; stloc i
//! ldarg.0; castclass T       // instance methods only
//! ldloc 0 .. ldloc n-1
//! call / callvirt T::M
//! ldnull                     // void methods
//! box R                      // value-type returns
//! ret
//! ```

use nimble_emit::{CompiledBody, ThunkArg};
use nimble_meta::{invalid_program, InvokeError, MethodRef, Value};

use crate::config::CompileConfig;
use crate::errors::CompileError;
use crate::kind::{checked_params, ThunkKind};

/// A compiled method.
#[derive(Debug)]
pub struct MethodThunk {
    method: MethodRef,
    body: CompiledBody,
}

impl MethodThunk {
    pub fn method(&self) -> MethodRef {
        self.method
    }

    pub fn body(&self) -> &CompiledBody {
        &self.body
    }

    /// Call the method on `instance` with `args`.
    ///
    /// Static methods ignore `instance`. Void methods return null.
    pub fn invoke(&self, instance: &Value, args: &[Value]) -> Result<Value, InvokeError> {
        self.body
            .run(&[ThunkArg::Value(instance), ThunkArg::Array(args)])?
            .ok_or_else(|| invalid_program(format!("{} produced no result", self.method)))
    }
}

/// Compile a thunk for `method` with the default configuration.
pub fn compile_method(method: MethodRef) -> Result<MethodThunk, CompileError> {
    compile_method_with(method, CompileConfig::default())
}

pub fn compile_method_with(
    method: MethodRef,
    config: CompileConfig,
) -> Result<MethodThunk, CompileError> {
    let params = method.params();
    let count = checked_params(method, params)?;

    let mut e = ThunkKind::Method.emitter(method);
    let locals: Vec<_> = params.iter().map(|p| p.ty()).collect();
    e.declare_locals(&locals);

    for (i, param) in (0..count).zip(params) {
        e.load_argument(1);
        e.load_constant_int(i32::from(i));
        e.load_element_ref();
        e.coerce(param.ty());
        e.store_local(i);
    }
    if !method.is_static() {
        e.load_argument(0);
        if config.casts_receiver() {
            e.cast_class(method.declaring_type());
        }
    }
    for i in 0..count {
        e.load_local(i);
    }
    e.emit_call(method);

    let ret = method.return_type();
    if ret.is_void() {
        e.load_null();
    } else {
        e.box_if_value_type(ret);
    }
    e.ret();

    let body = ThunkKind::Method.finish(e, method)?;
    Ok(MethodThunk { method, body })
}

#[cfg(test)]
mod tests;
