//! Constructor thunks: `(object[] args) -> object`.
//!
//! Emitted shape for `T(p1, .., pn)`:
//!
//! ```text
//! .locals (T, P1, .., Pn)
//! for i in 1..=n:  ldarg.0; ldc.i4 i-1; ldelem.ref; coerce Pi; stloc i
//! ldloc 1 .. ldloc n
//! newobj T::.ctor
//! stloc.0; ldloc.0
//! box T                      // value types only
//! ret
//! ```

use nimble_emit::{CompiledBody, ThunkArg};
use nimble_meta::{invalid_program, CtorRef, InvokeError, Value};

use crate::errors::CompileError;
use crate::kind::{checked_params, ThunkKind};

/// A compiled constructor.
#[derive(Debug)]
pub struct ConstructorThunk {
    ctor: CtorRef,
    body: CompiledBody,
}

impl ConstructorThunk {
    pub fn constructor(&self) -> CtorRef {
        self.ctor
    }

    pub fn body(&self) -> &CompiledBody {
        &self.body
    }

    /// Construct an instance. Value types come back boxed.
    ///
    /// Arguments are read by position; a short array fails with an
    /// index error, extra elements are ignored.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, InvokeError> {
        self.body
            .run(&[ThunkArg::Array(args)])?
            .ok_or_else(|| invalid_program(format!("{} produced no instance", self.ctor)))
    }
}

/// Compile a thunk for `ctor`.
pub fn compile_constructor(ctor: CtorRef) -> Result<ConstructorThunk, CompileError> {
    let params = ctor.params();
    let count = checked_params(ctor, params)?;
    let ty = ctor.declaring_type();

    let mut e = ThunkKind::Constructor.emitter(ctor);
    let mut locals = Vec::with_capacity(params.len() + 1);
    locals.push(ty);
    locals.extend(params.iter().map(|p| p.ty()));
    e.declare_locals(&locals);

    for (i, param) in (0..count).zip(params) {
        e.load_argument(0);
        e.load_constant_int(i32::from(i));
        e.load_element_ref();
        e.coerce(param.ty());
        e.store_local(i + 1);
    }
    for i in 1..=count {
        e.load_local(i);
    }
    e.emit_construct(ctor);
    e.store_local(0);
    e.load_local(0);
    e.box_if_value_type(ty);
    e.ret();

    let body = ThunkKind::Constructor.finish(e, ctor)?;
    Ok(ConstructorThunk { ctor, body })
}
