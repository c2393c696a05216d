use nimble_meta::{CtorRef, FromValue, InvokeError, TypeRef, Value};
use nimble_thunk::{
    compile_constructor, member_not_found, no_public_constructor, CompileError, ConstructorThunk,
    MemberKind,
};

use crate::{check_arity, signature_name};

/// Creates instances of one type through a compiled constructor.
#[derive(Debug)]
pub struct ConstructorProxy {
    thunk: ConstructorThunk,
}

impl ConstructorProxy {
    /// Use the public parameterless constructor of `ty`.
    pub fn new(ty: TypeRef) -> Result<Self, CompileError> {
        let ctor = ty
            .constructor(&[])
            .filter(|ctor| ctor.is_public())
            .ok_or_else(|| no_public_constructor(ty))?;
        Self::from_constructor(ctor)
    }

    /// Use the constructor of `ty` taking exactly `params`, public or not.
    pub fn with_params(ty: TypeRef, params: &[TypeRef]) -> Result<Self, CompileError> {
        let ctor = ty.constructor(params).ok_or_else(|| {
            member_not_found(ty, MemberKind::Constructor, signature_name(".ctor", params))
        })?;
        Self::from_constructor(ctor)
    }

    pub fn from_constructor(ctor: CtorRef) -> Result<Self, CompileError> {
        Ok(ConstructorProxy {
            thunk: compile_constructor(ctor)?,
        })
    }

    pub fn constructor(&self) -> CtorRef {
        self.thunk.constructor()
    }

    pub fn declaring_type(&self) -> TypeRef {
        self.constructor().declaring_type()
    }

    /// Create an instance. Value types come back boxed.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, InvokeError> {
        let ctor = self.constructor();
        check_arity(ctor, ctor.params().len(), args.len())?;
        self.thunk.invoke(args)
    }

    pub fn invoke_as<T: FromValue>(&self, args: &[Value]) -> Result<T, InvokeError> {
        T::from_value(self.invoke(args)?)
    }
}
