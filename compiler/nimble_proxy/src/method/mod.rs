use nimble_meta::{FromValue, InvokeError, MethodRef, TypeRef, Value};
use nimble_thunk::{
    compile_method_with, member_not_found, CompileConfig, CompileError, MemberKind, MethodThunk,
};

use crate::{check_arity, signature_name};

/// Calls one method through a compiled thunk.
#[derive(Debug)]
pub struct MethodProxy {
    thunk: MethodThunk,
}

impl MethodProxy {
    pub fn new(method: MethodRef) -> Result<Self, CompileError> {
        Self::with_config(method, CompileConfig::default())
    }

    pub fn with_config(method: MethodRef, config: CompileConfig) -> Result<Self, CompileError> {
        Ok(MethodProxy {
            thunk: compile_method_with(method, config)?,
        })
    }

    /// Look up `name` on `ty` or its bases. The first overload declared wins.
    pub fn find(ty: TypeRef, name: &str) -> Result<Self, CompileError> {
        let method = ty
            .method(name)
            .ok_or_else(|| member_not_found(ty, MemberKind::Method, name))?;
        Self::new(method)
    }

    /// Look up the overload of `name` taking exactly `params`.
    pub fn find_with(ty: TypeRef, name: &str, params: &[TypeRef]) -> Result<Self, CompileError> {
        let method = ty.method_with(name, params).ok_or_else(|| {
            member_not_found(ty, MemberKind::Method, signature_name(name, params))
        })?;
        Self::new(method)
    }

    pub fn method(&self) -> MethodRef {
        self.thunk.method()
    }

    /// Call on `instance`. Static methods ignore it; void methods return null.
    pub fn invoke(&self, instance: &Value, args: &[Value]) -> Result<Value, InvokeError> {
        let method = self.method();
        check_arity(method, method.params().len(), args.len())?;
        self.thunk.invoke(instance, args)
    }

    pub fn invoke_as<T: FromValue>(
        &self,
        instance: &Value,
        args: &[Value],
    ) -> Result<T, InvokeError> {
        T::from_value(self.invoke(instance, args)?)
    }

    /// Call with a null receiver.
    pub fn invoke_static(&self, args: &[Value]) -> Result<Value, InvokeError> {
        self.invoke(&Value::Null, args)
    }
}
