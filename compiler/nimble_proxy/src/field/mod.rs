use nimble_meta::{FieldRef, FromValue, InvokeError, TypeRef, Value};
use nimble_thunk::{
    compile_field_getter_with, compile_field_setter_with, member_not_found, CompileConfig,
    CompileError, FieldGetter, FieldSetter, MemberKind,
};

/// Reads and writes one field through compiled accessors.
///
/// Both accessors are compiled up front. Any field can be wrapped,
/// whatever its visibility; static fields ignore the instance.
#[derive(Debug)]
pub struct FieldProxy {
    getter: FieldGetter,
    setter: FieldSetter,
}

impl FieldProxy {
    pub fn new(field: FieldRef) -> Result<Self, CompileError> {
        Self::with_config(field, CompileConfig::default())
    }

    pub fn with_config(field: FieldRef, config: CompileConfig) -> Result<Self, CompileError> {
        Ok(FieldProxy {
            getter: compile_field_getter_with(field, config)?,
            setter: compile_field_setter_with(field, config)?,
        })
    }

    /// Look up `name` on `ty` or its bases.
    pub fn find(ty: TypeRef, name: &str) -> Result<Self, CompileError> {
        let field = ty
            .field(name)
            .ok_or_else(|| member_not_found(ty, MemberKind::Field, name))?;
        Self::new(field)
    }

    pub fn field(&self) -> FieldRef {
        self.getter.field()
    }

    pub fn get_value(&self, instance: &Value) -> Result<Value, InvokeError> {
        self.getter.get(instance)
    }

    pub fn get_value_as<T: FromValue>(&self, instance: &Value) -> Result<T, InvokeError> {
        T::from_value(self.get_value(instance)?)
    }

    pub fn set_value(&self, instance: &Value, value: &Value) -> Result<(), InvokeError> {
        self.setter.set(instance, value)
    }
}
