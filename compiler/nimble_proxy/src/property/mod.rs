//! Property access composed from accessor method thunks.
//!
//! | Operation | Accessor call |
//! |---|---|
//! | `get_value(instance, index)` | `getter(instance, index)` |
//! | `set_value(instance, value, [])` | `setter(instance, [value])` |
//! | `set_value(instance, value, index)` | `setter(instance, [index.., value])` |

use std::slice;

use nimble_meta::{
    missing_accessor, Accessor, FromValue, InvokeError, PropertyRef, TypeRef, Value,
};
use nimble_thunk::{member_not_found, CompileConfig, CompileError, MemberKind};
use smallvec::SmallVec;
use tracing::debug;

use crate::MethodProxy;

/// Reads and writes one property through its accessors.
#[derive(Debug)]
pub struct PropertyProxy {
    property: PropertyRef,
    getter: Option<MethodProxy>,
    setter: Option<MethodProxy>,
}

impl PropertyProxy {
    pub fn new(property: PropertyRef) -> Result<Self, CompileError> {
        Self::with_config(property, CompileConfig::default())
    }

    pub fn with_config(property: PropertyRef, config: CompileConfig) -> Result<Self, CompileError> {
        let compile = |accessor| MethodProxy::with_config(accessor, config);
        let getter = property.getter().map(compile).transpose()?;
        let setter = property.setter().map(compile).transpose()?;
        debug!(
            %property,
            readable = getter.is_some(),
            writable = setter.is_some(),
            indexed = !property.index_params().is_empty(),
            "property proxy"
        );
        Ok(PropertyProxy {
            property,
            getter,
            setter,
        })
    }

    /// Look up `name` on `ty` or its bases.
    pub fn find(ty: TypeRef, name: &str) -> Result<Self, CompileError> {
        let property = ty
            .property(name)
            .ok_or_else(|| member_not_found(ty, MemberKind::Property, name))?;
        Self::new(property)
    }

    pub fn property(&self) -> PropertyRef {
        self.property
    }

    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    /// Read the property. `index` is empty unless the property is indexed.
    pub fn get_value(&self, instance: &Value, index: &[Value]) -> Result<Value, InvokeError> {
        let getter = self
            .getter
            .as_ref()
            .ok_or_else(|| missing_accessor(self.property, Accessor::Getter))?;
        getter.invoke(instance, index)
    }

    pub fn get_value_as<T: FromValue>(
        &self,
        instance: &Value,
        index: &[Value],
    ) -> Result<T, InvokeError> {
        T::from_value(self.get_value(instance, index)?)
    }

    /// Write the property. The setter receives the index arguments followed
    /// by `value`.
    pub fn set_value(
        &self,
        instance: &Value,
        value: &Value,
        index: &[Value],
    ) -> Result<(), InvokeError> {
        let setter = self
            .setter
            .as_ref()
            .ok_or_else(|| missing_accessor(self.property, Accessor::Setter))?;
        if index.is_empty() {
            return setter.invoke(instance, slice::from_ref(value)).map(drop);
        }
        let args: SmallVec<[Value; 4]> = index.iter().chain([value]).cloned().collect();
        setter.invoke(instance, &args).map(drop)
    }
}
