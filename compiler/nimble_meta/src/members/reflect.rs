//! Reflective invocation: the validating slow path.
//!
//! Every call checks the argument count, coerces each boxed argument to its
//! declared type, validates the receiver, dispatches, then boxes the
//! result. Compiled thunks do the same work with the checks laid out once
//! at compile time; both paths share [`crate::coerce`], so they fail the
//! same way on the same input.

use std::fmt;

use super::{ConstructorInfo, FieldInfo, MethodInfo, ParamInfo, PropertyInfo};
use crate::coerce::{box_slot, cast_class, unbox_any};
use crate::errors::{missing_accessor, null_reference, wrong_arg_count, Accessor, InvokeError};
use crate::value::{Slot, Value};

fn coerce_args(
    member: &dyn fmt::Display,
    params: &[ParamInfo],
    args: &[Value],
) -> Result<Vec<Slot>, InvokeError> {
    if args.len() != params.len() {
        return Err(wrong_arg_count(member, params.len(), args.len()));
    }
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| unbox_any(arg, param.ty()))
        .collect()
}

impl MethodInfo {
    /// Invoke with boxed arguments.
    ///
    /// Static methods ignore `this`. By-ref parameters are passed by value;
    /// writes to them are not copied back.
    pub fn invoke(&'static self, this: &Value, args: &[Value]) -> Result<Value, InvokeError> {
        let slots = coerce_args(self, &self.params, args)?;
        let result = if self.is_static() {
            self.call(&Value::Null, &slots)?
        } else {
            let receiver = cast_class(this, self.declaring)?;
            if receiver.is_null() {
                return Err(null_reference(format_args!("receiver of {self}")));
            }
            self.call_virtual(&receiver, &slots)?
        };
        if self.ret.is_void() {
            Ok(Value::Null)
        } else {
            box_slot(result, self.ret)
        }
    }
}

impl ConstructorInfo {
    /// Construct a new instance from boxed arguments. Value types come back boxed.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, InvokeError> {
        let slots = coerce_args(self, &self.params, args)?;
        let created = self.construct(&slots)?;
        box_slot(created, self.declaring)
    }
}

impl FieldInfo {
    /// Read the field as a boxed value. Static fields ignore `target`.
    pub fn get_value(&self, target: &Value) -> Result<Value, InvokeError> {
        box_slot(self.load_from(target)?, self.ty)
    }

    /// Coerce `value` to the field type and store it. Static fields ignore `target`.
    pub fn set_value(&self, target: &Value, value: &Value) -> Result<(), InvokeError> {
        let slot = unbox_any(value, self.ty)?;
        self.store_into(target, slot)
    }
}

impl PropertyInfo {
    /// Call the getter with `index` as its arguments.
    pub fn get_value(&self, target: &Value, index: &[Value]) -> Result<Value, InvokeError> {
        let getter = self
            .getter
            .ok_or_else(|| missing_accessor(self, Accessor::Getter))?;
        getter.invoke(target, index)
    }

    /// Call the setter with the index arguments followed by `value`.
    pub fn set_value(
        &self,
        target: &Value,
        value: &Value,
        index: &[Value],
    ) -> Result<(), InvokeError> {
        let setter = self
            .setter
            .ok_or_else(|| missing_accessor(self, Accessor::Setter))?;
        let mut args = Vec::with_capacity(index.len() + 1);
        args.extend_from_slice(index);
        args.push(value.clone());
        setter.invoke(target, &args).map(|_| ())
    }
}
