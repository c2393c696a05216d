//! Conversions from boxed values to Rust types.
//!
//! Backs the `invoke_as` / `get_value_as` conveniences on the façades.
//! Conversions are exact: a boxed `Int64` does not convert to `i32`.

use std::sync::Arc;

use super::{ArrayRef, ObjectRef, Value};
use crate::errors::{invalid_cast, null_reference, InvokeError};
use crate::types::builtins;

/// Conversion from a boxed [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, InvokeError>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, InvokeError> {
        Ok(value)
    }
}

/// `None` for null, otherwise the inner conversion.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, InvokeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident, $builtin:expr) => {
        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, InvokeError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    Value::Null => {
                        Err(null_reference(format!("cannot convert null to {}", $builtin)))
                    }
                    other => Err(invalid_cast($builtin, other.type_name())),
                }
            }
        }
    };
}

impl_from_value!(bool, Bool, &builtins::BOOL);
impl_from_value!(i32, Int32, &builtins::INT32);
impl_from_value!(i64, Int64, &builtins::INT64);
impl_from_value!(f64, Float64, &builtins::FLOAT64);
impl_from_value!(char, Char, &builtins::CHAR);
impl_from_value!(Arc<str>, Str, &builtins::STRING);
impl_from_value!(ArrayRef, Array, &builtins::ARRAY);
impl_from_value!(ObjectRef, Object, &builtins::OBJECT);

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, InvokeError> {
        Arc::<str>::from_value(value).map(|s| s.to_string())
    }
}
