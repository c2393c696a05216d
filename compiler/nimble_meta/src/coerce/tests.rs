use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{counter_type, loud_counter_type, point_type};
use crate::types::builtins;
use crate::value::StructValue;

#[test]
fn unbox_primitives_exactly() {
    assert_eq!(unbox_any(&Value::from(7), &builtins::INT32), Ok(Slot::Int32(7)));
    assert_eq!(unbox_any(&Value::from(true), &builtins::BOOL), Ok(Slot::Bool(true)));
    assert_eq!(
        unbox_any(&Value::from(7i64), &builtins::INT32),
        Err(InvokeError::InvalidCast {
            expected: "Int32".to_string(),
            actual: "Int64".to_string(),
        })
    );
    assert_eq!(
        unbox_any(&Value::from("7"), &builtins::INT32),
        Err(InvokeError::InvalidCast {
            expected: "Int32".to_string(),
            actual: "String".to_string(),
        })
    );
}

#[test]
fn unbox_null_as_value_type_fails() {
    let point = point_type();
    assert!(matches!(
        unbox_any(&Value::Null, &builtins::FLOAT64),
        Err(InvokeError::NullReference { .. })
    ));
    assert!(matches!(
        unbox_any(&Value::Null, point),
        Err(InvokeError::NullReference { .. })
    ));
}

#[test]
fn unbox_reference_types_casts() {
    let counter = counter_type();
    let loud = loud_counter_type(counter);
    let instance = Value::from(Object::alloc(loud));
    assert_eq!(
        unbox_any(&instance, counter),
        Ok(Slot::Ref(instance.clone()))
    );
    assert_eq!(unbox_any(&Value::Null, &builtins::STRING), Ok(Slot::NULL));
    assert_eq!(
        unbox_any(&Value::from(1), &builtins::OBJECT),
        Ok(Slot::Ref(Value::from(1)))
    );
    assert!(matches!(
        unbox_any(&Value::from(Object::alloc(counter)), loud),
        Err(InvokeError::InvalidCast { .. })
    ));
    assert!(matches!(
        unbox_any(&Value::from(1), &builtins::VOID),
        Err(InvokeError::InvalidCast { .. })
    ));
}

#[test]
fn unbox_struct_copies_fields() {
    let point = point_type();
    let boxed = Object::from_struct(StructValue::new_default(point));
    let unboxed = unbox_any(&Value::from(Arc::clone(&boxed)), point);
    assert!(boxed.store(0, Slot::Int32(5)));
    match unboxed {
        Ok(Slot::Struct(s)) => assert_eq!(s.fields(), &[Slot::Int32(0), Slot::Int32(0)]),
        other => panic!("expected a struct, got {other:?}"),
    }
    // A different struct type with the same shape does not unbox.
    assert!(matches!(
        unbox_any(&Value::from(boxed), point_type()),
        Err(InvokeError::InvalidCast { .. })
    ));
}

#[test]
fn cast_class_passes_null_and_subtypes() {
    let counter = counter_type();
    let loud = loud_counter_type(counter);
    assert_eq!(cast_class(&Value::Null, loud), Ok(Value::Null));
    let instance = Value::from(Object::alloc(loud));
    assert_eq!(cast_class(&instance, counter), Ok(instance.clone()));
    assert_eq!(
        cast_class(&Value::from("s"), counter),
        Err(InvokeError::InvalidCast {
            expected: "Counter".to_string(),
            actual: "String".to_string(),
        })
    );
}

#[test]
fn box_slots() {
    let point = point_type();
    assert_eq!(box_slot(Slot::Char('a'), &builtins::CHAR), Ok(Value::from('a')));
    assert_eq!(box_slot(Slot::NULL, &builtins::STRING), Ok(Value::Null));
    let boxed = box_slot(Slot::Struct(StructValue::new_default(point)), point)
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(boxed.runtime_type(), Some(point));
    assert!(matches!(
        box_slot(Slot::Int32(1), &builtins::INT64),
        Err(InvokeError::InvalidCast { .. })
    ));
    assert!(matches!(
        box_slot(Slot::Int32(1), &builtins::STRING),
        Err(InvokeError::InvalidCast { .. })
    ));
}
