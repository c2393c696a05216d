use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{counter_type, field_of, point_type};

#[test]
fn runtime_types_of_boxed_primitives() {
    assert_eq!(Value::from(1).runtime_type(), Some(&builtins::INT32 as TypeRef));
    assert_eq!(Value::from(1i64).type_name(), "Int64");
    assert_eq!(Value::from(1.5).type_name(), "Double");
    assert_eq!(Value::from('x').type_name(), "Char");
    assert_eq!(Value::from("s").type_name(), "String");
    assert_eq!(Value::array(vec![]).type_name(), "Object[]");
    assert_eq!(Value::Null.type_name(), "null");
    assert_eq!(Value::Null.runtime_type(), None);
}

#[test]
fn strings_compare_by_content_objects_by_identity() {
    assert_eq!(Value::from("abc"), Value::string(String::from("abc")));
    assert!(Value::from(1) != Value::from(1i64));

    let counter = counter_type();
    let a = Object::alloc(counter);
    let b = Object::alloc(counter);
    assert_eq!(Value::from(Arc::clone(&a)), Value::from(Arc::clone(&a)));
    assert!(Value::from(a) != Value::from(b));

    let items = ArrayRef::new(vec![Value::from(1)]);
    assert_eq!(Value::from(items.clone()), Value::from(items));
    assert!(Value::array(vec![]) != Value::array(vec![]));
}

#[test]
fn alloc_uses_field_defaults() {
    let counter = counter_type();
    let obj = Object::alloc(counter);
    assert_eq!(obj.load(0), Some(Slot::Int32(0)));
    assert_eq!(obj.load(1), Some(Slot::NULL));
    assert_eq!(obj.load(2), None);
    assert!(obj.store(0, Slot::Int32(9)));
    assert!(!obj.store(7, Slot::Int32(9)));
    assert_eq!(obj.load(0), Some(Slot::Int32(9)));
}

#[test]
fn boxed_struct_is_a_copy() {
    let point = point_type();
    let x = field_of(point, "X");
    assert_eq!(
        StructValue::new_default(point).fields(),
        &[Slot::Int32(0), Slot::Int32(0)]
    );
    let value = StructValue::from_parts(point, vec![Slot::Int32(3), Slot::Int32(4)]);
    let boxed = Object::from_struct(value.clone());
    assert_eq!(boxed.ty(), point);
    assert!(boxed.store(0, Slot::Int32(30)));
    // The original struct is untouched.
    assert_eq!(x.load_from_struct(&value), Ok(Slot::Int32(3)));
    assert_eq!(boxed.to_struct().fields(), &[Slot::Int32(30), Slot::Int32(4)]);
}

#[test]
fn array_access() {
    let items = ArrayRef::new(vec![Value::from("a"), Value::from("b")]);
    assert_eq!(items.len(), 2);
    assert!(!items.is_empty());
    assert_eq!(items.get(1), Some(Value::from("b")));
    assert_eq!(items.get(2), None);
    assert!(items.set(0, Value::Null));
    assert!(!items.set(5, Value::Null));
    assert_eq!(items.to_vec(), vec![Value::Null, Value::from("b")]);
    assert!(ArrayRef::default().is_empty());
}

#[test]
fn slot_conformance() {
    let counter = counter_type();
    let point = point_type();
    assert!(Slot::Int32(1).conforms_to(&builtins::INT32));
    assert!(!Slot::Int32(1).conforms_to(&builtins::INT64));
    assert!(Slot::NULL.conforms_to(&builtins::STRING));
    assert!(Slot::NULL.conforms_to(counter));
    assert!(!Slot::NULL.conforms_to(&builtins::INT32));
    assert!(Slot::from(Value::from("x")).conforms_to(&builtins::OBJECT));
    assert!(!Slot::from(Value::from("x")).conforms_to(counter));
    assert!(Slot::Struct(StructValue::new_default(point)).conforms_to(point));
    assert!(!Slot::Struct(StructValue::new_default(point)).conforms_to(&builtins::OBJECT));
}

#[test]
fn slot_accessors_report_mismatches() {
    assert_eq!(Slot::Bool(true).as_bool(), Ok(true));
    assert_eq!(Slot::Char('q').as_char(), Ok('q'));
    assert_eq!(Slot::Float64(0.5).as_f64(), Ok(0.5));
    assert_eq!(
        Slot::Int64(1).as_i32(),
        Err(InvokeError::InvalidCast {
            expected: "Int32".to_string(),
            actual: "Int64".to_string(),
        })
    );
    assert!(matches!(
        Slot::NULL.as_str(),
        Err(InvokeError::NullReference { .. })
    ));
    assert!(matches!(
        Slot::from(Value::from(1)).as_array(),
        Err(InvokeError::InvalidCast { .. })
    ));
    assert!(matches!(
        Slot::Int32(1).as_object(),
        Err(InvokeError::InvalidCast { .. })
    ));
}

#[test]
fn from_value_conversions() {
    assert_eq!(i32::from_value(Value::from(5)), Ok(5));
    assert_eq!(String::from_value(Value::from("hi")), Ok("hi".to_string()));
    assert_eq!(Option::<i32>::from_value(Value::Null), Ok(None));
    assert_eq!(Option::<i32>::from_value(Value::from(2)), Ok(Some(2)));
    assert!(matches!(
        i32::from_value(Value::Null),
        Err(InvokeError::NullReference { .. })
    ));
    assert!(matches!(
        bool::from_value(Value::from(1)),
        Err(InvokeError::InvalidCast { .. })
    ));
}
