use pretty_assertions::assert_eq;

use super::*;

fn construct(ty: TypeRef, args: &[Value]) -> Value {
    ty.constructors()
        .iter()
        .find(|c| c.params().len() == args.len() && c.is_public())
        .unwrap_or_else(|| panic!("{ty} has no public constructor of arity {}", args.len()))
        .invoke(args)
        .unwrap_or_else(|err| panic!("{err}"))
}

#[test]
fn fixtures_are_defined_once() {
    let a = fixtures();
    let b = fixtures();
    assert!(std::ptr::eq(a, b));
    assert_eq!(a.sample.name(), "Sample");
    assert!(a.derived_sample.base() == Some(a.sample));
    assert!(a.point.is_value_type());
}

#[test]
fn sample_members() {
    let sample = fixtures().sample;
    assert!(sample.field("secret").is_some_and(|f| !f.is_public()));
    assert!(sample.field("Instances").is_some_and(|f| f.is_static()));
    assert!(sample.method("Add").is_some_and(|m| m.is_static()));
    assert!(sample.method("Describe").is_some_and(|m| m.is_virtual()));
    assert!(sample
        .method("Swap")
        .is_some_and(|m| m.params().iter().all(ParamInfo::is_by_ref)));
    assert!(sample.property("Id").is_some_and(|p| !p.can_write()));
    assert!(sample.property("Note").is_some_and(|p| !p.can_read()));
}

#[test]
fn name_list_indexer() {
    let list_ty = fixtures().name_list;
    let list = construct(list_ty, &[]);
    let item = list_ty
        .property("Item")
        .unwrap_or_else(|| panic!("NameList has no indexer"));
    assert_eq!(item.get_value(&list, &[Value::from(0)]), Ok(Value::from("Ozcan")));
    assert_eq!(item.get_value(&list, &[Value::from(1)]), Ok(Value::from("Degirmenci")));
    assert_eq!(
        item.get_value(&list, &[Value::from(2)]),
        Err(InvokeError::IndexOutOfRange { index: 2, len: 2 })
    );
    item.set_value(&list, &Value::from("X"), &[Value::from(0)])
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(item.get_value(&list, &[Value::from(0)]), Ok(Value::from("X")));
}

#[test]
fn point_translate_returns_a_new_point() {
    let point = fixtures().point;
    let p = construct(point, &[Value::from(1), Value::from(2)]);
    let translate = point
        .method("Translate")
        .unwrap_or_else(|| panic!("Point has no Translate"));
    let moved = translate
        .invoke(&p, &[Value::from(10), Value::from(20)])
        .unwrap_or_else(|err| panic!("{err}"));
    let sum = point.method("Sum").unwrap_or_else(|| panic!("Point has no Sum"));
    assert_eq!(sum.invoke(&moved, &[]), Ok(Value::from(33)));
    assert_eq!(sum.invoke(&p, &[]), Ok(Value::from(3)));
}

#[test]
fn derived_sample_overrides_describe() {
    let f = fixtures();
    let describe = f
        .sample
        .method("Describe")
        .unwrap_or_else(|| panic!("Sample has no Describe"));
    let base = construct(f.sample, &[Value::from(4), Value::from("four")]);
    let derived = construct(f.derived_sample, &[]);
    assert_eq!(describe.invoke(&base, &[]), Ok(Value::from("Sample(4)")));
    assert_eq!(describe.invoke(&derived, &[]), Ok(Value::from("DerivedSample")));
}

#[test]
fn hidden_has_no_public_constructor() {
    let hidden = fixtures().hidden;
    assert!(!hidden.constructors().is_empty());
    assert!(hidden.constructors().iter().all(|c| !c.is_public()));
}
