use nimble_fixtures::fixtures;
use nimble_meta::{builtins, TypeRef};
use pretty_assertions::assert_eq;

use super::*;
use crate::config::ReceiverPolicy;

fn method(ty: TypeRef, name: &str) -> MethodRef {
    ty.method(name)
        .unwrap_or_else(|| panic!("{ty} has no method {name}"))
}

fn compile(ty: TypeRef, name: &str) -> MethodThunk {
    compile_method(method(ty, name)).unwrap_or_else(|err| panic!("{err}"))
}

fn new_sample(number: i32, text: &str) -> Value {
    let ctor = fixtures()
        .sample
        .constructor(&[&builtins::INT32, &builtins::STRING])
        .unwrap_or_else(|| panic!("Sample(Int32, String)"));
    ctor.invoke(&[Value::from(number), Value::from(text)])
        .unwrap_or_else(|err| panic!("{err}"))
}

#[test]
fn value_type_results_are_boxed() {
    let thunk = compile(fixtures().sample, "Method2");
    let instance = new_sample(1, "one");
    assert_eq!(thunk.invoke(&instance, &[Value::from(41)]), Ok(Value::from(42)));
}

#[test]
fn void_methods_return_null() {
    let sample = fixtures().sample;
    let thunk = compile(sample, "Method1");
    let instance = new_sample(1, "one");
    assert_eq!(thunk.invoke(&instance, &[]), Ok(Value::Null));

    let note = sample.field("note").unwrap_or_else(|| panic!("note"));
    assert_eq!(note.get_value(&instance), Ok(Value::from("Method1")));
}

#[test]
fn arguments_keep_their_order() {
    let thunk = compile(fixtures().sample, "Concat");
    let instance = new_sample(1, "one");
    assert_eq!(
        thunk.invoke(&instance, &[Value::from("ab"), Value::from("cd")]),
        Ok(Value::from("abcd"))
    );
}

#[test]
fn static_methods_ignore_the_instance() {
    let thunk = compile(fixtures().sample, "Add");
    assert_eq!(
        thunk.invoke(&Value::Null, &[Value::from(2), Value::from(3)]),
        Ok(Value::from(5))
    );
    assert_eq!(
        thunk.invoke(&Value::from("ignored"), &[Value::from(2), Value::from(3)]),
        Ok(Value::from(5))
    );
}

#[test]
fn virtual_calls_dispatch_on_the_receiver() {
    let fx = fixtures();
    let thunk = compile(fx.sample, "Describe");
    assert_eq!(
        thunk.invoke(&new_sample(3, "three"), &[]),
        Ok(Value::from("Sample(3)"))
    );

    let derived = fx
        .derived_sample
        .constructor(&[])
        .unwrap_or_else(|| panic!("DerivedSample()"))
        .invoke(&[])
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(thunk.invoke(&derived, &[]), Ok(Value::from("DerivedSample")));
}

#[test]
fn struct_arguments_and_results() {
    let fx = fixtures();
    let origin = fx
        .point
        .constructor(&[&builtins::INT32, &builtins::INT32])
        .unwrap_or_else(|| panic!("Point(Int32, Int32)"))
        .invoke(&[Value::from(1), Value::from(2)])
        .unwrap_or_else(|err| panic!("{err}"));

    let translate = compile(fx.point, "Translate");
    let moved = translate
        .invoke(&origin, &[Value::from(10), Value::from(20)])
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(moved.runtime_type(), Some(fx.point));
    assert_eq!(compile(fx.point, "Sum").invoke(&moved, &[]), Ok(Value::from(33)));
    // The receiver is untouched.
    assert_eq!(compile(fx.point, "Sum").invoke(&origin, &[]), Ok(Value::from(3)));

    let instance = new_sample(0, "zero");
    compile(fx.sample, "SetOrigin")
        .invoke(&instance, &[moved])
        .unwrap_or_else(|err| panic!("{err}"));
    let fetched = compile(fx.sample, "GetOrigin")
        .invoke(&instance, &[])
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(compile(fx.point, "Sum").invoke(&fetched, &[]), Ok(Value::from(33)));
}

#[test]
fn private_methods_compile() {
    let fx = fixtures();
    let secret_ctor = fx
        .sample
        .constructors()
        .iter()
        .copied()
        .find(|c| !c.is_public())
        .unwrap_or_else(|| panic!("private Sample ctor"));
    let instance = secret_ctor
        .invoke(&[Value::from(99)])
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(compile(fx.sample, "Secret").invoke(&instance, &[]), Ok(Value::from(99)));
}

#[test]
fn coercion_failures() {
    let thunk = compile(fixtures().sample, "Method2");
    let instance = new_sample(1, "one");
    assert!(matches!(
        thunk.invoke(&instance, &[Value::from("41")]),
        Err(InvokeError::InvalidCast { .. })
    ));
    assert!(matches!(
        thunk.invoke(&instance, &[Value::Null]),
        Err(InvokeError::NullReference { .. })
    ));
    assert_eq!(
        thunk.invoke(&instance, &[]),
        Err(InvokeError::IndexOutOfRange { index: 0, len: 0 })
    );
}

#[test]
fn null_receiver_is_rejected() {
    let thunk = compile(fixtures().sample, "Method2");
    assert!(matches!(
        thunk.invoke(&Value::Null, &[Value::from(1)]),
        Err(InvokeError::NullReference { .. })
    ));
}

#[test]
fn checked_receiver_is_cast_up_front() {
    let fx = fixtures();
    let thunk = compile(fx.sample, "Method2");
    let other = fx
        .name_list
        .constructor(&[])
        .unwrap_or_else(|| panic!("NameList()"))
        .invoke(&[])
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(
        thunk.invoke(&other, &[Value::from(1)]),
        Err(InvokeError::InvalidCast {
            expected: "Sample".to_string(),
            actual: "NameList".to_string(),
        })
    );
}

#[test]
fn trusted_receiver_skips_the_cast() {
    let fx = fixtures();
    let config = CompileConfig::with_receiver(ReceiverPolicy::Trusted);
    let checked = compile(fx.sample, "Method2");
    let trusted = compile_method_with(method(fx.sample, "Method2"), config)
        .unwrap_or_else(|err| panic!("{err}"));
    // No castclass: 5 bytes shorter.
    assert_eq!(trusted.body().code_size() + 5, checked.body().code_size());

    // Method2 never reads its receiver, so any non-null object gets through.
    let other = fx
        .name_list
        .constructor(&[])
        .unwrap_or_else(|| panic!("NameList()"))
        .invoke(&[])
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(trusted.invoke(&other, &[Value::from(1)]), Ok(Value::from(2)));

    // Describe reads a field, which still checks the receiver type.
    let describe = compile_method_with(method(fx.sample, "Describe"), config)
        .unwrap_or_else(|err| panic!("{err}"));
    assert!(matches!(
        describe.invoke(&other, &[]),
        Err(InvokeError::InvalidCast { .. })
    ));
}

#[test]
fn by_ref_parameters_do_not_compile() {
    assert_eq!(
        compile_method(method(fixtures().sample, "Swap")).err(),
        Some(CompileError::ByRefParameter {
            member: "Sample::Swap".to_string(),
            param: "a".to_string(),
        })
    );
}

#[test]
fn body_shape() {
    let thunk = compile(fixtures().sample, "Method2");
    let body = thunk.body();
    assert_eq!(body.name(), "method Sample::Method2");
    assert_eq!(body.local_count(), 1);
    // ldarg.1, ldc.i4.0, ldelem.ref, unbox.any, stloc.0 = 9
    // ldarg.0, castclass, ldloc.0, callvirt, box, ret = 18
    assert_eq!(body.code_size(), 27);
    assert_eq!(thunk.method(), method(fixtures().sample, "Method2"));
}

#[test]
fn wide_signatures_spill_into_short_local_forms() {
    let thunk = compile(fixtures().sample, "Join");
    let instance = new_sample(1, "one");
    let args = [
        Value::from(1),
        Value::from(2),
        Value::from(3),
        Value::from(4),
        Value::from(5),
        Value::from("-"),
    ];
    assert_eq!(thunk.invoke(&instance, &args), Ok(Value::from("1-2-3-4-5")));

    let body = thunk.body();
    assert_eq!(body.local_count(), 6);
    // 6 x (ldarg.1, ldc.i4.n, ldelem.ref, coerce, stloc) = 54
    // stloc.s 4, stloc.s 5 = +2
    // ldarg.0, castclass, ldloc.0..3, ldloc.s 4, ldloc.s 5, callvirt, ret = 20
    assert_eq!(body.code_size(), 76);

    let mut swapped = args.clone();
    swapped.swap(4, 5);
    assert!(matches!(
        thunk.invoke(&instance, &swapped),
        Err(InvokeError::InvalidCast { .. })
    ));
}
