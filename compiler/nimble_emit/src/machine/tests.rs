use nimble_fixtures::fixtures;
use nimble_meta::{builtins, FieldRef, MethodRef};
use pretty_assertions::assert_eq;

use super::*;

const METHOD: [ParamKind; 2] = [ParamKind::Object, ParamKind::ObjectArray];

fn compile(returns_value: bool, locals: &[TypeRef], code: &[Instr]) -> CompiledBody {
    let mut b = MethodBuilder::new("test", ThunkSignature::new(&METHOD, returns_value));
    for &ty in locals {
        assert!(b.declare_local(ty).is_ok());
    }
    for &instr in code {
        b.emit(instr);
    }
    b.finalize().unwrap_or_else(|err| panic!("{err}"))
}

fn method(name: &str) -> MethodRef {
    fixtures()
        .sample
        .method(name)
        .unwrap_or_else(|| panic!("Sample has no {name}"))
}

fn field(name: &str) -> FieldRef {
    fixtures()
        .sample
        .field(name)
        .unwrap_or_else(|| panic!("Sample has no {name}"))
}

fn new_sample(number: i32) -> Value {
    fixtures()
        .sample
        .constructor(&[&builtins::INT32, &builtins::STRING])
        .unwrap_or_else(|| panic!("Sample(int, string)"))
        .invoke(&[Value::from(number), Value::from("s")])
        .unwrap_or_else(|err| panic!("{err}"))
}

fn run(body: &CompiledBody, this: &Value, args: &[Value]) -> Result<Option<Value>, InvokeError> {
    body.run(&[ThunkArg::Value(this), ThunkArg::Array(args)])
}

/// `(instance, args) => (object)((Sample)instance).Method2((int)args[0])`
fn method2_body() -> CompiledBody {
    compile(
        true,
        &[&builtins::INT32],
        &[
            Instr::LdArg1,
            Instr::LdcI4_0,
            Instr::LdElemRef,
            Instr::UnboxAny(&builtins::INT32),
            Instr::StLoc0,
            Instr::LdArg0,
            Instr::CastClass(fixtures().sample),
            Instr::LdLoc0,
            Instr::CallVirt(method("Method2")),
            Instr::Box(&builtins::INT32),
            Instr::Ret,
        ],
    )
}

#[test]
fn runs_a_method_body() {
    let body = method2_body();
    let sample = new_sample(0);
    assert_eq!(run(&body, &sample, &[Value::from(1)]), Ok(Some(Value::from(2))));
    assert_eq!(body.local_count(), 1);
    assert_eq!(body.max_stack(), 2);
}

#[test]
fn coercion_failures_surface_unchanged() {
    let body = method2_body();
    let sample = new_sample(0);
    assert!(matches!(
        run(&body, &sample, &[Value::from("1")]),
        Err(InvokeError::InvalidCast { .. })
    ));
    assert!(matches!(
        run(&body, &Value::from("not a sample"), &[Value::from(1)]),
        Err(InvokeError::InvalidCast { .. })
    ));
    assert!(matches!(
        run(&body, &Value::Null, &[Value::from(1)]),
        Err(InvokeError::NullReference { .. })
    ));
}

#[test]
fn element_loads_are_bounds_checked() {
    let body = method2_body();
    let sample = new_sample(0);
    assert_eq!(
        run(&body, &sample, &[]),
        Err(InvokeError::IndexOutOfRange { index: 0, len: 0 })
    );
}

#[test]
fn run_checks_argument_shape() {
    let body = method2_body();
    let sample = new_sample(0);
    assert!(matches!(
        body.run(&[ThunkArg::Value(&sample)]),
        Err(InvokeError::ArgumentCount { expected: 2, got: 1, .. })
    ));
    assert!(matches!(
        body.run(&[ThunkArg::Value(&sample), ThunkArg::Value(&sample)]),
        Err(InvokeError::InvalidProgram { .. })
    ));
}

#[test]
fn void_body_returns_nothing() {
    let sample = new_sample(0);
    let body = compile(
        false,
        &[],
        &[
            Instr::LdArg0,
            Instr::CastClass(fixtures().sample),
            Instr::CallVirt(method("Method1")),
            Instr::Ret,
        ],
    );
    assert_eq!(run(&body, &sample, &[]), Ok(None));
}

#[test]
fn static_fields_ignore_the_receiver() {
    let greeting = field("Greeting");
    let store = compile(
        false,
        &[],
        &[
            Instr::LdArg0,
            Instr::LdArg1,
            Instr::LdcI4_0,
            Instr::LdElemRef,
            Instr::CastClass(&builtins::STRING),
            Instr::StFld(greeting),
            Instr::Ret,
        ],
    );
    let load = compile(
        true,
        &[],
        &[Instr::LdArg0, Instr::LdFld(greeting), Instr::Ret],
    );
    assert_eq!(run(&store, &Value::from(42), &[Value::from("hello")]), Ok(None));
    assert_eq!(run(&load, &Value::Null, &[]), Ok(Some(Value::from("hello"))));
}

#[test]
fn instance_field_load_and_box() {
    let number = field("Number");
    let body = compile(
        true,
        &[&builtins::INT32],
        &[
            Instr::LdArg0,
            Instr::CastClass(fixtures().sample),
            Instr::LdFld(number),
            Instr::StLoc0,
            Instr::LdLoc0,
            Instr::Box(&builtins::INT32),
            Instr::Ret,
        ],
    );
    assert_eq!(run(&body, &new_sample(17), &[]), Ok(Some(Value::from(17))));
}

#[test]
fn newobj_boxes_value_types_on_request() {
    let point = fixtures().point;
    let ctor = point
        .constructor(&[&builtins::INT32, &builtins::INT32])
        .unwrap_or_else(|| panic!("Point(int, int)"));
    let body = compile(
        true,
        &[point],
        &[
            Instr::LdcI4_3,
            Instr::LdcI4S(40),
            Instr::NewObj(ctor),
            Instr::StLoc0,
            Instr::LdLoc0,
            Instr::Box(point),
            Instr::Ret,
        ],
    );
    let created = run(&body, &Value::Null, &[])
        .unwrap_or_else(|err| panic!("{err}"))
        .unwrap_or_else(|| panic!("no result"));
    assert_eq!(created.runtime_type(), Some(point));
    let sum = point.method("Sum").unwrap_or_else(|| panic!("Point has no Sum"));
    assert_eq!(sum.invoke(&created, &[]), Ok(Value::from(43)));
}

#[test]
fn returning_an_unboxed_value_is_an_invalid_program() {
    let body = compile(true, &[], &[Instr::LdcI4_1, Instr::Ret]);
    assert!(matches!(
        run(&body, &Value::Null, &[]),
        Err(InvokeError::InvalidProgram { .. })
    ));
}

#[test]
fn pop_discards() {
    let body = compile(true, &[], &[Instr::LdcI4_1, Instr::Pop, Instr::LdNull, Instr::Ret]);
    assert_eq!(run(&body, &Value::Null, &[]), Ok(Some(Value::Null)));
}

#[test]
fn locals_are_fresh_per_call() {
    // Returns the boxed local before storing the argument into it.
    let body = compile(
        true,
        &[&builtins::INT32],
        &[
            Instr::LdLoc0,
            Instr::Box(&builtins::INT32),
            Instr::LdArg1,
            Instr::LdcI4_0,
            Instr::LdElemRef,
            Instr::UnboxAny(&builtins::INT32),
            Instr::StLoc0,
            Instr::Ret,
        ],
    );
    assert_eq!(run(&body, &Value::Null, &[Value::from(5)]), Ok(Some(Value::from(0))));
    assert_eq!(run(&body, &Value::Null, &[Value::from(6)]), Ok(Some(Value::from(0))));
}

#[test]
fn field_load_from_an_unboxed_struct() {
    let point = fixtures().point;
    let x = point.field("X").unwrap_or_else(|| panic!("Point has no X"));
    let body = compile(
        true,
        &[],
        &[
            Instr::LdArg0,
            Instr::UnboxAny(point),
            Instr::LdFld(x),
            Instr::Box(&builtins::INT32),
            Instr::Ret,
        ],
    );
    let boxed = point
        .constructor(&[&builtins::INT32, &builtins::INT32])
        .unwrap_or_else(|| panic!("Point(int, int)"))
        .invoke(&[Value::from(4), Value::from(9)])
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(run(&body, &boxed, &[]), Ok(Some(Value::from(4))));
    assert!(matches!(
        run(&body, &new_sample(0), &[]),
        Err(InvokeError::InvalidCast { .. })
    ));
}
