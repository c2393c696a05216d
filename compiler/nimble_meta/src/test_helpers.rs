//! Shared test types for the metadata tests.
//!
//! Every call defines fresh descriptors, so tests that write static fields
//! never observe each other.

use crate::{
    builtins, native, CtorRef, FieldRef, MemberFlags, MethodRef, ParamInfo, PropertyRef, Slot,
    TypeBuilder, TypeRef, Value,
};

pub(crate) const PUBLIC: MemberFlags = MemberFlags::PUBLIC;
pub(crate) const PUBLIC_STATIC: MemberFlags = MemberFlags::PUBLIC.union(MemberFlags::STATIC);
pub(crate) const PUBLIC_VIRTUAL: MemberFlags = MemberFlags::PUBLIC.union(MemberFlags::VIRTUAL);

pub(crate) fn field_of(ty: TypeRef, name: &str) -> FieldRef {
    ty.field(name)
        .unwrap_or_else(|| panic!("{ty} has no field {name}"))
}

pub(crate) fn method_of(ty: TypeRef, name: &str) -> MethodRef {
    ty.method(name)
        .unwrap_or_else(|| panic!("{ty} has no method {name}"))
}

pub(crate) fn ctor_of(ty: TypeRef, params: &[TypeRef]) -> CtorRef {
    ty.constructor(params)
        .unwrap_or_else(|| panic!("{ty} has no matching constructor"))
}

pub(crate) fn property_of(ty: TypeRef, name: &str) -> PropertyRef {
    ty.property(name)
        .unwrap_or_else(|| panic!("{ty} has no property {name}"))
}

/// `class Counter { public int count; string label; public static long created; ... }`
pub(crate) fn counter_type() -> TypeRef {
    let mut b = TypeBuilder::class("Counter");
    let count = b.field("count", &builtins::INT32, PUBLIC);
    let label = b.field("label", &builtins::STRING, MemberFlags::empty());
    let created = b.field("created", &builtins::INT64, PUBLIC_STATIC);

    b.constructor(vec![], PUBLIC, move |_| {
        let total = created.load_from(&Value::Null)?.as_i64()?;
        created.store_into(&Value::Null, Slot::Int64(total + 1))
    });
    b.constructor(
        vec![
            ParamInfo::new("start", &builtins::INT32),
            ParamInfo::new("label", &builtins::STRING),
        ],
        PUBLIC,
        move |frame| {
            count.store_into(frame.this(), frame.arg(0)?.clone())?;
            label.store_into(frame.this(), frame.arg(1)?.clone())
        },
    );
    b.method(
        "Increment",
        vec![ParamInfo::new("by", &builtins::INT32)],
        &builtins::INT32,
        PUBLIC,
        move |frame| {
            let next = count.load_from(frame.this())?.as_i32()? + frame.arg(0)?.as_i32()?;
            count.store_into(frame.this(), Slot::Int32(next))?;
            Ok(Slot::Int32(next))
        },
    );
    b.method(
        "Add",
        vec![
            ParamInfo::new("a", &builtins::INT32),
            ParamInfo::new("b", &builtins::INT32),
        ],
        &builtins::INT32,
        PUBLIC_STATIC,
        |frame| {
            let a = frame.arg(0)?.as_i32()?;
            let b = frame.arg(1)?.as_i32()?;
            a.checked_add(b)
                .map(Slot::Int32)
                .ok_or_else(|| native("integer overflow in Add"))
        },
    );
    b.method("Describe", vec![], &builtins::STRING, PUBLIC_VIRTUAL, |_| {
        Ok(Slot::Ref(Value::string("Counter")))
    });
    b.method("Reset", vec![], &builtins::VOID, PUBLIC, move |frame| {
        count.store_into(frame.this(), Slot::Int32(0))?;
        Ok(Slot::NULL)
    });
    let get_count = b.method("get_Count", vec![], &builtins::INT32, PUBLIC, move |frame| {
        count.load_from(frame.this())
    });
    let set_count = b.method(
        "set_Count",
        vec![ParamInfo::new("value", &builtins::INT32)],
        &builtins::VOID,
        PUBLIC,
        move |frame| {
            count.store_into(frame.this(), frame.arg(0)?.clone())?;
            Ok(Slot::NULL)
        },
    );
    b.property("Count", &builtins::INT32, vec![], Some(get_count), Some(set_count));
    b.property("ReadOnlyCount", &builtins::INT32, vec![], Some(get_count), None);

    b.finish().unwrap_or_else(|err| panic!("{err}"))
}

/// `class LoudCounter : Counter` overriding `Describe`.
pub(crate) fn loud_counter_type(base: TypeRef) -> TypeRef {
    let mut b = TypeBuilder::derived("LoudCounter", base);
    b.field("volume", &builtins::FLOAT64, PUBLIC);
    b.constructor(vec![], PUBLIC, |_| Ok(()));
    b.method("Describe", vec![], &builtins::STRING, PUBLIC_VIRTUAL, |_| {
        Ok(Slot::Ref(Value::string("LoudCounter")))
    });
    b.finish().unwrap_or_else(|err| panic!("{err}"))
}

/// `struct Point { public int X; public int Y; }`
pub(crate) fn point_type() -> TypeRef {
    let mut b = TypeBuilder::value_type("Point");
    let x = b.field("X", &builtins::INT32, PUBLIC);
    let y = b.field("Y", &builtins::INT32, PUBLIC);
    b.constructor(
        vec![
            ParamInfo::new("x", &builtins::INT32),
            ParamInfo::new("y", &builtins::INT32),
        ],
        PUBLIC,
        move |frame| {
            x.store_into(frame.this(), frame.arg(0)?.clone())?;
            y.store_into(frame.this(), frame.arg(1)?.clone())
        },
    );
    b.method("Sum", vec![], &builtins::INT32, PUBLIC, move |frame| {
        let sum = x.load_from(frame.this())?.as_i32()? + y.load_from(frame.this())?.as_i32()?;
        Ok(Slot::Int32(sum))
    });
    b.finish().unwrap_or_else(|err| panic!("{err}"))
}
