//! Fixture types shared by the Nimble test suites and benchmarks.
//!
//! The types are defined once per process and returned by [`fixtures`].
//! Static fields are therefore shared by every test in a binary: tests
//! that write them must not assume they are the only writer.
//!
//! ```text
//! struct Point        { int X; int Y; Sum(); Translate(dx, dy) }
//! class  Sample       { int Number; string Text; int secret; string note;
//!                       static int Instances; static string Greeting; Point Origin;
//!                       Sample(number, text, secret, note, origin); Join(a..e, separator); ... }
//! class  DerivedSample : Sample { long Extra; override Describe() }
//! class  NameList     { object[] items = { "Ozcan", "Degirmenci" }; string this[int] }
//! class  Hidden       { private Hidden() }
//! ```

use std::sync::OnceLock;

use nimble_meta::{
    builtins, index_out_of_range, native, DefineError, FieldRef, Frame, InvokeError, MemberFlags,
    Object, ParamInfo, Slot, TypeBuilder, TypeRef, Value,
};

const PUBLIC: MemberFlags = MemberFlags::PUBLIC;
const PRIVATE: MemberFlags = MemberFlags::empty();
const PUBLIC_STATIC: MemberFlags = MemberFlags::PUBLIC.union(MemberFlags::STATIC);
const PUBLIC_VIRTUAL: MemberFlags = MemberFlags::PUBLIC.union(MemberFlags::VIRTUAL);

/// Items a fresh [`Fixtures::name_list`] holds.
pub const NAME_LIST_ITEMS: [&str; 2] = ["Ozcan", "Degirmenci"];

/// The fixture types.
#[derive(Clone, Copy, Debug)]
pub struct Fixtures {
    pub point: TypeRef,
    pub sample: TypeRef,
    pub derived_sample: TypeRef,
    pub name_list: TypeRef,
    /// A class whose only constructor is private.
    pub hidden: TypeRef,
}

/// The process-wide fixture types, defined on first use.
///
/// # Panics
///
/// Panics if the fixture definitions are rejected by the type builder,
/// which means the definitions in this crate are broken.
pub fn fixtures() -> &'static Fixtures {
    static FIXTURES: OnceLock<Result<Fixtures, DefineError>> = OnceLock::new();
    match FIXTURES.get_or_init(define) {
        Ok(fixtures) => fixtures,
        Err(err) => panic!("fixture types failed to define: {err}"),
    }
}

fn define() -> Result<Fixtures, DefineError> {
    let point = define_point()?;
    let sample = define_sample(point)?;
    Ok(Fixtures {
        point,
        sample,
        derived_sample: define_derived_sample(sample)?,
        name_list: define_name_list()?,
        hidden: define_hidden()?,
    })
}

fn int_param(name: &'static str) -> ParamInfo {
    ParamInfo::new(name, &builtins::INT32)
}

fn string_param(name: &'static str) -> ParamInfo {
    ParamInfo::new(name, &builtins::STRING)
}

/// Store the frame argument at `index` into `field` of the receiver.
fn store_arg(field: FieldRef, frame: &Frame<'_>, index: usize) -> Result<(), InvokeError> {
    field.store_into(frame.this(), frame.arg(index)?.clone())
}

fn checked(value: Option<i32>) -> Result<Slot, InvokeError> {
    value
        .map(Slot::Int32)
        .ok_or_else(|| native("arithmetic operation resulted in an overflow"))
}

// Point

fn define_point() -> Result<TypeRef, DefineError> {
    let mut b = TypeBuilder::value_type("Point");
    let ty = b.ty();
    let x = b.field("X", &builtins::INT32, PUBLIC);
    let y = b.field("Y", &builtins::INT32, PUBLIC);

    b.constructor(vec![int_param("x"), int_param("y")], PUBLIC, move |frame| {
        store_arg(x, frame, 0)?;
        store_arg(y, frame, 1)
    });
    b.method("Sum", vec![], &builtins::INT32, PUBLIC, move |frame| {
        let this = frame.this();
        checked(x.load_from(this)?.as_i32()?.checked_add(y.load_from(this)?.as_i32()?))
    });
    b.method(
        "Translate",
        vec![int_param("dx"), int_param("dy")],
        ty,
        PUBLIC,
        move |frame| {
            let this = frame.this();
            let nx = checked(x.load_from(this)?.as_i32()?.checked_add(frame.arg(0)?.as_i32()?))?;
            let ny = checked(y.load_from(this)?.as_i32()?.checked_add(frame.arg(1)?.as_i32()?))?;
            let moved = Object::alloc(ty);
            let target = Value::from(moved.clone());
            x.store_into(&target, nx)?;
            y.store_into(&target, ny)?;
            Ok(Slot::Struct(moved.to_struct()))
        },
    );
    b.finish()
}

// Sample

fn define_sample(point: TypeRef) -> Result<TypeRef, DefineError> {
    let mut b = TypeBuilder::class("Sample");
    let number = b.field("Number", &builtins::INT32, PUBLIC);
    let text = b.field("Text", &builtins::STRING, PUBLIC);
    let secret = b.field("secret", &builtins::INT32, PRIVATE);
    let note = b.field("note", &builtins::STRING, PRIVATE);
    let origin = b.field("Origin", point, PUBLIC);
    let instances = b.field("Instances", &builtins::INT32, PUBLIC_STATIC);
    b.field("Greeting", &builtins::STRING, PUBLIC_STATIC);

    b.constructor(vec![], PUBLIC, move |_| {
        let count = instances.load_from(&Value::Null)?.as_i32()?;
        instances.store_into(&Value::Null, Slot::Int32(count.wrapping_add(1)))
    });
    b.constructor(
        vec![int_param("number"), string_param("text")],
        PUBLIC,
        move |frame| {
            store_arg(number, frame, 0)?;
            store_arg(text, frame, 1)
        },
    );
    b.constructor(vec![int_param("secret")], PRIVATE, move |frame| {
        store_arg(secret, frame, 0)
    });
    b.constructor(
        vec![
            int_param("number"),
            string_param("text"),
            int_param("secret"),
            string_param("note"),
            ParamInfo::new("origin", point),
        ],
        PUBLIC,
        move |frame| {
            store_arg(number, frame, 0)?;
            store_arg(text, frame, 1)?;
            store_arg(secret, frame, 2)?;
            store_arg(note, frame, 3)?;
            store_arg(origin, frame, 4)
        },
    );

    b.method("Method1", vec![], &builtins::VOID, PUBLIC, move |frame| {
        note.store_into(frame.this(), Slot::Ref(Value::from("Method1")))?;
        Ok(Slot::NULL)
    });
    b.method(
        "Method2",
        vec![int_param("a")],
        &builtins::INT32,
        PUBLIC,
        |frame| checked(frame.arg(0)?.as_i32()?.checked_add(1)),
    );
    b.method(
        "Concat",
        vec![string_param("a"), string_param("b")],
        &builtins::STRING,
        PUBLIC,
        |frame| {
            let left = frame.arg(0)?.as_value()?.as_str().unwrap_or_default();
            let right = frame.arg(1)?.as_value()?.as_str().unwrap_or_default();
            Ok(Slot::Ref(Value::from(format!("{left}{right}"))))
        },
    );
    b.method(
        "Add",
        vec![int_param("a"), int_param("b")],
        &builtins::INT32,
        PUBLIC_STATIC,
        |frame| checked(frame.arg(0)?.as_i32()?.checked_add(frame.arg(1)?.as_i32()?)),
    );
    b.method(
        "Join",
        vec![
            int_param("a"),
            int_param("b"),
            int_param("c"),
            int_param("d"),
            int_param("e"),
            string_param("separator"),
        ],
        &builtins::STRING,
        PUBLIC,
        |frame| {
            let separator = frame.arg(5)?.as_value()?.as_str().unwrap_or_default();
            let parts = (0..5)
                .map(|i| frame.arg(i)?.as_i32().map(|n| n.to_string()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Slot::Ref(Value::from(parts.join(separator))))
        },
    );
    b.method("Describe", vec![], &builtins::STRING, PUBLIC_VIRTUAL, move |frame| {
        let n = number.load_from(frame.this())?.as_i32()?;
        Ok(Slot::Ref(Value::from(format!("Sample({n})"))))
    });
    b.method(
        "Swap",
        vec![
            ParamInfo::by_ref("a", &builtins::INT32),
            ParamInfo::by_ref("b", &builtins::INT32),
        ],
        &builtins::VOID,
        PUBLIC,
        |_| Ok(Slot::NULL),
    );
    b.method("GetOrigin", vec![], point, PUBLIC, move |frame| {
        origin.load_from(frame.this())
    });
    b.method(
        "SetOrigin",
        vec![ParamInfo::new("origin", point)],
        &builtins::VOID,
        PUBLIC,
        move |frame| {
            store_arg(origin, frame, 0)?;
            Ok(Slot::NULL)
        },
    );
    b.method("Secret", vec![], &builtins::INT32, PRIVATE, move |frame| {
        secret.load_from(frame.this())
    });

    let get_name = b.method("get_Name", vec![], &builtins::STRING, PUBLIC, move |frame| {
        text.load_from(frame.this())
    });
    let set_name = b.method(
        "set_Name",
        vec![string_param("value")],
        &builtins::VOID,
        PUBLIC,
        move |frame| {
            store_arg(text, frame, 0)?;
            Ok(Slot::NULL)
        },
    );
    let get_id = b.method("get_Id", vec![], &builtins::INT32, PUBLIC, move |frame| {
        number.load_from(frame.this())
    });
    let set_note = b.method(
        "set_Note",
        vec![string_param("value")],
        &builtins::VOID,
        PUBLIC,
        move |frame| {
            store_arg(note, frame, 0)?;
            Ok(Slot::NULL)
        },
    );
    b.property("Name", &builtins::STRING, vec![], Some(get_name), Some(set_name));
    b.property("Id", &builtins::INT32, vec![], Some(get_id), None);
    b.property("Note", &builtins::STRING, vec![], None, Some(set_note));

    b.finish()
}

fn define_derived_sample(sample: TypeRef) -> Result<TypeRef, DefineError> {
    let mut b = TypeBuilder::derived("DerivedSample", sample);
    b.field("Extra", &builtins::INT64, PUBLIC);
    b.constructor(vec![], PUBLIC, |_| Ok(()));
    b.method(
        "Join",
        vec![
            int_param("a"),
            int_param("b"),
            int_param("c"),
            int_param("d"),
            int_param("e"),
            string_param("separator"),
        ],
        &builtins::STRING,
        PUBLIC,
        |frame| {
            let separator = frame.arg(5)?.as_value()?.as_str().unwrap_or_default();
            let parts = (0..5)
                .map(|i| frame.arg(i)?.as_i32().map(|n| n.to_string()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Slot::Ref(Value::from(parts.join(separator))))
        },
    );
    b.method("Describe", vec![], &builtins::STRING, PUBLIC_VIRTUAL, |_| {
        Ok(Slot::Ref(Value::from("DerivedSample")))
    });
    b.finish()
}

// NameList

fn define_name_list() -> Result<TypeRef, DefineError> {
    let mut b = TypeBuilder::class("NameList");
    let items = b.field("items", &builtins::ARRAY, PRIVATE);

    b.constructor(vec![], PUBLIC, move |frame| {
        let initial = NAME_LIST_ITEMS.iter().copied().map(Value::from).collect();
        items.store_into(frame.this(), Slot::Ref(Value::array(initial)))
    });

    let get_item = b.method(
        "get_Item",
        vec![int_param("index")],
        &builtins::STRING,
        PUBLIC,
        move |frame| {
            let slot = items.load_from(frame.this())?;
            let list = slot.as_array()?;
            let index = frame.arg(0)?.as_i32()?;
            usize::try_from(index)
                .ok()
                .and_then(|i| list.get(i))
                .map(Slot::Ref)
                .ok_or_else(|| index_out_of_range(i64::from(index), list.len()))
        },
    );
    let set_item = b.method(
        "set_Item",
        vec![int_param("index"), string_param("value")],
        &builtins::VOID,
        PUBLIC,
        move |frame| {
            let slot = items.load_from(frame.this())?;
            let list = slot.as_array()?;
            let index = frame.arg(0)?.as_i32()?;
            let value = frame.arg(1)?.as_value()?.clone();
            let stored = usize::try_from(index).is_ok_and(|i| list.set(i, value));
            if stored {
                Ok(Slot::NULL)
            } else {
                Err(index_out_of_range(i64::from(index), list.len()))
            }
        },
    );
    let get_count = b.method("get_Count", vec![], &builtins::INT32, PUBLIC, move |frame| {
        let slot = items.load_from(frame.this())?;
        let len = slot.as_array()?.len();
        i32::try_from(len)
            .map(Slot::Int32)
            .map_err(|_| native("list is too long"))
    });
    b.property(
        "Item",
        &builtins::STRING,
        vec![int_param("index")],
        Some(get_item),
        Some(set_item),
    );
    b.property("Count", &builtins::INT32, vec![], Some(get_count), None);

    b.finish()
}

// Hidden

fn define_hidden() -> Result<TypeRef, DefineError> {
    let mut b = TypeBuilder::class("Hidden");
    b.constructor(vec![], PRIVATE, |_| Ok(()));
    b.method("Ping", vec![], &builtins::INT32, PUBLIC, |_| Ok(Slot::Int32(1)));
    b.finish()
}

#[cfg(test)]
mod tests;
