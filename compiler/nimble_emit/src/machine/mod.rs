//! Closure compilation and execution of verified bodies.
//!
//! [`lower`] turns each instruction into a boxed step closure once, with
//! operands (fields, methods, types, indices) captured by value. Running a
//! body is then a loop over the steps against a fresh [`Machine`]; nothing
//! is decoded per call.
//!
//! The verifier has already fixed the stack shape, so the remaining
//! run-time failures are the ones the instructions define: coercions,
//! null receivers, array bounds, and errors raised by member bodies. A
//! stack shape the verifier should have excluded surfaces as
//! [`InvokeError::InvalidProgram`] instead of a panic.

use std::fmt;

use nimble_meta::coerce::{box_slot, cast_class, unbox_any};
use nimble_meta::{
    index_out_of_range, invalid_program, wrong_arg_count, ArrayRef, InvokeError, Slot, TypeRef,
    Value,
};
use smallvec::SmallVec;
use tracing::trace;

use crate::builder::{MethodBuilder, ParamKind, ThunkSignature};
use crate::opcode::Instr;

/// One argument of a thunk invocation.
#[derive(Clone, Copy, Debug)]
pub enum ThunkArg<'a> {
    /// A boxed `object`.
    Value(&'a Value),
    /// An `object[]`, borrowed for the duration of the call.
    Array(&'a [Value]),
}

impl ThunkArg<'_> {
    fn kind(&self) -> ParamKind {
        match self {
            ThunkArg::Value(_) => ParamKind::Object,
            ThunkArg::Array(_) => ParamKind::ObjectArray,
        }
    }
}

/// Evaluation stack entry.
enum Operand<'a> {
    Slot(Slot),
    /// An `object[]` argument, not copied onto the stack.
    Array(&'a [Value]),
}

impl Operand<'_> {
    fn into_slot(self) -> Slot {
        match self {
            Operand::Slot(slot) => slot,
            Operand::Array(items) => Slot::Ref(Value::array(items.to_vec())),
        }
    }
}

type Stack<'a> = SmallVec<[Operand<'a>; 8]>;
type Args = SmallVec<[Slot; 4]>;

/// Per-invocation state.
pub(crate) struct Machine<'a> {
    args: &'a [ThunkArg<'a>],
    stack: Stack<'a>,
    locals: SmallVec<[Slot; 4]>,
    result: Option<Value>,
}

impl<'a> Machine<'a> {
    fn push(&mut self, slot: Slot) {
        self.stack.push(Operand::Slot(slot));
    }

    fn pop(&mut self) -> Result<Operand<'a>, InvokeError> {
        self.stack
            .pop()
            .ok_or_else(|| invalid_program("evaluation stack underflow"))
    }

    fn pop_slot(&mut self) -> Result<Slot, InvokeError> {
        self.pop().map(Operand::into_slot)
    }

    /// Pop a reference. Unboxed values here mean the body skipped a `box`.
    fn pop_ref(&mut self) -> Result<Value, InvokeError> {
        match self.pop_slot()? {
            Slot::Ref(value) => Ok(value),
            other => Err(invalid_program(format!(
                "expected an object reference, found unboxed {}",
                other.kind_name()
            ))),
        }
    }

    /// Pop `count` call arguments, first argument deepest.
    fn pop_args(&mut self, count: usize) -> Result<Args, InvokeError> {
        let start = self
            .stack
            .len()
            .checked_sub(count)
            .ok_or_else(|| invalid_program("evaluation stack underflow"))?;
        Ok(self.stack.drain(start..).map(Operand::into_slot).collect())
    }

    fn arg(&self, index: usize) -> Result<ThunkArg<'a>, InvokeError> {
        self.args
            .get(index)
            .copied()
            .ok_or_else(|| invalid_program(format!("argument {index} missing")))
    }

    fn local(&mut self, index: usize) -> Result<&mut Slot, InvokeError> {
        self.locals
            .get_mut(index)
            .ok_or_else(|| invalid_program(format!("local {index} missing")))
    }
}

type Step = Box<dyn for<'a> Fn(&mut Machine<'a>) -> Result<(), InvokeError> + Send + Sync>;

/// A finalized body: the callable artifact behind every thunk.
pub struct CompiledBody {
    name: String,
    signature: ThunkSignature,
    locals: Vec<TypeRef>,
    code_size: usize,
    max_stack: usize,
    steps: Vec<Step>,
}

impl CompiledBody {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &ThunkSignature {
        &self.signature
    }

    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    /// Encoded size of the body it was lowered from.
    pub fn code_size(&self) -> usize {
        self.code_size
    }

    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Execute the body.
    ///
    /// `args` must match the signature in count and kind. Returns the boxed
    /// result, or `None` for bodies that return nothing.
    pub fn run(&self, args: &[ThunkArg<'_>]) -> Result<Option<Value>, InvokeError> {
        if args.len() != self.signature.arity() {
            return Err(wrong_arg_count(&self.name, self.signature.arity(), args.len()));
        }
        for (i, (arg, kind)) in args.iter().zip(self.signature.params()).enumerate() {
            if arg.kind() != *kind {
                return Err(invalid_program(format!(
                    "argument {i} of {} must be {kind}, got {}",
                    self.name,
                    arg.kind()
                )));
            }
        }

        let mut machine = Machine {
            args,
            stack: SmallVec::with_capacity(self.max_stack),
            locals: self.locals.iter().map(|ty| ty.default_slot()).collect(),
            result: None,
        };
        for step in &self.steps {
            step(&mut machine)?;
        }
        match (machine.result, self.signature.returns_value()) {
            (Some(value), true) => Ok(Some(value)),
            (None, false) => Ok(None),
            _ => Err(invalid_program(format!("{} returned the wrong shape", self.name))),
        }
    }
}

impl fmt::Debug for CompiledBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledBody")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("locals", &self.locals)
            .field("code_size", &self.code_size)
            .field("max_stack", &self.max_stack)
            .finish_non_exhaustive()
    }
}

/// Lower a verified body into steps.
pub(crate) fn lower(body: MethodBuilder, max_stack: usize) -> CompiledBody {
    let code_size = body.code_size();
    let (name, signature, locals, code) = body.into_parts();
    let returns_value = signature.returns_value();
    let steps: Vec<Step> = code
        .into_iter()
        .map(|instr| lower_instr(instr, returns_value))
        .collect();
    trace!(body = %name, steps = steps.len(), max_stack, "lowered body");
    CompiledBody {
        name,
        signature,
        locals,
        code_size,
        max_stack,
        steps,
    }
}

fn lower_instr(instr: Instr, returns_value: bool) -> Step {
    if let Some(index) = instr.arg_index() {
        let index = usize::from(index);
        return Box::new(move |m: &mut Machine<'_>| {
            let operand = match m.arg(index)? {
                ThunkArg::Value(value) => Operand::Slot(Slot::Ref(value.clone())),
                ThunkArg::Array(items) => Operand::Array(items),
            };
            m.stack.push(operand);
            Ok(())
        });
    }
    if let Some(value) = instr.int_constant() {
        return Box::new(move |m: &mut Machine<'_>| {
            m.push(Slot::Int32(value));
            Ok(())
        });
    }
    if let Some(index) = instr.local_index() {
        let index = usize::from(index);
        return if instr.stack_effect().pops == 0 {
            Box::new(move |m: &mut Machine<'_>| {
                let slot = m.local(index)?.clone();
                m.push(slot);
                Ok(())
            })
        } else {
            Box::new(move |m: &mut Machine<'_>| {
                let slot = m.pop_slot()?;
                *m.local(index)? = slot;
                Ok(())
            })
        };
    }

    match instr {
        Instr::LdNull => Box::new(|m: &mut Machine<'_>| {
            m.push(Slot::NULL);
            Ok(())
        }),
        Instr::LdElemRef => Box::new(|m: &mut Machine<'_>| {
            let index = m.pop_slot()?.as_i32()?;
            let element = match m.pop()? {
                Operand::Array(items) => element_at(items, index)?,
                Operand::Slot(slot) => element_of(slot.as_array()?, index)?,
            };
            m.push(Slot::Ref(element));
            Ok(())
        }),
        Instr::LdFld(field) => Box::new(move |m: &mut Machine<'_>| {
            let receiver = m.pop_slot()?;
            let value = match &receiver {
                _ if field.is_static() => field.load_from(&Value::Null)?,
                Slot::Struct(value) => field.load_from_struct(value)?,
                Slot::Ref(value) => field.load_from(value)?,
                other => {
                    return Err(invalid_program(format!(
                        "ldfld {field} on unboxed {}",
                        other.kind_name()
                    )))
                }
            };
            m.push(value);
            Ok(())
        }),
        Instr::StFld(field) => Box::new(move |m: &mut Machine<'_>| {
            let value = m.pop_slot()?;
            let receiver = m.pop_slot()?;
            match &receiver {
                _ if field.is_static() => field.store_into(&Value::Null, value),
                Slot::Ref(target) => field.store_into(target, value),
                other => Err(invalid_program(format!(
                    "stfld {field} on unboxed {}",
                    other.kind_name()
                ))),
            }
        }),
        Instr::NewObj(ctor) => Box::new(move |m: &mut Machine<'_>| {
            let args = m.pop_args(ctor.params().len())?;
            let created = ctor.construct(&args)?;
            m.push(created);
            Ok(())
        }),
        Instr::Call(method) => Box::new(move |m: &mut Machine<'_>| {
            let args = m.pop_args(method.params().len())?;
            let this = if method.is_static() {
                Value::Null
            } else {
                m.pop_ref()?
            };
            let result = method.call(&this, &args)?;
            if !method.return_type().is_void() {
                m.push(result);
            }
            Ok(())
        }),
        Instr::CallVirt(method) => Box::new(move |m: &mut Machine<'_>| {
            let args = m.pop_args(method.params().len())?;
            let result = if method.is_static() {
                method.call(&Value::Null, &args)?
            } else {
                let this = m.pop_ref()?;
                method.call_virtual(&this, &args)?
            };
            if !method.return_type().is_void() {
                m.push(result);
            }
            Ok(())
        }),
        Instr::Box(ty) => Box::new(move |m: &mut Machine<'_>| {
            let slot = m.pop_slot()?;
            let boxed = box_slot(slot, ty)?;
            m.push(Slot::Ref(boxed));
            Ok(())
        }),
        Instr::UnboxAny(ty) => Box::new(move |m: &mut Machine<'_>| {
            let value = m.pop_ref()?;
            let slot = unbox_any(&value, ty)?;
            m.push(slot);
            Ok(())
        }),
        Instr::CastClass(ty) => Box::new(move |m: &mut Machine<'_>| {
            let value = m.pop_ref()?;
            let cast = cast_class(&value, ty)?;
            m.push(Slot::Ref(cast));
            Ok(())
        }),
        Instr::Pop => Box::new(|m: &mut Machine<'_>| m.pop().map(drop)),
        Instr::Ret if returns_value => Box::new(|m: &mut Machine<'_>| {
            let value = m.pop_ref()?;
            m.result = Some(value);
            Ok(())
        }),
        Instr::Ret => Box::new(|_: &mut Machine<'_>| Ok(())),
        other => Box::new(move |_: &mut Machine<'_>| {
            Err(invalid_program(format!("cannot lower {other}")))
        }),
    }
}

fn element_at(items: &[Value], index: i32) -> Result<Value, InvokeError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or_else(|| index_out_of_range(i64::from(index), items.len()))
}

fn element_of(items: &ArrayRef, index: i32) -> Result<Value, InvokeError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .ok_or_else(|| index_out_of_range(i64::from(index), items.len()))
}

#[cfg(test)]
mod tests;
