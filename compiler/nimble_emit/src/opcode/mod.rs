//! The thunk instruction set.
//!
//! A small stack-machine subset of CIL. Operand-carrying forms come in up
//! to three encodings (inline, short, long) with the encoded sizes CIL
//! uses; [`Instr::load_arg`] and friends pick the smallest one.

use std::fmt;

use nimble_meta::{CtorRef, FieldRef, MethodRef, TypeRef};

/// One instruction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Instr {
    LdArg0,
    LdArg1,
    LdArg2,
    LdArg3,
    LdArgS(u8),
    LdArg(u16),

    LdcI4M1,
    LdcI4_0,
    LdcI4_1,
    LdcI4_2,
    LdcI4_3,
    LdcI4_4,
    LdcI4_5,
    LdcI4_6,
    LdcI4_7,
    LdcI4_8,
    LdcI4S(i8),
    LdcI4(i32),

    LdNull,

    LdLoc0,
    LdLoc1,
    LdLoc2,
    LdLoc3,
    LdLocS(u8),
    LdLoc(u16),

    StLoc0,
    StLoc1,
    StLoc2,
    StLoc3,
    StLocS(u8),
    StLoc(u16),

    /// Pop an index and an object array, push the element.
    LdElemRef,
    /// Pop a receiver, push the field value. Static fields ignore the receiver.
    LdFld(FieldRef),
    /// Pop a value and a receiver, store the value. Static fields ignore the receiver.
    StFld(FieldRef),
    /// Pop the constructor arguments, push the new instance.
    NewObj(CtorRef),
    /// Non-virtual call.
    Call(MethodRef),
    /// Call through the receiver's runtime type, with a null check.
    CallVirt(MethodRef),

    Box(TypeRef),
    UnboxAny(TypeRef),
    CastClass(TypeRef),

    Pop,
    Ret,
}

/// Number of stack entries an instruction consumes and produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackEffect {
    pub pops: usize,
    pub pushes: usize,
}

impl StackEffect {
    const fn new(pops: usize, pushes: usize) -> Self {
        StackEffect { pops, pushes }
    }
}

impl Instr {
    /// Smallest `ldarg` form for `index`.
    pub fn load_arg(index: u16) -> Instr {
        match index {
            0 => Instr::LdArg0,
            1 => Instr::LdArg1,
            2 => Instr::LdArg2,
            3 => Instr::LdArg3,
            _ => u8::try_from(index).map_or(Instr::LdArg(index), Instr::LdArgS),
        }
    }

    /// Smallest `ldc.i4` form for `value`.
    pub fn load_int(value: i32) -> Instr {
        match value {
            -1 => Instr::LdcI4M1,
            0 => Instr::LdcI4_0,
            1 => Instr::LdcI4_1,
            2 => Instr::LdcI4_2,
            3 => Instr::LdcI4_3,
            4 => Instr::LdcI4_4,
            5 => Instr::LdcI4_5,
            6 => Instr::LdcI4_6,
            7 => Instr::LdcI4_7,
            8 => Instr::LdcI4_8,
            _ => i8::try_from(value).map_or(Instr::LdcI4(value), Instr::LdcI4S),
        }
    }

    /// Smallest `ldloc` form for `index`.
    pub fn load_local(index: u16) -> Instr {
        match index {
            0 => Instr::LdLoc0,
            1 => Instr::LdLoc1,
            2 => Instr::LdLoc2,
            3 => Instr::LdLoc3,
            _ => u8::try_from(index).map_or(Instr::LdLoc(index), Instr::LdLocS),
        }
    }

    /// Smallest `stloc` form for `index`.
    pub fn store_local(index: u16) -> Instr {
        match index {
            0 => Instr::StLoc0,
            1 => Instr::StLoc1,
            2 => Instr::StLoc2,
            3 => Instr::StLoc3,
            _ => u8::try_from(index).map_or(Instr::StLoc(index), Instr::StLocS),
        }
    }

    /// Argument index read by an `ldarg` form.
    pub fn arg_index(&self) -> Option<u16> {
        match *self {
            Instr::LdArg0 => Some(0),
            Instr::LdArg1 => Some(1),
            Instr::LdArg2 => Some(2),
            Instr::LdArg3 => Some(3),
            Instr::LdArgS(i) => Some(u16::from(i)),
            Instr::LdArg(i) => Some(i),
            _ => None,
        }
    }

    /// Local slot read by an `ldloc` form or written by an `stloc` form.
    pub fn local_index(&self) -> Option<u16> {
        match *self {
            Instr::LdLoc0 | Instr::StLoc0 => Some(0),
            Instr::LdLoc1 | Instr::StLoc1 => Some(1),
            Instr::LdLoc2 | Instr::StLoc2 => Some(2),
            Instr::LdLoc3 | Instr::StLoc3 => Some(3),
            Instr::LdLocS(i) | Instr::StLocS(i) => Some(u16::from(i)),
            Instr::LdLoc(i) | Instr::StLoc(i) => Some(i),
            _ => None,
        }
    }

    /// Constant pushed by an `ldc.i4` form.
    pub fn int_constant(&self) -> Option<i32> {
        match *self {
            Instr::LdcI4M1 => Some(-1),
            Instr::LdcI4_0 => Some(0),
            Instr::LdcI4_1 => Some(1),
            Instr::LdcI4_2 => Some(2),
            Instr::LdcI4_3 => Some(3),
            Instr::LdcI4_4 => Some(4),
            Instr::LdcI4_5 => Some(5),
            Instr::LdcI4_6 => Some(6),
            Instr::LdcI4_7 => Some(7),
            Instr::LdcI4_8 => Some(8),
            Instr::LdcI4S(v) => Some(i32::from(v)),
            Instr::LdcI4(v) => Some(v),
            _ => None,
        }
    }

    /// Size in bytes of the CIL encoding.
    pub fn encoded_len(&self) -> usize {
        match self {
            Instr::LdArgS(_) | Instr::LdcI4S(_) | Instr::LdLocS(_) | Instr::StLocS(_) => 2,
            // Two-byte `0xFE` prefix plus a 16-bit index.
            Instr::LdArg(_) | Instr::LdLoc(_) | Instr::StLoc(_) => 4,
            Instr::LdcI4(_)
            | Instr::LdFld(_)
            | Instr::StFld(_)
            | Instr::NewObj(_)
            | Instr::Call(_)
            | Instr::CallVirt(_)
            | Instr::Box(_)
            | Instr::UnboxAny(_)
            | Instr::CastClass(_) => 5,
            _ => 1,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instr::LdArg0 => "ldarg.0",
            Instr::LdArg1 => "ldarg.1",
            Instr::LdArg2 => "ldarg.2",
            Instr::LdArg3 => "ldarg.3",
            Instr::LdArgS(_) => "ldarg.s",
            Instr::LdArg(_) => "ldarg",
            Instr::LdcI4M1 => "ldc.i4.m1",
            Instr::LdcI4_0 => "ldc.i4.0",
            Instr::LdcI4_1 => "ldc.i4.1",
            Instr::LdcI4_2 => "ldc.i4.2",
            Instr::LdcI4_3 => "ldc.i4.3",
            Instr::LdcI4_4 => "ldc.i4.4",
            Instr::LdcI4_5 => "ldc.i4.5",
            Instr::LdcI4_6 => "ldc.i4.6",
            Instr::LdcI4_7 => "ldc.i4.7",
            Instr::LdcI4_8 => "ldc.i4.8",
            Instr::LdcI4S(_) => "ldc.i4.s",
            Instr::LdcI4(_) => "ldc.i4",
            Instr::LdNull => "ldnull",
            Instr::LdLoc0 => "ldloc.0",
            Instr::LdLoc1 => "ldloc.1",
            Instr::LdLoc2 => "ldloc.2",
            Instr::LdLoc3 => "ldloc.3",
            Instr::LdLocS(_) => "ldloc.s",
            Instr::LdLoc(_) => "ldloc",
            Instr::StLoc0 => "stloc.0",
            Instr::StLoc1 => "stloc.1",
            Instr::StLoc2 => "stloc.2",
            Instr::StLoc3 => "stloc.3",
            Instr::StLocS(_) => "stloc.s",
            Instr::StLoc(_) => "stloc",
            Instr::LdElemRef => "ldelem.ref",
            Instr::LdFld(_) => "ldfld",
            Instr::StFld(_) => "stfld",
            Instr::NewObj(_) => "newobj",
            Instr::Call(_) => "call",
            Instr::CallVirt(_) => "callvirt",
            Instr::Box(_) => "box",
            Instr::UnboxAny(_) => "unbox.any",
            Instr::CastClass(_) => "castclass",
            Instr::Pop => "pop",
            Instr::Ret => "ret",
        }
    }

    /// Stack effect of the instruction.
    ///
    /// `ret` reports no effect: what it pops depends on the signature of
    /// the enclosing body, which the verifier checks separately.
    pub fn stack_effect(&self) -> StackEffect {
        match self {
            Instr::StLoc0
            | Instr::StLoc1
            | Instr::StLoc2
            | Instr::StLoc3
            | Instr::StLocS(_)
            | Instr::StLoc(_)
            | Instr::Pop => StackEffect::new(1, 0),
            Instr::LdElemRef => StackEffect::new(2, 1),
            Instr::LdFld(_) | Instr::Box(_) | Instr::UnboxAny(_) | Instr::CastClass(_) => {
                StackEffect::new(1, 1)
            }
            Instr::StFld(_) => StackEffect::new(2, 0),
            Instr::NewObj(ctor) => StackEffect::new(ctor.params().len(), 1),
            Instr::Call(method) | Instr::CallVirt(method) => {
                let receiver = usize::from(!method.is_static());
                let result = usize::from(!method.return_type().is_void());
                StackEffect::new(method.params().len() + receiver, result)
            }
            Instr::Ret => StackEffect::new(0, 0),
            _ => StackEffect::new(0, 1),
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())?;
        match self {
            Instr::LdArgS(_) | Instr::LdArg(_) => {
                if let Some(index) = self.arg_index() {
                    write!(f, " {index}")?;
                }
            }
            Instr::LdLocS(_) | Instr::LdLoc(_) | Instr::StLocS(_) | Instr::StLoc(_) => {
                if let Some(index) = self.local_index() {
                    write!(f, " {index}")?;
                }
            }
            Instr::LdcI4S(v) => write!(f, " {v}")?,
            Instr::LdcI4(v) => write!(f, " {v}")?,
            Instr::LdFld(field) | Instr::StFld(field) => {
                write!(f, " {} {field}", field.field_type())?;
            }
            Instr::NewObj(ctor) => write!(f, " {ctor}")?,
            Instr::Call(method) | Instr::CallVirt(method) => {
                write!(f, " {} {method}", method.return_type())?;
            }
            Instr::Box(ty) | Instr::UnboxAny(ty) | Instr::CastClass(ty) => write!(f, " {ty}")?,
            _ => {}
        }
        Ok(())
    }
}
