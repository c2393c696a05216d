//! Emission errors.
//!
//! Every variant is a defect in the code that drove the emitter, found
//! while finalizing a body. Offsets are byte offsets of the offending
//! instruction in the encoded body, as printed by
//! [`MethodBuilder::disassemble`](crate::MethodBuilder::disassemble).

use std::fmt;

/// A body was rejected by the verifier or misused during emission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmitError {
    /// Locals were declared a second time.
    LocalsRedeclared,
    /// More locals than a 16-bit slot index can address.
    TooManyLocals { count: usize },
    /// A load or store names a slot that was never declared.
    LocalOutOfRange {
        offset: usize,
        index: u16,
        declared: usize,
    },
    /// An `ldarg` names a parameter the signature does not have.
    ArgumentOutOfRange {
        offset: usize,
        index: u16,
        arity: usize,
    },
    /// An instruction pops more entries than the stack holds.
    StackUnderflow {
        offset: usize,
        instr: &'static str,
        depth: usize,
    },
    /// `ret` reached with the wrong number of entries on the stack.
    StackImbalance {
        offset: usize,
        depth: usize,
        expected: usize,
    },
    /// Instructions follow the `ret`.
    UnreachableCode { offset: usize },
    /// The body does not end in `ret`.
    MissingReturn,
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::LocalsRedeclared => f.write_str("locals declared more than once"),
            EmitError::TooManyLocals { count } => {
                write!(f, "{count} locals exceed the addressable slot range")
            }
            EmitError::LocalOutOfRange {
                offset,
                index,
                declared,
            } => write!(
                f,
                "IL_{offset:04x}: local {index} out of range ({declared} declared)"
            ),
            EmitError::ArgumentOutOfRange {
                offset,
                index,
                arity,
            } => write!(
                f,
                "IL_{offset:04x}: argument {index} out of range (arity {arity})"
            ),
            EmitError::StackUnderflow {
                offset,
                instr,
                depth,
            } => write!(
                f,
                "IL_{offset:04x}: {instr} underflows the stack (depth {depth})"
            ),
            EmitError::StackImbalance {
                offset,
                depth,
                expected,
            } => write!(
                f,
                "IL_{offset:04x}: ret with stack depth {depth}, expected {expected}"
            ),
            EmitError::UnreachableCode { offset } => {
                write!(f, "IL_{offset:04x}: unreachable code after ret")
            }
            EmitError::MissingReturn => f.write_str("body does not end in ret"),
        }
    }
}

impl std::error::Error for EmitError {}
