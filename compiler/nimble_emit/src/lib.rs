//! Code emission for Nimble thunks.
//!
//! The pipeline for one thunk body:
//!
//! ```text
//! Emitter ──► MethodBuilder ──► verify ──► lower ──► CompiledBody::run
//! (choose      (signature,       (stack      (one boxed
//!  encodings)   locals, code)     depth,      closure per
//!                                 ranges)     instruction)
//! ```
//!
//! Bodies are verified before they exist as callables, so emitter misuse
//! is always an [`EmitError`] at finalization and never a run-time surprise.

mod builder;
mod emitter;
mod errors;
mod machine;
mod opcode;
mod verify;

pub use builder::{MethodBuilder, ParamKind, ThunkSignature};
pub use emitter::Emitter;
pub use errors::EmitError;
pub use machine::{CompiledBody, ThunkArg};
pub use opcode::{Instr, StackEffect};
