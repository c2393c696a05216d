//! Body verification by stack simulation.
//!
//! Thunk bodies are straight-line code, so one forward pass is enough:
//! track the stack depth, check every slot and argument index against the
//! declared tables, and require exactly one `ret`, as the last instruction,
//! with the depth the signature expects.

use crate::builder::MethodBuilder;
use crate::errors::EmitError;
use crate::opcode::Instr;

/// Check `body` and return the maximum stack depth it reaches.
pub(crate) fn verify(body: &MethodBuilder) -> Result<usize, EmitError> {
    let arity = body.signature().arity();
    let declared = body.locals().len();
    let expected_at_ret = usize::from(body.signature().returns_value());

    let mut depth = 0usize;
    let mut max_depth = 0usize;
    let mut offset = 0usize;
    let mut returned = false;

    for instr in body.code() {
        if returned {
            return Err(EmitError::UnreachableCode { offset });
        }
        if let Some(index) = instr.arg_index() {
            if usize::from(index) >= arity {
                return Err(EmitError::ArgumentOutOfRange {
                    offset,
                    index,
                    arity,
                });
            }
        }
        if let Some(index) = instr.local_index() {
            if usize::from(index) >= declared {
                return Err(EmitError::LocalOutOfRange {
                    offset,
                    index,
                    declared,
                });
            }
        }

        if *instr == Instr::Ret {
            if depth != expected_at_ret {
                return Err(EmitError::StackImbalance {
                    offset,
                    depth,
                    expected: expected_at_ret,
                });
            }
            returned = true;
        } else {
            let effect = instr.stack_effect();
            depth = depth
                .checked_sub(effect.pops)
                .ok_or(EmitError::StackUnderflow {
                    offset,
                    instr: instr.mnemonic(),
                    depth,
                })?
                + effect.pushes;
            max_depth = max_depth.max(depth);
        }
        offset += instr.encoded_len();
    }

    if returned {
        Ok(max_depth)
    } else {
        Err(EmitError::MissingReturn)
    }
}
