//! Thunk kinds and the compile steps they share.
//!
//! | Kind | Signature |
//! |---|---|
//! | constructor | `(object[] args) -> object` |
//! | method | `(object instance, object[] args) -> object` |
//! | field getter | `(object instance) -> object` |
//! | field setter | `(object instance, object value) -> void` |

use std::fmt;

use nimble_emit::{CompiledBody, Emitter, ParamKind, ThunkSignature};
use nimble_meta::ParamInfo;
use tracing::{debug, trace};

use crate::errors::CompileError;

/// Which calling convention a thunk exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThunkKind {
    Constructor,
    Method,
    FieldGetter,
    FieldSetter,
}

impl ThunkKind {
    pub fn signature(self) -> ThunkSignature {
        match self {
            ThunkKind::Constructor => ThunkSignature::new(&[ParamKind::ObjectArray], true),
            ThunkKind::Method => {
                ThunkSignature::new(&[ParamKind::Object, ParamKind::ObjectArray], true)
            }
            ThunkKind::FieldGetter => ThunkSignature::new(&[ParamKind::Object], true),
            ThunkKind::FieldSetter => {
                ThunkSignature::new(&[ParamKind::Object, ParamKind::Object], false)
            }
        }
    }

    /// A fresh emitter for a thunk of this kind over `member`.
    pub(crate) fn emitter(self, member: impl fmt::Display) -> Emitter {
        Emitter::new(format!("{self} {member}"), self.signature())
    }

    /// Finalize the body, logging it on the way out.
    pub(crate) fn finish(
        self,
        emitter: Emitter,
        member: impl fmt::Display,
    ) -> Result<CompiledBody, CompileError> {
        trace!(
            thunk = %self,
            %member,
            "emitted body\n{}",
            emitter.builder().disassemble()
        );
        let body = emitter.finalize().map_err(|source| CompileError::Emit {
            member: member.to_string(),
            source,
        })?;
        debug!(
            thunk = %self,
            %member,
            code_size = body.code_size(),
            locals = body.local_count(),
            max_stack = body.max_stack(),
            "compiled thunk"
        );
        Ok(body)
    }
}

impl fmt::Display for ThunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThunkKind::Constructor => "constructor",
            ThunkKind::Method => "method",
            ThunkKind::FieldGetter => "field getter",
            ThunkKind::FieldSetter => "field setter",
        })
    }
}

/// Check that `params` can be passed through an `object[]`, returning
/// their count.
///
/// The count leaves room for one extra local, so `count + 1` always fits
/// a slot index.
pub(crate) fn checked_params(
    member: impl fmt::Display,
    params: &[ParamInfo],
) -> Result<u16, CompileError> {
    if let Some(param) = params.iter().find(|p| p.is_by_ref()) {
        return Err(CompileError::ByRefParameter {
            member: member.to_string(),
            param: param.name().to_string(),
        });
    }
    u16::try_from(params.len())
        .ok()
        .filter(|&count| count < u16::MAX)
        .ok_or_else(|| CompileError::TooManyParameters {
            member: member.to_string(),
            count: params.len(),
        })
}
