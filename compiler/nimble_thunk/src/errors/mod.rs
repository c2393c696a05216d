//! Construction-time errors.
//!
//! Raised before any thunk exists: a member that cannot be found, a
//! signature the calling convention cannot express, or a body the emitter
//! rejected. Invocation failures are [`nimble_meta::InvokeError`].

use std::fmt;

use nimble_emit::EmitError;

/// Kind of member a lookup was for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Constructor,
    Method,
    Field,
    Property,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemberKind::Constructor => "constructor",
            MemberKind::Method => "method",
            MemberKind::Field => "field",
            MemberKind::Property => "property",
        })
    }
}

/// A thunk could not be built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    /// No member matched the lookup.
    MemberNotFound {
        type_name: String,
        kind: MemberKind,
        name: String,
    },
    /// The type has no public parameterless constructor.
    NoPublicConstructor { type_name: String },
    /// A parameter is passed by reference.
    ByRefParameter { member: String, param: String },
    /// More parameters than a local slot table can hold.
    TooManyParameters { member: String, count: usize },
    /// The emitted body failed verification.
    Emit { member: String, source: EmitError },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::MemberNotFound {
                type_name,
                kind,
                name,
            } => write!(f, "{type_name} has no {kind} {name}"),
            CompileError::NoPublicConstructor { type_name } => {
                write!(f, "{type_name} has no public parameterless constructor")
            }
            CompileError::ByRefParameter { member, param } => write!(
                f,
                "{member}: by-reference parameter {param} is not supported"
            ),
            CompileError::TooManyParameters { member, count } => {
                write!(f, "{member}: {count} parameters exceed the local slot limit")
            }
            CompileError::Emit { member, source } => {
                write!(f, "{member}: invalid thunk body: {source}")
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Emit { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// `type_name` has no `kind` called `name`.
#[cold]
pub fn member_not_found(
    type_name: impl fmt::Display,
    kind: MemberKind,
    name: impl Into<String>,
) -> CompileError {
    CompileError::MemberNotFound {
        type_name: type_name.to_string(),
        kind,
        name: name.into(),
    }
}

/// `type_name` cannot be constructed without arguments by outside callers.
#[cold]
pub fn no_public_constructor(type_name: impl fmt::Display) -> CompileError {
    CompileError::NoPublicConstructor {
        type_name: type_name.to_string(),
    }
}
