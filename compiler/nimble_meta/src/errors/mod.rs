//! Error types for type definition and member invocation.
//!
//! Two families live here:
//!
//! - [`DefineError`]: a type definition handed to [`TypeBuilder::finish`]
//!   is malformed. Raised once, while the host is describing its types.
//! - [`InvokeError`]: a member call failed at run time. Shared by the
//!   reflective slow path in this crate and by compiled thunks, so both
//!   paths report the same failure for the same bad input.
//!
//! Factory functions are the public construction API; they keep messages
//! uniform across call sites.
//!
//! [`TypeBuilder::finish`]: crate::TypeBuilder::finish

use std::fmt;

/// Which accessor of a property was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Accessor {
    Getter,
    Setter,
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Getter => f.write_str("getter"),
            Accessor::Setter => f.write_str("setter"),
        }
    }
}

// InvokeError

/// Failure raised while invoking a member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvokeError {
    /// A boxed value could not be coerced to the expected type.
    InvalidCast { expected: String, actual: String },
    /// A null receiver or null value where an instance was required.
    NullReference { context: String },
    /// The argument array does not match the member's parameter count.
    ArgumentCount {
        member: String,
        expected: usize,
        got: usize,
    },
    /// An array or argument index was outside its bounds.
    IndexOutOfRange { index: i64, len: usize },
    /// The property has no accessor of the requested kind.
    MissingAccessor { property: String, accessor: Accessor },
    /// A compiled body reached a state its verifier should have excluded.
    InvalidProgram { message: String },
    /// Raised by a member body.
    Native { message: String },
}

impl InvokeError {
    /// Whether this error came from coercing a value to a declared type.
    pub fn is_coercion(&self) -> bool {
        matches!(
            self,
            InvokeError::InvalidCast { .. } | InvokeError::NullReference { .. }
        )
    }
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::InvalidCast { expected, actual } => {
                write!(f, "invalid cast: expected {expected}, got {actual}")
            }
            InvokeError::NullReference { context } => {
                write!(f, "null reference: {context}")
            }
            InvokeError::ArgumentCount {
                member,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{member} expects {expected} {arg_word}, got {got}")
            }
            InvokeError::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            InvokeError::MissingAccessor { property, accessor } => {
                write!(f, "property {property} has no {accessor}")
            }
            InvokeError::InvalidProgram { message } => write!(f, "invalid program: {message}"),
            InvokeError::Native { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for InvokeError {}

/// A value of runtime type `actual` cannot be viewed as `expected`.
#[cold]
pub fn invalid_cast(expected: impl fmt::Display, actual: impl fmt::Display) -> InvokeError {
    InvokeError::InvalidCast {
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

/// A null value was used where an instance is required.
#[cold]
pub fn null_reference(context: impl fmt::Display) -> InvokeError {
    InvokeError::NullReference {
        context: context.to_string(),
    }
}

/// An argument array of the wrong length reached `member`.
#[cold]
pub fn wrong_arg_count(member: impl fmt::Display, expected: usize, got: usize) -> InvokeError {
    InvokeError::ArgumentCount {
        member: member.to_string(),
        expected,
        got,
    }
}

/// `index` is outside `0..len`.
#[cold]
pub fn index_out_of_range(index: i64, len: usize) -> InvokeError {
    InvokeError::IndexOutOfRange { index, len }
}

/// The property has no accessor of the requested kind.
#[cold]
pub fn missing_accessor(property: impl fmt::Display, accessor: Accessor) -> InvokeError {
    InvokeError::MissingAccessor {
        property: property.to_string(),
        accessor,
    }
}

/// A compiled body violated one of its own invariants.
#[cold]
pub fn invalid_program(message: impl Into<String>) -> InvokeError {
    InvokeError::InvalidProgram {
        message: message.into(),
    }
}

/// An error raised by a member body.
#[cold]
pub fn native(message: impl Into<String>) -> InvokeError {
    InvokeError::Native {
        message: message.into(),
    }
}

// DefineError

/// A type definition was rejected by [`TypeBuilder::finish`](crate::TypeBuilder::finish).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefineError {
    /// A value type contains itself, directly or through an unfinished value type.
    RecursiveValueType { type_name: String, field: String },
    /// The base type is not a class.
    InvalidBase { type_name: String, base: String },
    /// The base type was still being defined when the derived type was declared.
    UnfinishedBase { type_name: String, base: String },
}

impl fmt::Display for DefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefineError::RecursiveValueType { type_name, field } => {
                write!(
                    f,
                    "value type {type_name} contains itself through field {field}"
                )
            }
            DefineError::InvalidBase { type_name, base } => {
                write!(f, "{type_name} cannot derive from non-class type {base}")
            }
            DefineError::UnfinishedBase { type_name, base } => {
                write!(f, "{type_name} derives from {base}, which is not finished")
            }
        }
    }
}

impl std::error::Error for DefineError {}
