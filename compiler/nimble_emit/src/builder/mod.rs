//! Method bodies under construction.
//!
//! A [`MethodBuilder`] records a signature, a local table and a flat
//! instruction list. It does no checking while recording; everything is
//! verified once, in [`MethodBuilder::finalize`].

use std::fmt::{self, Write as _};

use nimble_meta::TypeRef;
use smallvec::SmallVec;

use crate::errors::EmitError;
use crate::machine::{self, CompiledBody};
use crate::opcode::Instr;
use crate::verify;

/// Shape of one thunk parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// A single boxed `object`.
    Object,
    /// An `object[]`.
    ObjectArray,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Object => f.write_str("object"),
            ParamKind::ObjectArray => f.write_str("object[]"),
        }
    }
}

/// Uniform calling convention of a thunk: boxed parameters, and a boxed
/// result or nothing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ThunkSignature {
    params: SmallVec<[ParamKind; 3]>,
    returns_value: bool,
}

impl ThunkSignature {
    pub fn new(params: &[ParamKind], returns_value: bool) -> Self {
        ThunkSignature {
            params: SmallVec::from_slice(params),
            returns_value,
        }
    }

    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn returns_value(&self) -> bool {
        self.returns_value
    }
}

impl fmt::Display for ThunkSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(if self.returns_value {
            ") -> object"
        } else {
            ") -> void"
        })
    }
}

/// A body being emitted.
pub struct MethodBuilder {
    name: String,
    signature: ThunkSignature,
    locals: Vec<TypeRef>,
    code: Vec<Instr>,
}

impl MethodBuilder {
    pub fn new(name: impl Into<String>, signature: ThunkSignature) -> Self {
        MethodBuilder {
            name: name.into(),
            signature,
            locals: Vec::new(),
            code: Vec::new(),
        }
    }

    /// Add a local of type `ty`, returning its slot index.
    pub fn declare_local(&mut self, ty: TypeRef) -> Result<u16, EmitError> {
        let index = u16::try_from(self.locals.len()).map_err(|_| EmitError::TooManyLocals {
            count: self.locals.len() + 1,
        })?;
        self.locals.push(ty);
        Ok(index)
    }

    pub fn emit(&mut self, instr: Instr) {
        self.code.push(instr);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &ThunkSignature {
        &self.signature
    }

    pub fn locals(&self) -> &[TypeRef] {
        &self.locals
    }

    pub fn code(&self) -> &[Instr] {
        &self.code
    }

    /// Encoded size of the body in bytes.
    pub fn code_size(&self) -> usize {
        self.code.iter().map(Instr::encoded_len).sum()
    }

    /// Listing with byte offsets, one instruction per line.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, ".method {} {}", self.name, self.signature);
        if !self.locals.is_empty() {
            out.push_str(".locals (");
            for (i, ty) in self.locals.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{ty}");
            }
            out.push_str(")\n");
        }
        let mut offset = 0;
        for instr in &self.code {
            let _ = writeln!(out, "IL_{offset:04x}: {instr}");
            offset += instr.encoded_len();
        }
        out
    }

    /// Verify the body and lower it into a callable [`CompiledBody`].
    pub fn finalize(self) -> Result<CompiledBody, EmitError> {
        let max_stack = verify::verify(&self)?;
        Ok(machine::lower(self, max_stack))
    }

    pub(crate) fn into_parts(self) -> (String, ThunkSignature, Vec<TypeRef>, Vec<Instr>) {
        (self.name, self.signature, self.locals, self.code)
    }
}

impl fmt::Debug for MethodBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodBuilder")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("locals", &self.locals.len())
            .field("code", &self.code.len())
            .finish()
    }
}
