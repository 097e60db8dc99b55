//! Failure taxonomy
//!
//! Every way a run can terminate early. None of these are recoverable from
//! inside the language: the engine stops at the first one and reports it
//! together with the offending instruction.

use crate::value::Atom;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("stack underflow: needed {needed} value(s), found {available}")]
    StackUnderflow { needed: usize, available: usize },

    #[error("{op}: expected {expected}, got {found}")]
    TypeMismatch {
        op: String,
        expected: String,
        found: String,
    },

    #[error("unbound name `{0}`")]
    UnboundName(Atom),

    #[error("unknown module `{0}`")]
    UnknownModule(Atom),

    #[error("module `{module}` has no export `{name}`")]
    UnknownExport { module: Atom, name: Atom },

    #[error("no clause matched the stack")]
    NoMatchingClause,

    #[error("{op}: division by zero")]
    DivisionByZero { op: String },

    /// The host output channel refused a write
    #[error("output failed: {0}")]
    Output(String),

    /// Raised by an instrumentation hook, never by the language itself
    #[error("cancelled by host: {0}")]
    HostCancellation(String),
}

impl ErrorKind {
    pub fn type_mismatch(
        op: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        ErrorKind::TypeMismatch {
            op: op.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Short stable name of the failure kind, for diagnostics and exit codes
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::StackUnderflow { .. } => "StackUnderflow",
            ErrorKind::TypeMismatch { .. } => "TypeMismatch",
            ErrorKind::UnboundName(_) => "UnboundName",
            ErrorKind::UnknownModule(_) => "UnknownModule",
            ErrorKind::UnknownExport { .. } => "UnknownExport",
            ErrorKind::NoMatchingClause => "NoMatchingClause",
            ErrorKind::DivisionByZero { .. } => "DivisionByZero",
            ErrorKind::Output(_) => "Output",
            ErrorKind::HostCancellation(_) => "HostCancellation",
        }
    }
}
