//! Instruction set
//!
//! Programs are flat sequences of three instructions; code blocks nest a
//! sequence inside `PushCode`. Bodies are shared (`Rc<[Instruction]>`) so a
//! closure created from the same literal many times never copies its code.

use crate::value::{Atom, Value};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Push a literal value
    PushLiteral(Value),

    /// Push a closure over the current scope
    PushCode(Rc<[Instruction]>),

    /// Resolve a name and run what it is bound to
    Invoke(Atom),
}

impl Instruction {
    pub fn literal(value: Value) -> Self {
        Instruction::PushLiteral(value)
    }

    pub fn code(body: impl IntoIterator<Item = Instruction>) -> Self {
        Instruction::PushCode(body.into_iter().collect())
    }

    pub fn invoke(name: impl AsRef<str>) -> Self {
        Instruction::Invoke(Atom::new(name))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::PushLiteral(value) => write!(f, "{}", value),
            Instruction::PushCode(body) => write_body(f, body),
            Instruction::Invoke(name) => write!(f, "{}", name),
        }
    }
}

/// Render a code body as `{ i1 i2 ... }`
pub(crate) fn write_body(f: &mut fmt::Formatter<'_>, body: &[Instruction]) -> fmt::Result {
    if body.is_empty() {
        return f.write_str("{}");
    }
    f.write_str("{ ")?;
    for instruction in body {
        write!(f, "{} ", instruction)?;
    }
    f.write_str("}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let program = Instruction::code([
            Instruction::invoke("dup"),
            Instruction::literal(Value::int(1)),
            Instruction::invoke("+"),
        ]);
        assert_eq!(program.to_string(), "{ dup 1 + }");
        assert_eq!(Instruction::code([]).to_string(), "{}");
    }

    #[test]
    fn test_structural_equality() {
        let a = Instruction::code([Instruction::invoke("x")]);
        let b = Instruction::code([Instruction::invoke("x")]);
        assert_eq!(a, b);
        assert_ne!(a, Instruction::invoke("x"));
    }
}
