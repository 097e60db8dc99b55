use crate::instruction::{Instruction, write_body};
use crate::scope::Scope;
use num_bigint::BigInt;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Atom: a symbolic name compared by text
///
/// Atoms are used as identifiers (what `Invoke` resolves), as tags
/// (`:true`, `:false`) and as pattern labels. Cloning shares the text.
#[derive(Clone, Eq)]
pub struct Atom(Rc<str>);

impl Atom {
    pub fn new(name: impl AsRef<str>) -> Self {
        Atom(Rc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Atom {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl From<&str> for Atom {
    fn from(name: &str) -> Self {
        Atom::new(name)
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self.0)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closure: a code block paired with the scope it was created in
///
/// The captured scope never changes after creation. Invoking the closure
/// runs `body` against the caller's stack but the closure's own scope.
pub struct Closure {
    pub body: Rc<[Instruction]>,
    pub scope: Scope,
}

impl Closure {
    pub fn new(body: Rc<[Instruction]>, scope: Scope) -> Self {
        Closure { body, scope }
    }
}

// The captured scope can reach this closure again through a module frame,
// so only the body is printed.
impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Value: What the language talks about
///
/// Values are immutable; every compound payload sits behind an `Rc` so
/// duplicating a value on the stack never copies its contents.
#[derive(Debug, Clone)]
pub enum Value {
    /// Arbitrary-precision integer
    Int(BigInt),

    /// Immutable text
    Str(Rc<str>),

    /// Symbol (`:name` in source)
    Atom(Atom),

    /// Bare identifier inside a vector literal (import lists, pattern binders)
    Name(Atom),

    /// Immutable ordered sequence
    Vec(Rc<[Value]>),

    /// Code block with its captured scope
    Code(Rc<Closure>),

    /// Host-implemented operation, identified by its dispatch key
    NativeFn(Atom),
}

impl Value {
    pub fn int(n: impl Into<BigInt>) -> Self {
        Value::Int(n.into())
    }

    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn atom(name: impl AsRef<str>) -> Self {
        Value::Atom(Atom::new(name))
    }

    pub fn name(name: impl AsRef<str>) -> Self {
        Value::Name(Atom::new(name))
    }

    pub fn vec(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Vec(items.into_iter().collect())
    }

    /// `:true` or `:false`
    pub fn boolean(b: bool) -> Self {
        Value::atom(if b { "true" } else { "false" })
    }

    /// Interpret `:true` / `:false`; anything else is not a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Atom(a) if a == "true" => Some(true),
            Value::Atom(a) if a == "false" => Some(false),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::Str(_) => "Str",
            Value::Atom(_) => "Atom",
            Value::Name(_) => "Name",
            Value::Vec(_) => "Vec",
            Value::Code(_) => "Code",
            Value::NativeFn(_) => "NativeFn",
        }
    }
}

// Structural for data, identity for code.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Atom(a), Value::Atom(b)) => a == b,
            (Value::Name(a), Value::Name(b)) => a == b,
            (Value::Vec(a), Value::Vec(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::Code(a), Value::Code(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFn(a), Value::NativeFn(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write_quoted(f, s),
            Value::Atom(a) => write!(f, ":{}", a),
            Value::Name(a) => write!(f, "{}", a),
            Value::Vec(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Value::Code(closure) => write_body(f, &closure.body),
            Value::NativeFn(name) => write!(f, "<native {}>", name),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}
