//! Host builtin contract
//!
//! Every native operation is a `Builtin`: a name, the types of the values it
//! consumes (deepest first) and a plain function. The engine checks the
//! declared inputs against the stack before anything is popped, so an
//! operation body only ever sees arguments of the shape it asked for and
//! every builtin reports `StackUnderflow` / `TypeMismatch` the same way.
//!
//! A builtin either finishes on the spot (`Flow::Next`) or asks the engine to
//! run a code body next (`Flow::Call`), optionally with a `Resume` step that
//! post-processes the stack once that body returns.

use gurk_core::{Atom, Closure, ErrorKind, Instruction, ModuleRegistry, Scope, Stack, Value};
use num_bigint::BigInt;
use std::io::Write;
use std::rc::Rc;

/// Declared input type of a builtin argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ty {
    Any,
    Int,
    Str,
    Atom,
    Vec,
    Code,
    /// `:atom` or a bare name from a vector literal
    Symbol,
}

impl Ty {
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Ty::Any, _)
                | (Ty::Int, Value::Int(_))
                | (Ty::Str, Value::Str(_))
                | (Ty::Atom, Value::Atom(_))
                | (Ty::Vec, Value::Vec(_))
                | (Ty::Code, Value::Code(_))
                | (Ty::Symbol, Value::Atom(_) | Value::Name(_))
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Ty::Any => "Any",
            Ty::Int => "Int",
            Ty::Str => "Str",
            Ty::Atom => "Atom",
            Ty::Vec => "Vec",
            Ty::Code => "Code",
            Ty::Symbol => "Symbol",
        }
    }
}

pub type Op = fn(&mut Native<'_>) -> Result<Flow, ErrorKind>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    /// Consumed values, deepest first
    pub inputs: &'static [Ty],
    pub op: Op,
}

impl Builtin {
    pub const fn new(name: &'static str, inputs: &'static [Ty], op: Op) -> Self {
        Builtin { name, inputs, op }
    }

    /// Verify depth and argument types without popping
    pub fn check(&self, stack: &Stack) -> Result<(), ErrorKind> {
        let values = stack
            .peek_n(self.inputs.len())
            .ok_or(ErrorKind::StackUnderflow {
                needed: self.inputs.len(),
                available: stack.len(),
            })?;
        for (ty, value) in self.inputs.iter().zip(values) {
            if !ty.accepts(value) {
                return Err(ErrorKind::type_mismatch(
                    self.name,
                    ty.name(),
                    value.type_name(),
                ));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .finish()
    }
}

/// What a builtin sees while it runs
///
/// `stack` is the stack with the declared inputs already removed; results
/// are pushed onto it. `scope` may be replaced (`def`, `import`).
pub struct Native<'a> {
    pub name: &'static str,
    args: Vec<Value>,
    pub stack: Stack,
    pub scope: Scope,
    pub modules: &'a ModuleRegistry,
    pub output: &'a mut dyn Write,
}

impl<'a> Native<'a> {
    pub fn new(
        name: &'static str,
        args: Vec<Value>,
        stack: Stack,
        scope: Scope,
        modules: &'a ModuleRegistry,
        output: &'a mut dyn Write,
    ) -> Self {
        Native {
            name,
            args,
            stack,
            scope,
            modules,
            output,
        }
    }

    /// Take the popped arguments, deepest first
    pub fn take_args<const N: usize>(&mut self) -> Result<[Value; N], ErrorKind> {
        std::mem::take(&mut self.args)
            .try_into()
            .map_err(|args: Vec<Value>| ErrorKind::StackUnderflow {
                needed: N,
                available: args.len(),
            })
    }

    pub fn push(&mut self, value: Value) {
        self.stack = self.stack.push(value);
    }

    /// Write to the host output channel
    pub fn write(&mut self, text: &str) -> Result<(), ErrorKind> {
        self.output
            .write_all(text.as_bytes())
            .and_then(|_| self.output.flush())
            .map_err(|e| ErrorKind::Output(e.to_string()))
    }

    pub fn mismatch(&self, expected: &str, found: &Value) -> ErrorKind {
        ErrorKind::type_mismatch(self.name, expected, found.type_name())
    }

    pub fn int(&self, value: Value) -> Result<BigInt, ErrorKind> {
        match value {
            Value::Int(n) => Ok(n),
            other => Err(self.mismatch("Int", &other)),
        }
    }

    pub fn text(&self, value: Value) -> Result<Rc<str>, ErrorKind> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(self.mismatch("Str", &other)),
        }
    }

    pub fn atom(&self, value: Value) -> Result<Atom, ErrorKind> {
        match value {
            Value::Atom(a) => Ok(a),
            other => Err(self.mismatch("Atom", &other)),
        }
    }

    pub fn symbol(&self, value: Value) -> Result<Atom, ErrorKind> {
        match value {
            Value::Atom(a) | Value::Name(a) => Ok(a),
            other => Err(self.mismatch("Symbol", &other)),
        }
    }

    pub fn items(&self, value: Value) -> Result<Rc<[Value]>, ErrorKind> {
        match value {
            Value::Vec(items) => Ok(items),
            other => Err(self.mismatch("Vec", &other)),
        }
    }

    pub fn code(&self, value: Value) -> Result<Rc<Closure>, ErrorKind> {
        match value {
            Value::Code(closure) => Ok(closure),
            other => Err(self.mismatch("Code", &other)),
        }
    }
}

/// How control continues after a builtin returns
#[derive(Debug)]
pub enum Flow {
    Next,
    Call(Call),
}

/// Run `body` under `scope` against the current stack
#[derive(Debug)]
pub struct Call {
    pub body: Rc<[Instruction]>,
    pub scope: Scope,
    pub then: Option<Resume>,
}

impl Call {
    pub fn new(body: Rc<[Instruction]>, scope: Scope) -> Self {
        Call {
            body,
            scope,
            then: None,
        }
    }

    pub fn closure(closure: &Closure) -> Self {
        Call::new(Rc::clone(&closure.body), closure.scope.clone())
    }

    pub fn then(mut self, resume: Resume) -> Self {
        self.then = Some(resume);
        self
    }
}

impl From<Call> for Flow {
    fn from(call: Call) -> Self {
        Flow::Call(call)
    }
}

/// Post-processing step run on the stack a called body left behind
///
/// `data` and `depth` are whatever the builtin needs to remember across the
/// call; `finish` gets them back together with the stack.
#[derive(Debug)]
pub struct Resume {
    pub op: &'static str,
    pub data: Value,
    pub depth: usize,
    pub finish: fn(&Resume, Stack) -> Result<Stack, ErrorKind>,
}
