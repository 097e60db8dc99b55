//! Lexical scope chain
//!
//! A `Scope` is a pointer to the innermost frame of a chain:
//!
//! ```text
//!   def x --> def y --> [module main] --> [module prelude]
//! ```
//!
//! `def` and `import` put new single-binding frames in front and hand back
//! the longer chain; the frames they replace are untouched, so a closure
//! that captured the shorter chain never sees the new names. The chain
//! always ends in a module frame, which is where `jar` writes.
//!
//! A name resolves either as data or as something to run. `def` and pattern
//! binders bind data: invoking the name pushes the value, even a code block.
//! Module entries (jars, host builtins) and the imported copies of them are
//! callable: invoking the name runs the code.

use crate::error::ErrorKind;
use crate::module::Module;
use crate::value::{Atom, Value};
use std::fmt;
use std::rc::Rc;

/// How `Invoke` treats the value a name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Push the value
    Data,
    /// Run code and builtins; push anything else
    Callable,
}

enum Frame {
    Local {
        name: Atom,
        value: Value,
        binding: Binding,
        parent: Scope,
    },
    Module(Rc<Module>),
}

#[derive(Clone)]
pub struct Scope(Rc<Frame>);

impl Scope {
    /// A scope consisting of a single module frame (and its parents)
    pub fn root(module: Rc<Module>) -> Self {
        Scope(Rc::new(Frame::Module(module)))
    }

    /// Prepend a block-local data binding
    pub fn bind(&self, name: Atom, value: Value) -> Scope {
        self.bind_as(name, value, Binding::Data)
    }

    pub fn bind_as(&self, name: Atom, value: Value, binding: Binding) -> Scope {
        Scope(Rc::new(Frame::Local {
            name,
            value,
            binding,
            parent: self.clone(),
        }))
    }

    /// Resolve a name, innermost frame first
    pub fn lookup(&self, name: &Atom) -> Result<Value, ErrorKind> {
        self.resolve(name).map(|(value, _)| value)
    }

    /// Resolve a name together with how it was bound
    pub fn resolve(&self, name: &Atom) -> Result<(Value, Binding), ErrorKind> {
        let mut scope = self;
        loop {
            match &*scope.0 {
                Frame::Local {
                    name: bound,
                    value,
                    binding,
                    parent,
                } => {
                    if bound == name {
                        return Ok((value.clone(), *binding));
                    }
                    scope = parent;
                }
                Frame::Module(module) => {
                    if let Some(value) = module.get(name) {
                        return Ok((value, Binding::Callable));
                    }
                    match module.parent() {
                        Some(parent) => scope = parent,
                        None => return Err(ErrorKind::UnboundName(name.clone())),
                    }
                }
            }
        }
    }

    /// The nearest module frame; `jar` writes here
    pub fn current_module(&self) -> Rc<Module> {
        let mut scope = self;
        loop {
            match &*scope.0 {
                Frame::Local { parent, .. } => scope = parent,
                Frame::Module(module) => return Rc::clone(module),
            }
        }
    }

    /// Permanent definition in the nearest module frame
    pub fn jar(&self, name: Atom, value: Value) {
        self.current_module().define(name, value);
    }

    /// Names bound in block-local frames, innermost first
    pub fn local_names(&self) -> Vec<Atom> {
        let mut names = Vec::new();
        let mut scope = self;
        while let Frame::Local { name, parent, .. } = &*scope.0 {
            names.push(name.clone());
            scope = parent;
        }
        names
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("locals", &self.local_names())
            .field("module", self.current_module().name())
            .finish()
    }
}
