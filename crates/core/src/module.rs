//! Module frames and the module registry
//!
//! A module frame holds long-lived bindings: host builtins registered at
//! startup and definitions created by `jar`. Frames live as long as the
//! registry that owns them and are only ever added to or updated, never
//! unlinked.
//!
//! The registry is a plain value owned by whoever runs programs (the
//! engine), so independent engines never see each other's modules.

use crate::error::ErrorKind;
use crate::scope::{Binding, Scope};
use crate::value::{Atom, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub struct Module {
    name: Atom,
    bindings: RefCell<HashMap<Atom, Value>>,
    /// Scope consulted after this frame during lookup
    parent: Option<Scope>,
}

impl Module {
    pub fn new(name: impl Into<Atom>, parent: Option<Scope>) -> Rc<Module> {
        Rc::new(Module {
            name: name.into(),
            bindings: RefCell::new(HashMap::new()),
            parent,
        })
    }

    pub fn name(&self) -> &Atom {
        &self.name
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.parent.as_ref()
    }

    /// Insert or replace a binding in place
    pub fn define(&self, name: Atom, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    pub fn get(&self, name: &Atom) -> Option<Value> {
        self.bindings.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &Atom) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    /// Bound names, sorted
    pub fn names(&self) -> Vec<Atom> {
        let mut names: Vec<Atom> = self.bindings.borrow().keys().cloned().collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }
}

// Bindings can hold closures whose scope leads back here; list names only.
impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("bindings", &self.names())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: HashMap<Atom, Rc<Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        ModuleRegistry::default()
    }

    /// Register a module frame under its own name, replacing any previous one
    pub fn register(&mut self, module: Rc<Module>) {
        self.modules.insert(module.name().clone(), module);
    }

    pub fn get(&self, name: &Atom) -> Result<Rc<Module>, ErrorKind> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorKind::UnknownModule(name.clone()))
    }

    pub fn contains(&self, name: &Atom) -> bool {
        self.modules.contains_key(name)
    }

    /// Registered module names, sorted
    pub fn names(&self) -> Vec<Atom> {
        let mut names: Vec<Atom> = self.modules.keys().cloned().collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }

    /// Copy the requested bindings of `module` into `scope`
    ///
    /// Each name becomes its own callable frame in front of `scope`; the
    /// module frame itself is never linked in. Nothing is bound unless every
    /// name exists.
    pub fn import(&self, scope: &Scope, module: &Atom, names: &[Atom]) -> Result<Scope, ErrorKind> {
        let frame = self.get(module)?;
        let mut bindings = Vec::with_capacity(names.len());
        for name in names {
            let value = frame.get(name).ok_or_else(|| ErrorKind::UnknownExport {
                module: module.clone(),
                name: name.clone(),
            })?;
            bindings.push((name.clone(), value));
        }
        Ok(bindings
            .into_iter()
            .fold(scope.clone(), |scope, (name, value)| {
                scope.bind_as(name, value, Binding::Callable)
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_math() -> ModuleRegistry {
        let math = Module::new("math", None);
        math.define(Atom::new("+"), Value::NativeFn(Atom::new("+")));
        math.define(Atom::new("-"), Value::NativeFn(Atom::new("-")));
        let mut registry = ModuleRegistry::new();
        registry.register(math);
        registry
    }

    #[test]
    fn test_import_copies_named_bindings() {
        let registry = registry_with_math();
        let scope = Scope::root(Module::new("main", None));

        let scope = registry
            .import(&scope, &Atom::new("math"), &[Atom::new("+")])
            .unwrap();
        assert_eq!(
            scope.lookup(&Atom::new("+")).unwrap(),
            Value::NativeFn(Atom::new("+"))
        );
        // Only what was asked for
        assert!(scope.lookup(&Atom::new("-")).is_err());
    }

    #[test]
    fn test_import_unknown_module() {
        let registry = registry_with_math();
        let scope = Scope::root(Module::new("main", None));
        let err = registry
            .import(&scope, &Atom::new("trig"), &[Atom::new("sin")])
            .unwrap_err();
        assert_eq!(err, ErrorKind::UnknownModule(Atom::new("trig")));
    }

    #[test]
    fn test_import_unknown_export() {
        let registry = registry_with_math();
        let scope = Scope::root(Module::new("main", None));
        let err = registry
            .import(&scope, &Atom::new("math"), &[Atom::new("+"), Atom::new("sqrt")])
            .unwrap_err();
        assert_eq!(
            err,
            ErrorKind::UnknownExport {
                module: Atom::new("math"),
                name: Atom::new("sqrt")
            }
        );
    }

    #[test]
    fn test_import_twice_is_idempotent() {
        let registry = registry_with_math();
        let scope = Scope::root(Module::new("main", None));
        let names = [Atom::new("+")];

        let once = registry.import(&scope, &Atom::new("math"), &names).unwrap();
        let twice = registry.import(&once, &Atom::new("math"), &names).unwrap();
        assert_eq!(
            once.lookup(&Atom::new("+")).unwrap(),
            twice.lookup(&Atom::new("+")).unwrap()
        );
    }

    #[test]
    fn test_module_define_updates_in_place() {
        let module = Module::new("main", None);
        module.define(Atom::new("x"), Value::int(1));
        module.define(Atom::new("x"), Value::int(2));
        assert_eq!(module.get(&Atom::new("x")), Some(Value::int(2)));
        assert_eq!(module.names(), vec![Atom::new("x")]);
    }
}
