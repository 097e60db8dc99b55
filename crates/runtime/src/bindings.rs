//! Naming things: `def`, `jar` and `import`
//!
//! `def` and `import` grow the lexical scope of the body being executed and
//! vanish when that body returns. `jar` writes into the module frame at the
//! root of the scope and lasts for the lifetime of the engine.

use crate::builtins::{Builtin, Flow, Native, Ty};
use gurk_core::{Atom, ErrorKind, Value};
use tracing::debug;

pub const BUILTINS: &[Builtin] = &[
    Builtin::new("def", &[Ty::Any, Ty::Symbol], def),
    Builtin::new("jar", &[Ty::Any, Ty::Symbol], jar),
    Builtin::new("import", &[Ty::Atom, Ty::Vec], import),
];

/// Bind a value for the rest of the current body
///
/// Stack effect: ( value :name -- )
pub fn def(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [value, name] = native.take_args()?;
    let name = native.symbol(name)?;
    native.scope = native.scope.bind(name, value);
    Ok(Flow::Next)
}

/// Bind a value permanently in the enclosing module
///
/// Stack effect: ( value :name -- )
pub fn jar(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [value, name] = native.take_args()?;
    let name = native.symbol(name)?;
    debug!(
        module = %native.scope.current_module().name(),
        name = %name,
        "jar"
    );
    native.scope.jar(name, value);
    Ok(Flow::Next)
}

/// Copy named bindings out of a module into the current scope
///
/// Stack effect: ( :module ( name ... ) -- )
pub fn import(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [module, names] = native.take_args()?;
    let module = native.atom(module)?;
    let names = native
        .items(names)?
        .iter()
        .map(|item| match item {
            Value::Name(name) | Value::Atom(name) => Ok(name.clone()),
            other => Err(native.mismatch("name list", other)),
        })
        .collect::<Result<Vec<Atom>, ErrorKind>>()?;
    native.scope = native.modules.import(&native.scope, &module, &names)?;
    debug!(module = %module, count = names.len(), "import");
    Ok(Flow::Next)
}
