//! Booleans and two-way choice
//!
//! There is no boolean type: `:true` and `:false` are ordinary atoms. `if`
//! only picks one of two values; the usual idiom passes code blocks and runs
//! the chosen one with `!`:
//!
//! ```text
//! n 0 = { "zero" } { "other" } if !
//! ```

use crate::builtins::{Builtin, Flow, Native, Ty};
use gurk_core::{ErrorKind, Value};

pub const BUILTINS: &[Builtin] = &[
    Builtin::new("if", &[Ty::Atom, Ty::Any, Ty::Any], choose),
    Builtin::new("=", &[Ty::Any, Ty::Any], equals),
];

/// Stack effect: ( flag then else -- chosen )
pub fn choose(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [flag, then, otherwise] = native.take_args()?;
    let chosen = match flag.as_bool() {
        Some(true) => then,
        Some(false) => otherwise,
        None => return Err(native.mismatch(":true or :false", &flag)),
    };
    native.push(chosen);
    Ok(Flow::Next)
}

/// Structural equality; values of different kinds are never equal
///
/// Code values compare by identity: a block equals its own copies (`dup`)
/// but not another block with the same text.
///
/// Stack effect: ( a b -- :true|:false )
pub fn equals(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [a, b] = native.take_args()?;
    native.push(Value::boolean(a == b));
    Ok(Flow::Next)
}
