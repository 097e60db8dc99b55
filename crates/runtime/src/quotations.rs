//! Code value invocation
//!
//! A code block on the stack is just data until `!` runs it. The body runs
//! against the current stack under the scope the block captured when it was
//! created, never the caller's.

use crate::builtins::{Builtin, Call, Flow, Native, Ty};
use gurk_core::ErrorKind;

pub const BUILTINS: &[Builtin] = &[Builtin::new("!", &[Ty::Code], call)];

/// Run the code value on top of the stack
///
/// Stack effect: ( ..a { ..a -- ..b } -- ..b )
pub fn call(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [code] = native.take_args()?;
    let closure = native.code(code)?;
    Ok(Call::closure(&closure).into())
}
