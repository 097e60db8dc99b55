//! String operations
//!
//! `str` is always available; the rest live in the `strings` module:
//!
//! ```text
//! :strings ( concat length parse-int ) import
//! ```

use crate::builtins::{Builtin, Flow, Native, Ty};
use crate::io::render;
use gurk_core::{ErrorKind, Value};
use num_bigint::BigInt;

pub const BUILTINS: &[Builtin] = &[Builtin::new("str", &[Ty::Any], to_str)];

pub const STRINGS: &[Builtin] = &[
    Builtin::new("concat", &[Ty::Str, Ty::Str], concat),
    Builtin::new("length", &[Ty::Str], length),
    Builtin::new("parse-int", &[Ty::Str], parse_int),
];

/// Convert any value to text; strings pass through unchanged
///
/// Stack effect: ( v -- s )
pub fn to_str(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [value] = native.take_args()?;
    let text = match value {
        Value::Str(_) => value,
        other => Value::str(render(&other)),
    };
    native.push(text);
    Ok(Flow::Next)
}

/// Stack effect: ( a b -- ab )
pub fn concat(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [a, b] = native.take_args()?;
    let (a, b) = (native.text(a)?, native.text(b)?);
    let mut joined = String::with_capacity(a.len() + b.len());
    joined.push_str(&a);
    joined.push_str(&b);
    native.push(Value::str(joined));
    Ok(Flow::Next)
}

/// Length in characters
///
/// Stack effect: ( s -- n )
pub fn length(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [s] = native.take_args()?;
    let s = native.text(s)?;
    native.push(Value::int(s.chars().count()));
    Ok(Flow::Next)
}

/// Stack effect: ( s -- n )
pub fn parse_int(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [s] = native.take_args()?;
    let s = native.text(s)?;
    let n = s
        .trim()
        .parse::<BigInt>()
        .map_err(|_| ErrorKind::type_mismatch(native.name, "integer text", format!("{:?}", s)))?;
    native.push(Value::Int(n));
    Ok(Flow::Next)
}
