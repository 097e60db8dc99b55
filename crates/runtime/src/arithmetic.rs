//! The `math` module
//!
//! ```text
//! :math ( + - * / % < > <= >= neg ) import
//! ```
//!
//! Integers are arbitrary precision, so nothing overflows. Division rounds
//! toward negative infinity and `%` takes the sign of the divisor, which
//! keeps `a b / b * a b % +` equal to `a` for every non-zero `b`.
//! Comparisons push `:true` or `:false`.

use crate::builtins::{Builtin, Flow, Native, Ty};
use gurk_core::{ErrorKind, Value};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;

const INT2: &[Ty] = &[Ty::Int, Ty::Int];

pub const MATH: &[Builtin] = &[
    Builtin::new("+", INT2, add),
    Builtin::new("-", INT2, subtract),
    Builtin::new("*", INT2, multiply),
    Builtin::new("/", INT2, divide),
    Builtin::new("%", INT2, modulo),
    Builtin::new("<", INT2, lt),
    Builtin::new(">", INT2, gt),
    Builtin::new("<=", INT2, lte),
    Builtin::new(">=", INT2, gte),
    Builtin::new("neg", &[Ty::Int], negate),
];

fn int_pair(native: &mut Native<'_>) -> Result<(BigInt, BigInt), ErrorKind> {
    let [a, b] = native.take_args()?;
    Ok((native.int(a)?, native.int(b)?))
}

fn binary(
    native: &mut Native<'_>,
    op: impl FnOnce(BigInt, BigInt) -> Result<Value, ErrorKind>,
) -> Result<Flow, ErrorKind> {
    let (a, b) = int_pair(native)?;
    let result = op(a, b)?;
    native.push(result);
    Ok(Flow::Next)
}

fn nonzero(native: &Native<'_>, divisor: &BigInt) -> Result<(), ErrorKind> {
    if divisor.is_zero() {
        return Err(ErrorKind::DivisionByZero {
            op: native.name.to_string(),
        });
    }
    Ok(())
}

/// Stack effect: ( a b -- a+b )
pub fn add(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    binary(native, |a, b| Ok(Value::Int(a + b)))
}

/// Stack effect: ( a b -- a-b )
pub fn subtract(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    binary(native, |a, b| Ok(Value::Int(a - b)))
}

/// Stack effect: ( a b -- a*b )
pub fn multiply(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    binary(native, |a, b| Ok(Value::Int(a * b)))
}

/// Floored division
///
/// Stack effect: ( a b -- a/b )
pub fn divide(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let (a, b) = int_pair(native)?;
    nonzero(native, &b)?;
    native.push(Value::Int(a.div_floor(&b)));
    Ok(Flow::Next)
}

/// Remainder with the sign of the divisor
///
/// Stack effect: ( a b -- a%b )
pub fn modulo(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let (a, b) = int_pair(native)?;
    nonzero(native, &b)?;
    native.push(Value::Int(a.mod_floor(&b)));
    Ok(Flow::Next)
}

/// Stack effect: ( a b -- a<b )
pub fn lt(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    binary(native, |a, b| Ok(Value::boolean(a < b)))
}

/// Stack effect: ( a b -- a>b )
pub fn gt(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    binary(native, |a, b| Ok(Value::boolean(a > b)))
}

/// Stack effect: ( a b -- a<=b )
pub fn lte(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    binary(native, |a, b| Ok(Value::boolean(a <= b)))
}

/// Stack effect: ( a b -- a>=b )
pub fn gte(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    binary(native, |a, b| Ok(Value::boolean(a >= b)))
}

/// Stack effect: ( a -- -a )
pub fn negate(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [a] = native.take_args()?;
    let a = native.int(a)?;
    native.push(Value::Int(-a));
    Ok(Flow::Next)
}
