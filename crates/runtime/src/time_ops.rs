//! Delays
//!
//! `sleep` blocks the whole engine; nothing else runs while it waits. A
//! wall-clock deadline is only checked after the sleep returns.
//!
//! ```text
//! 1 sleep         # one second
//! (1 5) sleep     # a fifth of a second
//! ```

use crate::builtins::{Builtin, Flow, Native, Ty};
use gurk_core::{ErrorKind, Value};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::time::Duration;

pub const BUILTINS: &[Builtin] = &[Builtin::new("sleep", &[Ty::Any], sleep)];

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Stack effect: ( seconds -- ) or ( (num den) -- )
pub fn sleep(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [value] = native.take_args()?;
    let duration = duration_of(native, &value)?;
    std::thread::sleep(duration);
    Ok(Flow::Next)
}

/// Interpret whole or fractional seconds
pub fn duration_of(native: &Native<'_>, value: &Value) -> Result<Duration, ErrorKind> {
    let (num, den) = match value {
        Value::Int(n) => (n.clone(), BigInt::from(1)),
        Value::Vec(items) => match &items[..] {
            [Value::Int(num), Value::Int(den)] => (num.clone(), den.clone()),
            _ => return Err(native.mismatch("Int or (num den)", value)),
        },
        other => return Err(native.mismatch("Int or (num den)", other)),
    };
    if den.is_zero() {
        return Err(ErrorKind::DivisionByZero {
            op: native.name.to_string(),
        });
    }
    if num.is_negative() != den.is_negative() && !num.is_zero() {
        return Err(native.mismatch("non-negative duration", value));
    }
    let nanos = (num.abs() * NANOS_PER_SEC) / den.abs();
    Ok(Duration::from_nanos(nanos.to_u64().unwrap_or(u64::MAX)))
}
