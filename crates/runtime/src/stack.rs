//! Stack shuffling words
//!
//! All of these only rearrange values already on the stack. The arity checks
//! happen in the engine, so each body just takes its arguments and pushes
//! them back in the new order.

use crate::builtins::{Builtin, Flow, Native, Ty};
use gurk_core::ErrorKind;

pub const BUILTINS: &[Builtin] = &[
    Builtin::new("dup", &[Ty::Any], dup),
    Builtin::new("drop", &[Ty::Any], drop),
    Builtin::new("swap", &[Ty::Any, Ty::Any], swap),
    Builtin::new("over", &[Ty::Any, Ty::Any], over),
    Builtin::new("rot", &[Ty::Any, Ty::Any, Ty::Any], rot),
    Builtin::new("unrot", &[Ty::Any, Ty::Any, Ty::Any], unrot),
    Builtin::new("nip", &[Ty::Any, Ty::Any], nip),
];

/// Duplicate the top value: ( a -- a a )
pub fn dup(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [a] = native.take_args()?;
    native.push(a.clone());
    native.push(a);
    Ok(Flow::Next)
}

/// Discard the top value: ( a -- )
pub fn drop(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [_] = native.take_args()?;
    Ok(Flow::Next)
}

/// Swap the top two values: ( a b -- b a )
pub fn swap(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [a, b] = native.take_args()?;
    native.push(b);
    native.push(a);
    Ok(Flow::Next)
}

/// Copy the second value to the top: ( a b -- a b a )
pub fn over(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [a, b] = native.take_args()?;
    native.push(a.clone());
    native.push(b);
    native.push(a);
    Ok(Flow::Next)
}

/// Rotate the top three values: ( a b c -- b c a )
pub fn rot(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [a, b, c] = native.take_args()?;
    native.push(b);
    native.push(c);
    native.push(a);
    Ok(Flow::Next)
}

/// Rotate the other way: ( a b c -- c a b )
pub fn unrot(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [a, b, c] = native.take_args()?;
    native.push(c);
    native.push(a);
    native.push(b);
    Ok(Flow::Next)
}

/// Drop the second value: ( a b -- b )
pub fn nip(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [_, b] = native.take_args()?;
    native.push(b);
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use crate::Engine;
    use gurk_core::{ErrorKind, Value};
    use gurk_parser::parse;

    fn stack_after(source: &str) -> Vec<Value> {
        Engine::new().run(&parse(source).unwrap()).unwrap().stack.to_vec()
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&n| Value::int(n)).collect()
    }

    #[test]
    fn test_dup_drop() {
        assert_eq!(stack_after("1 dup"), ints(&[1, 1]));
        assert_eq!(stack_after("1 2 drop"), ints(&[1]));
    }

    #[test]
    fn test_swap_over_nip() {
        assert_eq!(stack_after("1 2 swap"), ints(&[2, 1]));
        assert_eq!(stack_after("1 2 over"), ints(&[1, 2, 1]));
        assert_eq!(stack_after("1 2 nip"), ints(&[2]));
    }

    #[test]
    fn test_rot_unrot() {
        assert_eq!(stack_after("1 2 3 rot"), ints(&[2, 3, 1]));
        assert_eq!(stack_after("1 2 3 unrot"), ints(&[3, 1, 2]));
        assert_eq!(stack_after("1 2 3 rot unrot"), ints(&[1, 2, 3]));
    }

    #[test]
    fn test_underflow_leaves_stack_alone() {
        let failure = Engine::new().run(&parse("1 2 rot").unwrap()).unwrap_err();
        assert_eq!(
            failure.kind,
            ErrorKind::StackUnderflow {
                needed: 3,
                available: 2
            }
        );
        assert_eq!(failure.stack.to_vec(), ints(&[1, 2]));
    }
}
