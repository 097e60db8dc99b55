//! The `coro` module: stepping lazy sequences
//!
//! A sequence is two ordinary stack values, a step block and a state pair:
//!
//! ```text
//! { dup println 1 + } (1 ())
//! ```
//!
//! `iterate` hands the current value to the step, lets it run to completion
//! and packs whatever single value it leaves into a fresh state pair. Both
//! the step and the new state stay on the stack, so the next `iterate`
//! continues where this one stopped. Nothing runs until `iterate` is called
//! and nothing is suspended between calls.
//!
//! The second slot of the state pair rides along untouched.

use crate::builtins::{Builtin, Call, Flow, Native, Resume, Ty};
use gurk_core::{ErrorKind, Stack, Value};

pub const CORO: &[Builtin] = &[Builtin::new("iterate", &[Ty::Code, Ty::Vec], iterate)];

/// Stack effect: ( step (current aux) -- step (next aux) )
///
/// where step is ( current -- next )
pub fn iterate(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [step, state] = native.take_args()?;
    let items = native.items(state.clone())?;
    let [current, aux] = &items[..] else {
        return Err(ErrorKind::type_mismatch(
            native.name,
            "(current aux) pair",
            format!("{}", state),
        ));
    };
    let closure = native.code(step.clone())?;

    native.push(step);
    let depth = native.stack.len();
    native.push(current.clone());

    let resume = Resume {
        op: native.name,
        data: aux.clone(),
        depth,
        finish: repackage,
    };
    Ok(Call::closure(&closure).then(resume).into())
}

/// Wrap the step's result back into a state pair
fn repackage(resume: &Resume, stack: Stack) -> Result<Stack, ErrorKind> {
    if stack.len() != resume.depth + 1 {
        return Err(ErrorKind::type_mismatch(
            resume.op,
            "step leaving exactly one value",
            format!(
                "stack depth {} (expected {})",
                stack.len(),
                resume.depth + 1
            ),
        ));
    }
    let (next, rest) = stack.pop()?;
    Ok(rest.push(Value::vec([next, resume.data.clone()])))
}

#[cfg(test)]
mod tests {
    use crate::Engine;
    use crate::io::SharedOutput;
    use gurk_core::{ErrorKind, Value};
    use gurk_parser::parse;

    fn run(source: &str) -> (Result<Vec<Value>, ErrorKind>, String) {
        let output = SharedOutput::new();
        let program = format!(":coro ( iterate ) import :math ( + * ) import {}", source);
        let result = Engine::new()
            .with_output(output.clone())
            .run(&parse(&program).unwrap())
            .map(|state| state.stack.to_vec())
            .map_err(|failure| failure.kind);
        (result, output.contents())
    }

    #[test]
    fn test_counter_generator() {
        let (result, printed) = run("{ dup println 1 + } (1 ()) iterate iterate iterate iterate");
        assert_eq!(printed, "1\n2\n3\n4\n");
        let stack = result.unwrap();
        assert_eq!(stack.len(), 2);
        assert!(matches!(stack[0], Value::Code(_)));
        assert_eq!(stack[1], Value::vec([Value::int(5), Value::vec([])]));
    }

    #[test]
    fn test_nothing_runs_before_iterate() {
        let (_, printed) = run("{ dup println 1 + } (1 ())");
        assert_eq!(printed, "");
    }

    #[test]
    fn test_aux_slot_passes_through() {
        let (result, _) = run("{ 2 * } (3 :tag) iterate iterate");
        assert_eq!(
            result.unwrap()[1],
            Value::vec([Value::int(12), Value::atom("tag")])
        );
    }

    #[test]
    fn test_step_must_leave_one_value() {
        let (result, _) = run("{ drop } (1 ()) iterate");
        assert!(matches!(
            result.unwrap_err(),
            ErrorKind::TypeMismatch { op, .. } if op == "iterate"
        ));
        let (result, _) = run("{ dup } (1 ()) iterate");
        assert!(matches!(result.unwrap_err(), ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_state_must_be_a_pair() {
        let (result, _) = run("{ } (1) iterate");
        assert_eq!(
            result.unwrap_err(),
            ErrorKind::type_mismatch("iterate", "(current aux) pair", "(1)")
        );
        let (result, _) = run("(1 ()) { } iterate");
        assert!(matches!(result.unwrap_err(), ErrorKind::TypeMismatch { .. }));
    }
}
