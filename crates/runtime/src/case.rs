//! Structural pattern matching over the top of the stack
//!
//! `case` takes one code block whose body is a list of clauses, each a
//! vector literal (the pattern) followed by a code literal (the body):
//!
//! ```text
//! { (0)     { "zero" }
//!   (n :ok) { n }
//!   (_ _)   { :other } } case
//! ```
//!
//! A pattern of length k is compared against the k topmost values, the last
//! pattern element against the top of the stack. Pattern elements:
//!
//! | element    | matches       | effect                          |
//! |------------|---------------|---------------------------------|
//! | `_`        | anything      | consumed                        |
//! | `.`        | anything      | left on the stack for the body  |
//! | bare name  | anything      | consumed, bound in the body     |
//! | other      | equal value   | consumed                        |
//!
//! Clauses are tried in order and only peek at the stack; nothing is popped
//! until one matches.

use crate::builtins::{Builtin, Call, Flow, Native, Ty};
use gurk_core::{Atom, ErrorKind, Instruction, Scope, Stack, Value};
use std::rc::Rc;

pub const BUILTINS: &[Builtin] = &[Builtin::new("case", &[Ty::Code], case)];

const WILDCARD: &str = "_";
const KEEP: &str = ".";

struct Clause<'a> {
    pattern: &'a [Value],
    body: &'a Rc<[Instruction]>,
}

/// Stack effect: ( ..a { clauses } -- ..b )
pub fn case(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [clauses] = native.take_args()?;
    let closure = native.code(clauses)?;
    let clauses = parse_clauses(native, &closure.body)?;

    for clause in &clauses {
        if let Some((stack, scope)) = try_match(clause.pattern, &native.stack, &closure.scope) {
            native.stack = stack;
            return Ok(Call::new(Rc::clone(clause.body), scope).into());
        }
    }
    Err(ErrorKind::NoMatchingClause)
}

fn parse_clauses<'a>(
    native: &Native<'_>,
    body: &'a [Instruction],
) -> Result<Vec<Clause<'a>>, ErrorKind> {
    if body.len() % 2 != 0 {
        return Err(ErrorKind::type_mismatch(
            native.name,
            "(pattern) { body } pairs",
            format!("{} clause items", body.len()),
        ));
    }
    body.chunks(2)
        .map(|pair| match pair {
            [Instruction::PushLiteral(Value::Vec(pattern)), Instruction::PushCode(body)] => {
                Ok(Clause {
                    pattern: &pattern[..],
                    body,
                })
            }
            [Instruction::PushLiteral(Value::Vec(_)), other] => Err(ErrorKind::type_mismatch(
                native.name,
                "clause body { ... }",
                describe(other),
            )),
            [other, _] => Err(ErrorKind::type_mismatch(
                native.name,
                "clause pattern ( ... )",
                describe(other),
            )),
            _ => Err(ErrorKind::NoMatchingClause),
        })
        .collect()
}

fn describe(instruction: &Instruction) -> String {
    match instruction {
        Instruction::PushLiteral(value) => value.type_name().to_string(),
        Instruction::PushCode(_) => "Code".to_string(),
        Instruction::Invoke(name) => format!("name `{}`", name),
    }
}

/// Match without popping; on success return the stack the body runs on and
/// its scope
fn try_match(pattern: &[Value], stack: &Stack, scope: &Scope) -> Option<(Stack, Scope)> {
    let values = stack.peek_n(pattern.len())?;
    for (element, value) in pattern.iter().zip(&values) {
        let matches = match element {
            Value::Name(_) => true,
            literal => literal == *value,
        };
        if !matches {
            return None;
        }
    }

    let mut scope = scope.clone();
    let mut kept = Vec::new();
    for (element, value) in pattern.iter().zip(values) {
        match element {
            Value::Name(name) if name == KEEP => kept.push(value.clone()),
            Value::Name(name) if name == WILDCARD => {}
            Value::Name(name) => scope = scope.bind(Atom::clone(name), value.clone()),
            _ => {}
        }
    }

    let (_, rest) = stack.pop_n(pattern.len()).ok()?;
    let stack = kept.into_iter().fold(rest, |stack, value| stack.push(value));
    Some((stack, scope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Engine;
    use gurk_core::Module;
    use gurk_parser::parse;

    fn run(source: &str) -> Result<Vec<Value>, ErrorKind> {
        Engine::new()
            .run(&parse(source).unwrap())
            .map(|state| state.stack.to_vec())
            .map_err(|failure| failure.kind)
    }

    fn root() -> Scope {
        Scope::root(Module::new("main", None))
    }

    #[test]
    fn test_try_match_literal_and_binder() {
        let stack = Stack::from_values([Value::int(1), Value::atom("ok"), Value::int(5)]);
        let pattern = [Value::atom("ok"), Value::name("n")];
        let (rest, scope) = try_match(&pattern, &stack, &root()).unwrap();
        assert_eq!(rest.to_vec(), vec![Value::int(1)]);
        assert_eq!(scope.lookup(&Atom::new("n")).unwrap(), Value::int(5));
    }

    #[test]
    fn test_try_match_keep_and_wildcard() {
        let stack = Stack::from_values([Value::int(1), Value::int(2), Value::int(3)]);
        let pattern = [Value::name("."), Value::name("_"), Value::name(".")];
        let (rest, scope) = try_match(&pattern, &stack, &root()).unwrap();
        assert_eq!(rest.to_vec(), vec![Value::int(1), Value::int(3)]);
        assert!(scope.local_names().is_empty());
    }

    #[test]
    fn test_try_match_too_short() {
        let stack = Stack::from_values([Value::int(1)]);
        assert!(try_match(&[Value::name("_"), Value::name("_")], &stack, &root()).is_none());
    }

    #[test]
    fn test_first_matching_clause_wins() {
        let program = r#"5 { (5) { :five } (_) { :any } } case"#;
        assert_eq!(run(program).unwrap(), vec![Value::atom("five")]);
        let program = r#"6 { (5) { :five } (_) { :any } } case"#;
        assert_eq!(run(program).unwrap(), vec![Value::atom("any")]);
    }

    #[test]
    fn test_binders_are_scoped_to_clause() {
        let program = r#"1 2 { (a b) { b a } } case"#;
        assert_eq!(run(program).unwrap(), vec![Value::int(2), Value::int(1)]);
        assert_eq!(
            run("1 { (a) { } } case a").unwrap_err(),
            ErrorKind::UnboundName(Atom::new("a"))
        );
    }

    #[test]
    fn test_structural_vector_patterns() {
        let program = r#"(1 (2 3)) { ((1 (2 3))) { :yes } (_) { :no } } case"#;
        assert_eq!(run(program).unwrap(), vec![Value::atom("yes")]);
    }

    #[test]
    fn test_no_match_leaves_stack_untouched() {
        let mut engine = Engine::new();
        let failure = engine
            .run(&parse(r#"1 "a" { (2 _) { } (_ :b) { } } case"#).unwrap())
            .unwrap_err();
        assert_eq!(failure.kind, ErrorKind::NoMatchingClause);
        assert_eq!(failure.stack.len(), 3);
        let before: Vec<Value> = failure.stack.to_vec().into_iter().take(2).collect();
        assert_eq!(before, vec![Value::int(1), Value::str("a")]);
    }

    #[test]
    fn test_clause_body_uses_clause_list_scope() {
        let program = r#"
            10 :base def
            { { (x) { base } } case } :lookup jar
            { 99 :base def 1 lookup } !
        "#;
        assert_eq!(run(program).unwrap(), vec![Value::int(10)]);
    }

    #[test]
    fn test_malformed_clause_list() {
        assert_eq!(
            run("1 { (1) } case").unwrap_err(),
            ErrorKind::type_mismatch("case", "(pattern) { body } pairs", "1 clause items")
        );
        assert_eq!(
            run("1 { (1) 2 } case").unwrap_err(),
            ErrorKind::type_mismatch("case", "clause body { ... }", "Int")
        );
        assert_eq!(
            run("1 { x { } } case").unwrap_err(),
            ErrorKind::type_mismatch("case", "clause pattern ( ... )", "name `x`")
        );
    }
}
