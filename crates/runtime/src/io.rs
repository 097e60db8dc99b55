//! Text output
//!
//! `println` and `print` write to the engine's output channel (stdout unless
//! the host supplied another writer). Strings are written as their raw
//! text; every other value is written the way it would appear in source.
//!
//! A failed write aborts the run as a host cancellation: the program cannot
//! observe or recover from a broken output channel.

use crate::builtins::{Builtin, Flow, Native, Ty};
use gurk_core::{ErrorKind, Value};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

pub const BUILTINS: &[Builtin] = &[
    Builtin::new("println", &[Ty::Any], println),
    Builtin::new("print", &[Ty::Any], print),
];

/// Raw text for strings, source form for everything else
pub fn render(value: &Value) -> String {
    match value {
        Value::Str(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Stack effect: ( v -- )
pub fn println(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [value] = native.take_args()?;
    let mut line = render(&value);
    line.push('\n');
    native.write(&line)?;
    Ok(Flow::Next)
}

/// Stack effect: ( v -- )
pub fn print(native: &mut Native<'_>) -> Result<Flow, ErrorKind> {
    let [value] = native.take_args()?;
    native.write(&render(&value))?;
    Ok(Flow::Next)
}

/// In-memory output channel that can be read back after a run
///
/// Clones share the same buffer, so one handle can be given to
/// `Engine::with_output` and the other kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn new() -> Self {
        SharedOutput::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Engine;
    use gurk_parser::parse;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn output_of(source: &str) -> String {
        let output = SharedOutput::new();
        Engine::new()
            .with_output(output.clone())
            .run(&parse(source).unwrap())
            .unwrap();
        output.contents()
    }

    #[test]
    fn test_println_strings_raw() {
        assert_eq!(output_of(r#""a \"b\"" println"#), "a \"b\"\n");
    }

    #[test]
    fn test_println_other_values_in_source_form() {
        assert_eq!(
            output_of(r#"42 println :ok println (1 "x" ()) println { dup } println"#),
            "42\n:ok\n(1 \"x\" ())\n{ dup }\n"
        );
    }

    #[test]
    fn test_print_has_no_newline() {
        assert_eq!(output_of(r#""a" print "b" print"#), "ab");
    }

    #[test]
    fn test_broken_output_fails_run() {
        let failure = Engine::new()
            .with_output(Broken)
            .run(&parse(r#"1 "x" println"#).unwrap())
            .unwrap_err();
        assert!(!failure.is_cancellation());
        assert_eq!(failure.kind, ErrorKind::Output("closed".into()));
        assert_eq!(failure.instruction.to_string(), "println");
        assert_eq!(failure.stack.len(), 2);
    }

    #[test]
    fn test_shared_output_lines() {
        let output = SharedOutput::new();
        let mut handle = output.clone();
        handle.write_all(b"one\ntwo\n").unwrap();
        assert_eq!(output.lines(), vec!["one", "two"]);
        output.clear();
        assert_eq!(output.contents(), "");
    }
}
