//! Interactive session
//!
//! Every line runs against the stack and scope the previous line left, so
//! `def`s and imports made at the prompt stay visible. A failing line leaves
//! the session as it was before that line.

use gurk_parser::parse;
use gurk_runtime::{Engine, EngineConfig, FinalState, Stack};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use tracing::debug;

const PROMPT: &str = "gurk> ";

/// What the prompt loop should do after a line
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Quit,
    Print(String),
    Silent,
}

pub struct Session {
    engine: Engine,
    state: FinalState,
    config: EngineConfig,
}

impl Session {
    pub fn new(engine: Engine, config: EngineConfig) -> Self {
        let state = engine.fresh_state();
        Session {
            engine,
            state,
            config,
        }
    }

    pub fn stack(&self) -> &Stack {
        &self.state.stack
    }

    pub fn reset(&mut self) {
        self.state = self.engine.fresh_state();
    }

    pub fn handle(&mut self, line: &str) -> Step {
        let line = line.trim();
        match line {
            "" => Step::Silent,
            ":quit" | ":q" => Step::Quit,
            ":help" => Step::Print(HELP.trim().to_string()),
            ":stack" => Step::Print(describe_stack(self.stack())),
            ":reset" => {
                self.reset();
                Step::Print("Session reset.".to_string())
            }
            _ => match self.eval(line) {
                Ok(()) if self.stack().is_empty() => Step::Silent,
                Ok(()) => Step::Print(format!("=> {}", self.stack())),
                Err(message) => Step::Print(message),
            },
        }
    }

    /// Run one line of source against the current state
    pub fn eval(&mut self, source: &str) -> Result<(), String> {
        let program = parse(source).map_err(|e| format!("Error: {}", e))?;
        let mut middleware = self.config.middleware();
        match self
            .engine
            .run_from(self.state.clone(), &program, &mut middleware)
        {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(failure) => Err(format!(
                "Error: {}\n  stack: {}",
                failure,
                describe_stack(&failure.stack)
            )),
        }
    }
}

fn describe_stack(stack: &Stack) -> String {
    if stack.is_empty() {
        "(empty)".to_string()
    } else {
        stack.to_string()
    }
}

const HELP: &str = r#"
gurk REPL commands:
  :stack        Show the current stack
  :reset        Clear the stack and all definitions
  :help         Show this help
  :quit, :q     Exit the REPL

Anything else is run as gurk source, e.g.
  :math ( + ) import
  1 2 +
"#;

fn history_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("gurk_history"))
}

/// Prompt loop on the terminal
pub fn run(config: EngineConfig) -> Result<(), ReadlineError> {
    let mut rl = DefaultEditor::new()?;
    let history = history_file();
    if let Some(ref path) = history {
        let _ = rl.load_history(path);
    }

    let mut session = Session::new(Engine::new(), config);
    println!("gurk {} REPL. Type :help for commands, :quit to exit.", env!("CARGO_PKG_VERSION"));

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                match session.handle(&line) {
                    Step::Quit => break,
                    Step::Print(text) => println!("{}", text),
                    Step::Silent => {}
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    if let Some(ref path) = history {
        if let Err(e) = rl.save_history(path) {
            debug!("could not save history to {}: {}", path.display(), e);
        }
    }
    println!("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gurk_runtime::{SharedOutput, Value};

    fn session() -> (Session, SharedOutput) {
        let output = SharedOutput::new();
        let engine = Engine::new().with_output(output.clone());
        (Session::new(engine, EngineConfig::default()), output)
    }

    #[test]
    fn test_state_persists_between_lines() {
        let (mut s, _) = session();
        assert_eq!(s.handle(":math ( + ) import"), Step::Silent);
        assert_eq!(s.handle("1 2"), Step::Print("=> 1 2".to_string()));
        assert_eq!(s.handle("+"), Step::Print("=> 3".to_string()));
    }

    #[test]
    fn test_defs_persist() {
        let (mut s, output) = session();
        s.handle("42 :answer def");
        s.handle("answer println");
        assert_eq!(output.contents(), "42\n");
    }

    #[test]
    fn test_failed_line_keeps_previous_state() {
        let (mut s, _) = session();
        s.handle("1 2");
        match s.handle("3 nope") {
            Step::Print(message) => {
                assert!(message.starts_with("Error: unbound name `nope`"));
                assert!(message.contains("stack: 1 2 3"));
            }
            other => panic!("Expected error message, got {:?}", other),
        }
        assert_eq!(s.stack().to_vec(), vec![Value::int(1), Value::int(2)]);
    }

    #[test]
    fn test_parse_error_message() {
        let (mut s, _) = session();
        match s.handle("{ 1") {
            Step::Print(message) => assert!(message.contains("Unclosed code block")),
            other => panic!("Expected error message, got {:?}", other),
        }
    }

    #[test]
    fn test_commands() {
        let (mut s, _) = session();
        assert_eq!(s.handle(":stack"), Step::Print("(empty)".to_string()));
        s.handle("1 :x def 5");
        assert_eq!(s.handle(":stack"), Step::Print("5".to_string()));
        assert_eq!(s.handle(":reset"), Step::Print("Session reset.".to_string()));
        assert!(s.stack().is_empty());
        assert!(matches!(s.handle("x"), Step::Print(m) if m.contains("unbound name")));
        assert!(matches!(s.handle(":help"), Step::Print(m) if m.contains(":reset")));
        assert_eq!(s.handle(":q"), Step::Quit);
        assert_eq!(s.handle("   "), Step::Silent);
    }

    #[test]
    fn test_step_budget_applies_per_line() {
        let output = SharedOutput::new();
        let engine = Engine::new().with_output(output);
        let mut s = Session::new(engine, EngineConfig::new().with_max_steps(Some(1000)));
        assert!(matches!(
            s.handle("{ dup ! } dup !"),
            Step::Print(m) if m.contains("step budget")
        ));
        assert_eq!(s.handle("1"), Step::Print("=> 1".to_string()));
    }
}
