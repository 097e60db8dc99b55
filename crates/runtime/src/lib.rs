//! gurk runtime: the execution engine and its builtin modules
//!
//! Key design principles:
//! - Engine: owns the module registry and builtin table; no global state
//! - Builtins: plain functions behind a declared input contract
//! - Middleware: the only way to observe or stop a run from outside
//!
//! ```rust,ignore
//! let program = gurk_parser::parse(":math ( + ) import 1 2 +")?;
//! let state = Engine::new().run(&program)?;
//! assert_eq!(state.stack.peek(), Some(&Value::int(3)));
//! ```

pub mod arithmetic;
pub mod bindings;
pub mod builtins;
pub mod case;
pub mod cond;
pub mod config;
pub mod coro;
pub mod engine;
pub mod io;
pub mod modules;
pub mod quotations;
pub mod stack;
pub mod stdlib_embed;
pub mod string_ops;
pub mod time_ops;
pub mod trace;
pub mod watchdog;

pub use builtins::{Builtin, Call, Flow, Native, Resume, Ty};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Cancellation, Chain, Engine, Failure, FinalState, Middleware};
pub use io::SharedOutput;
pub use trace::Tracer;
pub use watchdog::{Deadline, StepBudget};

// Data model, re-exported so hosts need only this crate
pub use gurk_core::{Atom, ErrorKind, Instruction, Scope, Stack, Value};
