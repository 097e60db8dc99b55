//! Gurk Core: the data model of the gurk stack language
//!
//! This crate holds everything the execution engine threads through a run,
//! independent of how instructions are produced or which builtins exist.
//!
//! Key design principles:
//! - Value: What the language talks about (Int, Str, Atom, Vec, Code, ...)
//! - Stack: Immutable cons-list of Values; pushing shares the prior stack
//! - Scope: Chain of binding frames; block-local frames in front, module
//!   frames at the root
//!
//! # Modules
//!
//! - `error`: Failure taxonomy shared by the engine and builtins
//! - `value`: Core Value enum, atoms and closures
//! - `instruction`: The instruction set the engine executes
//! - `stack`: Persistent value stack
//! - `scope`: Lexical binding chain
//! - `module`: Module frames and the module registry

pub mod error;
pub mod instruction;
pub mod module;
pub mod scope;
pub mod stack;
pub mod value;

pub use error::ErrorKind;
pub use instruction::Instruction;
pub use module::{Module, ModuleRegistry};
pub use scope::{Binding, Scope};
pub use stack::Stack;
pub use value::{Atom, Closure, Value};
