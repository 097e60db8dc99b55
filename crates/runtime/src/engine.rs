//! Execution engine
//!
//! Folds an instruction sequence over `(stack, scope)`. Code bodies are run
//! on an explicit work list rather than by nested host calls:
//!
//! ```text
//!   current frame   { body, ip, scope }
//!   suspended       [ Body(frame) | Resume(step) ... ]
//! ```
//!
//! Calling a body suspends the caller unless the call was the caller's last
//! instruction, in which case the caller is simply dropped. Language-level
//! recursion therefore grows a heap `Vec` at worst and tail recursion grows
//! nothing. The top-level frame is always kept so its final scope can be
//! handed back in `FinalState`.
//!
//! The engine owns its module registry and builtin dispatch table; nothing
//! is process-global, so independent engines never interfere.

use crate::builtins::{Builtin, Call, Flow, Native, Resume};
use crate::modules;
use crate::stdlib_embed;
use gurk_core::{
    Atom, Binding, Closure, ErrorKind, Instruction, Module, ModuleRegistry, Scope, Stack, Value,
};
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Raised by middleware to abort a run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Cancellation(pub String);

impl From<Cancellation> for ErrorKind {
    fn from(cancel: Cancellation) -> Self {
        ErrorKind::HostCancellation(cancel.0)
    }
}

/// Observer called after every executed instruction
///
/// Receives the instruction and the stacks before and after it. Returning
/// `Err` aborts the run with `HostCancellation`.
pub trait Middleware {
    fn on_step(&mut self, instruction: &Instruction, old: &Stack, new: &Stack)
    -> Result<(), Cancellation>;
}

impl<F> Middleware for F
where
    F: FnMut(&Instruction, &Stack, &Stack) -> Result<(), Cancellation>,
{
    fn on_step(
        &mut self,
        instruction: &Instruction,
        old: &Stack,
        new: &Stack,
    ) -> Result<(), Cancellation> {
        self(instruction, old, new)
    }
}

/// Several middlewares run in order; the first error wins
#[derive(Default)]
pub struct Chain(Vec<Box<dyn Middleware>>);

impl Chain {
    pub fn new() -> Self {
        Chain::default()
    }

    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.0.push(Box::new(middleware));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Middleware for Chain {
    fn on_step(
        &mut self,
        instruction: &Instruction,
        old: &Stack,
        new: &Stack,
    ) -> Result<(), Cancellation> {
        for middleware in &mut self.0 {
            middleware.on_step(instruction, old, new)?;
        }
        Ok(())
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct FinalState {
    pub stack: Stack,
    /// Scope of the top-level program after its last instruction
    pub scope: Scope,
}

/// Terminal failure of a run
#[derive(Debug, Clone, Error)]
#[error("{kind} (instruction {position}: `{instruction}`)")]
pub struct Failure {
    pub kind: ErrorKind,
    /// Index of the offending instruction within the body being executed
    pub position: usize,
    pub instruction: Instruction,
    /// Stack when the failure was raised
    pub stack: Stack,
}

impl Failure {
    pub fn is_cancellation(&self) -> bool {
        matches!(self.kind, ErrorKind::HostCancellation(_))
    }
}

struct Frame {
    body: Rc<[Instruction]>,
    ip: usize,
    scope: Scope,
    root: bool,
}

impl Frame {
    fn finished(&self) -> bool {
        self.ip >= self.body.len()
    }
}

struct Pending {
    resume: Resume,
    position: usize,
    instruction: Instruction,
}

enum Task {
    Body(Frame),
    Resume(Pending),
}

pub struct Engine {
    modules: ModuleRegistry,
    natives: HashMap<Atom, Builtin>,
    prelude: Scope,
    output: Box<dyn Write>,
}

impl Engine {
    /// Engine with the prelude, the native modules and the embedded source
    /// modules loaded, printing to stdout
    pub fn new() -> Self {
        let prelude = Module::new(modules::PRELUDE, None);
        let mut engine = Engine {
            modules: ModuleRegistry::new(),
            natives: HashMap::new(),
            prelude: Scope::root(Rc::clone(&prelude)),
            output: Box::new(io::stdout()),
        };
        engine.install(&prelude, &modules::prelude());
        engine.modules.register(prelude);

        for (name, builtins) in modules::native_modules() {
            engine.register_module(name, builtins);
        }
        for name in stdlib_embed::list_stdlib() {
            if let Err(e) = engine.load_stdlib(name) {
                error!("failed to load stdlib module `{}`: {}", name, e);
            }
        }
        debug!(modules = ?engine.modules.names(), "engine ready");
        engine
    }

    /// Send `println`/`print` output somewhere other than stdout
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// Register a native module importable as `:name ( ... ) import`
    pub fn register_module(&mut self, name: &str, builtins: &[Builtin]) {
        let module = Module::new(name, None);
        self.install(&module, builtins);
        self.modules.register(module);
        debug!(module = name, count = builtins.len(), "registered native module");
    }

    /// Run `program` as the body of a new module; its jars become exports
    pub fn load_module(&mut self, name: &str, program: &[Instruction]) -> Result<(), Failure> {
        let module = Module::new(name, Some(self.prelude.clone()));
        self.modules.register(Rc::clone(&module));
        self.execute(
            Rc::from(program),
            Stack::new(),
            Scope::root(module),
            &mut Chain::new(),
        )?;
        debug!(module = name, "loaded source module");
        Ok(())
    }

    pub fn run(&mut self, program: &[Instruction]) -> Result<FinalState, Failure> {
        self.run_with_middleware(program, &mut Chain::new())
    }

    pub fn run_with_middleware(
        &mut self,
        program: &[Instruction],
        middleware: &mut dyn Middleware,
    ) -> Result<FinalState, Failure> {
        let state = self.fresh_state();
        self.run_from(state, program, middleware)
    }

    /// Empty stack and a new `main` module on top of the prelude
    pub fn fresh_state(&self) -> FinalState {
        FinalState {
            stack: Stack::new(),
            scope: Scope::root(Module::new("main", Some(self.prelude.clone()))),
        }
    }

    /// Continue from a previous run's stack and scope
    pub fn run_from(
        &mut self,
        state: FinalState,
        program: &[Instruction],
        middleware: &mut dyn Middleware,
    ) -> Result<FinalState, Failure> {
        debug!(instructions = program.len(), depth = state.stack.len(), "run start");
        let result = self.execute(Rc::from(program), state.stack, state.scope, middleware);
        match &result {
            Ok(state) => debug!(depth = state.stack.len(), "run finished"),
            Err(failure) if failure.is_cancellation() => warn!("run cancelled: {}", failure.kind),
            Err(failure) => debug!("run failed: {}", failure),
        }
        result
    }

    fn install(&mut self, module: &Module, builtins: &[Builtin]) {
        for builtin in builtins {
            let key = Atom::new(format!("{}.{}", module.name(), builtin.name));
            module.define(Atom::new(builtin.name), Value::NativeFn(key.clone()));
            self.natives.insert(key, *builtin);
        }
    }

    fn load_stdlib(&mut self, name: &str) -> Result<(), String> {
        let source = stdlib_embed::get_stdlib(name).ok_or("not embedded")?;
        let program = gurk_parser::parse(source).map_err(|e| e.to_string())?;
        self.load_module(name, &program).map_err(|e| e.to_string())
    }

    fn execute(
        &mut self,
        program: Rc<[Instruction]>,
        mut stack: Stack,
        scope: Scope,
        middleware: &mut dyn Middleware,
    ) -> Result<FinalState, Failure> {
        let mut current = Frame {
            body: program,
            ip: 0,
            scope,
            root: true,
        };
        let mut suspended: Vec<Task> = Vec::new();

        loop {
            if current.finished() {
                match suspended.pop() {
                    Some(Task::Body(frame)) => current = frame,
                    Some(Task::Resume(pending)) => {
                        let resume = &pending.resume;
                        stack = (resume.finish)(resume, stack.clone()).map_err(|kind| Failure {
                            kind,
                            position: pending.position,
                            instruction: pending.instruction.clone(),
                            stack: stack.clone(),
                        })?;
                    }
                    None => {
                        return Ok(FinalState {
                            stack,
                            scope: current.scope,
                        });
                    }
                }
                continue;
            }

            let body = Rc::clone(&current.body);
            let position = current.ip;
            let instruction = &body[position];
            current.ip += 1;

            let old = stack.clone();
            let fail = |kind: ErrorKind| Failure {
                kind,
                position,
                instruction: instruction.clone(),
                stack: old.clone(),
            };

            let call = match instruction {
                Instruction::PushLiteral(value) => {
                    stack = stack.push(value.clone());
                    None
                }
                Instruction::PushCode(code) => {
                    let closure = Closure::new(Rc::clone(code), current.scope.clone());
                    stack = stack.push(Value::Code(Rc::new(closure)));
                    None
                }
                Instruction::Invoke(name) => match current.scope.resolve(name).map_err(fail)? {
                    (value, Binding::Data) => {
                        stack = stack.push(value);
                        None
                    }
                    (Value::NativeFn(key), Binding::Callable) => {
                        let (flow, next_stack, next_scope) = self
                            .call_native(&key, &stack, &current.scope)
                            .map_err(fail)?;
                        stack = next_stack;
                        current.scope = next_scope;
                        match flow {
                            Flow::Next => None,
                            Flow::Call(call) => Some(call),
                        }
                    }
                    (Value::Code(closure), Binding::Callable) => Some(Call::closure(&closure)),
                    // Jarred plain data
                    (value, Binding::Callable) => {
                        stack = stack.push(value);
                        None
                    }
                },
            };

            if let Err(cancel) = middleware.on_step(instruction, &old, &stack) {
                return Err(fail(cancel.into()));
            }

            if let Some(Call { body, scope, then }) = call {
                let callee = Frame {
                    body,
                    ip: 0,
                    scope,
                    root: false,
                };
                let caller = std::mem::replace(&mut current, callee);
                if caller.root || !caller.finished() {
                    suspended.push(Task::Body(caller));
                }
                if let Some(resume) = then {
                    suspended.push(Task::Resume(Pending {
                        resume,
                        position,
                        instruction: instruction.clone(),
                    }));
                }
            }
        }
    }

    fn call_native(
        &mut self,
        key: &Atom,
        stack: &Stack,
        scope: &Scope,
    ) -> Result<(Flow, Stack, Scope), ErrorKind> {
        let builtin = *self
            .natives
            .get(key)
            .ok_or_else(|| ErrorKind::UnboundName(key.clone()))?;
        builtin.check(stack)?;
        let (args, rest) = stack.pop_n(builtin.inputs.len())?;
        let mut native = Native::new(
            builtin.name,
            args,
            rest,
            scope.clone(),
            &self.modules,
            &mut *self.output,
        );
        let flow = (builtin.op)(&mut native)?;
        Ok((flow, native.stack, native.scope))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("modules", &self.modules.names())
            .field("natives", &self.natives.len())
            .finish_non_exhaustive()
    }
}
