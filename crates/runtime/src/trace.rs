//! Program evolution trace
//!
//! Writes one line per executed instruction followed by the stack it left:
//!
//! ```text
//! 1                 => 1
//! 2                 => 1 2
//! swap              => 2 1
//! ```

use crate::engine::{Cancellation, Middleware};
use gurk_core::{Instruction, Stack};
use std::io::{self, Write};

const INSTRUCTION_WIDTH: usize = 18;

pub struct Tracer<W: Write> {
    out: W,
}

impl Tracer<io::Stderr> {
    pub fn stderr() -> Self {
        Tracer::new(io::stderr())
    }
}

impl<W: Write> Tracer<W> {
    pub fn new(out: W) -> Self {
        Tracer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Middleware for Tracer<W> {
    fn on_step(
        &mut self,
        instruction: &Instruction,
        _old: &Stack,
        new: &Stack,
    ) -> Result<(), Cancellation> {
        let mut text = instruction.to_string();
        // Code bodies can be long; keep the stack column readable
        if text.chars().count() > INSTRUCTION_WIDTH {
            text = text.chars().take(INSTRUCTION_WIDTH - 3).collect::<String>() + "...";
        }
        writeln!(self.out, "{:<width$}=> {}", text, new, width = INSTRUCTION_WIDTH)
            .map_err(|e| Cancellation(format!("trace output: {}", e)))
    }
}
