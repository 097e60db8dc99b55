//! Budgets for runaway programs
//!
//! The engine has no notion of time or effort of its own. These middlewares
//! watch a run from the outside and cancel it once a budget is spent:
//!
//! | Middleware   | Budget                              |
//! |--------------|-------------------------------------|
//! | `Deadline`   | wall-clock time since construction  |
//! | `StepBudget` | number of executed instructions     |
//!
//! Both are checked after every instruction, so a single long `sleep`
//! overruns a deadline by at most its own duration.
//!
//! ## Example
//!
//! ```ignore
//! let mut deadline = Deadline::new(Duration::from_secs(2));
//! let result = engine.run_with_middleware(&program, &mut deadline);
//! assert!(result.unwrap_err().is_cancellation());
//! ```

use crate::engine::{Cancellation, Middleware};
use gurk_core::{Instruction, Stack};
use std::time::{Duration, Instant};

/// Cancel once `limit` has elapsed
#[derive(Debug, Clone)]
pub struct Deadline {
    limit: Duration,
    started: Instant,
}

impl Deadline {
    /// The clock starts now
    pub fn new(limit: Duration) -> Self {
        Deadline {
            limit,
            started: Instant::now(),
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Middleware for Deadline {
    fn on_step(&mut self, _: &Instruction, _: &Stack, _: &Stack) -> Result<(), Cancellation> {
        let elapsed = self.elapsed();
        if elapsed > self.limit {
            return Err(Cancellation(format!(
                "timeout: ran for {:.3}s, limit is {:.3}s",
                elapsed.as_secs_f64(),
                self.limit.as_secs_f64()
            )));
        }
        Ok(())
    }
}

/// Cancel after `limit` instructions
#[derive(Debug, Clone)]
pub struct StepBudget {
    limit: u64,
    steps: u64,
}

impl StepBudget {
    pub fn new(limit: u64) -> Self {
        StepBudget { limit, steps: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Middleware for StepBudget {
    fn on_step(&mut self, _: &Instruction, _: &Stack, _: &Stack) -> Result<(), Cancellation> {
        self.steps += 1;
        if self.steps > self.limit {
            return Err(Cancellation(format!(
                "step budget of {} instructions exhausted",
                self.limit
            )));
        }
        Ok(())
    }
}
