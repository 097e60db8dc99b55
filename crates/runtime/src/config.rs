//! Run configuration
//!
//! Budgets and tracing for a run, gathered from a `gurk.toml` file, the
//! environment and the command line, in increasing order of precedence.
//!
//! # File format
//!
//! ```toml
//! [run]
//! timeout_secs = 2
//! max_steps = 1000000
//! trace = false
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `GURK_TIMEOUT_SECS` | Wall-clock limit in seconds (`0` disables) |
//! | `GURK_MAX_STEPS` | Instruction limit (`0` disables) |
//! | `GURK_TRACE` | `1`/`true` to trace every instruction |
//!
//! # Example
//!
//! ```rust,ignore
//! let config = EngineConfig::from_toml(&text)?
//!     .merge_env()
//!     .with_max_steps(Some(10_000));
//! let mut middleware = config.middleware();
//! engine.run_with_middleware(&program, &mut middleware)?;
//! ```

use crate::engine::Chain;
use crate::trace::Tracer;
use crate::watchdog::{Deadline, StepBudget};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const TIMEOUT_ENV: &str = "GURK_TIMEOUT_SECS";
pub const MAX_STEPS_ENV: &str = "GURK_MAX_STEPS";
pub const TRACE_ENV: &str = "GURK_TRACE";

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "gurk.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Wall-clock budget per run
    pub timeout: Option<Duration>,
    /// Instruction budget per run
    pub max_steps: Option<u64>,
    /// Write a trace of every instruction to stderr
    pub trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    run: RunSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunSection {
    timeout_secs: Option<u64>,
    max_steps: Option<u64>,
    trace: Option<bool>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<u64>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Parse the `[run]` table of a config file
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        Ok(Self::default().merge_file(file.run))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Override fields with any environment variables that are set and
    /// parse; malformed values are ignored
    pub fn merge_env(mut self) -> Self {
        if let Some(secs) = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(steps) = std::env::var(MAX_STEPS_ENV)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            self.max_steps = (steps > 0).then_some(steps);
        }

        if let Ok(value) = std::env::var(TRACE_ENV) {
            self.trace = matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }

        self
    }

    fn merge_file(mut self, run: RunSection) -> Self {
        if let Some(secs) = run.timeout_secs {
            self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(steps) = run.max_steps {
            self.max_steps = (steps > 0).then_some(steps);
        }
        if let Some(trace) = run.trace {
            self.trace = trace;
        }
        self
    }

    /// Middleware enforcing this configuration; empty when nothing is set
    ///
    /// The deadline clock starts when this is called.
    pub fn middleware(&self) -> Chain {
        let mut chain = Chain::new();
        if let Some(limit) = self.timeout {
            chain = chain.with(Deadline::new(limit));
        }
        if let Some(limit) = self.max_steps {
            chain = chain.with(StepBudget::new(limit));
        }
        if self.trace {
            chain = chain.with(Tracer::stderr());
        }
        chain
    }
}
