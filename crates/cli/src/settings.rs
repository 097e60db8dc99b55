//! Where run settings come from
//!
//! Later sources win: built-in defaults, then the config file (`--config`,
//! else `gurk.toml` in the working directory if there is one), then the
//! `GURK_*` environment variables, then command-line flags.

use gurk_runtime::EngineConfig;
use gurk_runtime::config::{CONFIG_FILE, ConfigError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Budget and trace flags shared by `run` and `repl`
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunFlags {
    /// Config file (defaults to ./gurk.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Cancel a run after this many seconds (0 disables)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Cancel a run after this many instructions (0 disables)
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u64>,

    /// Print every instruction and the resulting stack to stderr
    #[arg(long)]
    pub trace: bool,
}

pub fn resolve(flags: &RunFlags, cwd: &Path) -> Result<EngineConfig, ConfigError> {
    let file_config = match &flags.config {
        Some(path) => EngineConfig::load(path)?,
        None => {
            let default = cwd.join(CONFIG_FILE);
            if default.is_file() {
                EngineConfig::load(&default)?
            } else {
                EngineConfig::default()
            }
        }
    };

    let mut config = file_config.merge_env();
    if let Some(secs) = flags.timeout {
        config = config.with_timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }
    if let Some(steps) = flags.max_steps {
        config = config.with_max_steps((steps > 0).then_some(steps));
    }
    if flags.trace {
        config = config.with_trace(true);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gurk_runtime::config::{MAX_STEPS_ENV, TIMEOUT_ENV, TRACE_ENV};
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        // SAFETY: every test that touches the environment is #[serial]
        unsafe {
            std::env::remove_var(TIMEOUT_ENV);
            std::env::remove_var(MAX_STEPS_ENV);
            std::env::remove_var(TRACE_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let config = resolve(&RunFlags::default(), dir.path()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    #[serial]
    fn test_picks_up_gurk_toml_in_cwd() {
        clear_env();
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[run]\ntimeout_secs = 3\n").unwrap();
        let config = resolve(&RunFlags::default(), dir.path()).unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    #[serial]
    fn test_explicit_config_path() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.toml");
        fs::write(&path, "[run]\nmax_steps = 99\n").unwrap();
        let flags = RunFlags {
            config: Some(path),
            ..RunFlags::default()
        };
        let config = resolve(&flags, Path::new("/")).unwrap();
        assert_eq!(config.max_steps, Some(99));
    }

    #[test]
    #[serial]
    fn test_precedence_file_env_flags() {
        clear_env();
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[run]\ntimeout_secs = 1\nmax_steps = 10\n",
        )
        .unwrap();
        unsafe {
            std::env::set_var(TIMEOUT_ENV, "5");
            std::env::set_var(MAX_STEPS_ENV, "20");
        }
        let flags = RunFlags {
            max_steps: Some(30),
            trace: true,
            ..RunFlags::default()
        };
        let config = resolve(&flags, dir.path()).unwrap();
        clear_env();

        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.max_steps, Some(30));
        assert!(config.trace);
    }

    #[test]
    #[serial]
    fn test_flag_zero_disables_budget() {
        clear_env();
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[run]\ntimeout_secs = 4\n").unwrap();
        let flags = RunFlags {
            timeout: Some(0),
            ..RunFlags::default()
        };
        assert_eq!(resolve(&flags, dir.path()).unwrap().timeout, None);
    }

    #[test]
    #[serial]
    fn test_bad_config_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[run\n").unwrap();
        assert!(matches!(
            resolve(&RunFlags::default(), dir.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
