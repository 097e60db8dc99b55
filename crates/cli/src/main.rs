//! gurk command-line interface
//!
//! Runs .gurk programs and hosts the interactive REPL.
//!
//! Exit codes for `gurk run`: 0 on success, 1 when the program fails or
//! cannot be loaded, 2 when a timeout or step budget cancels it.

mod repl;
mod settings;

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use gurk_runtime::Engine;
use settings::RunFlags;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

const LOG_ENV: &str = "GURK_LOG";

#[derive(ClapParser)]
#[command(name = "gurk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "gurk - run stack-language programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a .gurk program
    Run {
        /// Program source file
        file: PathBuf,

        #[command(flatten)]
        flags: RunFlags,

        /// Print the final stack after a successful run
        #[arg(long)]
        print_stack: bool,
    },

    /// Start an interactive session
    Repl {
        #[command(flatten)]
        flags: RunFlags,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            flags,
            print_stack,
        } => run_file(&file, &flags, print_stack),
        Commands::Repl { flags } => run_repl(&flags),
        Commands::Completions { shell } => run_completions(shell),
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn run_file(path: &Path, flags: &RunFlags, print_stack: bool) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", path.display(), e);
            process::exit(1);
        }
    };

    let program = match gurk_parser::parse(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Error: {}: {}", path.display(), e);
            process::exit(1);
        }
    };

    let config = match settings::resolve(flags, &current_dir()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut middleware = config.middleware();
    match Engine::new().run_with_middleware(&program, &mut middleware) {
        Ok(state) => {
            if print_stack {
                println!("{}", state.stack);
            }
        }
        Err(failure) => {
            eprintln!("Error: {}", failure);
            eprintln!("  stack: {}", failure.stack);
            process::exit(if failure.is_cancellation() { 2 } else { 1 });
        }
    }
}

fn run_repl(flags: &RunFlags) {
    let config = match settings::resolve(flags, &current_dir()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = repl::run(config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_completions(shell: Shell) {
    generate(shell, &mut Cli::command(), "gurk", &mut io::stdout());
}
