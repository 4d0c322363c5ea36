//! lifo-demo CLI
//!
//! Runs the reference-stack and pool-stack walkthroughs.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use lifo_demo::{DemoConfig, run_dyn, run_pool};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing::info;

#[derive(ClapParser)]
#[command(name = "lifo-demo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Walk through the lifo stack variants", long_about = None)]
struct Cli {
    /// TOML configuration file (flags override its values)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push strings onto a linked reference stack and pop them back
    Dyn {
        /// Alias the strings instead of deep-copying them
        #[arg(long)]
        alias: bool,

        /// Strings to push (defaults to the configured items)
        items: Vec<String>,
    },

    /// Push product records into a fixed-capacity pool and pop them back
    Pool {
        /// Number of slots in the pool
        #[arg(short, long)]
        capacity: Option<usize>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lifo_demo=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DemoConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(2);
        }),
        None => DemoConfig::default(),
    };

    let transcript = match cli.command {
        Commands::Dyn { alias, items } => {
            let items = if items.is_empty() {
                config.dyn_stack.items
            } else {
                items
            };
            let deep_copy = config.dyn_stack.deep_copy && !alias;
            info!(count = items.len(), deep_copy, "running dynamic stack driver");
            run_dyn(&items, deep_copy)
        }
        Commands::Pool { capacity } => {
            let capacity = capacity.unwrap_or(config.pool.capacity);
            info!(capacity, "running pool stack driver");
            run_pool(capacity)
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "lifo-demo", &mut io::stdout());
            return;
        }
    };

    match transcript {
        Ok(text) => print!("{}", text),
        Err(err) => {
            eprintln!("Error: {} ({})", err, err.name());
            process::exit(1);
        }
    }
}
