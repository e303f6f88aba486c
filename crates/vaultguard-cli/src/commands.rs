//! CLI command implementations

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vaultguard_core::FIELD_MANIFEST;

use crate::config::CliConfig;
use crate::demo::run_demo;
use crate::script::Outcome;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "vaultguard_cli=info,vaultguard_core=info";

/// Vaultguard - PIN-guarded accounts with lockout
#[derive(Parser)]
#[command(name = "vaultguard")]
#[command(about = "PIN-guarded account ledger with lockout protection")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the built-in walkthrough
    Demo,

    /// Execute a command script
    Run {
        /// Path to script file
        script: PathBuf,
    },

    /// Show the effective lockout policy
    Policy,

    /// List account fields and how they are exposed
    Manifest {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Initialize logging to stderr
pub fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn print_outcomes(outcomes: &[Outcome]) {
    for outcome in outcomes {
        println!("{}", outcome);
    }
    let rejected = outcomes.iter().filter(|o| !o.is_ok()).count();
    println!();
    println!("{} commands, {} rejected", outcomes.len(), rejected);
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(CliConfig::default_path);
    let config = CliConfig::load_or_default(&config_path)?;

    match cli.command {
        Commands::Demo => {
            let mut runner = config.runner()?;
            let outcomes = run_demo(&mut runner)?;
            print_outcomes(&outcomes);
        }

        Commands::Run { script } => {
            let source = std::fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let mut runner = config.runner()?;
            info!(script = %script.display(), accounts = runner.registry().len(), "running script");
            let outcomes = runner
                .run_script(&source)
                .with_context(|| format!("Invalid script {}", script.display()))?;
            print_outcomes(&outcomes);
        }

        Commands::Policy => {
            let policy = config.policy();
            println!("Max failed attempts: {}", policy.max_failed_attempts);
            match policy.max_unlock_attempts {
                Some(max) => println!("Max unlock attempts: {}", max),
                None => println!("Max unlock attempts: unbounded"),
            }
            let hashing = config.hashing;
            println!(
                "Argon2id: {} KiB, {} iterations, parallelism {}",
                hashing.memory_kib, hashing.iterations, hashing.parallelism
            );
        }

        Commands::Manifest { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(FIELD_MANIFEST)?);
            } else {
                for field in FIELD_MANIFEST {
                    println!("{:<20} {:<10} {}", field.name, format!("{:?}", field.access), field.description);
                }
            }
        }
    }

    Ok(())
}
