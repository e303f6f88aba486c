//! Vaultguard - PIN-guarded account CLI

use clap::Parser;

use vaultguard_cli::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);
    run(cli)
}
