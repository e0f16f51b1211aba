// ordfix/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug ordfix correct ... pour voir les détails
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Correct {
            project_dir,
            inputs,
            agency,
            dry_run,
            strict,
        } => commands::correct::execute(project_dir, inputs, agency, dry_run, strict),

        Commands::Validate { project_dir } => commands::validate::execute(project_dir),

        Commands::Snapshot {
            project_dir,
            values,
            out,
        } => commands::snapshot::execute(project_dir, values, out),

        Commands::Inspect { project_dir, order } => commands::inspect::execute(project_dir, order),

        Commands::Rules { project_dir } => commands::rules::execute(project_dir),
    }
}
