// ordfix/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ordfix")]
#[command(about = "Rule-driven auto-corrector for XML order documents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🛠️  Corrects XML order documents against the order registry
    Correct {
        /// Project directory (holds ordfix.yaml)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// XML files or directories to correct
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Only correct orders of this agency code
        #[arg(long, short)]
        agency: Option<String>,

        /// Process and report without writing any file
        #[arg(long)]
        dry_run: bool,

        /// Exit with an error if any document was not corrected
        #[arg(long)]
        strict: bool,
    },

    /// ✅ Validates the registry snapshot structure
    Validate {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 📥 Builds the registry snapshot from a sheet export
    Snapshot {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Sheet export ({"values": [[...]]}, first row = headers)
        #[arg(long)]
        values: PathBuf,

        /// Output file (default: the configured registry)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// 🔍 Shows registry metadata and statistics, or one order
    Inspect {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Order number to display
        #[arg(long, short)]
        order: Option<String>,
    },

    /// 📋 Lists the active correction rules
    Rules {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}
