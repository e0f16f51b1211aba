// ordfix/src/commands/mod.rs

pub mod correct;
pub mod inspect;
pub mod rules;
pub mod snapshot;
pub mod validate;

use std::path::Path;

use ordfix_core::domain::project::CorrectorConfig;
use ordfix_core::infrastructure::config::load_corrector_config;

/// Loads `ordfix.yaml`. On failure the diagnostic (code and help) is printed
/// and the process exits.
pub fn load_config(project_dir: &Path) -> CorrectorConfig {
    println!("⚙️  Loading configuration...");
    match load_corrector_config(project_dir) {
        Ok(config) => {
            println!("   Project: {} (client {})", config.name, config.client);
            config
        }
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(2);
        }
    }
}

