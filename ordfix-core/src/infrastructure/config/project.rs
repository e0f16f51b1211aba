// ordfix-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::project::CorrectorConfig;
use crate::domain::rules::MissingFieldPolicy;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["ordfix.yaml", "ordfix.yml"];

pub const ENV_REGISTRY: &str = "ORDFIX_REGISTRY";
pub const ENV_OUTPUT_DIR: &str = "ORDFIX_OUTPUT_DIR";
pub const ENV_MISSING_FIELD: &str = "ORDFIX_MISSING_FIELD";

// --- LOADER ---

#[instrument(skip(project_dir))]
pub fn load_corrector_config(project_dir: &Path) -> Result<CorrectorConfig, InfrastructureError> {
    // 1. Discovery
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading corrector configuration");

    // 2. YAML
    let content = fs::read_to_string(&config_path)?;
    let mut config: CorrectorConfig = serde_yaml::from_str(&content)?;

    // 3. Environment layering, e.g. ORDFIX_OUTPUT_DIR=/tmp/out ordfix correct
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    // 4. Fail fast on a bad file rather than mid-batch
    config.validate()?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
        .ok_or_else(|| {
            InfrastructureError::ConfigNotFound(format!(
                "No configuration file found in {:?}. Checked: {:?}",
                root, CONFIG_CANDIDATES
            ))
        })
}

fn apply_env_overrides<F>(config: &mut CorrectorConfig, var: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = var(ENV_REGISTRY) {
        info!(old = ?config.registry, new = ?val, "Overriding registry via ENV");
        config.registry = val;
    }
    if let Some(val) = var(ENV_OUTPUT_DIR) {
        info!(old = ?config.output_dir, new = ?val, "Overriding output dir via ENV");
        config.output_dir = val;
    }
    if let Some(val) = var(ENV_MISSING_FIELD) {
        let policy: MissingFieldPolicy = val.parse().map_err(|_| {
            InfrastructureError::ConfigError(format!(
                "{ENV_MISSING_FIELD} must be 'skip' or 'write-empty', got '{val}'"
            ))
        })?;
        info!(old = %config.missing_field, new = %policy, "Overriding missing-field policy via ENV");
        config.missing_field = policy;
    }
    Ok(())
}
