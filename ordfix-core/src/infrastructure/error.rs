// ordfix-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(ordfix::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(ordfix::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(ordfix::infra::config_missing))]
    ConfigNotFound(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(ordfix::infra::config_invalid))]
    InvalidConfig(#[from] validator::ValidationErrors),

    // --- SNAPSHOT / JSON ---
    #[error("JSON Error: {0}")]
    #[diagnostic(
        code(ordfix::infra::json),
        help("The registry snapshot must be a JSON object with 'metadata' and 'commandes'.")
    )]
    JsonError(#[from] serde_json::Error),

    #[error("Snapshot Error: {0}")]
    #[diagnostic(code(ordfix::infra::snapshot))]
    SnapshotError(String),

    // --- XML ---
    #[error("XML Parsing Error in '{document}': {message}")]
    #[diagnostic(
        code(ordfix::infra::xml_parse),
        help("The document is not well-formed XML; it was left untouched.")
    )]
    XmlParse { document: String, message: String },

    #[error("XML Writing Error in '{document}': {message}")]
    #[diagnostic(code(ordfix::infra::xml_write))]
    XmlWrite { document: String, message: String },
}
