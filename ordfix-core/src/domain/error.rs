// ordfix-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid target path '{path}': {reason}")]
    #[diagnostic(
        code(ordfix::domain::target_path),
        help("Target paths are element names separated by '/', e.g. 'PositionCharacteristics/PositionLevel'.")
    )]
    InvalidTargetPath { path: String, reason: String },

    #[error("Invalid order id pattern '{pattern}': {reason}")]
    #[diagnostic(code(ordfix::domain::order_pattern))]
    InvalidOrderPattern { pattern: String, reason: String },

    #[error("Rule table Error: {0}")]
    #[diagnostic(
        code(ordfix::domain::rule_table),
        help("Rule names must be unique and the table must not be empty.")
    )]
    RuleTableError(String),

    #[error("Unknown value '{value}' for {kind}")]
    #[diagnostic(code(ordfix::domain::unknown_value))]
    UnknownValue { kind: &'static str, value: String },
}
