// ordfix-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CorrectorError {
    // --- DOMAIN (paths, rule table, order patterns) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE (io, yaml, json, xml) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- OUTPUTS ---
    #[error("Output sink unavailable: {0}")]
    #[diagnostic(code(ordfix::sink))]
    SinkUnavailable(String),

    #[error("Refusing to write outside the output directory: {0}")]
    #[diagnostic(
        code(ordfix::unsafe_output),
        help("Output names are plain file names derived from the input document id.")
    )]
    UnsafePath(String),
}

impl From<std::io::Error> for CorrectorError {
    fn from(err: std::io::Error) -> Self {
        CorrectorError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<serde_json::Error> for CorrectorError {
    fn from(err: serde_json::Error) -> Self {
        CorrectorError::Infrastructure(InfrastructureError::JsonError(err))
    }
}
