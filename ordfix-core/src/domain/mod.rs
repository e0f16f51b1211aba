pub mod correction;
pub mod document;
pub mod error;
pub mod order;
pub mod project;
pub mod rules;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use error::DomainError;
