// ordfix-core/src/domain/project/mod.rs

pub mod configuration;
pub use configuration::CorrectorConfig;
