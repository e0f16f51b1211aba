// ordfix-core/src/domain/rules/mod.rs

pub mod path;
pub mod rule;
pub mod table;

pub use path::TargetPath;
pub use rule::{Condition, CorrectionRule, InsertPosition, MissingFieldPolicy};
pub use table::RuleTable;
