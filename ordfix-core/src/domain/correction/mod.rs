// ordfix-core/src/domain/correction/mod.rs

pub mod applicator;
pub mod outcome;

pub use applicator::RuleApplicator;
pub use outcome::{
    BatchSummary, DocumentState, LogEntry, RuleOutcome, RuleWarning, SkipReason, WarningKind,
};
