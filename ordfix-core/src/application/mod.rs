// ordfix-core/src/application/mod.rs

pub mod batch;
pub mod correct;
pub mod snapshot;
pub mod validation;

// --- RE-EXPORTS (FACADE PATTERN) ---
// `use ordfix_core::application::{run_correction, validate_snapshot};`

pub use batch::{BatchOrchestrator, BatchReport, ProcessedDocument};
pub use correct::{
    CorrectionOptions, CorrectionReport, RuleOrigin, resolve_rules, run_correction,
};
pub use snapshot::{SnapshotSettings, build_snapshot};
pub use validation::{ValidationReport, ValidationSettings, validate_snapshot};
