pub mod project;
pub mod snapshot;

pub use crate::domain::project::CorrectorConfig;
pub use project::load_corrector_config;
pub use snapshot::{
    JsonSnapshotSource, load_raw_snapshot, load_sheet_values, load_snapshot, save_snapshot,
};
