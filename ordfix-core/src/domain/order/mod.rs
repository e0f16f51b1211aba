// ordfix-core/src/domain/order/mod.rs

pub mod record;
pub mod registry;
pub mod snapshot;

pub use record::{OrderRecord, SourceField};
pub use registry::OrderRegistry;
pub use snapshot::{Snapshot, SnapshotMetadata, SnapshotStatistics};
