// ordfix-core/src/ports/mod.rs

pub mod sink;
pub mod snapshot;

pub use sink::DocumentSink;
pub use snapshot::SnapshotSource;
