// ordfix-core/src/ports/snapshot.rs

use crate::domain::order::Snapshot;
use crate::error::CorrectorError;

/// Supplies the order registry snapshot a batch is corrected against.
pub trait SnapshotSource {
    fn load(&self) -> Result<Snapshot, CorrectorError>;
}
