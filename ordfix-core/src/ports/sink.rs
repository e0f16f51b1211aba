// ordfix-core/src/ports/sink.rs

// Where corrected documents and reports end up. The batch never touches the
// filesystem directly, so a dry run or a test can swap the destination.

use crate::error::CorrectorError;

pub trait DocumentSink: Send + Sync {
    /// Stores `content` under `file_name`, replacing any previous version.
    fn write(&self, file_name: &str, content: &[u8]) -> Result<(), CorrectorError>;
}
