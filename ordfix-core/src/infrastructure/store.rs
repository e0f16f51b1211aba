// ordfix-core/src/infrastructure/store.rs

use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::CorrectorError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::DocumentSink;

/// Writes outputs into a single directory. Names must stay inside it.
pub struct FsDocumentSink {
    root: PathBuf,
}

impl FsDocumentSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, file_name: &str) -> Result<PathBuf, CorrectorError> {
        let relative = Path::new(file_name);
        let safe = !file_name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(CorrectorError::UnsafePath(file_name.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl DocumentSink for FsDocumentSink {
    fn write(&self, file_name: &str, content: &[u8]) -> Result<(), CorrectorError> {
        let path = self.target(file_name)?;
        atomic_write(&path, content)?;
        debug!(path = ?path, bytes = content.len(), "Output written");
        Ok(())
    }
}
