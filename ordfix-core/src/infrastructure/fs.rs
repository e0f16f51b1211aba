// ordfix-core/src/infrastructure/fs.rs

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::document::SourceDocument;
use crate::infrastructure::error::InfrastructureError;

const XML_EXTENSION: &str = "xml";

/// Writes `content` to `path` through a temporary file in the same
/// directory, so readers see either the old file or the complete new one.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Expands the given inputs into the list of XML files to process.
///
/// Files are taken as given whatever their extension. Directories are walked
/// recursively and only `*.xml` entries are kept. `skip_dir` (the output
/// directory) is never descended into so a re-run does not pick up its own
/// results. The result is sorted and deduplicated.
pub fn discover_xml_files(
    inputs: &[PathBuf],
    skip_dir: Option<&Path>,
) -> Result<Vec<PathBuf>, InfrastructureError> {
    let skip = skip_dir.and_then(|d| d.canonicalize().ok());
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            return Err(InfrastructureError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Input {:?} does not exist", input),
            )));
        }

        let walker = WalkDir::new(input).follow_links(true).into_iter();
        for entry in walker.filter_entry(|e| {
            skip.as_ref()
                .is_none_or(|s| e.path().canonicalize().ok().as_ref() != Some(s))
        }) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let is_xml = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(XML_EXTENSION));
            if entry.file_type().is_file() && is_xml {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    debug!(count = files.len(), "Discovered input documents");
    Ok(files)
}

/// Reads each file into a [`SourceDocument`] identified by its file name.
pub fn read_documents(paths: &[PathBuf]) -> Result<Vec<SourceDocument>, InfrastructureError> {
    paths
        .iter()
        .map(|path| {
            let id = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let content = fs::read(path)?;
            Ok(SourceDocument::new(id, content))
        })
        .collect()
}
