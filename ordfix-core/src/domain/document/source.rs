// ordfix-core/src/domain/document/source.rs

use std::collections::HashSet;
use std::path::Path;

/// Raw bytes of one input document, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name, also used to derive the output name.
    pub id: String,
    pub content: Vec<u8>,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// `<stem><suffix>.xml`, e.g. `order_FU70001236_THALES_corrected.xml`.
pub fn output_file_name(id: &str, suffix: &str) -> String {
    format!("{}{suffix}.xml", stem(id))
}

fn stem(id: &str) -> &str {
    Path::new(id)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(id)
}

/// Hands out output names, never the same one twice in a batch.
///
/// Inputs from different directories may share a file name; the second
/// `order.xml` becomes `order<suffix>_2.xml`.
#[derive(Debug, Clone, Default)]
pub struct OutputNames {
    suffix: String,
    taken: HashSet<String>,
}

impl OutputNames {
    /// `reserved` names (e.g. the report file) are never handed out.
    pub fn new<I, S>(suffix: &str, reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffix: suffix.to_string(),
            taken: reserved.into_iter().map(Into::into).collect(),
        }
    }

    pub fn claim(&mut self, id: &str) -> String {
        let name = output_file_name(id, &self.suffix);
        if self.taken.insert(name.clone()) {
            return name;
        }

        let stem = stem(id);
        (2..)
            .map(|n| format!("{stem}{}_{n}.xml", self.suffix))
            .find(|candidate| !self.taken.contains(candidate))
            .map(|candidate| {
                self.taken.insert(candidate.clone());
                candidate
            })
            .unwrap_or(name)
    }
}
