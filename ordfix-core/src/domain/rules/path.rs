// ordfix-core/src/domain/rules/path.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Location of an element inside a document, as a sequence of element names.
///
/// The first step matches anywhere in the tree (the root included), every
/// following step matches a direct child. `//A/B/C`, `/A/B/C` and `A/B/C`
/// all parse to the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetPath {
    steps: Vec<String>,
}

impl TargetPath {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidTargetPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut steps = Vec::new();
        for step in trimmed.split('/') {
            if step.is_empty() {
                return Err(invalid("empty step (nested '//' is not supported)"));
            }
            if !is_element_name(step) {
                return Err(invalid(&format!(
                    "'{}' is not a plain element name (no predicates, wildcards, attributes or prefixes)",
                    step
                )));
            }
            steps.push(step.to_string());
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Name of the element the path points at.
    pub fn leaf(&self) -> &str {
        self.steps.last().map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn is_element_name(step: &str) -> bool {
    let mut chars = step.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//{}", self.steps.join("/"))
    }
}

impl FromStr for TargetPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TargetPath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TargetPath> for String {
    fn from(path: TargetPath) -> Self {
        path.to_string()
    }
}
