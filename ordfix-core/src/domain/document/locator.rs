// ordfix-core/src/domain/document/locator.rs

use regex::{Regex, RegexBuilder};

use super::tree::Document;
use crate::domain::error::DomainError;
use crate::domain::rules::TargetPath;

pub const DEFAULT_ORDER_ID_PATTERN: &str = r"FU\d{8}";
pub const DEFAULT_ORDER_ID_ELEMENTS: [&str; 2] =
    ["//ReferenceInformation/OrderId/IdValue", "//CustomerJobCode"];

/// Finds the order number a document refers to.
///
/// Looks, in order, at the configured id elements, then at every text node,
/// then at the document id (file name). The pattern is matched
/// case-insensitively and the result is upper-cased.
#[derive(Debug, Clone)]
pub struct OrderIdLocator {
    pattern: Regex,
    elements: Vec<TargetPath>,
}

impl OrderIdLocator {
    pub fn new(pattern: &str, elements: Vec<TargetPath>) -> Result<Self, DomainError> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DomainError::InvalidOrderPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { pattern, elements })
    }

    pub fn extract_order_id(&self, document: &Document) -> Option<String> {
        let from_elements = self
            .elements
            .iter()
            .flat_map(|path| document.find_all(path))
            .filter_map(|address| document.element(&address).map(super::tree::element_text))
            .find_map(|text| self.find_in(&text));

        from_elements
            .or_else(|| document.texts().into_iter().find_map(|t| self.find_in(t)))
            .or_else(|| self.find_in(document.id()))
    }

    fn find_in(&self, text: &str) -> Option<String> {
        self.pattern
            .find(text)
            .map(|m| m.as_str().to_uppercase())
    }

    /// Locator with the default pattern and id elements.
    pub fn with_defaults() -> Result<Self, DomainError> {
        let elements = DEFAULT_ORDER_ID_ELEMENTS
            .iter()
            .map(|raw| TargetPath::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(DEFAULT_ORDER_ID_PATTERN, elements)
    }
}
