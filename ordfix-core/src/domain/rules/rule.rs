// ordfix-core/src/domain/rules/rule.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use validator::Validate;

use super::path::TargetPath;
use crate::domain::error::DomainError;
use crate::domain::order::{OrderRecord, SourceField};

/// One correction: write `source_field` of the matched record into `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(from = "RuleDefinition")]
pub struct CorrectionRule {
    #[validate(length(min = 1, message = "Rule name cannot be empty"))]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "xpath")]
    pub target: TargetPath,

    pub source_field: SourceField,

    #[serde(default, skip_serializing_if = "Condition::is_always")]
    pub condition: Condition,

    /// Where a newly created leaf goes among its siblings.
    #[serde(default, skip_serializing_if = "InsertPosition::is_last")]
    pub insert: InsertPosition,
}

/// Rule as written in config files and snapshots. Exported rule tables
/// give placement as a `position` keyword instead of `insert`.
#[derive(Deserialize)]
struct RuleDefinition {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "xpath")]
    target: TargetPath,
    source_field: SourceField,
    #[serde(default)]
    condition: Condition,
    #[serde(default)]
    insert: Option<InsertPosition>,
    #[serde(default)]
    position: Option<String>,
}

impl From<RuleDefinition> for CorrectionRule {
    fn from(definition: RuleDefinition) -> Self {
        let insert = match (definition.insert, definition.position.as_deref()) {
            (Some(insert), _) => insert,
            (None, Some(raw)) => InsertPosition::from_placement(raw).unwrap_or_else(|| {
                warn!(rule = %definition.name, position = raw, "Unknown placement, new elements are appended");
                InsertPosition::Last
            }),
            (None, None) => InsertPosition::Last,
        };

        Self {
            name: definition.name,
            description: definition.description,
            target: definition.target,
            source_field: definition.source_field,
            condition: definition.condition,
            insert,
        }
    }
}

impl CorrectionRule {
    pub fn new(name: &str, target: TargetPath, source_field: SourceField) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            target,
            source_field,
            condition: Condition::Always,
            insert: InsertPosition::Last,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_insert(mut self, insert: InsertPosition) -> Self {
        self.insert = insert;
        self
    }
}

/// Applicability predicate over the matched record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Always,
    /// Holds when the record's site flag is set.
    #[serde(alias = "site_not_gemenos")]
    SiteNotExcluded,
}

impl Condition {
    pub fn holds(&self, record: &OrderRecord) -> bool {
        match self {
            Self::Always => true,
            Self::SiteNotExcluded => record.site_flag,
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::SiteNotExcluded => write!(f, "site_not_excluded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    First,
    #[default]
    Last,
    /// Right after the last sibling with this name, or last when absent.
    After(String),
}

impl InsertPosition {
    pub fn is_last(&self) -> bool {
        matches!(self, Self::Last)
    }

    /// Reads the placement keywords of exported rule tables:
    /// `before_siblings`, `first_child`, `beginning`, `end` and
    /// `after_<sibling_in_snake_case>`.
    pub fn from_placement(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        match raw.as_str() {
            "before_siblings" | "first_child" | "beginning" | "first" => return Some(Self::First),
            "end" | "last" | "last_child" => return Some(Self::Last),
            _ => {}
        }

        let sibling = match raw.strip_prefix("after_")? {
            // Shortened in the exported tables.
            "environment_id" => "WorkSiteEnvironmentId".to_string(),
            anchor => anchor.split('_').map(capitalize).collect(),
        };
        (!sibling.is_empty()).then_some(Self::After(sibling))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Last => write!(f, "last"),
            Self::After(sibling) => write!(f, "after {}", sibling),
        }
    }
}

/// What to do when the record has no value for a rule's source field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    #[default]
    Skip,
    WriteEmpty,
}

impl fmt::Display for MissingFieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::WriteEmpty => write!(f, "write_empty"),
        }
    }
}

impl FromStr for MissingFieldPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "skip" => Ok(Self::Skip),
            "write_empty" | "empty" => Ok(Self::WriteEmpty),
            _ => Err(DomainError::UnknownValue {
                kind: "missing field policy",
                value: s.to_string(),
            }),
        }
    }
}
