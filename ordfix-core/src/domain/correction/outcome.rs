// ordfix-core/src/domain/correction/outcome.rs

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::order::SourceField;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RuleOutcome {
    Applied {
        value: String,
        /// Elements created to reach the target (0 when it already existed).
        created: usize,
        changed: bool,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<RuleWarning>,
    },
    Skipped {
        reason: SkipReason,
    },
}

impl RuleOutcome {
    pub fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn warnings(&self) -> &[RuleWarning] {
        match self {
            Self::Applied { warnings, .. } => warnings,
            Self::Skipped { .. } => &[],
        }
    }
}

/// Why a rule, or a whole document, was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ConditionFalse,
    MissingField,
    TargetUnreachable,
    UnlocatableOrderId,
    UnmatchedOrder,
    AgencyFiltered,
    ParseFailure,
    WriteFailure,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ConditionFalse => "condition false",
            Self::MissingField => "missing field",
            Self::TargetUnreachable => "target unreachable",
            Self::UnlocatableOrderId => "no order id found",
            Self::UnmatchedOrder => "order not in registry",
            Self::AgencyFiltered => "agency filtered",
            Self::ParseFailure => "parse failure",
            Self::WriteFailure => "write failure",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleWarning {
    /// The path, or the parent a missing target was created under, matched
    /// several elements; only the first was used.
    AmbiguousTarget { matches: usize },
    /// The record had no value and the empty-write policy was applied.
    MissingField { field: SourceField },
}

impl RuleWarning {
    pub fn kind(&self) -> WarningKind {
        match self {
            Self::AmbiguousTarget { .. } => WarningKind::AmbiguousTarget,
            Self::MissingField { .. } => WarningKind::MissingField,
        }
    }
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousTarget { matches } => {
                write!(f, "ambiguous target ({} matches, first used)", matches)
            }
            Self::MissingField { field } => write!(f, "no value for '{}', wrote empty", field),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    AmbiguousTarget,
    MissingField,
}

/// One line of the correction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub document: String,
    /// `None` for entries covering the whole document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(flatten)]
    pub outcome: RuleOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LogEntry {
    pub fn for_rule(document: &str, rule: &str, outcome: RuleOutcome) -> Self {
        Self {
            document: document.to_string(),
            rule: Some(rule.to_string()),
            outcome,
            detail: None,
        }
    }

    pub fn for_document(document: &str, reason: SkipReason, detail: impl Into<String>) -> Self {
        Self {
            document: document.to_string(),
            rule: None,
            outcome: RuleOutcome::skipped(reason),
            detail: Some(detail.into()),
        }
    }
}

/// Terminal state of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentState {
    Corrected,
    Unmatched,
    Unlocatable,
    ParseFailure,
    Filtered,
    /// Corrected in memory, but the output could not be written.
    WriteFailure,
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Corrected => "corrected",
            Self::Unmatched => "unmatched",
            Self::Unlocatable => "unlocatable",
            Self::ParseFailure => "parse failure",
            Self::Filtered => "filtered",
            Self::WriteFailure => "write failure",
        };
        write!(f, "{}", s)
    }
}

/// Counters over a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub documents: usize,
    pub corrected: usize,
    pub unmatched: usize,
    pub unlocatable: usize,
    pub parse_failures: usize,
    pub filtered: usize,
    pub write_failures: usize,
    pub rules_applied: usize,
    pub elements_changed: usize,
    pub elements_created: usize,
    pub rules_skipped: BTreeMap<SkipReason, usize>,
    pub warnings: BTreeMap<WarningKind, usize>,
}

impl BatchSummary {
    pub fn record(&mut self, state: DocumentState, log: &[LogEntry]) {
        self.documents += 1;
        match state {
            DocumentState::Corrected => self.corrected += 1,
            DocumentState::Unmatched => self.unmatched += 1,
            DocumentState::Unlocatable => self.unlocatable += 1,
            DocumentState::ParseFailure => self.parse_failures += 1,
            DocumentState::Filtered => self.filtered += 1,
            DocumentState::WriteFailure => self.write_failures += 1,
        }

        for entry in log.iter().filter(|e| e.rule.is_some()) {
            match &entry.outcome {
                RuleOutcome::Applied {
                    created,
                    changed,
                    warnings,
                    ..
                } => {
                    self.rules_applied += 1;
                    self.elements_created += created;
                    if *changed {
                        self.elements_changed += 1;
                    }
                    for warning in warnings {
                        *self.warnings.entry(warning.kind()).or_insert(0) += 1;
                    }
                }
                RuleOutcome::Skipped { reason } => {
                    *self.rules_skipped.entry(*reason).or_insert(0) += 1;
                }
            }
        }
    }

    pub fn documents_skipped(&self) -> usize {
        self.documents - self.corrected
    }

    pub fn total_rules_skipped(&self) -> usize {
        self.rules_skipped.values().sum()
    }

    pub fn total_warnings(&self) -> usize {
        self.warnings.values().sum()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} document(s): {} corrected, {} unmatched, {} unlocatable, {} unparseable, {} filtered, {} unwritten | rules: {} applied ({} changed, {} created), {} skipped | warnings: {}",
            self.documents,
            self.corrected,
            self.unmatched,
            self.unlocatable,
            self.parse_failures,
            self.filtered,
            self.write_failures,
            self.rules_applied,
            self.elements_changed,
            self.elements_created,
            self.total_rules_skipped(),
            self.total_warnings()
        )
    }
}
