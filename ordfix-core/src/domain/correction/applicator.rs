// ordfix-core/src/domain/correction/applicator.rs

use tracing::{debug, warn};

use super::outcome::{RuleOutcome, RuleWarning, SkipReason};
use crate::domain::document::Document;
use crate::domain::order::OrderRecord;
use crate::domain::rules::{CorrectionRule, MissingFieldPolicy};

/// Applies a single correction rule to a document.
/// This is PURE domain logic: the document is mutated in memory only.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleApplicator {
    policy: MissingFieldPolicy,
}

impl RuleApplicator {
    pub fn new(policy: MissingFieldPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MissingFieldPolicy {
        self.policy
    }

    pub fn apply(
        &self,
        document: &mut Document,
        record: &OrderRecord,
        rule: &CorrectionRule,
    ) -> RuleOutcome {
        // 1. Condition
        if !rule.condition.holds(record) {
            debug!(rule = %rule.name, condition = %rule.condition, "Condition not met");
            return RuleOutcome::skipped(SkipReason::ConditionFalse);
        }

        // 2. Value (explicit policy when missing)
        let mut warnings = Vec::new();
        let value = match (record.value(rule.source_field), self.policy) {
            (Some(value), _) => value.to_string(),
            (None, MissingFieldPolicy::Skip) => {
                debug!(rule = %rule.name, field = %rule.source_field, "No value, rule skipped");
                return RuleOutcome::skipped(SkipReason::MissingField);
            }
            (None, MissingFieldPolicy::WriteEmpty) => {
                warnings.push(RuleWarning::MissingField {
                    field: rule.source_field,
                });
                String::new()
            }
        };

        // 3. Target (first match, or minimal creation)
        let Some(resolution) = document.resolve_or_create(&rule.target, &rule.insert) else {
            return RuleOutcome::skipped(SkipReason::TargetUnreachable);
        };
        if resolution.is_ambiguous() {
            warn!(
                document = document.id(),
                rule = %rule.name,
                path = %rule.target,
                matches = resolution.matches,
                "Ambiguous target, writing the first match only"
            );
            warnings.push(RuleWarning::AmbiguousTarget {
                matches: resolution.matches,
            });
        }

        // 4. Write
        let Some(changed) = document.set_text(&resolution.address, &value) else {
            return RuleOutcome::skipped(SkipReason::TargetUnreachable);
        };

        RuleOutcome::Applied {
            value,
            created: resolution.created,
            changed,
            warnings,
        }
    }
}
