// ordfix-core/src/domain/rules/table.rs

use std::collections::HashSet;
use validator::Validate;

use super::path::TargetPath;
use super::rule::{Condition, CorrectionRule, InsertPosition};
use crate::domain::error::DomainError;
use crate::domain::order::SourceField;

/// Ordered, immutable list of correction rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    rules: Vec<CorrectionRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<CorrectionRule>) -> Result<Self, DomainError> {
        if rules.is_empty() {
            return Err(DomainError::RuleTableError("no rules defined".to_string()));
        }

        let mut seen = HashSet::new();
        for rule in &rules {
            rule.validate()
                .map_err(|e| DomainError::RuleTableError(format!("rule '{}': {}", rule.name, e)))?;
            if !seen.insert(rule.name.as_str()) {
                return Err(DomainError::RuleTableError(format!(
                    "duplicate rule name '{}'",
                    rule.name
                )));
            }
        }

        Ok(Self { rules })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorrectionRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn into_rules(self) -> Vec<CorrectionRule> {
        self.rules
    }

    /// Built-in table for the order documents.
    pub fn default_rules() -> Vec<CorrectionRule> {
        fn rule(name: &str, path: &str, field: SourceField, description: &str) -> Option<CorrectionRule> {
            TargetPath::parse(path)
                .ok()
                .map(|target| CorrectionRule::new(name, target, field).with_description(description))
        }

        let rules = [
            rule(
                "numero_commande",
                "//ReferenceInformation/OrderId/IdValue",
                SourceField::OrderId,
                "Order number in OrderId/IdValue",
            )
            .map(|r| r.with_insert(InsertPosition::First)),
            rule(
                "emploi_cc_position_code",
                "//PositionCharacteristics/PositionStatus/Code",
                SourceField::PositionCode,
                "Position code in PositionStatus/Code",
            )
            .map(|r| r.with_insert(InsertPosition::First)),
            rule(
                "categorie_socio_position_level",
                "//PositionCharacteristics/PositionLevel",
                SourceField::SocioCategory,
                "Socio-professional category in PositionLevel",
            )
            .map(|r| r.with_insert(InsertPosition::After("PositionStatus".to_string()))),
            rule(
                "classement_cc_coefficient",
                "//PositionCharacteristics/PositionCoefficient",
                SourceField::PositionCoefficient,
                "Position classification in PositionCoefficient",
            )
            .map(|r| r.with_insert(InsertPosition::After("PositionLevel".to_string()))),
            rule(
                "centre_analyse_cost_center_name",
                "//CustomerReportingRequirements/CostCenterName",
                SourceField::CostCenterName,
                "Full cost center in CostCenterName",
            )
            .map(|r| r.with_insert(InsertPosition::After("CostCenterCode".to_string()))),
            rule(
                "centre_analyse_department_code",
                "//CustomerReportingRequirements/DepartmentCode",
                SourceField::CostCenterPrefix,
                "Cost center prefix in DepartmentCode",
            )
            .map(|r| r.with_insert(InsertPosition::First)),
            rule(
                "centre_analyse_cost_center_code",
                "//CustomerReportingRequirements/CostCenterCode",
                SourceField::CostCenterPrefix,
                "Cost center prefix in CostCenterCode",
            )
            .map(|r| r.with_insert(InsertPosition::After("DepartmentCode".to_string()))),
            rule(
                "worksite_conditional",
                "//WorkSite/WorkSiteName",
                SourceField::CostCenterName,
                "Cost center in WorkSiteName unless the site is excluded",
            )
            .map(|r| {
                r.with_condition(Condition::SiteNotExcluded)
                    .with_insert(InsertPosition::After("WorkSiteEnvironmentId".to_string()))
            }),
        ];

        rules.into_iter().flatten().collect()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            rules: Self::default_rules(),
        }
    }
}
