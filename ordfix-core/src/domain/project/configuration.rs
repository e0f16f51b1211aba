// src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::document::{DEFAULT_ORDER_ID_ELEMENTS, DEFAULT_ORDER_ID_PATTERN, OrderIdLocator};
use crate::domain::error::DomainError;
use crate::domain::rules::{CorrectionRule, MissingFieldPolicy, TargetPath};

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct CorrectorConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,

    #[serde(default = "default_client")]
    #[validate(length(min = 1, message = "Client cannot be empty"))]
    pub client: String,

    /// Snapshot file, relative to the project directory.
    #[serde(default = "default_registry")]
    pub registry: String,

    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,

    #[serde(rename = "output-suffix", default = "default_output_suffix")]
    pub output_suffix: String,

    #[serde(rename = "report-file", default = "default_report_file")]
    pub report_file: String,

    #[serde(rename = "missing-field", default)]
    pub missing_field: MissingFieldPolicy,

    #[serde(rename = "excluded-site", default = "default_excluded_site")]
    #[validate(length(min = 1, message = "Excluded site cannot be empty"))]
    pub excluded_site: String,

    #[serde(rename = "order-id-pattern", default = "default_order_id_pattern")]
    #[validate(custom(function = "validate_pattern"))]
    pub order_id_pattern: String,

    /// Expected prefix of order numbers, only used for snapshot warnings.
    #[serde(rename = "order-id-prefix", default = "default_order_id_prefix")]
    pub order_id_prefix: String,

    #[serde(rename = "order-id-elements", default = "default_order_id_elements")]
    pub order_id_elements: Vec<TargetPath>,

    #[serde(default)]
    #[validate(nested)]
    pub rules: Vec<CorrectionRule>,
}

impl CorrectorConfig {
    pub fn locator(&self) -> Result<OrderIdLocator, DomainError> {
        OrderIdLocator::new(&self.order_id_pattern, self.order_id_elements.clone())
    }
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            name: "ordfix".to_string(),
            client: default_client(),
            registry: default_registry(),
            output_dir: default_output_dir(),
            output_suffix: default_output_suffix(),
            report_file: default_report_file(),
            missing_field: MissingFieldPolicy::default(),
            excluded_site: default_excluded_site(),
            order_id_pattern: default_order_id_pattern(),
            order_id_prefix: default_order_id_prefix(),
            order_id_elements: default_order_id_elements(),
            rules: Vec::new(),
        }
    }
}

fn validate_pattern(pattern: &str) -> Result<(), ValidationError> {
    regex::Regex::new(pattern)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_regex"))
}

fn default_client() -> String {
    "THALES".to_string()
}
fn default_registry() -> String {
    "thales_orders.json".to_string()
}
fn default_output_dir() -> String {
    "corrected".to_string()
}
fn default_output_suffix() -> String {
    "_corrected".to_string()
}
fn default_report_file() -> String {
    "correction_report.json".to_string()
}
fn default_excluded_site() -> String {
    "GEMENOS".to_string()
}
fn default_order_id_pattern() -> String {
    DEFAULT_ORDER_ID_PATTERN.to_string()
}
fn default_order_id_prefix() -> String {
    "FU".to_string()
}
fn default_order_id_elements() -> Vec<TargetPath> {
    DEFAULT_ORDER_ID_ELEMENTS
        .iter()
        .filter_map(|raw| TargetPath::parse(raw).ok())
        .collect()
}
