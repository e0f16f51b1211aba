// ordfix-core/src/application/validation.rs

use chrono::Local;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::domain::project::CorrectorConfig;
use crate::domain::rules::TargetPath;

const REQUIRED_SECTIONS: [&str; 4] = ["metadata", "commandes", "regles_xml", "statistiques"];
const REQUIRED_METADATA: [&str; 4] = ["last_updated", "version", "client", "source"];
const REQUIRED_ORDER_FIELDS: [&str; 4] = ["order_id", "client", "emploi_cc", "code_agence"];
const REQUIRED_RULE_FIELDS: [&str; 3] = ["name", "xpath", "source_field"];
const REQUIRED_STATISTICS: [&str; 3] =
    ["total_commandes", "codes_agence_uniques", "emplois_cc_uniques"];
pub const EXPECTED_RULES: [&str; 5] = [
    "numero_commande",
    "emploi_cc_position_code",
    "categorie_socio_position_level",
    "classement_cc_coefficient",
    "centre_analyse_cost_center_name",
];

/// What the snapshot is checked against.
#[derive(Debug, Clone)]
pub struct ValidationSettings {
    pub client: String,
    pub order_id_prefix: String,
}

impl From<&CorrectorConfig> for ValidationSettings {
    fn from(config: &CorrectorConfig) -> Self {
        Self {
            client: config.client.clone(),
            order_id_prefix: config.order_id_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub orders: usize,
    pub rules: usize,
    pub agency_codes: usize,
    pub position_codes: usize,
    pub socio_categories: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    pub with_position_code: usize,
    pub with_cost_center: usize,
    pub with_start_date: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub validated_at: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub summary: ValidationSummary,
    pub quality: DataQuality,
    pub agency_codes: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Structural check of a raw snapshot. Every problem is collected, nothing
/// stops at the first error.
#[instrument(skip_all, fields(client = %settings.client))]
pub fn validate_snapshot(raw: &Value, settings: &ValidationSettings) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let empty = Map::new();

    let Some(root) = raw.as_object() else {
        errors.push("snapshot root is not a JSON object".to_string());
        return ValidationReport {
            validated_at: Local::now().to_rfc3339(),
            errors,
            warnings,
            summary: ValidationSummary::default(),
            quality: DataQuality::default(),
            agency_codes: Vec::new(),
        };
    };

    for section in REQUIRED_SECTIONS {
        if !root.contains_key(section) {
            errors.push(format!("missing section '{}'", section));
        }
    }

    // 1. Metadata
    if let Some(metadata) = root.get("metadata") {
        match metadata.as_object() {
            Some(metadata) => {
                for field in REQUIRED_METADATA {
                    if !metadata.contains_key(field) {
                        errors.push(format!("missing metadata field '{}'", field));
                    }
                }
                let client = metadata.get("client").and_then(Value::as_str);
                if client.is_some_and(|c| c != settings.client) {
                    errors.push(format!(
                        "metadata client is '{}', expected '{}'",
                        client.unwrap_or_default(),
                        settings.client
                    ));
                }
            }
            None => errors.push("'metadata' must be an object".to_string()),
        }
    }

    // 2. Orders
    let orders = array_section(root, "commandes", &mut errors);
    if root.contains_key("commandes") && orders.is_empty() {
        warnings.push("no orders in snapshot".to_string());
    }
    for (index, order) in orders.iter().enumerate() {
        let Some(order) = order.as_object() else {
            errors.push(format!("order #{}: not an object", index));
            continue;
        };
        let order_id = text(order, "order_id");

        let missing: Vec<&str> = REQUIRED_ORDER_FIELDS
            .into_iter()
            .filter(|field| text(order, field).is_none())
            .collect();
        if !missing.is_empty() {
            errors.push(format!(
                "order #{} ({}): missing {}",
                index,
                order_id.unwrap_or("N/A"),
                missing.join(", ")
            ));
        }
        if let Some(client) = text(order, "client")
            && client != settings.client
        {
            errors.push(format!(
                "order #{}: client is '{}', expected '{}'",
                index, client, settings.client
            ));
        }
        if let Some(id) = order_id
            && !id.starts_with(&settings.order_id_prefix)
        {
            warnings.push(format!(
                "unusual order number {} (does not start with '{}')",
                id, settings.order_id_prefix
            ));
        }
    }

    // 3. Rules
    let rules = array_section(root, "regles_xml", &mut errors);
    if root.contains_key("regles_xml") && rules.is_empty() {
        errors.push("rule table is empty".to_string());
    }
    if !rules.is_empty() {
        let names: Vec<&str> = rules
            .iter()
            .filter_map(|r| r.get("name").and_then(Value::as_str))
            .collect();
        for expected in EXPECTED_RULES {
            if !names.contains(&expected) {
                errors.push(format!("missing rule '{}'", expected));
            }
        }
    }
    for (index, rule) in rules.iter().enumerate() {
        let Some(rule) = rule.as_object() else {
            errors.push(format!("rule #{}: not an object", index));
            continue;
        };
        let name = text(rule, "name").unwrap_or("N/A");
        let missing: Vec<&str> = REQUIRED_RULE_FIELDS
            .into_iter()
            .filter(|field| !rule.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            errors.push(format!("rule '{}': missing {}", name, missing.join(", ")));
        }
        if let Some(xpath) = text(rule, "xpath")
            && let Err(e) = TargetPath::parse(xpath)
        {
            errors.push(format!("rule '{}': {}", name, e));
        }
    }

    // 4. Statistics
    let stats = match root.get("statistiques") {
        Some(Value::Object(stats)) => stats,
        Some(_) => {
            errors.push("'statistiques' must be an object".to_string());
            &empty
        }
        None => &empty,
    };
    if root.contains_key("statistiques") {
        for field in REQUIRED_STATISTICS {
            if !stats.contains_key(field) {
                errors.push(format!("missing statistic '{}'", field));
            }
        }
        if let Some(total) = stats.get("total_commandes")
            && total.as_u64().is_none()
        {
            errors.push(format!("invalid total_commandes: {}", total));
        }
    }

    let count = |key: &str| stats.get(key).and_then(Value::as_array).map_or(0, Vec::len);
    let with = |key: &str| {
        orders
            .iter()
            .filter_map(Value::as_object)
            .filter(|o| text(o, key).is_some())
            .count()
    };

    let report = ValidationReport {
        validated_at: Local::now().to_rfc3339(),
        summary: ValidationSummary {
            orders: orders.len(),
            rules: rules.len(),
            agency_codes: count("codes_agence_uniques"),
            position_codes: count("emplois_cc_uniques"),
            socio_categories: count("categories_socio_uniques"),
        },
        quality: DataQuality {
            with_position_code: with("emploi_cc"),
            with_cost_center: with("centre_analyse"),
            with_start_date: with("date_debut"),
        },
        agency_codes: stats
            .get("codes_agence_uniques")
            .and_then(Value::as_array)
            .map(|codes| {
                codes
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        errors,
        warnings,
    };
    debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Snapshot validated"
    );
    report
}

fn array_section<'v>(
    root: &'v Map<String, Value>,
    key: &str,
    errors: &mut Vec<String>,
) -> &'v [Value] {
    match root.get(key) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.push(format!("'{}' must be an array", key));
            &[]
        }
        None => &[],
    }
}

/// Non-blank string value of `key`.
fn text<'v>(object: &'v Map<String, Value>, key: &str) -> Option<&'v str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
