// ordfix-core/src/infrastructure/config/snapshot.rs

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::domain::order::{OrderRecord, Snapshot, SnapshotMetadata, SnapshotStatistics};
use crate::domain::rules::CorrectionRule;
use crate::error::CorrectorError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::SnapshotSource;

const SITE_FLAG_KEY: &str = "site_not_gemenos";
const SITE_NAME_KEY: &str = "site_mission";

/// Registry snapshot stored as a JSON file.
pub struct JsonSnapshotSource {
    path: PathBuf,
    excluded_site: String,
}

impl JsonSnapshotSource {
    pub fn new(path: impl Into<PathBuf>, excluded_site: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            excluded_site: excluded_site.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for JsonSnapshotSource {
    fn load(&self) -> Result<Snapshot, CorrectorError> {
        load_snapshot(&self.path, &self.excluded_site).map_err(Into::into)
    }
}

// --- LOADING ---

/// Reads the snapshot as untyped JSON, for structural validation.
pub fn load_raw_snapshot(path: &Path) -> Result<Value, InfrastructureError> {
    let content = fs::read_to_string(path).map_err(|e| {
        InfrastructureError::SnapshotError(format!("Cannot read {:?}: {}", path, e))
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[instrument(skip(excluded_site))]
pub fn load_snapshot(path: &Path, excluded_site: &str) -> Result<Snapshot, InfrastructureError> {
    let raw = load_raw_snapshot(path)?;
    let snapshot = parse_snapshot(raw, excluded_site)?;
    info!(
        orders = snapshot.orders.len(),
        rules = snapshot.rules.len(),
        "Registry snapshot loaded"
    );
    Ok(snapshot)
}

/// Builds a typed snapshot, tolerating bad rows.
///
/// Order rows that do not deserialize or carry no order id are dropped with
/// a warning, as are malformed rules. A row without an explicit site flag
/// gets one derived from its mission site. Statistics are recomputed when
/// the file does not ship them.
pub fn parse_snapshot(raw: Value, excluded_site: &str) -> Result<Snapshot, InfrastructureError> {
    let Value::Object(mut root) = raw else {
        return Err(InfrastructureError::SnapshotError(
            "Snapshot root must be a JSON object".to_string(),
        ));
    };

    let metadata = match root.remove("metadata") {
        Some(value) => serde_json::from_value::<SnapshotMetadata>(value).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring malformed snapshot metadata");
            SnapshotMetadata::default()
        }),
        None => SnapshotMetadata::default(),
    };

    let orders: Vec<OrderRecord> = rows(&mut root, "commandes")
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| parse_order_row(index, row, excluded_site))
        .collect();

    let rules: Vec<CorrectionRule> = rows(&mut root, "regles_xml")
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed snapshot rule");
                None
            }
        })
        .collect();

    let statistics = match root.remove("statistiques") {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "Recomputing malformed snapshot statistics");
            SnapshotStatistics::compute(&orders, metadata.last_updated.clone())
        }),
        None => SnapshotStatistics::compute(&orders, metadata.last_updated.clone()),
    };

    Ok(Snapshot {
        metadata,
        orders,
        rules,
        statistics,
    })
}

fn rows(root: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match root.remove(key) {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            warn!(section = key, "Snapshot section is not an array, ignoring it");
            Vec::new()
        }
    }
}

fn parse_order_row(index: usize, row: Value, excluded_site: &str) -> Option<OrderRecord> {
    let Value::Object(mut fields) = row else {
        warn!(index, "Skipping snapshot order that is not an object");
        return None;
    };

    // Sheet exports sometimes carry numbers where text is expected.
    for (key, value) in fields.iter_mut() {
        if key != SITE_FLAG_KEY
            && let Value::Number(n) = value
        {
            *value = Value::String(n.to_string());
        }
    }
    fields.retain(|_, value| !value.is_null());

    if !fields.contains_key(SITE_FLAG_KEY) {
        let site = fields.get(SITE_NAME_KEY).and_then(Value::as_str);
        let flag = OrderRecord::derive_site_flag(site, excluded_site);
        fields.insert(SITE_FLAG_KEY.to_string(), Value::Bool(flag));
    }

    match serde_json::from_value::<OrderRecord>(Value::Object(fields)) {
        Ok(record) if record.order_id.trim().is_empty() => {
            warn!(index, "Skipping snapshot order without order number");
            None
        }
        Ok(record) => Some(record),
        Err(e) => {
            warn!(index, error = %e, "Skipping malformed snapshot order");
            None
        }
    }
}

// --- WRITING ---

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), InfrastructureError> {
    let content = serde_json::to_string_pretty(snapshot)?;
    atomic_write(path, content)?;
    debug!(path = ?path, orders = snapshot.orders.len(), "Snapshot written");
    Ok(())
}

// --- SHEET EXPORT ---

/// Reads a sheet export: either `{"values": [[...], ...]}` as returned by
/// the Sheets API, or the bare array of rows. Scalars become strings.
pub fn load_sheet_values(path: &Path) -> Result<Vec<Vec<String>>, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&content)?;

    let rows = match raw {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("values") {
            Some(Value::Array(rows)) => rows,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(InfrastructureError::SnapshotError(
                    "'values' must be an array of rows".to_string(),
                ));
            }
        },
        _ => {
            return Err(InfrastructureError::SnapshotError(
                "Sheet export must be an object with 'values' or an array".to_string(),
            ));
        }
    };

    Ok(rows
        .into_iter()
        .map(|row| match row {
            Value::Array(cells) => cells.into_iter().map(cell_to_string).collect(),
            other => vec![cell_to_string(other)],
        })
        .collect())
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample() -> Value {
        json!({
            "metadata": {
                "last_updated": "2025-06-30T10:00:00",
                "version": "1.0",
                "client": "THALES",
                "source": "Google Sheets"
            },
            "commandes": [
                {
                    "order_id": "FU70001236",
                    "client": "THALES",
                    "code_agence": "MRS",
                    "emploi_cc": "OUV-123",
                    "categorie_socio": "OUVRIER",
                    "classement_cc": 170,
                    "centre_analyse": "THL001 / Atelier",
                    "centre_analyse_prefix": "THL001",
                    "site_mission": "Marseille"
                },
                {
                    "order_id": "FU70009999",
                    "site_mission": "Gemenos (13)",
                    "classement_cc": null
                },
                { "order_id": "" },
                { "client": "THALES" },
                "not-an-object"
            ],
            "regles_xml": [
                { "name": "numero_commande", "xpath": "//ReferenceInformation/OrderId/IdValue", "source_field": "order_id" },
                { "name": "broken", "xpath": "//A[1]", "source_field": "order_id" }
            ]
        })
    }

    #[test]
    fn test_parse_tolerates_bad_rows() -> Result<()> {
        let snapshot = parse_snapshot(sample(), "GEMENOS")?;

        assert_eq!(snapshot.orders.len(), 2);
        assert_eq!(snapshot.rules.len(), 1);
        assert_eq!(snapshot.metadata.client.as_deref(), Some("THALES"));

        let first = &snapshot.orders[0];
        assert_eq!(first.position_coefficient.as_deref(), Some("170"));
        assert!(first.site_flag);
        assert!(!snapshot.orders[1].site_flag);

        // Not shipped, so recomputed from the surviving rows.
        assert_eq!(snapshot.statistics.total_orders, 2);
        assert_eq!(snapshot.statistics.agency_codes, vec!["MRS"]);
        Ok(())
    }

    #[test]
    fn test_exported_rule_placement_is_kept() -> Result<()> {
        use crate::domain::correction::RuleApplicator;
        use crate::domain::order::OrderRecord;
        use crate::domain::rules::{InsertPosition, TargetPath};
        use crate::infrastructure::xml::parse_document;

        let raw = json!({
            "commandes": [{ "order_id": "FU70001236", "categorie_socio": "OUVRIER" }],
            "regles_xml": [{
                "name": "categorie_socio_position_level",
                "description": "CATÉGORIE SOCIO dans PositionLevel",
                "xpath": "//PositionCharacteristics/PositionLevel",
                "source_field": "categorie_socio",
                "action": "create_or_update",
                "parent_xpath": "//PositionCharacteristics",
                "position": "after_position_status"
            }]
        });
        let snapshot = parse_snapshot(raw, "GEMENOS")?;
        let rule = &snapshot.rules[0];
        assert_eq!(rule.insert, InsertPosition::After("PositionStatus".to_string()));

        let mut document = parse_document(
            "order.xml",
            b"<PositionCharacteristics><PositionStatus><Code>X</Code></PositionStatus><PositionCoefficient>B3</PositionCoefficient></PositionCharacteristics>",
        )?;
        let mut record = OrderRecord::new("FU70001236");
        record.socio_category = Some("OUVRIER".into());
        RuleApplicator::default().apply(&mut document, &record, rule);

        let names: Vec<String> = document
            .root()
            .children
            .iter()
            .filter_map(|node| match node {
                xmltree::XMLNode::Element(e) => Some(e.name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["PositionStatus", "PositionLevel", "PositionCoefficient"]);
        assert_eq!(
            document.text_at(&TargetPath::parse("PositionLevel")?).as_deref(),
            Some("OUVRIER")
        );
        Ok(())
    }

    #[test]
    fn test_explicit_site_flag_wins() -> Result<()> {
        let raw = json!({
            "commandes": [
                { "order_id": "FU70000001", "site_mission": "GEMENOS", "site_not_gemenos": true }
            ]
        });
        let snapshot = parse_snapshot(raw, "GEMENOS")?;
        assert!(snapshot.orders[0].site_flag);
        Ok(())
    }

    #[test]
    fn test_root_must_be_object() {
        let result = parse_snapshot(json!([1, 2]), "GEMENOS");
        assert!(matches!(result, Err(InfrastructureError::SnapshotError(_))));
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("thales_orders.json");
        let snapshot = parse_snapshot(sample(), "GEMENOS")?;

        save_snapshot(&path, &snapshot)?;
        let source = JsonSnapshotSource::new(&path, "GEMENOS");
        let reloaded = source.load()?;

        assert_eq!(reloaded.orders, snapshot.orders);
        assert_eq!(reloaded.statistics, snapshot.statistics);
        Ok(())
    }

    #[test]
    fn test_sheet_values_shapes() -> Result<()> {
        let dir = tempdir()?;
        let wrapped = dir.path().join("wrapped.json");
        fs::write(
            &wrapped,
            r#"{"range": "Commandes!A1:L3", "values": [["Numéro Commande", "Code Agence"], ["FU70001236", 13]]}"#,
        )?;
        let bare = dir.path().join("bare.json");
        fs::write(&bare, r#"[["Numéro Commande"], ["FU70001236"], []]"#)?;

        let rows = load_sheet_values(&wrapped)?;
        assert_eq!(rows[1], vec!["FU70001236", "13"]);

        let rows = load_sheet_values(&bare)?;
        assert_eq!(rows.len(), 3);
        assert!(rows[2].is_empty());
        Ok(())
    }
}
