// ordfix-core/src/application/snapshot.rs

use chrono::{DateTime, Local, NaiveDate};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::domain::order::{OrderRecord, Snapshot, SnapshotMetadata, SnapshotStatistics};
use crate::domain::project::CorrectorConfig;
use crate::domain::rules::RuleTable;

pub const SNAPSHOT_VERSION: &str = "1.0.0";

// Sheet column headers.
const COL_ORDER_ID: &str = "Numéro Commande";
const COL_AGENCY: &str = "Code Agence";
const COL_POSITION: &str = "Emploi CC";
const COL_SOCIO: &str = "Catégorie Socio";
const COL_COEFFICIENT: &str = "Classement CC";
const COL_COST_CENTER: &str = "Centre Analyse";
const COL_SIRET: &str = "SIRET Client";
const COL_SITE: &str = "Site Mission";
const COL_START: &str = "Date Début";
const COL_END: &str = "Date Fin";
const COL_FILE: &str = "Nom Fichier";
const COL_TIMESTAMP: &str = "Timestamp";

#[derive(Debug, Clone)]
pub struct SnapshotSettings {
    pub client: String,
    pub excluded_site: String,
    pub source: String,
}

impl From<&CorrectorConfig> for SnapshotSettings {
    fn from(config: &CorrectorConfig) -> Self {
        Self {
            client: config.client.clone(),
            excluded_site: config.excluded_site.clone(),
            source: "sheet export".to_string(),
        }
    }
}

/// Builds a registry snapshot from sheet rows, the first row being the
/// headers. Rows without an order number are dropped with a warning.
pub fn build_snapshot(
    values: &[Vec<String>],
    settings: &SnapshotSettings,
    now: DateTime<Local>,
) -> Snapshot {
    let stamp = now.format("%Y-%m-%dT%H:%M:%S").to_string();

    let Some((headers, rows)) = values.split_first() else {
        warn!("Sheet export is empty");
        return assemble(Vec::new(), settings, &stamp);
    };

    let columns: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim(), i))
        .collect();

    let mut orders = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let cell = |name: &str| -> Option<String> {
            columns
                .get(name)
                .and_then(|&i| row.get(i))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty() && *v != "nan")
                .map(str::to_string)
        };

        let Some(order_id) = cell(COL_ORDER_ID) else {
            // Header is sheet row 1.
            warn!(line = index + 2, "Row ignored: no order number");
            continue;
        };

        let cost_center = cell(COL_COST_CENTER);
        let site = cell(COL_SITE);

        let mut record = OrderRecord::new(order_id);
        record.client = Some(settings.client.clone());
        record.agency_code = cell(COL_AGENCY);
        record.position_code = cell(COL_POSITION);
        record.socio_category = cell(COL_SOCIO);
        record.position_coefficient = cell(COL_COEFFICIENT);
        record.cost_center_prefix = cost_center.as_deref().and_then(cost_center_prefix);
        record.cost_center_name = cost_center;
        record.siret = cell(COL_SIRET);
        record.site_flag = OrderRecord::derive_site_flag(site.as_deref(), &settings.excluded_site);
        record.site_name = site;
        record.start_date = cell(COL_START).map(|d| normalize_date(&d));
        record.end_date = cell(COL_END).map(|d| normalize_date(&d));
        record.file_name = cell(COL_FILE);
        record.processed_at = cell(COL_TIMESTAMP);
        record.last_updated = Some(stamp.clone());

        orders.push(record);
    }

    info!(orders = orders.len(), "Orders converted from sheet export");
    assemble(orders, settings, &stamp)
}

fn assemble(orders: Vec<OrderRecord>, settings: &SnapshotSettings, stamp: &str) -> Snapshot {
    let statistics = SnapshotStatistics::compute(&orders, Some(stamp.to_string()));
    Snapshot {
        metadata: SnapshotMetadata {
            last_updated: Some(stamp.to_string()),
            version: Some(SNAPSHOT_VERSION.to_string()),
            client: Some(settings.client.clone()),
            source: Some(settings.source.clone()),
            repository: None,
        },
        orders,
        rules: RuleTable::default_rules(),
        statistics,
    }
}

/// `"1FRA / PLADI/BP/PST04"` -> `"1FRA"`: first whitespace token, cut at the
/// first slash.
pub fn cost_center_prefix(cost_center: &str) -> Option<String> {
    cost_center
        .split_whitespace()
        .next()
        .and_then(|token| token.split('/').next())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// `DD/MM/YYYY` becomes `YYYY-MM-DD`. Timestamps and anything else that
/// does not parse are kept as given.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains('T') {
        return raw.to_string();
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn settings() -> SnapshotSettings {
        SnapshotSettings::from(&CorrectorConfig::default())
    }

    #[test]
    fn test_cost_center_prefix() {
        assert_eq!(cost_center_prefix("1FRA / PLADI/BP/PST04").as_deref(), Some("1FRA"));
        assert_eq!(cost_center_prefix("THL001/ATELIER").as_deref(), Some("THL001"));
        assert_eq!(cost_center_prefix("   "), None);
        assert_eq!(cost_center_prefix("/X"), None);
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("15/01/2025"), "2025-01-15");
        assert_eq!(normalize_date("5/3/2025"), "2025-03-05");
        assert_eq!(normalize_date("2025-01-15T08:00:00"), "2025-01-15T08:00:00");
        assert_eq!(normalize_date("demain"), "demain");
    }

    #[test]
    fn test_build_from_sheet() {
        let values = vec![
            row(&[
                "Numéro Commande",
                "Code Agence",
                "Emploi CC",
                "Catégorie Socio",
                "Classement CC",
                "Centre Analyse",
                "Site Mission",
                "Date Début",
            ]),
            row(&[
                " FU70001236 ",
                "MRS",
                "OUV-123",
                "OUVRIER",
                "170",
                "1FRA / PLADI/BP/PST04",
                "Marseille",
                "15/01/2025",
            ]),
            row(&["", "MRS"]),
            row(&["FU70009999", "TLS", "", "", "", "", "Gémenos / GEMENOS"]),
        ];
        let now = Local.with_ymd_and_hms(2025, 6, 30, 10, 0, 0).single();
        let Some(now) = now else { return };

        let snapshot = build_snapshot(&values, &settings(), now);

        assert_eq!(snapshot.orders.len(), 2);
        let first = &snapshot.orders[0];
        assert_eq!(first.order_id, "FU70001236");
        assert_eq!(first.client.as_deref(), Some("THALES"));
        assert_eq!(first.cost_center_prefix.as_deref(), Some("1FRA"));
        assert_eq!(first.start_date.as_deref(), Some("2025-01-15"));
        assert!(first.site_flag);

        let second = &snapshot.orders[1];
        assert!(!second.site_flag);
        assert_eq!(second.position_code, None);

        assert_eq!(snapshot.metadata.last_updated.as_deref(), Some("2025-06-30T10:00:00"));
        assert_eq!(snapshot.rules.len(), 8);
        assert_eq!(snapshot.statistics.total_orders, 2);
        assert_eq!(snapshot.statistics.agency_codes, vec!["MRS", "TLS"]);
    }

    #[test]
    fn test_empty_sheet() {
        let snapshot = build_snapshot(&[], &settings(), Local::now());
        assert!(snapshot.orders.is_empty());
        assert_eq!(snapshot.statistics.total_orders, 0);
    }
}
