// ordfix-core/src/domain/order/snapshot.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::record::OrderRecord;
use super::registry::OrderRegistry;
use crate::domain::rules::CorrectionRule;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

/// Aggregates shipped alongside the records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStatistics {
    #[serde(rename = "total_commandes", default)]
    pub total_orders: usize,
    #[serde(rename = "derniere_mise_a_jour", default, skip_serializing_if = "Option::is_none")]
    pub computed_at: Option<String>,
    #[serde(rename = "codes_agence_uniques", default)]
    pub agency_codes: Vec<String>,
    #[serde(rename = "emplois_cc_uniques", default)]
    pub position_codes: Vec<String>,
    #[serde(rename = "categories_socio_uniques", default)]
    pub socio_categories: Vec<String>,
    #[serde(rename = "classements_cc_uniques", default)]
    pub position_coefficients: Vec<String>,
    #[serde(rename = "repartition_par_agence", default)]
    pub orders_per_agency: BTreeMap<String, usize>,
}

impl SnapshotStatistics {
    pub fn compute(orders: &[OrderRecord], computed_at: Option<String>) -> Self {
        fn unique<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
            values
                .flatten()
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }

        let mut orders_per_agency = BTreeMap::new();
        for agency in orders.iter().filter_map(|o| o.agency_code.as_deref()) {
            *orders_per_agency.entry(agency.to_string()).or_insert(0) += 1;
        }

        Self {
            total_orders: orders.len(),
            computed_at,
            agency_codes: unique(orders.iter().map(|o| o.agency_code.as_deref())),
            position_codes: unique(orders.iter().map(|o| o.position_code.as_deref())),
            socio_categories: unique(orders.iter().map(|o| o.socio_category.as_deref())),
            position_coefficients: unique(
                orders.iter().map(|o| o.position_coefficient.as_deref()),
            ),
            orders_per_agency,
        }
    }
}

/// Materialized export of the order reference data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub metadata: SnapshotMetadata,
    #[serde(rename = "commandes", default)]
    pub orders: Vec<OrderRecord>,
    #[serde(rename = "regles_xml", default)]
    pub rules: Vec<CorrectionRule>,
    #[serde(rename = "statistiques", default)]
    pub statistics: SnapshotStatistics,
}

impl Snapshot {
    pub fn registry(&self) -> OrderRegistry {
        OrderRegistry::from_records(self.orders.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_compute() {
        let mut a = OrderRecord::new("FU00000001");
        a.agency_code = Some("MRS".into());
        a.socio_category = Some("OUVRIER".into());
        let mut b = OrderRecord::new("FU00000002");
        b.agency_code = Some("MRS".into());
        b.socio_category = Some("ETAM".into());
        let mut c = OrderRecord::new("FU00000003");
        c.agency_code = Some("TLS".into());
        c.socio_category = Some("OUVRIER".into());

        let stats = SnapshotStatistics::compute(&[a, b, c], None);

        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.agency_codes, vec!["MRS", "TLS"]);
        assert_eq!(stats.socio_categories, vec!["ETAM", "OUVRIER"]);
        assert_eq!(stats.orders_per_agency.get("MRS"), Some(&2));
        assert!(stats.position_codes.is_empty());
    }
}
