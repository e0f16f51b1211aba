// ordfix-core/src/domain/order/registry.rs

use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use super::record::OrderRecord;

/// Read-only index of order records keyed by order id.
///
/// Built once, then shared by reference: nothing mutates it after load.
#[derive(Debug, Clone, Default)]
pub struct OrderRegistry {
    records: HashMap<String, OrderRecord>,
}

impl OrderRegistry {
    /// Last write wins when an order id appears more than once.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = OrderRecord>,
    {
        let mut index = HashMap::new();
        for record in records {
            let key = record.order_id.trim().to_uppercase();
            if index.insert(key.clone(), record).is_some() {
                warn!(order_id = %key, "Duplicate order in registry, keeping the last one");
            }
        }
        Self { records: index }
    }

    pub fn lookup(&self, order_id: &str) -> Option<&OrderRecord> {
        self.records.get(&order_id.trim().to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by order id.
    pub fn iter(&self) -> impl Iterator<Item = &OrderRecord> {
        let mut sorted: Vec<&OrderRecord> = self.records.values().collect();
        sorted.sort_by(|a, b| a.order_id.cmp(&b.order_id));
        sorted.into_iter()
    }

    /// Number of orders per agency code.
    pub fn agencies(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for agency in self.records.values().filter_map(|r| r.agency_code.as_deref()) {
            *counts.entry(agency.to_string()).or_insert(0) += 1;
        }
        counts
    }
}
