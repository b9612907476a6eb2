//! Record selection ahead of the engine.
//!
//! An empty selection on any dimension means "all values".

use crate::records::{RouteType, ShipmentRecord, VendorType};
use crate::zones::{Zone, ZoneClassifier};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub periods: Vec<String>,
    pub zones: Vec<Zone>,
    pub clusters: Vec<String>,
    pub route_types: Vec<RouteType>,
    pub vendor_types: Vec<VendorType>,
}

fn allows<T: PartialEq>(selection: &[T], value: &T) -> bool {
    selection.is_empty() || selection.contains(value)
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
            && self.zones.is_empty()
            && self.clusters.is_empty()
            && self.route_types.is_empty()
            && self.vendor_types.is_empty()
    }

    /// Unclassified records pass only when no zone is selected.
    pub fn matches(&self, record: &ShipmentRecord, zone: Option<Zone>) -> bool {
        let zone_ok = self.zones.is_empty() || zone.is_some_and(|z| self.zones.contains(&z));

        zone_ok
            && allows(&self.periods, &record.period)
            && allows(&self.clusters, &record.cluster)
            && allows(&self.route_types, &record.route_type)
            && allows(&self.vendor_types, &record.vendor_type)
    }

    /// Keeps matching records in input order.
    #[tracing::instrument(skip_all, fields(records = records.len()))]
    pub fn apply(&self, records: Vec<ShipmentRecord>, classifier: &ZoneClassifier) -> Vec<ShipmentRecord> {
        let total = records.len();
        let kept: Vec<ShipmentRecord> = records
            .into_iter()
            .filter(|r| self.matches(r, classifier.classify_record(r)))
            .collect();

        info!(total, kept = kept.len(), "Records filtered");
        kept
    }
}

/// Record count per zone; unclassified records are counted under `None`.
pub fn zone_counts(
    records: &[ShipmentRecord],
    classifier: &ZoneClassifier,
) -> BTreeMap<Option<Zone>, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(classifier.classify_record(r)).or_default() += 1;
    }
    counts
}
