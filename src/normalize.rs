//! Record normalization.
//!
//! Every optional field is filled from [`DEFAULTS`] before aggregation, so the
//! engine never branches on absence. Substitutions are counted per field in a
//! [`NormalizationReport`] for diagnostics only, with fields whose column was
//! missing from every input file listed apart from those with empty cells.

use crate::loader::Column;
use crate::records::{RawRecord, RawUtilization, RouteType, ShipmentRecord, VendorType};
use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Canonical default for a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Text(&'static str),
    Number(f64),
}

/// Field name to default value. Every optional field of [`RawRecord`] has an entry.
pub static DEFAULTS: &[(&str, DefaultValue)] = &[
    ("period", DefaultValue::Text("")),
    ("day", DefaultValue::Number(0.0)),
    ("cluster", DefaultValue::Text("")),
    ("route", DefaultValue::Text("")),
    ("route_type", DefaultValue::Text("")),
    ("vendor_type", DefaultValue::Text("")),
    ("section_cost", DefaultValue::Number(0.0)),
    ("capacity_moved", DefaultValue::Number(0.0)),
    ("section_utilization", DefaultValue::Number(0.0)),
    ("section_distance", DefaultValue::Number(0.0)),
    ("trip_indicator", DefaultValue::Number(0.0)),
];

/// How bare utilization numbers are expressed in the input.
///
/// Cells written with a `%` sign are fractions already and ignore the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UtilizationScale {
    /// 0.8 means 80%.
    #[default]
    Fraction,
    /// 80 means 80%.
    Percent,
}

impl FromStr for UtilizationScale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fraction" => Ok(UtilizationScale::Fraction),
            "percent" => Ok(UtilizationScale::Percent),
            other => bail!("unknown utilization scale: {other}"),
        }
    }
}

/// Number of defaulted values per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub records: usize,
    /// Defaults used per field, whatever the cause.
    pub defaulted: BTreeMap<String, usize>,
    /// Fields with no column in any input; every record was defaulted.
    pub absent_columns: BTreeSet<String>,
}

impl NormalizationReport {
    pub fn defaulted_count(&self, field: &str) -> usize {
        self.defaulted.get(field).copied().unwrap_or(0)
    }

    pub fn is_absent(&self, field: &str) -> bool {
        self.absent_columns.contains(field)
    }

    /// Defaults used for empty cells of a column that was present.
    pub fn empty_cell_count(&self, field: &str) -> usize {
        if self.is_absent(field) {
            0
        } else {
            self.defaulted_count(field)
        }
    }
}

pub struct Normalizer {
    defaults: HashMap<&'static str, DefaultValue>,
    scale: UtilizationScale,
}

impl Normalizer {
    pub fn new(scale: UtilizationScale) -> Self {
        Self {
            defaults: DEFAULTS.iter().copied().collect(),
            scale,
        }
    }

    fn text(&self, field: &str) -> &'static str {
        match self.defaults.get(field) {
            Some(DefaultValue::Text(s)) => *s,
            _ => "",
        }
    }

    fn number(&self, field: &str) -> f64 {
        match self.defaults.get(field) {
            Some(DefaultValue::Number(n)) => *n,
            _ => 0.0,
        }
    }

    /// Normalizes a batch of raw records, preserving order.
    ///
    /// `columns_present` is the set of columns found across the input files.
    #[tracing::instrument(skip_all, fields(records = raw.len()))]
    pub fn normalize(
        &self,
        raw: Vec<RawRecord>,
        columns_present: &BTreeSet<Column>,
    ) -> (Vec<ShipmentRecord>, NormalizationReport) {
        let absent_columns = DEFAULTS
            .iter()
            .map(|(field, _)| *field)
            .filter(|field| !columns_present.iter().any(|c| c.field() == *field))
            .map(str::to_string)
            .collect();

        let mut report = NormalizationReport {
            records: raw.len(),
            absent_columns,
            ..Default::default()
        };

        let records = raw
            .into_iter()
            .map(|r| self.normalize_one(r, &mut report))
            .collect();

        for field in &report.absent_columns {
            if report.records > 0 {
                warn!(field = %field, "Column missing from input, defaulted for every record");
            }
        }
        for (field, count) in &report.defaulted {
            if !report.is_absent(field) {
                debug!(field = %field, count, "Defaulted empty cells");
            }
        }
        info!(
            records = report.records,
            defaulted_fields = report.defaulted.len(),
            "Records normalized"
        );

        (records, report)
    }

    fn normalize_one(&self, raw: RawRecord, report: &mut NormalizationReport) -> ShipmentRecord {
        let mut text = |field: &'static str, value: Option<String>| -> String {
            match value {
                Some(v) if !v.trim().is_empty() => v.trim().to_string(),
                _ => {
                    *report.defaulted.entry(field.to_string()).or_default() += 1;
                    self.text(field).to_string()
                }
            }
        };

        let period = text("period", raw.period);
        let cluster = text("cluster", raw.cluster).to_ascii_uppercase();
        let route = text("route", raw.route);
        let route_type = RouteType::from(text("route_type", raw.route_type).as_str());
        let vendor_type = VendorType::from(text("vendor_type", raw.vendor_type).as_str());

        let mut number = |field: &'static str, value: Option<f64>| -> f64 {
            match value {
                Some(v) if v.is_finite() => v,
                _ => {
                    *report.defaulted.entry(field.to_string()).or_default() += 1;
                    self.number(field)
                }
            }
        };

        let day = number("day", raw.day);
        let section_cost = number("section_cost", raw.section_cost);
        let capacity_moved = number("capacity_moved", raw.capacity_moved);
        let section_utilization = match raw.section_utilization {
            Some(RawUtilization::Bare(v)) if v.is_finite() => match self.scale {
                UtilizationScale::Fraction => v,
                UtilizationScale::Percent => v / 100.0,
            },
            Some(RawUtilization::Fraction(v)) if v.is_finite() => v,
            _ => number("section_utilization", None),
        };
        let section_distance = number("section_distance", raw.section_distance);
        let trip_indicator = number("trip_indicator", raw.trip_indicator);

        ShipmentRecord {
            period,
            day: if day > 0.0 { day as u32 } else { 0 },
            cluster,
            lane: raw.lane.trim().to_string(),
            route,
            route_type,
            vendor_type,
            section_cost,
            capacity_moved,
            section_utilization,
            section_distance,
            trip_indicator,
        }
    }
}
