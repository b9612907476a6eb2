//! Daily load and cost series per period.

use crate::records::ShipmentRecord;
use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendKind {
    /// Total capacity moved per day.
    Load,
    /// Total section cost per day.
    Cost,
}

impl FromStr for TrendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "load" | "load-trend" => Ok(TrendKind::Load),
            "cost" | "cost-trend" => Ok(TrendKind::Cost),
            other => bail!("unknown trend type: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: String,
    pub day: u32,
    pub value: f64,
}

/// Sums the chosen measure per `(period, day)`.
///
/// Periods keep their first-appearance order; days ascend within a period.
pub fn daily_trend(records: &[ShipmentRecord], kind: TrendKind) -> Vec<TrendPoint> {
    let mut period_order: Vec<&str> = Vec::new();
    let mut totals: BTreeMap<(&str, u32), f64> = BTreeMap::new();

    for r in records {
        if !period_order.contains(&r.period.as_str()) {
            period_order.push(&r.period);
        }
        let value = match kind {
            TrendKind::Load => r.capacity_moved,
            TrendKind::Cost => r.section_cost,
        };
        *totals.entry((r.period.as_str(), r.day)).or_default() += value;
    }

    period_order
        .iter()
        .flat_map(|period| {
            totals
                .range((*period, 0)..=(*period, u32::MAX))
                .map(|((p, day), value)| TrendPoint {
                    period: p.to_string(),
                    day: *day,
                    value: *value,
                })
        })
        .collect()
}
