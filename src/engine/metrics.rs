//! Derived metrics for aggregated groups.
//!
//! Degenerate divisions produce `None`, never zero: a zero utilization or cpkg
//! must stay distinguishable from a missing one.

use crate::engine::types::{AggregateGroup, SummaryRow};
use crate::engine::utility::{round2, segment_count, weighted_mean};
use tracing::warn;

/// Distance-weighted utilization as a fraction.
pub fn weighted_utilization(samples: &[(f64, f64)]) -> Option<f64> {
    weighted_mean(samples)
}

/// Record count corrected for routes split into several section records.
pub fn adjusted_trip_count(route: &str, record_count: usize) -> f64 {
    if route.trim().is_empty() {
        record_count as f64
    } else {
        record_count as f64 / segment_count(route) as f64
    }
}

/// Cost per unit of utilized capacity.
pub fn cost_per_unit_capacity(
    total_cost: f64,
    total_capacity: f64,
    utilization: Option<f64>,
) -> Option<f64> {
    let util = utilization?;
    if total_capacity == 0.0 || util == 0.0 {
        return None;
    }
    let cpkg = total_cost / (total_capacity * util);
    cpkg.is_finite().then_some(cpkg)
}

/// Formats a utilization fraction as a two-decimal percentage, e.g. `73.33%`.
pub fn format_utilization(utilization: Option<f64>) -> Option<String> {
    utilization.map(|u| format!("{:.2}%", round2(u * 100.0)))
}

/// Computes the summary row for one group.
pub fn summarize(group: &AggregateGroup) -> SummaryRow {
    let weighted_utilization = weighted_utilization(&group.samples);

    let cost_per_unit_capacity = if group.record_count == 0 {
        warn!(lane = %group.key.lane, route = %group.key.route, "No contributing rows for cpkg");
        None
    } else {
        cost_per_unit_capacity(group.total_cost, group.total_capacity, weighted_utilization)
    };

    SummaryRow {
        lane: group.key.lane.clone(),
        route: group.key.route.clone(),
        total_cost: group.total_cost,
        total_capacity: group.total_capacity,
        weighted_utilization,
        adjusted_trip_count: adjusted_trip_count(&group.key.route, group.record_count),
        cost_per_unit_capacity,
    }
}
