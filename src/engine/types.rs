//! Data types used by the aggregation pipeline.

use serde::Serialize;

/// Grouping key of an [`AggregateGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    pub period: String,
    pub lane: String,
    pub route: String,
}

/// Raw sums and samples for one `(period, lane, route)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateGroup {
    pub key: GroupKey,
    pub total_cost: f64,
    pub total_capacity: f64,
    /// `(utilization, distance)` per contributing record.
    pub samples: Vec<(f64, f64)>,
    pub record_count: usize,
}

/// All groups of one period, sorted by lane then route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodGroups {
    pub period: String,
    pub groups: Vec<AggregateGroup>,
}

/// Metric-enriched output row for one `(period, lane, route)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub lane: String,
    pub route: String,
    pub total_cost: f64,
    pub total_capacity: f64,
    /// Fraction; formatted as a percentage only when emitted.
    pub weighted_utilization: Option<f64>,
    pub adjusted_trip_count: f64,
    pub cost_per_unit_capacity: Option<f64>,
}

impl SummaryRow {
    pub fn route_key(&self) -> (&str, &str) {
        (&self.lane, &self.route)
    }
}

/// Cleaned rows of one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSheet {
    pub period: String,
    pub rows: Vec<SummaryRow>,
}

/// One route present in every period, with its row from each period in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub lane: String,
    pub route: String,
    pub per_period: Vec<SummaryRow>,
}

/// Routes common to all periods, side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSheet {
    pub periods: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}
