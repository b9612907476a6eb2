use crate::engine::types::{PeriodSheet, SummaryRow};
use tracing::debug;

/// A row is kept when it has a lane or route and any non-zero measurement.
pub fn has_signal(row: &SummaryRow) -> bool {
    let labelled = !row.lane.is_empty() || !row.route.is_empty();
    let measured = row.total_cost != 0.0
        || row.total_capacity != 0.0
        || row.weighted_utilization.is_some_and(|u| u != 0.0);
    labelled && measured
}

/// Builds the sheet of one period, or `None` when no row survives cleaning.
pub fn build_sheet(period: &str, rows: Vec<SummaryRow>) -> Option<PeriodSheet> {
    let total = rows.len();
    let rows: Vec<SummaryRow> = rows.into_iter().filter(has_signal).collect();

    debug!(period, kept = rows.len(), dropped = total - rows.len(), "Sheet cleaned");

    if rows.is_empty() {
        return None;
    }

    Some(PeriodSheet {
        period: period.to_string(),
        rows,
    })
}
