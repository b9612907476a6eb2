//! Aggregation and reporting engine.
//!
//! Records flow through aggregation, metric derivation, sheet cleaning and
//! the cross-period comparison. Every stage is a pure function of its input.

pub mod aggregate;
pub mod compare;
pub mod metrics;
pub mod sheet;
pub mod types;
pub mod utility;

use crate::records::ShipmentRecord;
use crate::report::Report;
use tracing::info;

/// Builds the report for an already filtered record set.
///
/// An empty input, or one where every row is noise, yields an empty report.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn build_report(records: &[ShipmentRecord]) -> Report {
    let sheets: Vec<types::PeriodSheet> = aggregate::aggregate(records)
        .into_iter()
        .filter_map(|period| {
            let rows = period.groups.iter().map(metrics::summarize).collect();
            sheet::build_sheet(&period.period, rows)
        })
        .collect();

    let comparison = compare::build_comparison(&sheets);

    let report = Report::new(sheets, comparison);
    if report.is_empty() {
        info!("Nothing to report");
    } else {
        info!(sheets = report.len(), "Report built");
    }
    report
}
