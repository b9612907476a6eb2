use crate::engine::types::{ComparisonRow, ComparisonSheet, PeriodSheet};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Builds the cross-period view of routes present in every sheet.
///
/// Returns `None` for fewer than two sheets, or when no route is common to all.
/// Rows follow the order of the first sheet.
pub fn build_comparison(sheets: &[PeriodSheet]) -> Option<ComparisonSheet> {
    if sheets.len() < 2 {
        return None;
    }

    let mut common: HashSet<(&str, &str)> =
        sheets[0].rows.iter().map(|r| r.route_key()).collect();
    for sheet in &sheets[1..] {
        let keys: HashSet<(&str, &str)> = sheet.rows.iter().map(|r| r.route_key()).collect();
        common.retain(|k| keys.contains(k));
    }

    debug!(periods = sheets.len(), common = common.len(), "Common routes computed");

    if common.is_empty() {
        info!("No route is present in every period, skipping comparison");
        return None;
    }

    let lookups: Vec<HashMap<(&str, &str), _>> = sheets
        .iter()
        .map(|s| s.rows.iter().map(|r| (r.route_key(), r)).collect())
        .collect();

    let rows = sheets[0]
        .rows
        .iter()
        .filter(|r| common.contains(&r.route_key()))
        .map(|r| ComparisonRow {
            lane: r.lane.clone(),
            route: r.route.clone(),
            per_period: lookups
                .iter()
                .filter_map(|lookup| lookup.get(&r.route_key()).map(|row| (*row).clone()))
                .collect(),
        })
        .collect();

    Some(ComparisonSheet {
        periods: sheets.iter().map(|s| s.period.clone()).collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::SummaryRow;

    fn row(lane: &str, cost: f64) -> SummaryRow {
        SummaryRow {
            lane: lane.into(),
            route: String::new(),
            total_cost: cost,
            total_capacity: 1.0,
            weighted_utilization: Some(0.5),
            adjusted_trip_count: 1.0,
            cost_per_unit_capacity: Some(2.0),
        }
    }

    fn sheet(period: &str, rows: Vec<SummaryRow>) -> PeriodSheet {
        PeriodSheet {
            period: period.into(),
            rows,
        }
    }

    #[test]
    fn test_single_sheet_has_no_comparison() {
        assert_eq!(build_comparison(&[sheet("A", vec![row("X", 1.0)])]), None);
        assert_eq!(build_comparison(&[]), None);
    }

    #[test]
    fn test_intersection_not_union() {
        let sheets = vec![
            sheet("A", vec![row("X", 1.0), row("Y", 2.0)]),
            sheet("B", vec![row("Y", 3.0), row("Z", 4.0)]),
        ];
        let cmp = build_comparison(&sheets).unwrap();

        assert_eq!(cmp.periods, vec!["A", "B"]);
        assert_eq!(cmp.rows.len(), 1);
        assert_eq!(cmp.rows[0].lane, "Y");
        let costs: Vec<f64> = cmp.rows[0].per_period.iter().map(|r| r.total_cost).collect();
        assert_eq!(costs, vec![2.0, 3.0]);
    }

    #[test]
    fn test_route_missing_from_one_of_three_periods_is_excluded() {
        let sheets = vec![
            sheet("A", vec![row("X", 1.0), row("Y", 1.0)]),
            sheet("B", vec![row("X", 1.0), row("Y", 1.0)]),
            sheet("C", vec![row("Y", 1.0)]),
        ];
        let cmp = build_comparison(&sheets).unwrap();
        assert_eq!(cmp.rows.len(), 1);
        assert_eq!(cmp.rows[0].per_period.len(), 3);
    }

    #[test]
    fn test_route_key_includes_route_label() {
        let mut routed = row("X", 1.0);
        routed.route = "X-Y".into();
        let sheets = vec![sheet("A", vec![row("X", 1.0)]), sheet("B", vec![routed])];
        assert_eq!(build_comparison(&sheets), None);
    }
}
