use crate::engine::types::{AggregateGroup, GroupKey, PeriodGroups};
use crate::records::ShipmentRecord;
use std::collections::BTreeMap;
use tracing::debug;

/// Groups records by `(period, lane, route)`.
///
/// Periods come out in order of first appearance in `records`; groups within a
/// period are sorted by lane then route. Only keys present in the input exist.
pub fn aggregate(records: &[ShipmentRecord]) -> Vec<PeriodGroups> {
    let mut period_order: Vec<&str> = Vec::new();
    let mut groups: BTreeMap<GroupKey, AggregateGroup> = BTreeMap::new();

    for r in records {
        if !period_order.contains(&r.period.as_str()) {
            period_order.push(&r.period);
        }

        let key = GroupKey {
            period: r.period.clone(),
            lane: r.lane.clone(),
            route: r.route.clone(),
        };

        let group = groups.entry(key.clone()).or_insert_with(|| AggregateGroup {
            key,
            total_cost: 0.0,
            total_capacity: 0.0,
            samples: Vec::new(),
            record_count: 0,
        });

        group.total_cost += r.section_cost;
        group.total_capacity += r.capacity_moved;
        group
            .samples
            .push((r.section_utilization, r.section_distance));
        group.record_count += 1;
    }

    let mut by_period: BTreeMap<String, Vec<AggregateGroup>> = BTreeMap::new();
    for (key, group) in groups {
        by_period.entry(key.period).or_default().push(group);
    }

    let result: Vec<PeriodGroups> = period_order
        .into_iter()
        .filter_map(|period| {
            by_period.remove(period).map(|groups| PeriodGroups {
                period: period.to_string(),
                groups,
            })
        })
        .collect();

    debug!(
        periods = result.len(),
        groups = result.iter().map(|p| p.groups.len()).sum::<usize>(),
        "Records aggregated"
    );

    result
}
