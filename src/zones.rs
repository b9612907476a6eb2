//! Zone classification.
//!
//! Rules are an ordered list of `(predicate, zone)` pairs. The first
//! predicate that matches decides the zone, so lane-substring rules that
//! must beat a cluster rule are placed before it.

use crate::records::{RouteType, ShipmentRecord};
use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Zone {
    N1,
    N2,
    N3,
    S1,
    S2,
    E,
    W1,
    W2,
    W3,
    C,
    NE1,
    NE2,
}

impl Zone {
    pub const ALL: [Zone; 12] = [
        Zone::N1,
        Zone::N2,
        Zone::N3,
        Zone::S1,
        Zone::S2,
        Zone::E,
        Zone::W1,
        Zone::W2,
        Zone::W3,
        Zone::C,
        Zone::NE1,
        Zone::NE2,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Zone::N1 => "N1",
            Zone::N2 => "N2",
            Zone::N3 => "N3",
            Zone::S1 => "S1",
            Zone::S2 => "S2",
            Zone::E => "E",
            Zone::W1 => "W1",
            Zone::W2 => "W2",
            Zone::W3 => "W3",
            Zone::C => "C",
            Zone::NE1 => "NE1",
            Zone::NE2 => "NE2",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Zone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_uppercase();
        match Zone::ALL.iter().find(|z| z.code() == code) {
            Some(zone) => Ok(*zone),
            None => bail!("unknown zone code: {s}"),
        }
    }
}

/// Operator grouping for the E rule.
///
/// - `RprOverrides`: `(cluster in {IXW, CCU} AND lane lacks NAG) OR lane has RPR`
/// - `ClusterGated`: `cluster in {IXW, CCU} AND (lane lacks NAG OR lane has RPR)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EZoneGrouping {
    #[default]
    RprOverrides,
    ClusterGated,
}

impl FromStr for EZoneGrouping {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rpr-overrides" | "rpr_overrides" => Ok(EZoneGrouping::RprOverrides),
            "cluster-gated" | "cluster_gated" => Ok(EZoneGrouping::ClusterGated),
            other => bail!("unknown E zone grouping: {other}"),
        }
    }
}

const N1_CLUSTERS: &[&str] = &["DEL", "JAI", "LKO"];
const S1_CLUSTERS: &[&str] = &["BLR", "CJB", "HYD", "MAA"];
const W1_CLUSTERS: &[&str] = &["BOM", "NAG", "PNQ"];
const E_CLUSTERS: &[&str] = &["IXW", "CCU"];

/// Fields a rule may look at, plus dataset-wide context.
pub struct ZoneInput<'a> {
    pub cluster: &'a str,
    pub lane: &'a str,
    pub route_type: &'a RouteType,
    /// Lanes that carry at least one record from an N1 cluster.
    pub n1_lanes: &'a HashSet<String>,
}

type Predicate = fn(&ZoneInput<'_>, EZoneGrouping) -> bool;

fn in_set(value: &str, set: &[&str]) -> bool {
    set.contains(&value)
}

static RULES: &[(Predicate, Zone)] = &[
    (|r, _| r.lane.contains("IXJ"), Zone::N3),
    (|r, _| r.cluster == "AMB" && !r.lane.contains("IXJ"), Zone::N2),
    (
        |r, _| in_set(r.cluster, N1_CLUSTERS) || r.n1_lanes.contains(r.lane),
        Zone::N1,
    ),
    (|r, _| r.lane.contains("CCJ"), Zone::S2),
    (
        |r, _| in_set(r.cluster, S1_CLUSTERS) && !r.lane.contains("CCJ"),
        Zone::S1,
    ),
    (|r, _| r.lane.contains("GOI"), Zone::W3),
    (
        |r, _| {
            in_set(r.cluster, W1_CLUSTERS) && !r.lane.contains("RPR") && !r.lane.contains("GOI")
        },
        Zone::W1,
    ),
    (
        |r, grouping| {
            let cluster = in_set(r.cluster, E_CLUSTERS);
            let rpr = r.lane.contains("RPR");
            let nag = r.lane.contains("NAG");
            match grouping {
                EZoneGrouping::RprOverrides => (cluster && !nag) || rpr,
                EZoneGrouping::ClusterGated => cluster && (!nag || rpr),
            }
        },
        Zone::E,
    ),
    (|r, _| r.cluster == "AMD", Zone::W2),
    (|r, _| r.cluster == "IDR", Zone::C),
    (
        |r, _| r.cluster == "GAU" && *r.route_type == RouteType::National,
        Zone::NE1,
    ),
    (
        |r, _| r.cluster == "GAU" && *r.route_type == RouteType::Regional,
        Zone::NE2,
    ),
];

/// Classifier bound to one record set.
///
/// The N1 rule is a lane-set membership test, so the classifier needs to see
/// the whole dataset once before it can classify individual records.
#[derive(Debug, Clone, Default)]
pub struct ZoneClassifier {
    grouping: EZoneGrouping,
    n1_lanes: HashSet<String>,
}

impl ZoneClassifier {
    pub fn new(grouping: EZoneGrouping, records: &[ShipmentRecord]) -> Self {
        let n1_lanes = records
            .iter()
            .filter(|r| in_set(&r.cluster, N1_CLUSTERS))
            .map(|r| r.lane.clone())
            .collect();

        Self { grouping, n1_lanes }
    }

    /// Returns the zone of the first matching rule, or `None` when no rule matches.
    pub fn classify(&self, cluster: &str, lane: &str, route_type: &RouteType) -> Option<Zone> {
        let input = ZoneInput {
            cluster,
            lane,
            route_type,
            n1_lanes: &self.n1_lanes,
        };

        RULES
            .iter()
            .find(|(predicate, _)| predicate(&input, self.grouping))
            .map(|(_, zone)| *zone)
    }

    pub fn classify_record(&self, record: &ShipmentRecord) -> Option<Zone> {
        self.classify(&record.cluster, &record.lane, &record.route_type)
    }
}
