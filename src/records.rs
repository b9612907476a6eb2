//! Shipment record types.
//!
//! [`RawRecord`] is what the loader produces: every business field except the
//! lane may be missing. [`ShipmentRecord`] is the normalized form the engine
//! consumes, with every field populated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single section row as read from an input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub period: Option<String>,
    pub day: Option<f64>,
    pub cluster: Option<String>,
    pub lane: String,
    pub route: Option<String>,
    pub route_type: Option<String>,
    pub vendor_type: Option<String>,
    pub section_cost: Option<f64>,
    pub capacity_moved: Option<f64>,
    pub section_utilization: Option<RawUtilization>,
    pub section_distance: Option<f64>,
    pub trip_indicator: Option<f64>,
}

/// A utilization cell as it was written in the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawUtilization {
    /// A bare number, read through the configured [`UtilizationScale`].
    ///
    /// [`UtilizationScale`]: crate::normalize::UtilizationScale
    Bare(f64),
    /// Written with a `%` sign and already converted to a fraction.
    Fraction(f64),
}

/// Route type of a shipment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteType {
    Regional,
    National,
    Other(String),
}

impl From<&str> for RouteType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "REGIONAL" => RouteType::Regional,
            "NATIONAL" => RouteType::National,
            other => RouteType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteType::Regional => write!(f, "REGIONAL"),
            RouteType::National => write!(f, "NATIONAL"),
            RouteType::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Vendor type of the carrier that moved the section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VendorType {
    VendorScheduled,
    Market,
    Feeder,
    Other(String),
}

impl From<&str> for VendorType {
    fn from(s: &str) -> Self {
        let key: String = s
            .trim()
            .to_ascii_uppercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match key.as_str() {
            "VENDOR_SCHEDULED" => VendorType::VendorScheduled,
            "MARKET" => VendorType::Market,
            "FEEDER" => VendorType::Feeder,
            _ => VendorType::Other(key),
        }
    }
}

impl fmt::Display for VendorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorType::VendorScheduled => write!(f, "VENDOR_SCHEDULED"),
            VendorType::Market => write!(f, "MARKET"),
            VendorType::Feeder => write!(f, "FEEDER"),
            VendorType::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Normalized section record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentRecord {
    pub period: String,
    pub day: u32,
    pub cluster: String,
    pub lane: String,
    pub route: String,
    pub route_type: RouteType,
    pub vendor_type: VendorType,
    pub section_cost: f64,
    pub capacity_moved: f64,
    /// Always a fraction (0.8 == 80%).
    pub section_utilization: f64,
    pub section_distance: f64,
    pub trip_indicator: f64,
}
