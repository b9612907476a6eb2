//! Engine configuration from the environment.
//!
//! Values come from `.env` or the process environment; CLI flags override them.

use crate::normalize::UtilizationScale;
use crate::zones::EZoneGrouping;
use anyhow::{Context, Result};
use std::str::FromStr;

pub const E_ZONE_VAR: &str = "LANE_REPORT_E_ZONE";
pub const UTIL_SCALE_VAR: &str = "LANE_REPORT_UTIL_SCALE";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub e_zone: EZoneGrouping,
    pub utilization_scale: UtilizationScale,
}

fn parse_var<T>(name: &str, value: Option<String>) -> Result<Option<T>>
where
    T: FromStr<Err = anyhow::Error>,
{
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.parse::<T>().with_context(|| format!("invalid {name}")))
        .transpose()
}

impl EngineConfig {
    /// Reads configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            e_zone: parse_var(E_ZONE_VAR, lookup(E_ZONE_VAR))?.unwrap_or(defaults.e_zone),
            utilization_scale: parse_var(UTIL_SCALE_VAR, lookup(UTIL_SCALE_VAR))?
                .unwrap_or(defaults.utilization_scale),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Applies CLI overrides on top of environment values.
    pub fn with_overrides(
        mut self,
        e_zone: Option<EZoneGrouping>,
        utilization_scale: Option<UtilizationScale>,
    ) -> Self {
        if let Some(e) = e_zone {
            self.e_zone = e;
        }
        if let Some(s) = utilization_scale {
            self.utilization_scale = s;
        }
        self
    }
}
