//! Air Quality Index engine (CPCB National AQI).
//!
//! concentrations -> per-pollutant sub-index -> overall index -> category
//!
//! Everything here is pure: no I/O, no shared state. Safe to call from any
//! number of request workers at once.
//!
//! Submodules:
//! - `breakpoints` — breakpoint rows, validated tables, sub-index interpolation
//! - `category`    — severity bands for the integer index

pub mod breakpoints;
pub mod category;

pub use breakpoints::{Breakpoint, BreakpointTable, TableError, AQI_CEILING};
pub use category::AqiCategory;

use breakpoints::{PM10_BREAKPOINTS, PM25_BREAKPOINTS};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pollutants
// ---------------------------------------------------------------------------

/// Pollutants that contribute to the overall index.
///
/// CO2, temperature and humidity are recorded alongside readings but are
/// informational only. Adding a pollutant here (with its table) is all it
/// takes for it to join the worst-pollutant-governs pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
}

impl Pollutant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm25",
            Pollutant::Pm10 => "pm10",
        }
    }

    pub fn breakpoints(&self) -> BreakpointTable<'static> {
        match self {
            Pollutant::Pm25 => BreakpointTable::from_static(PM25_BREAKPOINTS),
            Pollutant::Pm10 => BreakpointTable::from_static(PM10_BREAKPOINTS),
        }
    }

    pub fn sub_index(&self, concentration: f64) -> u16 {
        self.breakpoints().sub_index(concentration)
    }
}

/// PM2.5 sub-index for a concentration in µg/m³.
pub fn sub_index_pm25(pm25: f64) -> u16 {
    Pollutant::Pm25.sub_index(pm25)
}

/// PM10 sub-index for a concentration in µg/m³.
pub fn sub_index_pm10(pm10: f64) -> u16 {
    Pollutant::Pm10.sub_index(pm10)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Overall index and its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AqiResult {
    pub aqi: u16,
    pub category: AqiCategory,
}

impl AqiResult {
    pub fn from_aqi(aqi: u16) -> Self {
        Self { aqi, category: AqiCategory::from_aqi(aqi) }
    }
}

/// Combines sub-indices: the worst pollutant governs. No inputs means 0.
pub fn overall_aqi<I>(sub_indices: I) -> u16
where
    I: IntoIterator<Item = u16>,
{
    sub_indices.into_iter().max().unwrap_or(0)
}

/// Computes the index for a set of pollutant concentrations.
pub fn compute_aqi_for(concentrations: &[(Pollutant, f64)]) -> AqiResult {
    let aqi = overall_aqi(concentrations.iter().map(|(p, c)| p.sub_index(*c)));
    AqiResult::from_aqi(aqi)
}

/// Computes the index from PM2.5 and PM10 concentrations (µg/m³).
pub fn compute_aqi(pm25: f64, pm10: f64) -> AqiResult {
    compute_aqi_for(&[(Pollutant::Pm25, pm25), (Pollutant::Pm10, pm10)])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
