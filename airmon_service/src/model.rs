//! Shared data types for the air quality service.

use crate::aqi::{AqiCategory, AqiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted air quality reading.
///
/// Created once at ingest time and never modified. `timestamp` is assigned
/// by the service when the index is computed, never taken from the client,
/// so every stored reading can be ordered by it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Opaque storage key. Not part of the JSON representation.
    #[serde(skip_serializing, default)]
    pub id: Uuid,

    /// PM2.5 concentration in µg/m³.
    pub pm25: f64,
    /// PM10 concentration in µg/m³.
    pub pm10: f64,
    /// CO2 concentration in ppm.
    pub co2: Option<f64>,
    /// Temperature in °C.
    pub temperature: Option<f64>,
    /// Relative humidity in percent (0-100).
    pub humidity: Option<f64>,

    pub aqi: u16,
    pub category: AqiCategory,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// Stand-in returned by "latest" queries before anything was ingested:
    /// zero concentrations, AQI 0, "Good", stamped `now`.
    pub fn placeholder(now: DateTime<Utc>) -> Self {
        let result = AqiResult::from_aqi(0);
        Self {
            id: Uuid::nil(),
            pm25: 0.0,
            pm10: 0.0,
            co2: None,
            temperature: None,
            humidity: None,
            aqi: result.aqi,
            category: result.category,
            timestamp: now,
        }
    }
}
