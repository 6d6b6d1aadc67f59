//! Inbound reading payloads: parsing, validation, and turning a payload
//! into a stored `Reading`.
//!
//! Payloads are typed. Unknown fields are rejected rather than carried
//! through to storage.

use crate::aqi::{compute_aqi, AqiCategory};
use crate::model::Reading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Largest magnitude accepted for any measurement. Far beyond anything a
/// sensor reports, and well inside what a NUMERIC column round-trips.
pub const MAX_MEASUREMENT: f64 = 1_000_000.0;

/// Body of `POST /api/air/ingest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestReading {
    /// PM2.5 concentration in µg/m³ (>= 0).
    pub pm25: f64,
    /// PM10 concentration in µg/m³ (>= 0).
    pub pm10: f64,
    /// CO2 concentration in ppm (>= 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2: Option<f64>,
    /// Temperature in °C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Relative humidity in percent, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

/// Why an ingest payload was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Body is not valid JSON for `IngestReading` (syntax, missing or unknown field).
    Malformed(String),
    /// Field is NaN or infinite.
    NotFinite { field: &'static str },
    /// Field must be >= 0.
    Negative { field: &'static str, value: f64 },
    /// Field falls outside an inclusive range.
    OutOfRange { field: &'static str, value: f64, min: f64, max: f64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Malformed(e) => write!(f, "malformed reading payload: {}", e),
            ValidationError::NotFinite { field } => write!(f, "{} must be a finite number", field),
            ValidationError::Negative { field, value } => {
                write!(f, "{} must be greater than or equal to 0 (got {})", field, value)
            }
            ValidationError::OutOfRange { field, value, min, max } => {
                write!(f, "{} must be between {} and {} (got {})", field, min, max, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Name of the offending field, if the error is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Malformed(_) => None,
            ValidationError::NotFinite { field }
            | ValidationError::Negative { field, .. }
            | ValidationError::OutOfRange { field, .. } => Some(*field),
        }
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    check_range(field, value, 0.0, MAX_MEASUREMENT)
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    check_finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, value, min, max });
    }
    Ok(())
}

impl IngestReading {
    /// Checks domain constraints. The AQI engine would clamp bad values;
    /// they are refused here instead so they never reach storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_non_negative("pm25", self.pm25)?;
        check_non_negative("pm10", self.pm10)?;
        if let Some(co2) = self.co2 {
            check_non_negative("co2", co2)?;
        }
        if let Some(temperature) = self.temperature {
            check_range("temperature", temperature, -MAX_MEASUREMENT, MAX_MEASUREMENT)?;
        }
        if let Some(humidity) = self.humidity {
            check_range("humidity", humidity, 0.0, 100.0)?;
        }
        Ok(())
    }
}

/// Parses and validates a JSON request body.
pub fn parse_payload(body: &str) -> Result<IngestReading, ValidationError> {
    let payload: IngestReading = serde_json::from_str(body)
        .map_err(|e| ValidationError::Malformed(e.to_string()))?;
    payload.validate()?;
    Ok(payload)
}

// ---------------------------------------------------------------------------
// Reading construction
// ---------------------------------------------------------------------------

/// Computes the index for a validated payload and stamps it as a new reading.
pub fn build_reading(payload: &IngestReading, now: DateTime<Utc>) -> Reading {
    let result = compute_aqi(payload.pm25, payload.pm10);

    Reading {
        id: Uuid::new_v4(),
        pm25: payload.pm25,
        pm10: payload.pm10,
        co2: payload.co2,
        temperature: payload.temperature,
        humidity: payload.humidity,
        aqi: result.aqi,
        category: result.category,
        timestamp: now,
    }
}

/// Body returned after a successful ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub aqi: u16,
    pub category: AqiCategory,
}

impl From<&Reading> for IngestResponse {
    fn from(reading: &Reading) -> Self {
        IngestResponse {
            status: "ok".to_string(),
            aqi: reading.aqi,
            category: reading.category,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
