//! PostgreSQL reading store (`air.readings`).
//!
//! Concentrations are NUMERIC columns and cross the boundary as
//! `rust_decimal::Decimal`. See `sql/001_air_readings.sql` for the schema.

use super::{ReadingStore, StoreError};
use crate::aqi::AqiCategory;
use crate::db::{self, DbConfigError};
use crate::model::Reading;
use ::postgres::{Client, Row};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use uuid::Uuid;

const SELECT_COLUMNS: &str =
    "id, pm25, pm10, co2, temperature, humidity, aqi, category, recorded_at";

/// Reading store backed by a single synchronous PostgreSQL connection.
pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    /// Connects and verifies the `air` schema and `readings` table exist.
    pub fn open(database_url: &str) -> Result<Self, DbConfigError> {
        let client = db::connect_and_verify(database_url)?;
        Ok(Self { client })
    }

    /// Wraps an already-validated client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

// ---------------------------------------------------------------------------
// Column conversion
// ---------------------------------------------------------------------------

fn to_numeric(field: &'static str, value: f64) -> Result<Decimal, StoreError> {
    Decimal::from_f64(value).ok_or(StoreError::Encode { field, value })
}

fn to_optional_numeric(field: &'static str, value: Option<f64>) -> Result<Option<Decimal>, StoreError> {
    value.map(|v| to_numeric(field, v)).transpose()
}

fn from_numeric(field: &str, value: Decimal) -> Result<f64, StoreError> {
    value
        .to_f64()
        .ok_or_else(|| StoreError::Decode(format!("{} value {} is not representable", field, value)))
}

fn row_to_reading(row: &Row) -> Result<Reading, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let pm25: Decimal = row.try_get("pm25")?;
    let pm10: Decimal = row.try_get("pm10")?;
    let co2: Option<Decimal> = row.try_get("co2")?;
    let temperature: Option<Decimal> = row.try_get("temperature")?;
    let humidity: Option<Decimal> = row.try_get("humidity")?;
    let aqi: i16 = row.try_get("aqi")?;
    let category: String = row.try_get("category")?;
    let timestamp: DateTime<Utc> = row.try_get("recorded_at")?;

    let aqi = u16::try_from(aqi)
        .map_err(|_| StoreError::Decode(format!("reading {} has negative aqi {}", id, aqi)))?;
    let category: AqiCategory = category
        .parse()
        .map_err(|e| StoreError::Decode(format!("reading {}: {}", id, e)))?;

    Ok(Reading {
        id,
        pm25: from_numeric("pm25", pm25)?,
        pm10: from_numeric("pm10", pm10)?,
        co2: co2.map(|v| from_numeric("co2", v)).transpose()?,
        temperature: temperature.map(|v| from_numeric("temperature", v)).transpose()?,
        humidity: humidity.map(|v| from_numeric("humidity", v)).transpose()?,
        aqi,
        category,
        timestamp,
    })
}

// ---------------------------------------------------------------------------
// ReadingStore
// ---------------------------------------------------------------------------

impl ReadingStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    fn insert(&mut self, reading: &Reading) -> Result<(), StoreError> {
        let pm25 = to_numeric("pm25", reading.pm25)?;
        let pm10 = to_numeric("pm10", reading.pm10)?;
        let co2 = to_optional_numeric("co2", reading.co2)?;
        let temperature = to_optional_numeric("temperature", reading.temperature)?;
        let humidity = to_optional_numeric("humidity", reading.humidity)?;
        let aqi = reading.aqi as i16;

        self.client.execute(
            "INSERT INTO air.readings
             (id, pm25, pm10, co2, temperature, humidity, aqi, category, recorded_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            &[
                &reading.id,
                &pm25,
                &pm10,
                &co2,
                &temperature,
                &humidity,
                &aqi,
                &reading.category.as_str(),
                &reading.timestamp,
            ],
        )?;

        Ok(())
    }

    fn latest(&mut self) -> Result<Option<Reading>, StoreError> {
        let query = format!(
            "SELECT {} FROM air.readings ORDER BY recorded_at DESC, seq DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let rows = self.client.query(query.as_str(), &[])?;

        rows.first().map(row_to_reading).transpose()
    }

    fn recent(&mut self, limit: usize) -> Result<Vec<Reading>, StoreError> {
        let query = format!(
            "SELECT {} FROM air.readings ORDER BY recorded_at DESC, seq DESC LIMIT $1",
            SELECT_COLUMNS
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self.client.query(query.as_str(), &[&limit])?;

        let mut readings = rows.iter().map(row_to_reading).collect::<Result<Vec<_>, _>>()?;
        readings.reverse();
        Ok(readings)
    }

    fn count(&mut self) -> Result<u64, StoreError> {
        let row = self.client.query_one("SELECT COUNT(*) FROM air.readings", &[])?;
        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as u64)
    }

    fn close(self: Box<Self>) -> Result<(), StoreError> {
        self.client.close()?;
        Ok(())
    }
}
