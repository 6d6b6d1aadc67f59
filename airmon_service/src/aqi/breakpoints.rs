//! CPCB breakpoint tables and piecewise-linear sub-index calculation.
//!
//! Each pollutant maps a concentration range onto an index range. Within
//! a row the index is linearly interpolated; beyond the last row the
//! sub-index saturates at `AQI_CEILING`.
//!
//! Sources:
//!   - Central Pollution Control Board, National Air Quality Index (2014)

use std::fmt;

/// Highest representable index. Concentrations past the last breakpoint
/// row saturate here.
pub const AQI_CEILING: u16 = 500;

// ---------------------------------------------------------------------------
// Breakpoint rows
// ---------------------------------------------------------------------------

/// One row of a breakpoint table: concentrations in `[c_low, c_high]` map
/// onto indices in `[i_low, i_high]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub c_low: f64,
    pub c_high: f64,
    pub i_low: u16,
    pub i_high: u16,
}

impl Breakpoint {
    pub const fn new(c_low: f64, c_high: f64, i_low: u16, i_high: u16) -> Self {
        Self { c_low, c_high, i_low, i_high }
    }

    /// Linear interpolation within this row, rounded half away from zero.
    ///
    /// Concentrations in the gap just below `c_low` (e.g. PM2.5 30.5)
    /// follow the same line and land slightly under `i_low`.
    fn interpolate(&self, cp: f64) -> u16 {
        let i_low = f64::from(self.i_low);
        let i_high = f64::from(self.i_high);
        let slope = (i_high - i_low) / (self.c_high - self.c_low);

        (slope * (cp - self.c_low) + i_low).round() as u16
    }
}

/// PM2.5 breakpoints, 24-hour average in µg/m³.
pub static PM25_BREAKPOINTS: &[Breakpoint] = &[
    Breakpoint::new(0.0, 30.0, 0, 50),
    Breakpoint::new(31.0, 60.0, 51, 100),
    Breakpoint::new(61.0, 90.0, 101, 200),
    Breakpoint::new(91.0, 120.0, 201, 300),
    Breakpoint::new(121.0, 250.0, 301, 400),
    Breakpoint::new(251.0, 350.0, 401, 500),
];

/// PM10 breakpoints, 24-hour average in µg/m³.
pub static PM10_BREAKPOINTS: &[Breakpoint] = &[
    Breakpoint::new(0.0, 50.0, 0, 50),
    Breakpoint::new(51.0, 100.0, 51, 100),
    Breakpoint::new(101.0, 250.0, 101, 200),
    Breakpoint::new(251.0, 350.0, 201, 300),
    Breakpoint::new(351.0, 430.0, 301, 400),
    Breakpoint::new(431.0, 600.0, 401, 500),
];

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Reasons a set of rows cannot form a breakpoint table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// No rows at all.
    Empty,
    /// First row does not start at concentration 0 / index 0.
    DoesNotStartAtZero,
    /// A row has a non-finite bound or `low >= high`.
    InvalidRow(usize),
    /// Concentration ranges overlap or go backwards between rows.
    ConcentrationOrder(usize),
    /// Index ranges are not contiguous (`i_low` must be previous `i_high + 1`).
    IndexGap(usize),
    /// Last row ends above `AQI_CEILING`.
    ExceedsCeiling(u16),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Empty => write!(f, "breakpoint table has no rows"),
            TableError::DoesNotStartAtZero => {
                write!(f, "breakpoint table must start at concentration 0 and index 0")
            }
            TableError::InvalidRow(i) => {
                write!(f, "row {}: bounds must be finite with low < high", i)
            }
            TableError::ConcentrationOrder(i) => {
                write!(f, "row {}: concentration range overlaps the previous row", i)
            }
            TableError::IndexGap(i) => {
                write!(f, "row {}: index range is not contiguous with the previous row", i)
            }
            TableError::ExceedsCeiling(top) => {
                write!(f, "last row ends at index {} (ceiling is {})", top, AQI_CEILING)
            }
        }
    }
}

impl std::error::Error for TableError {}

/// An ordered, validated breakpoint table for a single pollutant.
#[derive(Debug, Clone, Copy)]
pub struct BreakpointTable<'a> {
    rows: &'a [Breakpoint],
}

impl<'a> BreakpointTable<'a> {
    /// Builds a table after checking row ordering and contiguity.
    pub fn new(rows: &'a [Breakpoint]) -> Result<Self, TableError> {
        let first = rows.first().ok_or(TableError::Empty)?;

        for (i, row) in rows.iter().enumerate() {
            let finite = row.c_low.is_finite() && row.c_high.is_finite();
            if !finite || row.c_low >= row.c_high || row.i_low >= row.i_high {
                return Err(TableError::InvalidRow(i));
            }
        }

        if first.c_low != 0.0 || first.i_low != 0 {
            return Err(TableError::DoesNotStartAtZero);
        }

        for (i, pair) in rows.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.c_low <= prev.c_high {
                return Err(TableError::ConcentrationOrder(i + 1));
            }
            if next.i_low != prev.i_high + 1 {
                return Err(TableError::IndexGap(i + 1));
            }
        }

        let top = rows[rows.len() - 1].i_high;
        if top > AQI_CEILING {
            return Err(TableError::ExceedsCeiling(top));
        }

        Ok(Self { rows })
    }

    /// Wraps rows known to be well formed. Only used for the static CPCB
    /// tables, which the tests below check with `new`.
    pub(crate) const fn from_static(rows: &'a [Breakpoint]) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &'a [Breakpoint] {
        self.rows
    }

    /// Largest concentration covered before saturation.
    pub fn max_concentration(&self) -> f64 {
        self.rows.last().map(|r| r.c_high).unwrap_or(0.0)
    }

    /// Maps a concentration onto a sub-index in `0..=AQI_CEILING`.
    ///
    /// Negative (and NaN) concentrations are treated as zero. The first row
    /// whose `c_high` is not below the concentration is used; if none
    /// qualifies the result is `AQI_CEILING`.
    pub fn sub_index(&self, concentration: f64) -> u16 {
        let cp = concentration.max(0.0);

        self.rows
            .iter()
            .find(|row| cp <= row.c_high)
            .map(|row| row.interpolate(cp))
            .unwrap_or(AQI_CEILING)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
