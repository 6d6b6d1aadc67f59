//! AQI severity bands.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity category derived from an integer AQI. Bands use inclusive
/// upper bounds: 0-50, 51-100, 101-200, 201-300, 301-400, >400.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Severe,
}

impl AqiCategory {
    /// Every category, least to most severe.
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Satisfactory,
        AqiCategory::Moderate,
        AqiCategory::Poor,
        AqiCategory::VeryPoor,
        AqiCategory::Severe,
    ];

    pub fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Satisfactory,
            101..=200 => AqiCategory::Moderate,
            201..=300 => AqiCategory::Poor,
            301..=400 => AqiCategory::VeryPoor,
            _ => AqiCategory::Severe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Satisfactory => "Satisfactory",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Severe => "Severe",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised category label (e.g. a hand-edited database row).
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown AQI category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for AqiCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AqiCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges_are_inclusive() {
        let cases = [
            (0, AqiCategory::Good),
            (50, AqiCategory::Good),
            (51, AqiCategory::Satisfactory),
            (100, AqiCategory::Satisfactory),
            (101, AqiCategory::Moderate),
            (200, AqiCategory::Moderate),
            (201, AqiCategory::Poor),
            (300, AqiCategory::Poor),
            (301, AqiCategory::VeryPoor),
            (400, AqiCategory::VeryPoor),
            (401, AqiCategory::Severe),
            (500, AqiCategory::Severe),
        ];
        for (aqi, expected) in cases {
            assert_eq!(AqiCategory::from_aqi(aqi), expected, "aqi {}", aqi);
        }
    }

    #[test]
    fn test_classification_is_total_and_ordered() {
        let mut previous = AqiCategory::Good;
        for aqi in 0..=u16::MAX {
            let category = AqiCategory::from_aqi(aqi);
            assert!(category >= previous);
            previous = category;
        }
        assert_eq!(previous, AqiCategory::Severe);
    }

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for category in AqiCategory::ALL {
            assert_eq!(category.as_str().parse::<AqiCategory>(), Ok(category));
        }
        assert!("Hazardous".parse::<AqiCategory>().is_err());
    }

    #[test]
    fn test_serializes_as_display_label() {
        let json = serde_json::to_string(&AqiCategory::VeryPoor).unwrap();
        assert_eq!(json, "\"Very Poor\"");
        let back: AqiCategory = serde_json::from_str("\"Severe\"").unwrap();
        assert_eq!(back, AqiCategory::Severe);
    }
}
