/// AQI engine behaviour checked end to end through the public API.
///
/// Covers the worked scenarios for the CPCB tables plus the properties
/// that must hold for every input: zero maps to zero, negatives clamp,
/// breakpoints are continuous, saturation at 500, worst pollutant wins.

use airmon_service::aqi::{
    compute_aqi, sub_index_pm10, sub_index_pm25, AqiCategory, Pollutant, AQI_CEILING,
};

// ---------------------------------------------------------------------------
// Worked scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_low_pollution_is_good() {
    // PM2.5: 50/30 * 10 = 16.67 -> 17, PM10: 50/50 * 20 = 20
    assert_eq!(sub_index_pm25(10.0), 17);
    assert_eq!(sub_index_pm10(20.0), 20);

    let result = compute_aqi(10.0, 20.0);
    assert_eq!(result.aqi, 20);
    assert_eq!(result.category, AqiCategory::Good);
}

#[test]
fn test_top_of_second_pm25_band_is_satisfactory() {
    assert_eq!(sub_index_pm25(60.0), 100);
    assert_eq!(sub_index_pm10(30.0), 30);

    let result = compute_aqi(60.0, 30.0);
    assert_eq!(result.aqi, 100);
    assert_eq!(result.category, AqiCategory::Satisfactory);
}

#[test]
fn test_clean_air_is_zero() {
    let result = compute_aqi(0.0, 0.0);
    assert_eq!(result.aqi, 0);
    assert_eq!(result.category, AqiCategory::Good);
}

#[test]
fn test_pm25_past_table_saturates() {
    let result = compute_aqi(400.0, 0.0);
    assert_eq!(result.aqi, 500);
    assert_eq!(result.category, AqiCategory::Severe);
}

#[test]
fn test_negative_readings_clamp_to_zero() {
    let result = compute_aqi(-5.0, -5.0);
    assert_eq!(result.aqi, 0);
    assert_eq!(result.category, AqiCategory::Good);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn test_sub_indices_monotone_over_defined_range() {
    for pollutant in [Pollutant::Pm25, Pollutant::Pm10] {
        for row in pollutant.breakpoints().rows() {
            let mut previous = pollutant.sub_index(row.c_low);
            // quarter-unit steps across the row, ending exactly on c_high
            let steps = ((row.c_high - row.c_low) * 4.0) as usize;
            for step in 1..=steps {
                let cp = row.c_low + step as f64 / 4.0;
                let index = pollutant.sub_index(cp);
                assert!(
                    index >= previous,
                    "{} index dropped at {}: {} < {}",
                    pollutant.as_str(),
                    cp,
                    index,
                    previous
                );
                previous = index;
            }
        }
    }
}

#[test]
fn test_between_rows_uses_next_row_formula() {
    // (100 - 51) / (60 - 31) * (30.5 - 31) + 51 = 50.16
    assert_eq!(sub_index_pm25(30.5), 50);
    // (100 - 51) / (100 - 51) * (50.5 - 51) + 51 = 50.5, half away from zero
    assert_eq!(sub_index_pm10(50.5), 51);
}

#[test]
fn test_breakpoints_are_continuous() {
    for pollutant in [Pollutant::Pm25, Pollutant::Pm10] {
        let table = pollutant.breakpoints();
        for row in table.rows() {
            assert_eq!(pollutant.sub_index(row.c_low), row.i_low);
            assert_eq!(pollutant.sub_index(row.c_high), row.i_high);
        }
    }
}

#[test]
fn test_everything_past_last_row_is_ceiling() {
    for pollutant in [Pollutant::Pm25, Pollutant::Pm10] {
        let top = pollutant.breakpoints().max_concentration();
        for extra in [0.001, 1.0, 50.0, 10_000.0] {
            assert_eq!(pollutant.sub_index(top + extra), AQI_CEILING);
        }
    }
}

#[test]
fn test_negative_same_as_zero() {
    for value in [-0.001, -1.0, -1e9] {
        assert_eq!(sub_index_pm25(value), sub_index_pm25(0.0));
        assert_eq!(sub_index_pm10(value), sub_index_pm10(0.0));
    }
}

#[test]
fn test_overall_is_max_of_pollutants() {
    let samples = [0.0, 7.5, 30.0, 31.0, 45.0, 99.0, 180.0, 260.0, 349.0, 425.0, 599.0, 700.0];
    for &pm25 in &samples {
        for &pm10 in &samples {
            let expected = sub_index_pm25(pm25).max(sub_index_pm10(pm10));
            let result = compute_aqi(pm25, pm10);
            assert_eq!(result.aqi, expected, "pm25={} pm10={}", pm25, pm10);
            assert_eq!(result.category, AqiCategory::from_aqi(expected));
        }
    }
}

#[test]
fn test_index_never_exceeds_ceiling() {
    for value in [0.0, 1.0, 1e3, 1e6, f64::MAX, f64::INFINITY] {
        assert!(compute_aqi(value, value).aqi <= AQI_CEILING);
    }
}

#[test]
fn test_category_labels() {
    let labels: Vec<&str> = AqiCategory::ALL.iter().map(|c| c.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Good", "Satisfactory", "Moderate", "Poor", "Very Poor", "Severe"]
    );
}
