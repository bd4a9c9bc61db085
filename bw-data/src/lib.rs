//! Chart-side transforms for vegetation-index series.
//!
//! These are consumed by renderers only; the pipeline never calls them.

/// Min-max rescaling of series parameters into a common display range.
pub mod normalization {
    use bw_core::series::RawSeriesRow;

    /// Lower bound of the display range.
    pub const DISPLAY_MIN: f64 = 1.0;
    /// Upper bound of the display range.
    pub const DISPLAY_MAX: f64 = 100.0;
    /// Value given to every row of a field whose values are all equal.
    pub const FLAT_VALUE: f64 = 50.0;

    /// Rescale each named field independently into [`DISPLAY_MIN`, `DISPLAY_MAX`].
    ///
    /// A field missing from a row counts as `0.0`. When a field is flat
    /// (max == min) every row maps to [`FLAT_VALUE`]. Fields not named are
    /// copied through unchanged.
    pub fn normalize(series: &[RawSeriesRow], fields: &[&str]) -> Vec<RawSeriesRow> {
        let mut result = series.to_vec();
        for field in fields {
            let values: Vec<f64> = series
                .iter()
                .map(|row| row.value(field).unwrap_or_default())
                .collect();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let span = max - min;
            for (row, value) in result.iter_mut().zip(values) {
                let scaled = if span == 0.0 {
                    FLAT_VALUE
                } else {
                    (value - min) / span * (DISPLAY_MAX - DISPLAY_MIN) + DISPLAY_MIN
                };
                row.values.insert(field.to_string(), scaled);
            }
        }
        result
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;
        use std::collections::BTreeMap;

        fn rows(field: &str, values: &[f64]) -> Vec<RawSeriesRow> {
            values
                .iter()
                .enumerate()
                .map(|(i, v)| RawSeriesRow {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap(),
                    values: BTreeMap::from([(field.to_string(), *v)]),
                    bloom_tag: None,
                    season_tag: None,
                })
                .collect()
        }

        fn column(rows: &[RawSeriesRow], field: &str) -> Vec<f64> {
            rows.iter().map(|r| r.value(field).unwrap()).collect()
        }

        #[test]
        fn test_flat_field_maps_to_midpoint() {
            let series = rows("NDVI", &[7.0, 7.0, 7.0]);
            let normalized = normalize(&series, &["NDVI"]);
            assert_eq!(column(&normalized, "NDVI"), vec![50.0, 50.0, 50.0]);
        }

        #[test]
        fn test_range_endpoints_are_exact() {
            let series = rows("NDVI", &[0.0, 5.0, 10.0]);
            let normalized = normalize(&series, &["NDVI"]);
            let values = column(&normalized, "NDVI");
            assert_eq!(values[0], 1.0);
            assert_eq!(values[1], 50.5);
            assert_eq!(values[2], 100.0);
        }

        #[test]
        fn test_fields_are_scaled_independently() {
            let mut series = rows("NDVI", &[0.2, 0.8]);
            series[0].values.insert("LST_K".to_string(), 290.0);
            series[1].values.insert("LST_K".to_string(), 310.0);
            series[0].values.insert("PAR".to_string(), 400.0);
            let normalized = normalize(&series, &["NDVI", "LST_K"]);
            assert_eq!(column(&normalized, "NDVI"), vec![1.0, 100.0]);
            assert_eq!(column(&normalized, "LST_K"), vec![1.0, 100.0]);
            assert_eq!(normalized[0].value("PAR"), Some(400.0));
        }

        #[test]
        fn test_missing_field_counts_as_zero() {
            let mut series = rows("NDVI", &[4.0, 8.0]);
            series.push(RawSeriesRow {
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                values: BTreeMap::new(),
                bloom_tag: None,
                season_tag: None,
            });
            let normalized = normalize(&series, &["NDVI"]);
            assert_eq!(column(&normalized, "NDVI"), vec![50.5, 100.0, 1.0]);
        }

        #[test]
        fn test_normalizing_twice_is_stable() {
            let series = rows("NDVI", &[0.0, 10.0, 2.5]);
            let once = normalize(&series, &["NDVI"]);
            let twice = normalize(&once, &["NDVI"]);
            for (a, b) in column(&once, "NDVI").iter().zip(column(&twice, "NDVI")) {
                assert!((a - b).abs() < 1e-9);
            }
        }

        #[test]
        fn test_empty_series() {
            assert!(normalize(&[], &["NDVI"]).is_empty());
        }
    }
}

/// Event annotations drawn as reference lines on the series chart.
pub mod events {
    use bw_core::series::{EventTag, RawSeriesRow};
    use chrono::NaiveDate;
    use serde::Serialize;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct EventMarker {
        pub date: NaiveDate,
        pub label: String,
    }

    /// Rows carrying the given tag, in file order.
    pub fn event_markers(series: &[RawSeriesRow], tag: EventTag) -> Vec<EventMarker> {
        series
            .iter()
            .filter_map(|row| {
                row.tag(tag).map(|label| EventMarker {
                    date: row.date,
                    label: label.to_string(),
                })
            })
            .collect()
    }

}
