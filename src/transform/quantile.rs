//! Box plot shape transformer: hourly aggregates to synthetic
//! quantile summaries.
//!
//! The source carries aggregate statistics per hour, not raw samples,
//! so the five-point summary is approximated as mean±std rather than
//! computed from true quartiles. The output is labeled accordingly;
//! a consumer rendering it as a box plot is showing an approximation
//! and must say so.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::format::hour_label;
use crate::models::QuantileSummary;
use crate::normalize::{ColumnSpec, RowSchema};

/// Columns consumed by the box plot family.
pub const BOXPLOT_SCHEMA: RowSchema<'static> = RowSchema {
    columns: &[
        ColumnSpec::numeric("hour"),
        ColumnSpec::numeric("mean"),
        ColumnSpec::numeric("std"),
        ColumnSpec::numeric("min"),
        ColumnSpec::numeric("max"),
        ColumnSpec::numeric("count"),
    ],
    key: &["hour"],
};

/// Finished box plot structure: one synthetic summary per hour.
#[derive(Debug, Clone, Serialize)]
pub struct BoxPlotData {
    /// Summaries keyed by hour, 0-23 only.
    pub summaries: BTreeMap<u8, QuantileSummary>,
    /// Clock labels for the hours present, in hour order.
    pub labels: Vec<String>,
    /// Records skipped for an out-of-range hour.
    pub skipped: usize,
}

/// Build synthetic quantile summaries from normalized hourly stats.
///
/// Records with an hour outside 0-23 are dropped without error.
/// No ordering of the summary vector is enforced: when std exceeds
/// `mean - min`, the vector is non-monotonic and stays that way.
pub fn quantile_summaries(records: &[Value]) -> BoxPlotData {
    let mut summaries = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let hour = record.get("hour").and_then(|v| v.as_f64());
        match hour {
            Some(h) if (0.0..=23.0).contains(&h) && h.fract() == 0.0 => {
                let get = |name: &str| record.get(name).and_then(|v| v.as_f64()).unwrap_or(f64::NAN);
                let summary = QuantileSummary::from_stats(
                    h as u8,
                    get("mean"),
                    get("std"),
                    get("min"),
                    get("max"),
                    get("count").max(0.0) as u64,
                );
                summaries.insert(h as u8, summary);
            }
            _ => skipped += 1,
        }
    }

    let labels = summaries.keys().filter_map(|&h| hour_label(h)).collect();

    BoxPlotData {
        summaries,
        labels,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn test_summary_for_hour_nine() {
        // End-to-end: the raw strings of the aggregation output.
        let raw = vec![json!({
            "hour": "9", "mean": "23.5", "std": "1.2",
            "min": "21.0", "max": "26.0", "count": "40"
        })];
        let normalized = normalize(&raw, &BOXPLOT_SCHEMA).unwrap();
        let data = quantile_summaries(&normalized.records);

        let s = &data.summaries[&9];
        let expect = [21.0, 21.0, 22.3, 23.5, 24.7, 26.0, 26.0];
        for (got, want) in s.points.iter().zip(expect.iter()) {
            assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
        }
        assert_eq!(s.count, 40);
    }

    #[test]
    fn test_mean_preserved_exactly() {
        let records = vec![json!({
            "hour": 7.0, "mean": 22.875, "std": 0.5,
            "min": 21.0, "max": 24.0, "count": 12.0
        })];
        let data = quantile_summaries(&records);

        let s = &data.summaries[&7];
        assert_eq!(s.mean, 22.875);
        assert_eq!(s.points[3], 22.875);
        assert_eq!(s.points[0], s.points[1]);
        assert_eq!(s.points[0], 21.0);
    }

    #[test]
    fn test_out_of_range_hours_dropped() {
        let records = vec![
            json!({"hour": 24.0, "mean": 22.0, "std": 1.0, "min": 20.0, "max": 24.0, "count": 5.0}),
            json!({"hour": -3.0, "mean": 22.0, "std": 1.0, "min": 20.0, "max": 24.0, "count": 5.0}),
            json!({"hour": 5.0, "mean": 22.0, "std": 1.0, "min": 20.0, "max": 24.0, "count": 5.0}),
        ];
        let data = quantile_summaries(&records);

        assert_eq!(data.summaries.len(), 1);
        assert!(data.summaries.contains_key(&5));
        assert_eq!(data.skipped, 2);
    }

    #[test]
    fn test_non_monotonic_vector_tolerated() {
        // std > mean - min: mean-std undercuts min and is kept.
        let records = vec![json!({
            "hour": 2.0, "mean": 21.5, "std": 3.0,
            "min": 20.0, "max": 23.0, "count": 8.0
        })];
        let data = quantile_summaries(&records);

        let s = &data.summaries[&2];
        assert!(s.points[2] < s.points[0]);
    }

    #[test]
    fn test_labels_in_hour_order() {
        let records = vec![
            json!({"hour": 14.0, "mean": 23.0, "std": 1.0, "min": 21.0, "max": 25.0, "count": 3.0}),
            json!({"hour": 9.0, "mean": 22.0, "std": 1.0, "min": 21.0, "max": 24.0, "count": 3.0}),
        ];
        let data = quantile_summaries(&records);

        assert_eq!(data.labels, vec!["9 AM".to_string(), "2 PM".to_string()]);
    }
}
