//! History shape transformer: hourly CO2 averages to a line series.
//!
//! Input records carry `(hour, co2)` for a trailing 12- or 24-hour
//! window. Output is an ordered series of clock-labeled points plus
//! the tick thinning for the dense 24-hour axis.

use serde::Serialize;
use serde_json::Value;

use crate::format::{downsample_ticks, hour_label, AxisTicks, DENSE_AXIS_THRESHOLD};
use crate::models::SeriesPoint;
use crate::normalize::{ColumnSpec, RowSchema};

/// Columns consumed by the CO2 history family.
pub const CO2_HISTORY_SCHEMA: RowSchema<'static> = RowSchema {
    columns: &[ColumnSpec::numeric("hour"), ColumnSpec::numeric("co2")],
    key: &["hour"],
};

/// Finished line chart structure.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryData {
    /// One point per hour bucket, in source order.
    pub points: Vec<SeriesPoint>,
    /// Tick thinning for the axis; all points stay plotted.
    pub ticks: AxisTicks,
    /// Records skipped for an out-of-range hour.
    pub skipped: usize,
}

/// Build the CO2 history series from normalized records.
///
/// Records with an hour outside 0-23 are dropped without error.
pub fn co2_history(records: &[Value]) -> HistoryData {
    let mut points = Vec::new();
    let mut skipped = 0usize;

    for record in records {
        let hour = record.get("hour").and_then(|v| v.as_f64());
        let co2 = record.get("co2").and_then(|v| v.as_f64());

        match (hour, co2) {
            (Some(h), Some(co2)) if (0.0..=23.0).contains(&h) && h.fract() == 0.0 => {
                let label = hour_label(h as u8).expect("hour in range");
                points.push(SeriesPoint::new(label, co2));
            }
            _ => skipped += 1,
        }
    }

    let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();

    HistoryData {
        ticks: downsample_ticks(&labels, DENSE_AXIS_THRESHOLD),
        points,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn test_points_in_source_order_with_labels() {
        let records = vec![
            json!({"hour": 3.0, "co2": 516.25}),
            json!({"hour": 4.0, "co2": 510.83}),
            json!({"hour": 15.0, "co2": 649.42}),
        ];
        let data = co2_history(&records);

        assert_eq!(data.points.len(), 3);
        assert_eq!(data.points[0], SeriesPoint::new("3 AM", 516.25));
        assert_eq!(data.points[2], SeriesPoint::new("3 PM", 649.42));
    }

    #[test]
    fn test_out_of_range_hours_skipped() {
        let records = vec![
            json!({"hour": 25.0, "co2": 500.0}),
            json!({"hour": 10.0, "co2": 620.0}),
        ];
        let data = co2_history(&records);

        assert_eq!(data.points.len(), 1);
        assert_eq!(data.skipped, 1);
    }

    #[test]
    fn test_twelve_hour_window_keeps_all_ticks() {
        let records: Vec<Value> = (3..15)
            .map(|h| json!({"hour": h as f64, "co2": 500.0 + h as f64}))
            .collect();
        let data = co2_history(&records);

        assert_eq!(data.points.len(), 12);
        assert_eq!(data.ticks.positions.len(), 12);
    }

    #[test]
    fn test_twenty_four_hour_window_thins_ticks_only() {
        let records: Vec<Value> = (0..24)
            .map(|h| json!({"hour": h as f64, "co2": 500.0 + h as f64}))
            .collect();
        let data = co2_history(&records);

        // Every point plotted, every second tick labeled.
        assert_eq!(data.points.len(), 24);
        assert_eq!(data.ticks.positions.len(), 12);
        assert_eq!(data.ticks.labels[0], "12 AM");
        assert_eq!(data.ticks.labels[1], "2 AM");
    }

    #[test]
    fn test_end_to_end_from_raw_rows() {
        let raw = vec![
            json!({"hour": "8", "co2": "547.58"}),
            json!({"hour": "9", "co2": "640.00"}),
        ];
        let normalized = normalize(&raw, &CO2_HISTORY_SCHEMA).unwrap();
        let data = co2_history(&normalized.records);

        assert_eq!(data.points[1], SeriesPoint::new("9 AM", 640.0));
    }
}
