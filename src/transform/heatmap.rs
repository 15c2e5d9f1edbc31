//! Heatmap shape transformer: observation records to a 24x7 matrix.
//!
//! Input records carry `(day_name, hour, ta)`. Each record lands in
//! the cell addressed by its hour (row) and day (column, Monday
//! first). Cells without an observation stay `None` so the renderer
//! shows "no data" instead of zero; nothing is interpolated.

use serde::Serialize;
use serde_json::Value;

use crate::format::HOUR_LABELS;
use crate::models::{day_index, Matrix2D, DAY_ABBREV};
use crate::normalize::{ColumnSpec, RowSchema};

/// Columns consumed by the heatmap family.
pub const HEATMAP_SCHEMA: RowSchema<'static> = RowSchema {
    columns: &[
        ColumnSpec::text("day_name"),
        ColumnSpec::numeric("hour"),
        ColumnSpec::numeric("ta"),
    ],
    key: &["day_name", "hour"],
};

/// Finished heatmap structure handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapData {
    /// 24 hour-rows of 7 day-columns; `null` cells mean no data.
    pub matrix: Matrix2D,
    /// Column tick text, Monday first.
    pub day_labels: Vec<String>,
    /// Row tick text, `12 AM` through `11 PM`.
    pub hour_labels: Vec<String>,
    /// Records skipped for an unknown day name or out-of-range hour.
    pub skipped: usize,
}

/// Populate the matrix from normalized records.
///
/// A record with a day name outside the known table or an hour
/// outside 0-23 is skipped silently, not treated as an error: callers
/// may intentionally pass partial data. Skips are counted so tests
/// and diagnostics can see them.
pub fn heatmap_matrix(records: &[Value]) -> HeatmapData {
    let mut matrix = Matrix2D::empty();
    let mut skipped = 0usize;

    for record in records {
        let day = record
            .get("day_name")
            .and_then(|v| v.as_str())
            .and_then(day_index);
        let hour = record.get("hour").and_then(|v| v.as_f64());
        let ta = record.get("ta").and_then(|v| v.as_f64());

        match (day, hour, ta) {
            (Some(day), Some(hour), Some(ta)) if in_hour_range(hour) => {
                matrix.set(hour as usize, day, ta);
            }
            _ => skipped += 1,
        }
    }

    HeatmapData {
        matrix,
        day_labels: DAY_ABBREV.iter().map(|d| d.to_string()).collect(),
        hour_labels: HOUR_LABELS.to_vec(),
        skipped,
    }
}

fn in_hour_range(hour: f64) -> bool {
    hour >= 0.0 && hour <= 23.0 && hour.fract() == 0.0
}
