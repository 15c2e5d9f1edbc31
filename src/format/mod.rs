//! Label and axis formatting.
//!
//! Derives the human-readable category labels bound to transformed
//! data positions: 12-hour clock labels, granularity-dependent date
//! labels, and the tick-downsampling policy for dense axes.
//!
//! Date labels use chrono's English month/day names, so output is
//! identical regardless of the runtime locale.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;

use crate::models::Granularity;

// =============================================================================
// Hour Labels
// =============================================================================

/// The 24 clock labels, `12 AM` through `11 PM`, indexed by hour.
pub static HOUR_LABELS: Lazy<[String; 24]> = Lazy::new(|| {
    std::array::from_fn(|h| hour_label(h as u8).expect("hour in range"))
});

/// 12-hour clock label for an hour index.
///
/// `0 -> "12 AM"`, `12 -> "12 PM"`, morning hours keep their value,
/// afternoon hours wrap by 12. Indices outside 0-23 return `None`.
pub fn hour_label(hour: u8) -> Option<String> {
    if hour > 23 {
        return None;
    }
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let clock = match hour % 12 {
        0 => 12,
        h => h,
    };
    Some(format!("{clock} {suffix}"))
}

// =============================================================================
// Granularity Table
// =============================================================================

/// One row of the granularity table: which source column carries the
/// time key and how its value is displayed.
#[derive(Debug, Clone, Copy)]
pub struct GranularityRule {
    pub granularity: Granularity,
    /// Source column holding the time key.
    pub source_column: &'static str,
    /// chrono format string for the axis label.
    pub date_format: &'static str,
}

/// The full mapping, table-driven rather than inferred from data.
pub const GRANULARITY_RULES: [GranularityRule; 3] = [
    GranularityRule {
        granularity: Granularity::Daily,
        source_column: "date",
        date_format: "%b %d",
    },
    GranularityRule {
        granularity: Granularity::Weekly,
        source_column: "week_start",
        date_format: "%b %d",
    },
    GranularityRule {
        granularity: Granularity::Monthly,
        source_column: "month",
        date_format: "%B",
    },
];

/// Look up the rule for a granularity.
pub fn granularity_rule(granularity: Granularity) -> &'static GranularityRule {
    GRANULARITY_RULES
        .iter()
        .find(|r| r.granularity == granularity)
        .expect("every granularity has a rule")
}

/// Format a source date string per the granularity table.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, and bare `YYYY-MM`
/// keys. An unparsable value falls back to the raw string, matching
/// the permissive policy for odd source data.
pub fn date_label(raw: &str, granularity: Granularity) -> String {
    let rule = granularity_rule(granularity);
    match parse_date_key(raw) {
        Some(date) => date.format(rule.date_format).to_string(),
        None => raw.to_string(),
    }
}

fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    // Month-period keys like "2019-02" pin to the first of the month.
    NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").ok()
}

// =============================================================================
// Tick Downsampling
// =============================================================================

/// Point count above which tick text is thinned.
pub const DENSE_AXIS_THRESHOLD: usize = 12;

/// Tick positions and text for one axis.
///
/// Downsampling affects only which positions get text; the underlying
/// series always keeps every point.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AxisTicks {
    /// Indices into the series that receive a tick label.
    pub positions: Vec<usize>,
    /// Label text, parallel to `positions`.
    pub labels: Vec<String>,
}

/// Thin tick labels for a dense axis.
///
/// At or below the threshold every point gets a tick; above it only
/// even-indexed points do.
pub fn downsample_ticks(labels: &[String], threshold: usize) -> AxisTicks {
    let keep_all = labels.len() <= threshold;
    let (positions, labels) = labels
        .iter()
        .enumerate()
        .filter(|(i, _)| keep_all || i % 2 == 0)
        .map(|(i, l)| (i, l.clone()))
        .unzip();
    AxisTicks { positions, labels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_labels_exhaustive() {
        let expected = [
            "12 AM", "1 AM", "2 AM", "3 AM", "4 AM", "5 AM", "6 AM", "7 AM", "8 AM", "9 AM",
            "10 AM", "11 AM", "12 PM", "1 PM", "2 PM", "3 PM", "4 PM", "5 PM", "6 PM", "7 PM",
            "8 PM", "9 PM", "10 PM", "11 PM",
        ];
        for (hour, want) in expected.iter().enumerate() {
            assert_eq!(hour_label(hour as u8).as_deref(), Some(*want));
        }
        assert_eq!(hour_label(24), None);
    }

    #[test]
    fn test_hour_label_boundaries() {
        assert_eq!(hour_label(0).unwrap(), "12 AM");
        assert_eq!(hour_label(12).unwrap(), "12 PM");
        assert_eq!(hour_label(11).unwrap(), "11 AM");
        assert_eq!(hour_label(13).unwrap(), "1 PM");
        assert_eq!(hour_label(23).unwrap(), "11 PM");
    }

    #[test]
    fn test_static_hour_labels_match() {
        assert_eq!(HOUR_LABELS[0], "12 AM");
        assert_eq!(HOUR_LABELS[23], "11 PM");
    }

    #[test]
    fn test_granularity_table() {
        assert_eq!(granularity_rule(Granularity::Daily).source_column, "date");
        assert_eq!(
            granularity_rule(Granularity::Weekly).source_column,
            "week_start"
        );
        assert_eq!(granularity_rule(Granularity::Monthly).source_column, "month");
    }

    #[test]
    fn test_date_label_daily_and_weekly() {
        assert_eq!(date_label("2019-05-29", Granularity::Daily), "May 29");
        assert_eq!(date_label("2019-01-07", Granularity::Weekly), "Jan 07");
    }

    #[test]
    fn test_date_label_monthly() {
        assert_eq!(date_label("2019-02-04", Granularity::Monthly), "February");
        assert_eq!(date_label("2019-02", Granularity::Monthly), "February");
    }

    #[test]
    fn test_date_label_with_time_component() {
        assert_eq!(
            date_label("2019-03-04 00:00:00", Granularity::Weekly),
            "Mar 04"
        );
    }

    #[test]
    fn test_date_label_fallback() {
        assert_eq!(date_label("garbage", Granularity::Daily), "garbage");
    }

    #[test]
    fn test_downsample_below_threshold_keeps_all() {
        let labels: Vec<String> = (0..10).map(|i| format!("t{i}")).collect();
        let ticks = downsample_ticks(&labels, DENSE_AXIS_THRESHOLD);
        assert_eq!(ticks.positions, (0..10).collect::<Vec<_>>());
        assert_eq!(ticks.labels.len(), 10);
    }

    #[test]
    fn test_downsample_dense_axis_keeps_even_indices() {
        let labels: Vec<String> = (0..24).map(|i| format!("t{i}")).collect();
        let ticks = downsample_ticks(&labels, DENSE_AXIS_THRESHOLD);
        assert_eq!(ticks.positions.len(), 12);
        assert!(ticks.positions.iter().all(|p| p % 2 == 0));
        assert_eq!(ticks.labels[1], "t2");
    }

    #[test]
    fn test_downsample_never_touches_point_count() {
        // The policy returns tick metadata only; the caller's series
        // is untouched by construction.
        let labels: Vec<String> = (0..30).map(|i| i.to_string()).collect();
        let before = labels.clone();
        let _ = downsample_ticks(&labels, DENSE_AXIS_THRESHOLD);
        assert_eq!(labels, before);
    }
}
