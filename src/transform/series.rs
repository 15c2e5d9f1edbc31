//! Trend shape transformer: time-bucketed percentages to stacked bar
//! series.
//!
//! Covers both trend variants: thermal comfort bands and CO2 air
//! quality bands. The time key column and its label format come from
//! the granularity table, never inferred from the data.
//!
//! The comfort source usually carries only a `comfortable`
//! percentage. The complementary bands are then synthesized -
//! `too_hot = max(0, 100 - comfortable)`, `too_cold = 0` - and each
//! series is tagged with its [`Provenance`] so a consumer can never
//! mistake the synthesized bands for measurements. When the source
//! does carry measured `too_hot` and `too_cold` columns, those win.

use serde::Serialize;
use serde_json::Value;

use crate::error::PipelineOutcome;
use crate::format::{date_label, downsample_ticks, granularity_rule, AxisTicks, DENSE_AXIS_THRESHOLD};
use crate::models::{AirQualityBand, ComfortBand, Granularity, Provenance, SeriesPoint};
use crate::normalize::{normalize, ColumnSpec, DropStats, RowSchema};

/// One stacked series with its origin.
#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    /// Legend name, e.g. `Comfortable` or `Needs Improvement`.
    pub name: &'static str,
    /// Whether the values are measured or synthesized.
    pub provenance: Provenance,
    pub points: Vec<SeriesPoint>,
}

/// Finished trend structure: parallel series over one label axis.
#[derive(Debug, Clone, Serialize)]
pub struct TrendData {
    pub series: Vec<TrendSeries>,
    /// Formatted axis labels in source order.
    pub labels: Vec<String>,
    /// Tick thinning for dense axes; every data point stays plotted.
    pub ticks: AxisTicks,
    /// Normalizer drop statistics, surfaced for diagnostics.
    pub dropped: DropStats,
}

/// Build the comfort-condition trend from raw rows.
///
/// Takes raw rows rather than normalized records because the schema
/// depends on what the source offers: measured band columns are used
/// when present, synthesized otherwise.
pub fn comfort_trend(rows: &[Value], granularity: Granularity) -> PipelineOutcome<TrendData> {
    let rule = granularity_rule(granularity);
    let measured = has_measured_bands(rows);

    let mut columns = vec![
        ColumnSpec::text(rule.source_column),
        ColumnSpec::numeric(ComfortBand::Comfortable.column()),
    ];
    if measured {
        columns.push(ColumnSpec::numeric(ComfortBand::TooHot.column()));
        columns.push(ColumnSpec::numeric(ComfortBand::TooCold.column()));
    }
    let key = [rule.source_column];
    let schema = RowSchema {
        columns: &columns,
        key: &key,
    };

    let normalized = normalize(rows, &schema)?;
    let labels = label_axis(&normalized.records, rule.source_column, granularity);
    let comfortable = column_values(&normalized.records, ComfortBand::Comfortable.column());

    let (too_hot, too_cold) = if measured {
        (
            TrendSeries {
                name: ComfortBand::TooHot.label(),
                provenance: Provenance::Measured,
                points: to_points(&labels, &column_values(&normalized.records, ComfortBand::TooHot.column())),
            },
            TrendSeries {
                name: ComfortBand::TooCold.label(),
                provenance: Provenance::Measured,
                points: to_points(&labels, &column_values(&normalized.records, ComfortBand::TooCold.column())),
            },
        )
    } else {
        let complement: Vec<f64> = comfortable.iter().map(|c| (100.0 - c).max(0.0)).collect();
        let zeros = vec![0.0; comfortable.len()];
        (
            TrendSeries {
                name: ComfortBand::TooHot.label(),
                provenance: Provenance::DerivedComplement,
                points: to_points(&labels, &complement),
            },
            TrendSeries {
                name: ComfortBand::TooCold.label(),
                provenance: Provenance::PlaceholderZero,
                points: to_points(&labels, &zeros),
            },
        )
    };

    let series = vec![
        TrendSeries {
            name: ComfortBand::Comfortable.label(),
            provenance: Provenance::Measured,
            points: to_points(&labels, &comfortable),
        },
        too_hot,
        too_cold,
    ];

    Ok(TrendData {
        ticks: downsample_ticks(&labels, DENSE_AXIS_THRESHOLD),
        series,
        labels,
        dropped: normalized.dropped,
    })
}

/// Build the CO2 air-quality trend from raw rows.
///
/// All three bands are measured; the source is the percentage
/// breakdown produced by the aggregation step.
pub fn co2_trend(rows: &[Value], granularity: Granularity) -> PipelineOutcome<TrendData> {
    let rule = granularity_rule(granularity);

    const BANDS: [AirQualityBand; 3] = [
        AirQualityBand::Excellent,
        AirQualityBand::Fair,
        AirQualityBand::NeedsImprovement,
    ];

    let mut columns = vec![ColumnSpec::text(rule.source_column)];
    columns.extend(BANDS.iter().map(|b| ColumnSpec::numeric(b.column())));
    let key = [rule.source_column];
    let schema = RowSchema {
        columns: &columns,
        key: &key,
    };

    let normalized = normalize(rows, &schema)?;
    let labels = label_axis(&normalized.records, rule.source_column, granularity);

    let series = BANDS
        .iter()
        .map(|band| TrendSeries {
            name: band.label(),
            provenance: Provenance::Measured,
            points: to_points(&labels, &column_values(&normalized.records, band.column())),
        })
        .collect();

    Ok(TrendData {
        ticks: downsample_ticks(&labels, DENSE_AXIS_THRESHOLD),
        series,
        labels,
        dropped: normalized.dropped,
    })
}

/// Whether the source carries measured complementary band columns.
fn has_measured_bands(rows: &[Value]) -> bool {
    rows.first()
        .and_then(|r| r.as_object())
        .map(|obj| {
            obj.contains_key(ComfortBand::TooHot.column())
                && obj.contains_key(ComfortBand::TooCold.column())
        })
        .unwrap_or(false)
}

fn label_axis(records: &[Value], column: &str, granularity: Granularity) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.get(column).and_then(|v| v.as_str()))
        .map(|raw| date_label(raw, granularity))
        .collect()
}

fn column_values(records: &[Value], column: &str) -> Vec<f64> {
    records
        .iter()
        .map(|r| r.get(column).and_then(|v| v.as_f64()).unwrap_or(0.0))
        .collect()
}

fn to_points(labels: &[String], values: &[f64]) -> Vec<SeriesPoint> {
    labels
        .iter()
        .zip(values.iter())
        .map(|(label, &value)| SeriesPoint::new(label.clone(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comfort_complement_derivation() {
        let rows = vec![json!({"date": "2019-05-29", "comfortable": "62"})];
        let data = comfort_trend(&rows, Granularity::Daily).unwrap();

        let comfortable = &data.series[0];
        let too_hot = &data.series[1];
        let too_cold = &data.series[2];

        assert_eq!(comfortable.points[0].value, 62.0);
        assert_eq!(comfortable.provenance, Provenance::Measured);
        assert_eq!(too_hot.points[0].value, 38.0);
        assert_eq!(too_hot.provenance, Provenance::DerivedComplement);
        assert_eq!(too_cold.points[0].value, 0.0);
        assert_eq!(too_cold.provenance, Provenance::PlaceholderZero);
    }

    #[test]
    fn test_complement_clamped_at_zero() {
        let rows = vec![json!({"date": "2019-05-29", "comfortable": "104.2"})];
        let data = comfort_trend(&rows, Granularity::Daily).unwrap();
        assert_eq!(data.series[1].points[0].value, 0.0);
    }

    #[test]
    fn test_measured_bands_win_over_derivation() {
        let rows = vec![json!({
            "date": "2019-05-29",
            "comfortable": "60",
            "too_hot": "30",
            "too_cold": "10"
        })];
        let data = comfort_trend(&rows, Granularity::Daily).unwrap();

        assert_eq!(data.series[1].points[0].value, 30.0);
        assert_eq!(data.series[1].provenance, Provenance::Measured);
        assert_eq!(data.series[2].points[0].value, 10.0);
        assert_eq!(data.series[2].provenance, Provenance::Measured);
    }

    #[test]
    fn test_weekly_uses_week_start_column() {
        let rows = vec![
            json!({"week_start": "2019-01-07", "comfortable": "44.05"}),
            json!({"week_start": "2019-01-14", "comfortable": "39.29"}),
        ];
        let data = comfort_trend(&rows, Granularity::Weekly).unwrap();

        assert_eq!(data.labels, vec!["Jan 07", "Jan 14"]);
        assert_eq!(data.series[0].points[1].value, 39.29);
    }

    #[test]
    fn test_monthly_label_is_month_name() {
        let rows = vec![json!({"month": "2019-02-04", "comfortable": "50"})];
        let data = comfort_trend(&rows, Granularity::Monthly).unwrap();
        assert_eq!(data.labels, vec!["February"]);
    }

    #[test]
    fn test_wrong_granularity_column_fails() {
        let rows = vec![json!({"date": "2019-05-29", "comfortable": "62"})];
        assert!(comfort_trend(&rows, Granularity::Weekly).is_err());
    }

    #[test]
    fn test_co2_trend_three_measured_bands() {
        let rows = vec![json!({
            "week_start": "2019-01-07",
            "excellent": "73.81",
            "fair": "26.19",
            "needs_improvement": "0.00"
        })];
        let data = co2_trend(&rows, Granularity::Weekly).unwrap();

        assert_eq!(data.series.len(), 3);
        assert_eq!(data.series[0].name, "Excellent");
        assert_eq!(data.series[0].points[0].value, 73.81);
        assert_eq!(data.series[2].name, "Needs Improvement");
        assert!(data.series.iter().all(|s| s.provenance == Provenance::Measured));
    }

    #[test]
    fn test_duplicate_time_bucket_last_wins() {
        let rows = vec![
            json!({"date": "2019-05-29", "comfortable": "40"}),
            json!({"date": "2019-05-29", "comfortable": "55"}),
        ];
        let data = comfort_trend(&rows, Granularity::Daily).unwrap();

        assert_eq!(data.labels.len(), 1);
        assert_eq!(data.series[0].points[0].value, 55.0);
        assert_eq!(data.dropped.superseded, 1);
    }

    #[test]
    fn test_series_order_is_axis_order() {
        let rows = vec![
            json!({"date": "2019-05-27", "comfortable": "30"}),
            json!({"date": "2019-05-28", "comfortable": "40"}),
            json!({"date": "2019-05-29", "comfortable": "50"}),
        ];
        let data = comfort_trend(&rows, Granularity::Daily).unwrap();
        assert_eq!(data.labels, vec!["May 27", "May 28", "May 29"]);
    }
}
