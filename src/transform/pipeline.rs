//! High-level pipeline API: raw rows and a query in, a renderable
//! chart structure out.
//!
//! The pipeline is a pure function of `(rows, query)`: no UI state,
//! no IO, no shared mutability between chart instances. Fetching the
//! rows for a query (and racing stale responses) lives in
//! [`crate::source`].
//!
//! # Example
//!
//! ```rust,ignore
//! use comfortviz::pipeline::transform_rows;
//! use comfortviz::models::{ChartKind, ChartQuery, EntityRef, TimeRange};
//!
//! let query = ChartQuery::new(
//!     ChartKind::Heatmap,
//!     EntityRef::zone(26)?,
//!     TimeRange::Month,
//! )?;
//! let chart = transform_rows(&rows, &query)?;
//! println!("{}", chart.summary());
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::error::{PipelineOutcome, QueryError};
use crate::logs::{log_info, log_warning};
use crate::models::{ChartKind, ChartQuery, Granularity};
use crate::normalize::normalize;
use crate::parser::ParseResult;
use crate::transform::heatmap::{heatmap_matrix, HeatmapData, HEATMAP_SCHEMA};
use crate::transform::history::{co2_history, HistoryData, CO2_HISTORY_SCHEMA};
use crate::transform::quantile::{quantile_summaries, BoxPlotData, BOXPLOT_SCHEMA};
use crate::transform::series::{co2_trend, comfort_trend, TrendData};

/// The finished structure for one chart, whatever its family.
///
/// This is the stable contract a rendering layer of any kind can
/// consume; everything inside is plain data.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "chart", rename_all = "snake_case")]
pub enum ChartData {
    Heatmap(HeatmapData),
    BoxPlot(BoxPlotData),
    Trend(TrendData),
    History(HistoryData),
}

impl ChartData {
    /// One-line summary for progress output.
    pub fn summary(&self) -> String {
        match self {
            ChartData::Heatmap(h) => format!(
                "heatmap: {} of 168 cells filled, {} records skipped",
                h.matrix.filled(),
                h.skipped
            ),
            ChartData::BoxPlot(b) => format!(
                "box plot: {} hour buckets, {} records skipped",
                b.summaries.len(),
                b.skipped
            ),
            ChartData::Trend(t) => format!(
                "trend: {} series over {} buckets",
                t.series.len(),
                t.labels.len()
            ),
            ChartData::History(h) => {
                format!("history: {} points, {} records skipped", h.points.len(), h.skipped)
            }
        }
    }
}

/// Transform raw rows into the chart structure the query asks for.
///
/// Validates the query, normalizes the rows against the chart
/// family's schema, runs the matching shape transformer, and binds
/// axis labels. Derived entities live only in the returned value;
/// nothing persists across calls.
pub fn transform_rows(rows: &[Value], query: &ChartQuery) -> PipelineOutcome<ChartData> {
    query.validate()?;

    log_info(format!(
        "Transforming {} rows for {} ({}, {})",
        rows.len(),
        query.kind.name(),
        query.entity.label(),
        query.range.as_code()
    ));

    let chart = match query.kind {
        ChartKind::Heatmap => {
            let normalized = normalize(rows, &HEATMAP_SCHEMA)?;
            report_drops(normalized.dropped.malformed);
            let data = heatmap_matrix(&normalized.records);
            report_skips(data.skipped);
            ChartData::Heatmap(data)
        }
        ChartKind::BoxPlot => {
            let normalized = normalize(rows, &BOXPLOT_SCHEMA)?;
            report_drops(normalized.dropped.malformed);
            let data = quantile_summaries(&normalized.records);
            report_skips(data.skipped);
            ChartData::BoxPlot(data)
        }
        ChartKind::ComfortTrends => {
            let data = comfort_trend(rows, trend_granularity(query)?)?;
            report_drops(data.dropped.malformed);
            ChartData::Trend(data)
        }
        ChartKind::Co2Trends => {
            let data = co2_trend(rows, trend_granularity(query)?)?;
            report_drops(data.dropped.malformed);
            ChartData::Trend(data)
        }
        ChartKind::Co2History => {
            let normalized = normalize(rows, &CO2_HISTORY_SCHEMA)?;
            report_drops(normalized.dropped.malformed);
            let data = co2_history(&normalized.records);
            report_skips(data.skipped);
            ChartData::History(data)
        }
    };

    log_info(chart.summary());
    Ok(chart)
}

/// Transform an already-parsed CSV for the query.
pub fn transform_parsed(parsed: &ParseResult, query: &ChartQuery) -> PipelineOutcome<ChartData> {
    log_info(format!(
        "Read {} rows ({} columns, '{}'-delimited, {})",
        parsed.records.len(),
        parsed.headers.len(),
        parsed.delimiter,
        parsed.encoding
    ));
    transform_rows(&parsed.records, query)
}

fn trend_granularity(query: &ChartQuery) -> Result<Granularity, QueryError> {
    query
        .range
        .granularity()
        .ok_or_else(|| QueryError::UnsupportedTimeRange {
            chart: query.kind.name().to_string(),
            range: query.range.as_code().to_string(),
        })
}

fn report_drops(malformed: usize) {
    if malformed > 0 {
        log_warning(format!("{malformed} malformed rows dropped"));
    }
}

fn report_skips(skipped: usize) {
    if skipped > 0 {
        log_warning(format!("{skipped} records outside the expected domain skipped"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NormalizeError, PipelineError};
    use crate::models::{EntityRef, TimeRange};
    use serde_json::json;

    fn heatmap_query() -> ChartQuery {
        ChartQuery::new(
            ChartKind::Heatmap,
            EntityRef::zone(26).unwrap(),
            TimeRange::Month,
        )
        .unwrap()
    }

    #[test]
    fn test_heatmap_end_to_end() {
        let rows = vec![json!({"day_name": "Monday", "hour": "14", "ta": "23.1"})];
        let chart = transform_rows(&rows, &heatmap_query()).unwrap();

        match chart {
            ChartData::Heatmap(data) => {
                assert_eq!(data.matrix.get(14, 0), Some(23.1));
                assert_eq!(data.matrix.filled(), 1);
            }
            other => panic!("expected heatmap, got {other:?}"),
        }
    }

    #[test]
    fn test_boxplot_end_to_end() {
        let rows = vec![json!({
            "hour": "9", "mean": "23.5", "std": "1.2",
            "min": "21.0", "max": "26.0", "count": "40"
        })];
        let query = ChartQuery::new(
            ChartKind::BoxPlot,
            EntityRef::zone(30).unwrap(),
            TimeRange::Quarter,
        )
        .unwrap();
        let chart = transform_rows(&rows, &query).unwrap();

        match chart {
            ChartData::BoxPlot(data) => {
                let s = &data.summaries[&9];
                assert_eq!(s.points[3], 23.5);
            }
            other => panic!("expected box plot, got {other:?}"),
        }
    }

    #[test]
    fn test_comfort_trend_end_to_end() {
        let rows = vec![json!({"date": "2019-05-29", "comfortable": "62"})];
        let query = ChartQuery::new(
            ChartKind::ComfortTrends,
            EntityRef::floor(0).unwrap(),
            TimeRange::Daily,
        )
        .unwrap();
        let chart = transform_rows(&rows, &query).unwrap();

        match chart {
            ChartData::Trend(data) => {
                assert_eq!(data.series[1].points[0].value, 38.0);
                assert_eq!(data.series[2].points[0].value, 0.0);
            }
            other => panic!("expected trend, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_query_rejected_before_transform() {
        let rows = vec![json!({"day_name": "Monday", "hour": "14", "ta": "23.1"})];
        let query = ChartQuery {
            kind: ChartKind::Heatmap,
            entity: EntityRef::floor(0).unwrap(),
            range: TimeRange::Month,
        };
        assert!(matches!(
            transform_rows(&rows, &query),
            Err(PipelineError::Query(_))
        ));
    }

    #[test]
    fn test_all_malformed_degrades_to_no_data() {
        let rows = vec![json!({"day_name": "Monday", "hour": "x", "ta": "y"})];
        let err = transform_rows(&rows, &heatmap_query()).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Normalize(NormalizeError::AllRowsDropped { total: 1 })
        ));
        assert!(err.is_no_data());
    }

    #[test]
    fn test_chart_serializes_with_tag() {
        let rows = vec![json!({"day_name": "Monday", "hour": "14", "ta": "23.1"})];
        let chart = transform_rows(&rows, &heatmap_query()).unwrap();
        let json = serde_json::to_value(&chart).unwrap();

        assert_eq!(json["chart"], "heatmap");
        assert_eq!(json["matrix"][14][0], 23.1);
        assert!(json["matrix"][0][0].is_null());
    }

    #[test]
    fn test_summary_lines() {
        let rows = vec![json!({"day_name": "Monday", "hour": "14", "ta": "23.1"})];
        let chart = transform_rows(&rows, &heatmap_query()).unwrap();
        assert!(chart.summary().contains("1 of 168"));
    }
}
