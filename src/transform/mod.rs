//! Shape transformation module.
//!
//! One transformer per chart family, plus the pipeline tying them to
//! the normalizer:
//! - Heatmap: records to a 24x7 hour-by-day matrix
//! - Quantile: hourly aggregates to synthetic box plot summaries
//! - Series: time-bucketed percentages to stacked trend series
//! - History: hourly CO2 averages to a labeled line series
//! - Pipeline: `(rows, query)` to the finished chart structure

pub mod heatmap;
pub mod history;
pub mod pipeline;
pub mod quantile;
pub mod series;

pub use heatmap::{heatmap_matrix, HeatmapData, HEATMAP_SCHEMA};
pub use history::{co2_history, HistoryData, CO2_HISTORY_SCHEMA};
pub use pipeline::{transform_parsed, transform_rows, ChartData};
pub use quantile::{quantile_summaries, BoxPlotData, BOXPLOT_SCHEMA};
pub use series::{co2_trend, comfort_trend, TrendData, TrendSeries};
