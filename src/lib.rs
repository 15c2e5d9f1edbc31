//! # comfortviz - chart data for building comfort dashboards
//!
//! comfortviz transforms pre-aggregated sensor CSVs (temperature,
//! CO2) into the data structures charting libraries consume:
//! hour-by-day matrices, synthetic quantile summaries, stacked trend
//! series, and labeled line series.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│ Normalizer  │────▶│ Transformer │
//! │ (per query) │     │ (auto-enc)  │     │ (coerce+dedup)    │ (per chart) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! The pipeline is a pure function of `(rows, query)`. Fetching is
//! separate: a [`source::ChartFetcher`] tags each request and applies
//! a result only while its tag is current, so a stale response can
//! never overwrite a newer selection.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use comfortviz::models::{ChartKind, ChartQuery, EntityRef, TimeRange};
//! use comfortviz::source::DataSource;
//!
//! #[tokio::main]
//! async fn main() {
//!     let query = ChartQuery::new(
//!         ChartKind::Heatmap,
//!         EntityRef::zone(26).unwrap(),
//!         TimeRange::Month,
//!     ).unwrap();
//!     let chart = DataSource::from_env().fetch_chart(&query).await.unwrap();
//!     println!("{}", chart.summary());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (queries, matrices, summaries, bands)
//! - [`parser`] - CSV parsing with auto-detection
//! - [`normalize`] - Typed records, NaN filtering, de-duplication
//! - [`transform`] - Shape transformers and the pipeline
//! - [`format`] - Hour/date labels and tick downsampling
//! - [`source`] - File layout, fetching, supersession guard
//! - [`logs`] - Structured progress events

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Normalization
pub mod normalize;

// Transformation
pub mod transform;

// Labels
pub mod format;

// Data source
pub mod source;

// Log events
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{NormalizeError, ParseError, PipelineError, QueryError, SourceError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AirQualityBand, ChartKind, ChartQuery, ComfortBand, EntityRef, Floor, Granularity, Matrix2D,
    Provenance, QuantileSummary, SeriesPoint, TimeRange, Zone,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{csv_to_rows, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto, ParseResult};

// =============================================================================
// Re-exports - Normalization
// =============================================================================

pub use normalize::{normalize, ColumnSpec, DropStats, NormalizeResult, RowSchema};

// =============================================================================
// Re-exports - Transformers
// =============================================================================

pub use transform::{
    co2_history, co2_trend, comfort_trend, heatmap_matrix, quantile_summaries, transform_parsed,
    transform_rows, BoxPlotData, ChartData, HeatmapData, HistoryData, TrendData, TrendSeries,
};

// =============================================================================
// Re-exports - Formatting
// =============================================================================

pub use format::{date_label, downsample_ticks, hour_label, AxisTicks, DENSE_AXIS_THRESHOLD};

// =============================================================================
// Re-exports - Source
// =============================================================================

pub use source::{ChartFetcher, DataSource, FetchOutcome};
