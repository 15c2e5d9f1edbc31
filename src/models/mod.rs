//! Domain models for the comfortviz transformation pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`ChartQuery`] - Immutable selection (chart, entity, time range)
//! - [`ChartKind`] / [`TimeRange`] / [`Granularity`] - Selection enums
//! - [`Zone`] / [`Floor`] / [`EntityRef`] - Building entity identifiers
//! - [`Matrix2D`] - 24x7 hour-by-day heatmap matrix
//! - [`QuantileSummary`] - Synthetic five-point summary for box plots
//! - [`SeriesPoint`] / [`Provenance`] - Trend series building blocks
//! - [`ComfortBand`] / [`AirQualityBand`] - Classification bands

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

// =============================================================================
// Building Entities
// =============================================================================

/// Zones with sensor coverage.
pub const ZONES: [u32; 9] = [26, 27, 30, 47, 48, 50, 51, 52, 244];

/// Monitored floor levels. Floor 0 is the lobby.
pub const FLOORS: [u32; 7] = [0, 25, 26, 27, 28, 29, 30];

/// A building zone identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Zone(u32);

impl Zone {
    /// Create a zone, checking it against the monitored set.
    pub fn new(id: u32) -> Result<Self, QueryError> {
        if ZONES.contains(&id) {
            Ok(Self(id))
        } else {
            Err(QueryError::UnknownZone(id))
        }
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// A building floor identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Floor(u32);

impl Floor {
    /// Create a floor, checking it against the monitored set.
    pub fn new(level: u32) -> Result<Self, QueryError> {
        if FLOORS.contains(&level) {
            Ok(Self(level))
        } else {
            Err(QueryError::UnknownFloor(level))
        }
    }

    pub fn level(&self) -> u32 {
        self.0
    }
}

/// Entity addressed by a data file: a zone or a floor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    Zone(Zone),
    Floor(Floor),
}

impl EntityRef {
    /// Create a zone entity.
    pub fn zone(id: u32) -> Result<Self, QueryError> {
        Zone::new(id).map(EntityRef::Zone)
    }

    /// Create a floor entity.
    pub fn floor(level: u32) -> Result<Self, QueryError> {
        Floor::new(level).map(EntityRef::Floor)
    }

    /// File-name fragment, e.g. `zone26` or `floor0`.
    pub fn file_fragment(&self) -> String {
        match self {
            EntityRef::Zone(z) => format!("zone{}", z.id()),
            EntityRef::Floor(f) => format!("floor{}", f.level()),
        }
    }

    /// Display label, e.g. `Zone 26`, `Lobby`, `Floor 28`.
    pub fn label(&self) -> String {
        match self {
            EntityRef::Zone(z) => format!("Zone {}", z.id()),
            EntityRef::Floor(f) if f.level() == 0 => "Lobby".to_string(),
            EntityRef::Floor(f) => format!("Floor {}", f.level()),
        }
    }
}

// =============================================================================
// Day of Week
// =============================================================================

/// Day names in column order: Monday is index 0, Sunday is index 6.
///
/// This matches the aggregation step that produced the CSVs
/// (`dayofweek` with 0=Monday). Matching is case-sensitive and exact.
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Abbreviated day names for axis tick text, same order as
/// [`DAY_NAMES`].
pub const DAY_ABBREV: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Resolve a day name to its column index. Unknown names return `None`.
pub fn day_index(name: &str) -> Option<usize> {
    DAY_NAMES.iter().position(|&d| d == name)
}

// =============================================================================
// Time Range & Granularity
// =============================================================================

/// Time window selected in the dashboard filter controls.
///
/// The valid subset depends on the chart kind; see
/// [`ChartKind::supports_range`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// Last month.
    Month,
    /// Last quarter.
    Quarter,
    /// Last 12 hours.
    #[serde(rename = "12hours")]
    Hours12,
    /// Last 24 hours.
    #[serde(rename = "24hours")]
    Hours24,
    /// Daily aggregation.
    Daily,
    /// Weekly aggregation.
    Weekly,
    /// Monthly aggregation.
    Monthly,
}

impl TimeRange {
    /// Parse the filter-control value string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "month" => Some(Self::Month),
            "quarter" => Some(Self::Quarter),
            "12hours" => Some(Self::Hours12),
            "24hours" => Some(Self::Hours24),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Path fragment used in the data file layout.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Hours12 => "12hours",
            Self::Hours24 => "24hours",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// The trend aggregation granularity, if this range is one.
    pub fn granularity(&self) -> Option<Granularity> {
        match self {
            Self::Daily => Some(Granularity::Daily),
            Self::Weekly => Some(Granularity::Weekly),
            Self::Monthly => Some(Granularity::Monthly),
            _ => None,
        }
    }
}

/// Aggregation granularity for trend charts.
///
/// Each granularity selects a different source column and a different
/// display format; the mapping lives in
/// [`crate::format::granularity_rule`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

// =============================================================================
// Chart Kind
// =============================================================================

/// The chart families the pipeline can feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Hour-by-day temperature heatmap (zone-addressed).
    Heatmap,
    /// Hourly temperature variability box plot (zone-addressed).
    BoxPlot,
    /// Stacked comfort-condition trend (floor-addressed).
    ComfortTrends,
    /// Stacked CO2 air-quality trend (floor-addressed).
    Co2Trends,
    /// CO2 concentration line chart (floor-addressed).
    Co2History,
}

impl ChartKind {
    /// Parse the CLI/selection value string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "heatmap" => Some(Self::Heatmap),
            "boxplot" => Some(Self::BoxPlot),
            "comfort-trends" => Some(Self::ComfortTrends),
            "co2-trends" => Some(Self::Co2Trends),
            "co2-history" => Some(Self::Co2History),
            _ => None,
        }
    }

    /// Metric category directory in the data file layout.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Heatmap | Self::BoxPlot | Self::ComfortTrends => "thermal comfort",
            Self::Co2Trends | Self::Co2History => "air quality",
        }
    }

    /// Chart-type directory in the data file layout.
    pub fn chart_dir(&self) -> &'static str {
        match self {
            Self::Heatmap => "heatmap",
            Self::BoxPlot => "boxplot",
            Self::ComfortTrends => "trends",
            Self::Co2Trends => "co2trends",
            Self::Co2History => "co2hist",
        }
    }

    /// Display name for query error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Heatmap => "heatmap",
            Self::BoxPlot => "box plot",
            Self::ComfortTrends => "comfort trends",
            Self::Co2Trends => "CO2 trends",
            Self::Co2History => "CO2 history",
        }
    }

    /// Whether the chart is addressed by zone (true) or floor (false).
    pub fn zone_addressed(&self) -> bool {
        matches!(self, Self::Heatmap | Self::BoxPlot)
    }

    /// The time ranges the chart's filter control offers.
    pub fn supported_ranges(&self) -> &'static [TimeRange] {
        match self {
            Self::Heatmap | Self::BoxPlot => &[TimeRange::Month, TimeRange::Quarter],
            Self::ComfortTrends | Self::Co2Trends => {
                &[TimeRange::Daily, TimeRange::Weekly, TimeRange::Monthly]
            }
            Self::Co2History => &[TimeRange::Hours12, TimeRange::Hours24],
        }
    }

    pub fn supports_range(&self, range: TimeRange) -> bool {
        self.supported_ranges().contains(&range)
    }
}

// =============================================================================
// Chart Query
// =============================================================================

/// An immutable chart selection.
///
/// The pipeline is a pure function of `(rows, query)`; the query is
/// built once per filter change and never mutated. Requests in flight
/// are tagged with the query active at request time so a stale result
/// can be recognized and discarded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChartQuery {
    pub kind: ChartKind,
    pub entity: EntityRef,
    pub range: TimeRange,
}

impl ChartQuery {
    /// Build and validate a query against the selection domains.
    pub fn new(kind: ChartKind, entity: EntityRef, range: TimeRange) -> Result<Self, QueryError> {
        let query = Self {
            kind,
            entity,
            range,
        };
        query.validate()?;
        Ok(query)
    }

    /// Check entity kind and time range against the chart kind.
    pub fn validate(&self) -> Result<(), QueryError> {
        match (self.kind.zone_addressed(), self.entity) {
            (true, EntityRef::Floor(_)) => {
                return Err(QueryError::EntityMismatch {
                    chart: self.kind.name().to_string(),
                    expected: "zone",
                })
            }
            (false, EntityRef::Zone(_)) => {
                return Err(QueryError::EntityMismatch {
                    chart: self.kind.name().to_string(),
                    expected: "floor",
                })
            }
            _ => {}
        }

        if !self.kind.supports_range(self.range) {
            return Err(QueryError::UnsupportedTimeRange {
                chart: self.kind.name().to_string(),
                range: self.range.as_code().to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Series Point
// =============================================================================

/// One `(label, value)` pair of a line or bar series.
///
/// Ordering defines the horizontal axis order. Labels are unique
/// within one rendering; the normalizer enforces this with
/// last-write-wins de-duplication on the time-bucket key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Where the values of a trend series came from.
///
/// The comfort-trend source often carries only a `comfortable`
/// percentage; the complementary categories are then synthesized and
/// must never be mistaken for measurements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Values read directly from the source file.
    Measured,
    /// Values derived as `max(0, 100 - comfortable)`.
    DerivedComplement,
    /// Values pinned at zero because no independent data exists.
    PlaceholderZero,
}

impl Provenance {
    /// True for any series not backed by measurements.
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, Provenance::Measured)
    }
}

// =============================================================================
// Heatmap Matrix
// =============================================================================

/// Hour-by-day matrix for the temperature heatmap.
///
/// Fixed shape: 24 rows (hours) of 7 columns (days, Monday first).
/// A `None` cell means no observation exists for that (hour, day)
/// pair and must render as "no data", never as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Matrix2D {
    cells: Vec<Vec<Option<f64>>>,
}

impl Matrix2D {
    pub const HOURS: usize = 24;
    pub const DAYS: usize = 7;

    /// All 168 cells initialized to `None`.
    pub fn empty() -> Self {
        Self {
            cells: vec![vec![None; Self::DAYS]; Self::HOURS],
        }
    }

    pub fn get(&self, hour: usize, day: usize) -> Option<f64> {
        self.cells.get(hour)?.get(day).copied().flatten()
    }

    /// Set a cell; out-of-range coordinates are ignored.
    pub fn set(&mut self, hour: usize, day: usize, value: f64) {
        if hour < Self::HOURS && day < Self::DAYS {
            self.cells[hour][day] = Some(value);
        }
    }

    /// Row-major access for renderers: `rows()[hour][day]`.
    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.cells
    }

    /// Number of populated cells.
    pub fn filled(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|c| c.is_some())
            .count()
    }
}

impl Default for Matrix2D {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Quantile Summary
// =============================================================================

/// Synthetic five-point summary for one hour bucket.
///
/// Built from aggregate statistics as
/// `[min, min, mean-std, mean, mean+std, max, max]` - mean±std
/// standing in for true quartiles because only aggregates are
/// available. The doubled endpoints give box renderers a zero-width
/// whisker cap. This is NOT a true box plot: `min <= mean-std` is not
/// guaranteed (std may exceed mean - min) and the renderer must
/// tolerate a non-monotonic vector rather than correct it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuantileSummary {
    /// Hour bucket, 0-23.
    pub hour: u8,
    /// The seven-point vector handed to the box primitive.
    pub points: [f64; 7],
    /// Aggregate stats kept for hover payloads.
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub count: u64,
}

impl QuantileSummary {
    /// Build the summary from the hour's aggregate statistics.
    pub fn from_stats(hour: u8, mean: f64, std: f64, min: f64, max: f64, count: u64) -> Self {
        Self {
            hour,
            points: [min, min, mean - std, mean, mean + std, max, max],
            mean,
            std,
            min,
            max,
            count,
        }
    }

    /// Plain `(min, max)` whiskers, for renderers with an explicit
    /// whisker concept that do not want the doubled endpoints.
    pub fn whiskers(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

// =============================================================================
// Classification Bands
// =============================================================================

/// Thermal comfort band for an air temperature, per ASHRAE-55 as used
/// by the aggregation step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ComfortBand {
    TooCold,
    Comfortable,
    TooHot,
}

impl ComfortBand {
    /// Classify an air temperature in degrees Celsius.
    pub fn classify(ta: f64) -> Self {
        if ta < 21.0 {
            Self::TooCold
        } else if ta <= 26.0 {
            Self::Comfortable
        } else {
            Self::TooHot
        }
    }

    /// Source column name for this band's percentage.
    pub fn column(&self) -> &'static str {
        match self {
            Self::TooCold => "too_cold",
            Self::Comfortable => "comfortable",
            Self::TooHot => "too_hot",
        }
    }

    /// Legend label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TooCold => "Too Cold",
            Self::Comfortable => "Comfortable",
            Self::TooHot => "Too Hot",
        }
    }
}

/// CO2 air-quality band, per the aggregation step's thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityBand {
    Excellent,
    Fair,
    NeedsImprovement,
}

impl AirQualityBand {
    /// Classify a CO2 concentration in ppm.
    pub fn classify(co2: f64) -> Self {
        if co2 <= 600.0 {
            Self::Excellent
        } else if co2 <= 1000.0 {
            Self::Fair
        } else {
            Self::NeedsImprovement
        }
    }

    /// Source column name for this band's percentage.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Fair => "fair",
            Self::NeedsImprovement => "needs_improvement",
        }
    }

    /// Legend label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Fair => "Fair",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
