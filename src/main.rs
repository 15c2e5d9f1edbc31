//! comfortviz CLI - Transform building sensor CSVs into chart data
//!
//! # Main Commands
//!
//! ```bash
//! comfortviz fetch --chart heatmap --zone 26 --range month   # Resolve, fetch and transform
//! comfortviz heatmap month_zone26.csv                        # Transform a local CSV
//! comfortviz entities --chart boxplot --range month          # List entities with data
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! comfortviz parse input.csv        # Just parse CSV to JSON rows
//! comfortviz boxplot input.csv      # Hourly stats to quantile summaries
//! comfortviz trends input.csv       # Percentages to stacked trend series
//! comfortviz history input.csv      # Hourly CO2 to a line series
//! comfortviz labels                 # Show the 24 clock labels
//! ```

use clap::{Parser, Subcommand};
use comfortviz::{
    co2_history, co2_trend, comfort_trend, heatmap_matrix, hour_label, normalize,
    parse_csv_file_auto, quantile_summaries, ChartData, ChartFetcher, ChartKind, ChartQuery,
    DataSource, EntityRef, FetchOutcome, Granularity, TimeRange,
};
use comfortviz::logs::{LogLevel, LOG_BROADCASTER};
use comfortviz::transform::{BOXPLOT_SCHEMA, CO2_HISTORY_SCHEMA, HEATMAP_SCHEMA};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "comfortviz")]
#[command(about = "Transform building sensor CSVs into chart data structures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output JSON rows
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transform day/hour temperature rows into a heatmap matrix
    Heatmap {
        /// Input CSV file with day_name, hour, ta columns
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transform hourly statistics into box plot quantile summaries
    Boxplot {
        /// Input CSV file with hour, mean, std, min, max, count columns
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transform percentage breakdowns into stacked trend series
    Trends {
        /// Input CSV file with a time key and percentage columns
        input: PathBuf,

        /// Aggregation granularity: daily, weekly or monthly
        #[arg(short, long, default_value = "daily")]
        granularity: String,

        /// Treat the input as CO2 air-quality bands instead of
        /// thermal comfort bands
        #[arg(long)]
        co2: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transform hourly CO2 averages into a line series
    History {
        /// Input CSV file with hour, co2 columns
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve, fetch and transform the data file for a selection
    Fetch {
        /// Chart kind: heatmap, boxplot, comfort-trends, co2-trends, co2-history
        #[arg(long)]
        chart: String,

        /// Zone id (zone-addressed charts)
        #[arg(long)]
        zone: Option<u32>,

        /// Floor level (floor-addressed charts)
        #[arg(long)]
        floor: Option<u32>,

        /// Time range: month, quarter, 12hours, 24hours, daily, weekly, monthly
        #[arg(long)]
        range: String,

        /// Data base directory (default: $COMFORTVIZ_DATA_DIR or ./data)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Fetch time bound in seconds
        #[arg(long, default_value = "10")]
        timeout: u64,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List entities that have a data file for a chart and range
    Entities {
        /// Chart kind: heatmap, boxplot, comfort-trends, co2-trends, co2-history
        #[arg(long)]
        chart: String,

        /// Time range
        #[arg(long)]
        range: String,

        /// Data base directory (default: $COMFORTVIZ_DATA_DIR or ./data)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Show the 24 clock labels used on hour axes
    Labels,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Heatmap { input, output } => cmd_heatmap(&input, output.as_deref()),

        Commands::Boxplot { input, output } => cmd_boxplot(&input, output.as_deref()),

        Commands::Trends {
            input,
            granularity,
            co2,
            output,
        } => cmd_trends(&input, &granularity, co2, output.as_deref()),

        Commands::History { input, output } => cmd_history(&input, output.as_deref()),

        Commands::Fetch {
            chart,
            zone,
            floor,
            range,
            data_dir,
            timeout,
            output,
        } => {
            cmd_fetch(
                &chart,
                zone,
                floor,
                &range,
                data_dir.as_deref(),
                timeout,
                output.as_deref(),
            )
            .await
        }

        Commands::Entities {
            chart,
            range,
            data_dir,
        } => cmd_entities(&chart, &range, data_dir.as_deref()).await,

        Commands::Labels => cmd_labels(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'",
        match result.delimiter {
            '\t' => "\\t".to_string(),
            c => c.to_string(),
        }
    );
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("Parsed {} records", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)
}

fn cmd_heatmap(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = parse_csv_file_auto(input)?;
    let normalized = normalize(&parsed.records, &HEATMAP_SCHEMA)?;
    let data = heatmap_matrix(&normalized.records);

    eprintln!(
        "Heatmap: {} of 168 cells filled, {} malformed rows dropped, {} records skipped",
        data.matrix.filled(),
        normalized.dropped.malformed,
        data.skipped
    );

    write_output(&serde_json::to_string_pretty(&data)?, output)
}

fn cmd_boxplot(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = parse_csv_file_auto(input)?;
    let normalized = normalize(&parsed.records, &BOXPLOT_SCHEMA)?;
    let data = quantile_summaries(&normalized.records);

    eprintln!(
        "Box plot: {} hour buckets (synthetic mean±std summaries, not true quartiles)",
        data.summaries.len()
    );

    write_output(&serde_json::to_string_pretty(&data)?, output)
}

fn cmd_trends(
    input: &Path,
    granularity: &str,
    co2: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let granularity = match granularity {
        "daily" => Granularity::Daily,
        "weekly" => Granularity::Weekly,
        "monthly" => Granularity::Monthly,
        other => return Err(format!("unknown granularity: {other}").into()),
    };

    let parsed = parse_csv_file_auto(input)?;
    let data = if co2 {
        co2_trend(&parsed.records, granularity)?
    } else {
        comfort_trend(&parsed.records, granularity)?
    };

    for series in &data.series {
        eprintln!(
            "   {} ({:?}): {} points",
            series.name,
            series.provenance,
            series.points.len()
        );
    }

    write_output(&serde_json::to_string_pretty(&data)?, output)
}

fn cmd_history(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = parse_csv_file_auto(input)?;
    let normalized = normalize(&parsed.records, &CO2_HISTORY_SCHEMA)?;
    let data = co2_history(&normalized.records);

    eprintln!(
        "History: {} points, {} tick labels",
        data.points.len(),
        data.ticks.labels.len()
    );

    write_output(&serde_json::to_string_pretty(&data)?, output)
}

async fn cmd_fetch(
    chart: &str,
    zone: Option<u32>,
    floor: Option<u32>,
    range: &str,
    data_dir: Option<&Path>,
    timeout: u64,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = build_query(chart, zone, floor, range)?;

    let source = match data_dir {
        Some(dir) => DataSource::new(dir),
        None => DataSource::from_env(),
    }
    .with_timeout(Duration::from_secs(timeout));

    eprintln!("Resolved: {}", source.resolve(&query).display());

    // Mirror pipeline log events to stderr while the fetch runs.
    let mut rx = LOG_BROADCASTER.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(entry) = rx.recv().await {
            let prefix = match entry.level {
                LogLevel::Info => "  ",
                LogLevel::Success => "  +",
                LogLevel::Warning => "  !",
                LogLevel::Error => "  x",
            };
            eprintln!("{} {}", prefix, entry.message);
        }
    });

    let fetcher = ChartFetcher::new(source);
    let outcome = fetcher.fetch(query).await;
    printer.abort();

    match outcome {
        FetchOutcome::Applied(chart) => {
            eprintln!("{}", chart.summary());
            if let ChartData::Trend(ref trend) = chart {
                for series in trend.series.iter().filter(|s| s.provenance.is_synthetic()) {
                    eprintln!(
                        "   note: '{}' is {:?}, not measured data",
                        series.name, series.provenance
                    );
                }
            }
            write_output(&serde_json::to_string_pretty(&chart)?, output)
        }
        FetchOutcome::Superseded => {
            eprintln!("Result discarded: superseded by a newer request");
            Ok(())
        }
        FetchOutcome::Failed(err) if err.is_no_data() => {
            eprintln!("No data available for the selected parameters");
            std::process::exit(2);
        }
        FetchOutcome::Failed(err) => Err(err.into()),
    }
}

async fn cmd_entities(
    chart: &str,
    range: &str,
    data_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = ChartKind::from_code(chart).ok_or_else(|| format!("unknown chart: {chart}"))?;
    let range = TimeRange::from_code(range).ok_or_else(|| format!("unknown range: {range}"))?;

    let source = match data_dir {
        Some(dir) => DataSource::new(dir),
        None => DataSource::from_env(),
    };

    let mut entities = source.available_entities(kind, range).await?;
    entities.sort_by_key(|e| e.file_fragment());

    for entity in &entities {
        println!("{}", entity.label());
    }
    eprintln!("{} entities with data", entities.len());

    Ok(())
}

fn cmd_labels() -> Result<(), Box<dyn std::error::Error>> {
    for hour in 0..24u8 {
        if let Some(label) = hour_label(hour) {
            println!("{:2} -> {}", hour, label);
        }
    }
    Ok(())
}

/// Build and validate a query from CLI arguments.
fn build_query(
    chart: &str,
    zone: Option<u32>,
    floor: Option<u32>,
    range: &str,
) -> Result<ChartQuery, Box<dyn std::error::Error>> {
    let kind = ChartKind::from_code(chart).ok_or_else(|| format!("unknown chart: {chart}"))?;
    let range = TimeRange::from_code(range).ok_or_else(|| format!("unknown range: {range}"))?;

    let entity = match (zone, floor) {
        (Some(id), None) => EntityRef::zone(id)?,
        (None, Some(level)) => EntityRef::floor(level)?,
        _ => return Err("pass exactly one of --zone or --floor".into()),
    };

    Ok(ChartQuery::new(kind, entity, range)?)
}

/// Write to a file or stdout.
fn write_output(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("Written to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
