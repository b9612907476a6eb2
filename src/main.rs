//! CLI entry point for the lane report tool.
//!
//! Loads shipment section files, applies the selection filters, and writes
//! the monthly lane/route report, a daily trend series, or zone counts.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lane_report::{
    config::EngineConfig,
    engine::build_report,
    filter::{RecordFilter, zone_counts},
    loader::load_files,
    normalize::{Normalizer, UtilizationScale},
    output::{print_json, write_csv_dir, write_trend, write_xlsx},
    records::{RouteType, ShipmentRecord, VendorType},
    trend::{TrendKind, daily_trend},
    zones::{EZoneGrouping, Zone, ZoneClassifier},
};
use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "lane_report")]
#[command(about = "Monthly lane and route cost/utilization reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input files and the selection applied to them.
#[derive(Args)]
struct InputArgs {
    /// Shipment files (.csv, .xlsx, .xls, .xlsb, .ods), concatenated in order
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Only include these periods (repeatable)
    #[arg(long = "period")]
    periods: Vec<String>,

    /// Only include these zones, e.g. N1, S2, NE1 (repeatable)
    #[arg(long = "zone")]
    zones: Vec<Zone>,

    /// Only include these clusters (repeatable)
    #[arg(long = "cluster")]
    clusters: Vec<String>,

    /// Only include these route types: REGIONAL, NATIONAL (repeatable)
    #[arg(long = "route-type")]
    route_types: Vec<String>,

    /// Only include these vendor types, e.g. MARKET, FEEDER (repeatable)
    #[arg(long = "vendor-type")]
    vendor_types: Vec<String>,

    /// E zone operator grouping: rpr-overrides or cluster-gated
    #[arg(long)]
    e_zone: Option<EZoneGrouping>,

    /// Utilization input scale: fraction or percent
    #[arg(long)]
    util_scale: Option<UtilizationScale>,
}

impl InputArgs {
    fn filter(&self) -> RecordFilter {
        RecordFilter {
            periods: self.periods.clone(),
            zones: self.zones.clone(),
            clusters: self.clusters.iter().map(|c| c.to_ascii_uppercase()).collect(),
            route_types: self
                .route_types
                .iter()
                .map(|s| RouteType::from(s.as_str()))
                .collect(),
            vendor_types: self
                .vendor_types
                .iter()
                .map(|s| VendorType::from(s.as_str()))
                .collect(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the per-period and comparison report
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// Workbook to write
        #[arg(short = 'x', long, default_value = "report.xlsx")]
        xlsx: PathBuf,

        /// Also write one CSV per sheet into this directory
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Gzip compress the CSV files
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Log the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the daily load or cost series as CSV
    Trend {
        #[command(flatten)]
        input: InputArgs,

        /// Trend type: load or cost
        #[arg(short, long, default_value = "load")]
        kind: TrendKind,

        /// CSV file to write (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Log record counts per zone
    Zones {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/lane_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("lane_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            xlsx,
            csv_dir,
            gzip,
            json,
        } => {
            let records = load_selection(&input)?;
            let report = build_report(&records);

            if report.is_empty() {
                warn!("Nothing to report for the selected records");
                return Ok(());
            }

            write_xlsx(&report, &xlsx)?;
            if let Some(dir) = csv_dir {
                write_csv_dir(&report, &dir, gzip)?;
            }
            if json {
                print_json(&report)?;
            }

            info!(sheets = ?report.sheet_names(), "Report complete");
        }
        Commands::Trend {
            input,
            kind,
            output,
        } => {
            let records = load_selection(&input)?;
            let points = daily_trend(&records, kind);

            match output {
                Some(path) => write_trend(File::create(path)?, &points)?,
                None => write_trend(std::io::stdout().lock(), &points)?,
            }
            info!(points = points.len(), ?kind, "Trend written");
        }
        Commands::Zones { input } => {
            let (records, classifier) = load_classified(&input)?;
            let kept = input.filter().apply(records, &classifier);

            for (zone, count) in zone_counts(&kept, &classifier) {
                let zone = zone.map(|z| z.code()).unwrap_or("unclassified");
                info!(zone, count, "Zone");
            }
        }
    }

    Ok(())
}

/// Loads, normalizes and builds the classifier over the whole dataset.
fn load_classified(input: &InputArgs) -> Result<(Vec<ShipmentRecord>, ZoneClassifier)> {
    let config = EngineConfig::from_env()?.with_overrides(input.e_zone, input.util_scale);
    info!(?config, "Engine configuration");

    let dataset = load_files(&input.inputs)?;
    let (records, norm) = Normalizer::new(config.utilization_scale)
        .normalize(dataset.records, &dataset.columns_present);
    if !norm.absent_columns.is_empty() {
        info!(absent = ?norm.absent_columns, "Optional columns not in input");
    }
    let classifier = ZoneClassifier::new(config.e_zone, &records);

    Ok((records, classifier))
}

/// Loads the inputs and keeps the records matching the CLI selection.
fn load_selection(input: &InputArgs) -> Result<Vec<ShipmentRecord>> {
    let (records, classifier) = load_classified(input)?;
    Ok(input.filter().apply(records, &classifier))
}
