use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use core_types::{AnchorPolicy, ConfidencePolicy};
use event_catalog::EventFilter;
use event_study::{StudyReport, StudyRequest, StudySession};
use panel::DataContext;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The main entry point for the eventlab analytics CLI.
fn main() -> anyhow::Result<()> {
    // Load environment variables from the .env file, if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();
    let config = configuration::load_config().context("failed to load config.toml")?;

    // One read-only session per invocation; every command shares it.
    let data_path = cli
        .data
        .clone()
        .unwrap_or_else(|| config.dataset.parquet_path.clone());
    let ctx = DataContext::from_parquet(&data_path)
        .with_context(|| format!("failed to load panel from {data_path}"))?;
    let session = StudySession::open(ctx)?;

    // Execute the appropriate command
    match cli.command {
        Commands::SectorStudy(args) => run_study(&session, &config, args, Vec::new()),
        Commands::TickerStudy(args) => {
            if args.tickers.is_empty() || args.tickers.len() > 10 {
                anyhow::bail!(
                    "ticker studies take between 1 and 10 tickers (got {})",
                    args.tickers.len()
                );
            }
            run_study(&session, &config, args.study, args.tickers)
        }
        Commands::Catalog => print_catalog(&session),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Aligns daily returns around corporate events and aggregates the reaction.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the daily panel Parquet file (overrides config.toml).
    #[arg(long, global = true)]
    data: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cross-sectional study over every ticker that matches the filters.
    SectorStudy(StudyArgs),

    /// Study restricted to an explicit set of tickers (1-10).
    TickerStudy(TickerStudyArgs),

    /// List the selectable event types, sectors, and panel date bounds.
    Catalog,
}

#[derive(Args)]
struct StudyArgs {
    /// Event types to include (e.g. "10-Q,SPLIT"); empty keeps all types.
    #[arg(long, value_delimiter = ',')]
    types: Vec<String>,

    /// Window radius k in trading days.
    #[arg(long)]
    window: Option<u32>,

    /// Inclusive lower bound on event dates (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Inclusive upper bound on event dates (format: YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Sectors to include; empty keeps all sectors.
    #[arg(long, value_delimiter = ',')]
    sectors: Vec<String>,

    /// Exclude days with co-occurring events (drops every record of a pair).
    #[arg(long)]
    no_overlap: bool,

    /// Anchor policy: "exact" or "next-trading-day".
    #[arg(long)]
    anchor: Option<String>,

    /// Confidence-band policy: "propagated" or "naive".
    #[arg(long)]
    ci: Option<String>,

    /// Write the tidy window rows to this CSV file.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print the full report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct TickerStudyArgs {
    /// Tickers to study (e.g. "AAPL,MSFT"), capped at 10.
    #[arg(long, value_delimiter = ',', required = true)]
    tickers: Vec<String>,

    #[command(flatten)]
    study: StudyArgs,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Builds the request from CLI arguments plus configured defaults and runs it.
fn run_study(
    session: &StudySession,
    config: &configuration::Config,
    args: StudyArgs,
    tickers: Vec<String>,
) -> anyhow::Result<()> {
    let anchor: AnchorPolicy = match &args.anchor {
        Some(raw) => raw.parse()?,
        None => config.study.anchor,
    };
    let confidence: ConfidencePolicy = match &args.ci {
        Some(raw) => raw.parse()?,
        None => config.study.confidence,
    };

    let request = StudyRequest {
        filter: EventFilter {
            event_types: args.types,
            start_date: args.from.or(config.study.start_date),
            end_date: args.to.or(config.study.end_date),
            sectors: args.sectors,
            tickers,
            exclude_overlaps: args.no_overlap,
        },
        window: args.window.unwrap_or(config.study.window),
        anchor,
        confidence,
    };

    let output = session.run(&request)?;
    let report = &output.report;

    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else if report.summary.is_empty() {
        println!(
            "No events matched the current filters ({} requested).",
            report.summary.requested_events
        );
    } else {
        print_report(report);
    }

    if let Some(path) = &args.export {
        output.export_csv(path)?;
        info!(path = %path.display(), "window rows exported");
    }

    Ok(())
}

/// Renders the run summary plus the per-offset and CAR tables.
fn print_report(report: &StudyReport) {
    let summary = &report.summary;
    println!(
        "Events matched: {}/{} | Rows in ±k: {} | Min/Max rows per rel_day: {}/{}",
        summary.matched_events,
        summary.requested_events,
        summary.window_rows,
        summary.min_rows_per_offset,
        summary.max_rows_per_offset,
    );

    let mut stats = Table::new();
    stats
        .load_preset(UTF8_FULL)
        .set_header(vec!["rel_day", "mean", "median", "count"]);
    for s in &report.stats {
        stats.add_row(vec![
            s.rel_day.to_string(),
            format!("{:.6}", s.mean),
            format!("{:.6}", s.median),
            s.n.to_string(),
        ]);
    }
    println!("{stats}");

    let mut car = Table::new();
    car.load_preset(UTF8_FULL)
        .set_header(vec!["rel_day", "CAR", "lower", "upper", "CAR %", "n"]);
    for c in &report.car {
        car.add_row(vec![
            c.rel_day.to_string(),
            format!("{:.6}", c.car),
            format!("{:.6}", c.lower),
            format!("{:.6}", c.upper),
            format!("{:+.2}%", c.car_pct * 100.0),
            c.n.to_string(),
        ]);
    }
    println!("{car}");
}

/// Prints the selector choices a front end would offer for this panel.
fn print_catalog(session: &StudySession) -> anyhow::Result<()> {
    let ctx = session.context();
    match ctx.date_bounds()? {
        Some((lo, hi)) => println!("Panel dates: {lo} to {hi} ({} rows)", ctx.height()),
        None => println!("Panel is empty."),
    }
    println!("Tickers: {}", ctx.ticker_choices()?.len());
    println!("Event types: {}", session.event_type_choices()?.join(", "));
    let sectors = ctx.sector_choices()?;
    if !sectors.is_empty() {
        println!("Sectors: {}", sectors.join(", "));
    }
    Ok(())
}
