//! Team metrics comparison CLI
//!
//! Reads a CSV export (long or wide form), normalizes it and prints the
//! requested analysis as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use teambench::application::AnalyticsService;
use teambench::config::AppConfig;
use teambench::domain::comparison::{
    DateRange, FlaggedRecord, OutlierMethod, PerformerSummary, TeamMetricStats, TeamScore,
};
use teambench::infrastructure::write_records_csv;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Compare team metrics against each other and against benchmarks", long_about = None)]
struct Cli {
    /// TOML configuration file (overrides TEAMBENCH_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a CSV export into canonical metric records
    Normalize {
        /// Input CSV file
        input: PathBuf,

        /// Emit canonical long-form CSV instead of JSON
        #[arg(long)]
        csv: bool,
    },
    /// Summarize teams, metrics and the covered period
    Summary {
        /// Input CSV file
        input: PathBuf,
    },
    /// Rank teams per metric
    Compare {
        /// Input CSV file
        input: PathBuf,

        /// Comma-separated teams (default: every team in the input)
        #[arg(short, long)]
        teams: Option<String>,

        /// Comma-separated metrics (default: every metric in the input)
        #[arg(short, long)]
        metrics: Option<String>,

        /// Team the others are measured against
        #[arg(short, long)]
        baseline: Option<String>,
    },
    /// Compare teams against configured benchmark targets
    Benchmark {
        /// Input CSV file
        input: PathBuf,

        /// Comma-separated teams (default: every team in the input)
        #[arg(short, long)]
        teams: Option<String>,

        /// Comma-separated metrics (default: every metric in the input)
        #[arg(short, long)]
        metrics: Option<String>,
    },
    /// Composite performance ranking with best/worst performers
    Rank {
        /// Input CSV file
        input: PathBuf,

        /// Comma-separated metrics (default: every metric in the input)
        #[arg(short, long)]
        metrics: Option<String>,
    },
    /// Descriptive statistics and outliers per team and metric
    Stats {
        /// Input CSV file
        input: PathBuf,

        /// Comma-separated teams (default: every team in the input)
        #[arg(short, long)]
        teams: Option<String>,

        /// Comma-separated metrics (default: every metric in the input)
        #[arg(short, long)]
        metrics: Option<String>,

        /// Outlier method (iqr, zscore)
        #[arg(long, default_value = "iqr")]
        outliers: String,
    },
    /// Trend of one metric over time
    Trend {
        /// Input CSV file
        input: PathBuf,

        /// Metric to analyze
        #[arg(short, long)]
        metric: String,

        /// Restrict to one team
        #[arg(short, long)]
        team: Option<String>,

        /// Compare two periods instead: START..END,START..END (YYYY-MM-DD)
        #[arg(long)]
        periods: Option<String>,
    },
}

#[derive(Serialize)]
struct RankReport {
    ranking: Vec<TeamScore>,
    performers: Vec<PerformerSummary>,
}

#[derive(Serialize)]
struct StatsReport {
    statistics: Vec<TeamMetricStats>,
    outliers: Vec<FlaggedRecord>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env_with_path(cli.config).context("Failed to load configuration")?;
    if let Some(path) = &config.config_path {
        info!("Using configuration from {}", path.display());
    }
    let service = AnalyticsService::new(config);

    match cli.command {
        Commands::Normalize { input, csv } => {
            let normalized = service.load_csv(&input)?;
            if csv {
                write_records_csv(&normalized.records, std::io::stdout())?;
            } else {
                print_json(&normalized)?;
            }
        }
        Commands::Summary { input } => {
            let normalized = service.load_csv(&input)?;
            print_json(&service.summarize(&normalized.records))?;
        }
        Commands::Compare {
            input,
            teams,
            metrics,
            baseline,
        } => {
            let records = service.load_csv(&input)?.records;
            let summary = service.summarize(&records);
            let teams = selection(teams, &summary.teams);
            let metrics = selection(metrics, &summary.metrics);
            let results = service.compare_teams(&records, &teams, &metrics, baseline.as_deref())?;
            print_json(&results)?;
        }
        Commands::Benchmark {
            input,
            teams,
            metrics,
        } => {
            let records = service.load_csv(&input)?.records;
            let summary = service.summarize(&records);
            let teams = selection(teams, &summary.teams);
            let metrics = selection(metrics, &summary.metrics);
            print_json(&service.compare_to_benchmarks(&records, &teams, &metrics)?)?;
        }
        Commands::Rank { input, metrics } => {
            let records = service.load_csv(&input)?.records;
            let metrics = selection(metrics, &service.summarize(&records).metrics);
            print_json(&RankReport {
                ranking: service.performance_ranking(&records, &metrics),
                performers: service.best_and_worst(&records, &metrics),
            })?;
        }
        Commands::Stats {
            input,
            teams,
            metrics,
            outliers,
        } => {
            let method = OutlierMethod::from_str(&outliers)?;
            let records = service.load_csv(&input)?.records;
            let summary = service.summarize(&records);
            let teams = selection(teams, &summary.teams);
            let metrics = selection(metrics, &summary.metrics);

            let flagged = metrics
                .iter()
                .flat_map(|metric| service.outliers(&records, metric, method))
                .filter(|f| f.is_outlier)
                .collect();
            print_json(&StatsReport {
                statistics: service.team_statistics(&records, &teams, &metrics),
                outliers: flagged,
            })?;
        }
        Commands::Trend {
            input,
            metric,
            team,
            periods,
        } => {
            let records = service.load_csv(&input)?.records;
            match periods {
                Some(periods) => {
                    let (first, second) = parse_periods(&periods)?;
                    let comparison =
                        service.compare_periods(&records, &metric, team.as_deref(), first, second);
                    print_json(&comparison)?;
                }
                None => print_json(&service.trend(&records, &metric, team.as_deref())?)?,
            }
        }
    }

    Ok(())
}

/// Comma-separated selection, falling back to everything present in the input.
fn selection(arg: Option<String>, available: &[String]) -> Vec<String> {
    match arg {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => available.to_vec(),
    }
}

fn parse_periods(arg: &str) -> Result<(DateRange, DateRange)> {
    let (first, second) = arg
        .split_once(',')
        .context(format!("Expected two periods separated by ',': {}", arg))?;
    Ok((parse_range(first)?, parse_range(second)?))
}

fn parse_range(arg: &str) -> Result<DateRange> {
    let (start, end) = arg
        .trim()
        .split_once("..")
        .context(format!("Expected START..END: {}", arg))?;
    let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")
        .context(format!("Invalid start date format: {}", start))?;
    let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d")
        .context(format!("Invalid end date format: {}", end))?;
    if start > end {
        anyhow::bail!("Period start {} is after its end {}", start, end);
    }
    Ok(DateRange::new(start, end))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
