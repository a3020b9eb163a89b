//! bnetza-check - BNetzA underperformance checker for fixed-line broadband
//!
//! Usage:
//!   bnetza-check --data-path ./messprotokoll stats
//!   bnetza-check --days 30 check --contract-download 300 --contract-upload 150
//!   bnetza-check --all select --json
//!   bnetza-check export --format csv --output messdaten.csv
//!
//! Exit codes:
//!   0 - success, no underperformance
//!   1 - underperformance found, campaign invalid, or check not possible
//!   2 - configuration or input error

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bnetza_checker::{
    campaign::{self, CampaignSource, SubsetOutcome},
    config::AppConfig,
    ingest,
    models::{ContractSpeeds, Measurement},
    report, stats,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Check broadband measurements against the BNetzA underperformance procedure
#[derive(Parser, Debug)]
#[command(name = "bnetza-check")]
#[command(about = "Check broadband measurements against the BNetzA underperformance procedure")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, env = "BNETZA_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Directory with Breitbandmessung_*.csv exports
    #[arg(short, long, env = "BNETZA_DATA_PATH")]
    data_path: Option<PathBuf>,

    /// Only use measurements from the last N days
    #[arg(long, conflicts_with = "all")]
    days: Option<u32>,

    /// Use all measurements regardless of age
    #[arg(long)]
    all: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Descriptive statistics of the loaded measurements
    Stats,

    /// Validate the loaded measurements as a campaign
    Validate,

    /// Search the loaded measurements for a compliant 3x10 campaign
    Select,

    /// Full underperformance check
    Check {
        /// Contracted download speed (Mbit/s)
        #[arg(long)]
        contract_download: Option<f64>,

        /// Contracted upload speed (Mbit/s)
        #[arg(long)]
        contract_upload: Option<f64>,
    },

    /// Export the loaded measurements
    Export {
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: ExportFormat,

        /// Output file path (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Markdown,
    Csv,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Initialize tracing; logs go to stderr so stdout stays machine-readable
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bnetza_checker=info,bnetza_check=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env()?,
    };
    if let Some(path) = &cli.data_path {
        config.data.measurements_path = path.clone();
    }

    let measurements = load(&cli, &config)?;

    match cli.command {
        Commands::Stats => {
            let summary = stats::aggregate(&measurements);
            if cli.json {
                print_json(&summary)?;
            } else {
                println!("Statistics");
                print!("{}", report::render_statistics(&summary));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate => {
            let result = campaign::validate(&measurements);
            if cli.json {
                print_json(&result)?;
            } else {
                println!("Valid:     {}", if result.valid { "yes" } else { "no" });
                println!("Days:      {} ({})", result.stats.day_count, result.stats.date_range_label());
                for e in &result.errors {
                    println!("  error:   {}", e);
                }
                for w in &result.warnings {
                    println!("  warning: {}", w);
                }
            }
            Ok(exit_code(result.valid))
        }
        Commands::Select => {
            let outcome = campaign::select_subset(&measurements);
            if cli.json {
                print_json(&outcome)?;
            } else {
                match &outcome {
                    SubsetOutcome::Found(selected) => {
                        println!(
                            "Compliant campaign: {}, {}, {}",
                            selected.days[0], selected.days[1], selected.days[2]
                        );
                        print_rows(selected.measurements());
                    }
                    SubsetOutcome::NotFound(diag) => {
                        println!(
                            "No compliant campaign in {} measurements over {} days ({} candidate day triples)",
                            diag.pool_size, diag.day_count, diag.candidate_triples
                        );
                        println!("Most populated days: {}", diag.busiest_days_label());
                    }
                }
            }
            Ok(exit_code(outcome.is_found()))
        }
        Commands::Check {
            contract_download,
            contract_upload,
        } => {
            let contract = ContractSpeeds::new(
                contract_download.unwrap_or(config.contract.download),
                contract_upload.unwrap_or(config.contract.upload),
            )?;
            let checked = campaign::check_in_background(measurements, contract).await?;
            info!(
                source = checked.source.as_str(),
                underperformance = checked.result.underperformance,
                "check finished"
            );
            if cli.json {
                print_json(&checked)?;
            } else {
                print!("{}", report::render_check(&checked));
            }
            let clean = checked.source != CampaignSource::Insufficient
                && checked.source != CampaignSource::NotConstructible
                && !checked.result.underperformance;
            Ok(exit_code(clean))
        }
        Commands::Export { format, output } => {
            let body = match format {
                ExportFormat::Markdown => {
                    report::measurements_markdown(&measurements, chrono::Local::now().naive_local())
                }
                ExportFormat::Csv => report::measurements_csv(&measurements),
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, body)
                        .with_context(|| format!("Failed to write export: {:?}", path))?;
                    info!(path = %path.display(), rows = measurements.len(), "export written");
                }
                None => print!("{}", body),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(cli: &Cli, config: &AppConfig) -> Result<Vec<Measurement>> {
    let all = ingest::load_dir(&config.data.measurements_path, &config.data.file_prefix)?;
    let timeframe = if cli.all {
        None
    } else {
        cli.days.or(config.check.timeframe())
    };
    let Some(days) = timeframe else {
        return Ok(all);
    };
    let recent = ingest::filter_by_timeframe(&all, days, chrono::Local::now().naive_local());
    info!(days, total = all.len(), kept = recent.len(), "timeframe filter applied");
    Ok(recent)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_rows(rows: &[Measurement]) {
    println!(
        "{:>20} {:>12} {:>12} {:>10}",
        "Date/Time", "Download", "Upload", "Ping"
    );
    println!("{}", "-".repeat(57));
    for m in rows {
        println!(
            "{:>20} {:>12.2} {:>12.2} {:>10.0}",
            m.timestamp.format("%Y-%m-%d %H:%M:%S"),
            m.download,
            m.upload,
            m.latency
        );
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
