//! Command implementations for the ridership CLI
//!
//! Sets up logging, maps parsed arguments onto job configurations, runs the
//! selected job and prints its final report.

use crate::cli::args::{AggregateArgs, Args, Commands, DownscaleArgs, WeatherArgs};
use crate::models::ProcessingStats;
use crate::processor::{Downscaler, RideAggregator};
use crate::weather::{NcdcClient, WeatherReport};

use anyhow::{Context, Result};
use colored::*;
use indicatif::HumanDuration;
use std::time::Duration;
use tracing::{debug, info};

/// Main command runner
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let show_progress = args.show_progress();
    match args.command {
        Some(Commands::Aggregate(cmd)) => run_aggregate(cmd, show_progress).await,
        Some(Commands::Downscale(cmd)) => run_downscale(cmd, show_progress).await,
        Some(Commands::Weather(cmd)) => run_weather(cmd).await,
        None => Ok(()),
    }
}

/// Set up structured logging on stderr based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ridership_etl={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialise logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

async fn run_aggregate(cmd: AggregateArgs, show_progress: bool) -> Result<()> {
    let mut config = cmd.to_config();
    if !show_progress {
        config = config.without_progress();
    }
    let output = config.output_path();

    info!("Aggregating rides in {}", config.data_dir.display());
    let stats = RideAggregator::new(config)
        .process()
        .await
        .with_context(|| format!("Aggregation into {} failed", output.display()))?;

    print_stats("Aggregation complete", &stats);
    Ok(())
}

async fn run_downscale(cmd: DownscaleArgs, show_progress: bool) -> Result<()> {
    let mut config = cmd.to_config();
    if !show_progress {
        config = config.without_progress();
    }

    let downscaler = Downscaler::new(config);
    let stats = downscaler
        .process()
        .await
        .with_context(|| format!("Downscaling {} failed", downscaler.data_dir().display()))?;

    print_stats("Downscale complete", &stats);
    Ok(())
}

async fn run_weather(cmd: WeatherArgs) -> Result<()> {
    let config = cmd.to_config();
    let client = NcdcClient::new(&config).context("Invalid weather configuration")?;

    let today = chrono::Local::now().date_naive();
    let report = client
        .poll(&config, today)
        .await
        .with_context(|| format!("Weather polling for ZIP {} failed", config.zip_code))?;

    print_weather_report(&report);
    Ok(())
}

fn print_stats(title: &str, stats: &ProcessingStats) {
    let elapsed = Duration::from_millis(stats.processing_time_ms as u64);

    println!("\n{}", title.bright_green().bold());
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed
    );
    println!(
        "  {} {} -> {}",
        "Rows:".bright_cyan(),
        stats.input_rows,
        stats.output_rows
    );
    for path in &stats.output_paths {
        println!("  {} {}", "Wrote:".bright_cyan(), path.display());
    }
    println!("  {} {}", "Time:".bright_cyan(), HumanDuration(elapsed));
}

fn print_weather_report(report: &WeatherReport) {
    println!("\n{}", "Weather readings".bright_green().bold());
    println!("  {} {}", "ZIP code:".bright_cyan(), report.zip_code);
    println!(
        "  {} {} {}",
        "Station:".bright_cyan(),
        report.station.id.bright_white().bold(),
        report.station.name.as_deref().unwrap_or_default()
    );
    println!("  {} {}", "Dataset:".bright_cyan(), report.dataset_id);
    println!(
        "  {} {} to {}",
        "Window:".bright_cyan(),
        report.start_date,
        report.end_date
    );

    if report.observations.is_empty() {
        println!("  {}", "No readings in window".yellow());
        return;
    }

    println!(
        "  {} {}",
        "Readings:".bright_cyan(),
        report.observations.len()
    );
    for obs in &report.observations {
        println!(
            "    {}  {:<6} {:>8.2}  {}",
            obs.date, obs.datatype, obs.value, obs.attributes
        );
    }
}
