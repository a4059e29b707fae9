//! Command-line argument definitions for the ridership ETL
//!
//! Every flag defaults to the standard run's value, so a bare subcommand
//! reproduces it.

use crate::config::{AggregateConfig, DownscaleConfig, WeatherConfig};
use crate::constants::{
    DEFAULT_AGGREGATE_OUTPUT, DEFAULT_AGGREGATE_PREFIX, DEFAULT_DATA_DIR, DEFAULT_REQUEST_DELAY,
    DEFAULT_SAMPLE_FRACTION, DEFAULT_SAMPLE_PREFIX, DEFAULT_TOP_GROUPS, DEFAULT_WINDOW_DAYS,
    DEFAULT_ZIP_CODE, NCDC_BASE_URL, NCDC_TOKEN_ENV, PARQUET_SUFFIX,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments for the ridership ETL
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ridership",
    version,
    about = "Bike-share ridership ETL: hourly aggregation, Parquet to CSV downscaling, NOAA weather polling",
    long_about = "Offline preparation of bike-share ride data. Aggregates monthly Parquet ride files \
                  into hourly station-pair summaries, converts Parquet files to CSV with optional \
                  random downsampling, and polls NOAA's Climate Data Online API for nearby weather."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Only log warnings and errors"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Aggregate ride files into hourly station-pair summaries
    Aggregate(AggregateArgs),
    /// Convert Parquet files to CSV, downsampling the matching ones
    Downscale(DownscaleArgs),
    /// Fetch recent weather readings for a ZIP code
    Weather(WeatherArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct AggregateArgs {
    /// Directory holding the ride files; the output is written here too
    #[arg(long = "data-dir", value_name = "PATH", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Filename prefix of the ride files to aggregate
    #[arg(long, default_value = DEFAULT_AGGREGATE_PREFIX)]
    pub prefix: String,

    /// Filename suffix of the ride files to aggregate
    #[arg(long, default_value = PARQUET_SUFFIX)]
    pub suffix: String,

    /// Output CSV file name, relative to the data directory
    #[arg(short = 'o', long, default_value = DEFAULT_AGGREGATE_OUTPUT)]
    pub output: String,

    /// Number of busiest groups to print after aggregating
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TOP_GROUPS)]
    pub top: usize,

    /// Disable the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

impl AggregateArgs {
    pub fn to_config(&self) -> AggregateConfig {
        let config = AggregateConfig::default()
            .with_data_dir(&self.data_dir)
            .with_prefix(&self.prefix)
            .with_suffix(&self.suffix)
            .with_output_file(&self.output)
            .with_top_groups(self.top);

        if self.no_progress {
            config.without_progress()
        } else {
            config
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct DownscaleArgs {
    /// Directory holding the Parquet files; CSV files are written beside them
    #[arg(long = "data-dir", value_name = "PATH", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Filename prefix selecting the files to downsample
    #[arg(long, default_value = DEFAULT_SAMPLE_PREFIX)]
    pub prefix: String,

    /// Fraction of rows kept from each sampled file, in (0, 1]
    #[arg(short = 'f', long, default_value_t = DEFAULT_SAMPLE_FRACTION)]
    pub fraction: f64,

    /// Seed for reproducible samples
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

impl DownscaleArgs {
    pub fn to_config(&self) -> DownscaleConfig {
        let mut config = DownscaleConfig::default()
            .with_data_dir(&self.data_dir)
            .with_sample_prefix(&self.prefix)
            .with_fraction(self.fraction);

        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if self.no_progress {
            config = config.without_progress();
        }
        config
    }
}

#[derive(Debug, Clone, Parser)]
pub struct WeatherArgs {
    /// NCDC access token
    #[arg(long, env = NCDC_TOKEN_ENV, hide_env_values = true)]
    pub token: String,

    /// ZIP code used to look up stations
    #[arg(long, default_value = DEFAULT_ZIP_CODE)]
    pub zip: String,

    /// Dataset id; defaults to the first dataset the station lists
    #[arg(long)]
    pub dataset: Option<String>,

    /// First day of the window (YYYY-MM-DD)
    #[arg(long = "start-date", value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    /// Last day of the window (YYYY-MM-DD), defaults to today
    #[arg(long = "end-date", value_name = "DATE")]
    pub end_date: Option<NaiveDate>,

    /// Window length in days when no start date is given
    #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
    pub days: i64,

    /// Pause after every request, in milliseconds
    #[arg(
        long = "delay-ms",
        value_name = "MS",
        default_value_t = DEFAULT_REQUEST_DELAY.as_millis() as u64
    )]
    pub delay_ms: u64,

    /// API base URL
    #[arg(long = "base-url", value_name = "URL", default_value = NCDC_BASE_URL)]
    pub base_url: String,
}

impl WeatherArgs {
    pub fn to_config(&self) -> WeatherConfig {
        let mut config = WeatherConfig::default()
            .with_base_url(&self.base_url)
            .with_token(&self.token)
            .with_zip_code(&self.zip)
            .with_window(self.start_date, self.end_date)
            .with_window_days(self.days)
            .with_request_delay(Duration::from_millis(self.delay_ms));

        if let Some(dataset) = &self.dataset {
            config = config.with_dataset(dataset);
        }
        config
    }
}

impl Args {
    /// Log level selected by the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Progress bars stay off in quiet mode
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}
