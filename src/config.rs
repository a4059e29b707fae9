//! Configuration management and validation.
//!
//! Provides one configuration structure per job. Defaults carry the
//! constants of the standard run; the CLI overrides them
//! field by field.

use crate::constants::{
    CSV_EXTENSION, DEFAULT_AGGREGATE_OUTPUT, DEFAULT_AGGREGATE_PREFIX, DEFAULT_DATA_DIR,
    DEFAULT_REQUEST_DELAY, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SAMPLE_FRACTION,
    DEFAULT_SAMPLE_PREFIX, DEFAULT_TOP_GROUPS, DEFAULT_WINDOW_DAYS, DEFAULT_ZIP_CODE,
    NCDC_BASE_URL, PARQUET_SUFFIX,
};
use crate::error::{EtlError, Result};
use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Configuration for the ride aggregation job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateConfig {
    /// Directory holding the ride files and receiving the output
    pub data_dir: PathBuf,

    /// Input files must start with this prefix
    pub file_prefix: String,

    /// Input files must end with this suffix
    pub file_suffix: String,

    /// Output file name, relative to `data_dir`
    pub output_file: String,

    /// Number of busiest groups to report
    pub top_groups: usize,

    /// Draw a progress bar while reading files
    pub show_progress: bool,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            file_prefix: DEFAULT_AGGREGATE_PREFIX.to_string(),
            file_suffix: PARQUET_SUFFIX.to_string(),
            output_file: DEFAULT_AGGREGATE_OUTPUT.to_string(),
            top_groups: DEFAULT_TOP_GROUPS,
            show_progress: true,
        }
    }
}

impl AggregateConfig {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    pub fn with_output_file(mut self, output_file: impl Into<String>) -> Self {
        self.output_file = output_file.into();
        self
    }

    pub fn with_top_groups(mut self, top_groups: usize) -> Self {
        self.top_groups = top_groups;
        self
    }

    /// Disable the progress bar (tests, quiet mode)
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Full path of the aggregated CSV
    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join(&self.output_file)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.output_file.trim().is_empty() {
            return Err(EtlError::Configuration {
                message: "Output file name cannot be empty".to_string(),
            });
        }

        if self.output_file.ends_with(self.file_suffix.as_str())
            && self.output_file.starts_with(self.file_prefix.as_str())
        {
            return Err(EtlError::Configuration {
                message: format!(
                    "Output file '{}' would match the input pattern '{}*{}'",
                    self.output_file, self.file_prefix, self.file_suffix
                ),
            });
        }

        debug!("Aggregate configuration validated: {:?}", self);
        Ok(())
    }
}

/// Configuration for the downscale job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownscaleConfig {
    /// Directory holding the Parquet files and receiving the CSV outputs
    pub data_dir: PathBuf,

    /// Files starting with this prefix are sampled, other Parquet files are converted
    pub sample_prefix: String,

    /// Fraction of rows kept by sampling
    pub fraction: f64,

    /// Seed for reproducible samples
    pub seed: Option<u64>,

    /// Draw a progress bar while converting files
    pub show_progress: bool,
}

impl Default for DownscaleConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            sample_prefix: DEFAULT_SAMPLE_PREFIX.to_string(),
            fraction: DEFAULT_SAMPLE_FRACTION,
            seed: None,
            show_progress: true,
        }
    }
}

impl DownscaleConfig {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_sample_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sample_prefix = prefix.into();
        self
    }

    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Output path for an input file name: the stem before the first dot, as CSV
    pub fn output_path_for(&self, file_name: &str) -> PathBuf {
        let stem = file_name.split('.').next().unwrap_or(file_name);
        self.data_dir.join(format!("{}.{}", stem, CSV_EXTENSION))
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if !(self.fraction > 0.0 && self.fraction <= 1.0) {
            return Err(EtlError::InvalidFraction {
                fraction: self.fraction,
            });
        }
        Ok(())
    }
}

/// Configuration for the weather polling job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// API base URL, ending with a slash
    pub base_url: String,

    /// Access token sent with every request
    pub token: String,

    /// ZIP code used to look up stations
    pub zip_code: String,

    /// Dataset to fetch; the first listed dataset is used when unset
    pub dataset: Option<String>,

    /// First day of the readings window
    pub start_date: Option<NaiveDate>,

    /// Last day of the readings window (defaults to today)
    pub end_date: Option<NaiveDate>,

    /// Window length used when no start date is given
    pub window_days: i64,

    /// Pause after every request
    pub request_delay: Duration,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: NCDC_BASE_URL.to_string(),
            token: String::new(),
            zip_code: DEFAULT_ZIP_CODE.to_string(),
            dataset: None,
            start_date: None,
            end_date: None,
            window_days: DEFAULT_WINDOW_DAYS,
            request_delay: DEFAULT_REQUEST_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl WeatherConfig {
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn with_zip_code(mut self, zip_code: impl Into<String>) -> Self {
        self.zip_code = zip_code.into();
        self
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    pub fn with_window(mut self, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    pub fn with_window_days(mut self, window_days: i64) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn with_request_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }

    /// Resolve the readings window relative to `today`
    pub fn date_window(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let end = self.end_date.unwrap_or(today);
        let start = match self.start_date {
            Some(start) => start,
            None => ChronoDuration::try_days(self.window_days)
                .and_then(|window| end.checked_sub_signed(window))
                .ok_or_else(|| self.window_out_of_range())?,
        };

        if start > end {
            return Err(EtlError::InvalidDateWindow { start, end });
        }
        Ok((start, end))
    }

    fn window_out_of_range(&self) -> EtlError {
        EtlError::Configuration {
            message: format!("Window length of {} days is out of range", self.window_days),
        }
    }

    /// Resolve the readings window relative to the local date
    pub fn current_date_window(&self) -> Result<(NaiveDate, NaiveDate)> {
        self.date_window(Local::now().date_naive())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(EtlError::Configuration {
                message: "An NCDC access token is required".to_string(),
            });
        }

        if self.zip_code.trim().is_empty() {
            return Err(EtlError::Configuration {
                message: "ZIP code cannot be empty".to_string(),
            });
        }

        if self.window_days < 0 {
            return Err(EtlError::Configuration {
                message: format!("Window length must be non-negative, got {}", self.window_days),
            });
        }

        if ChronoDuration::try_days(self.window_days).is_none() {
            return Err(self.window_out_of_range());
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(EtlError::InvalidDateWindow { start, end });
            }
        }

        Ok(())
    }
}
