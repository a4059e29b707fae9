//! Error handling for ridership ETL operations.
//!
//! Provides error types with context for file discovery, frame
//! transformation, CSV output and weather API failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Data directory not found at path: {path}")]
    DataDirNotFound { path: PathBuf },

    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Required column '{column}' missing from {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Column '{column}' must be {expected}, found {found}")]
    InvalidColumnType {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Sample fraction must be in (0, 1], got {fraction}")]
    InvalidFraction { fraction: f64 },

    #[error("Invalid date window: start {start} is after end {end}")]
    InvalidDateWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No {what} returned for {query}")]
    NoResults { what: &'static str, query: String },

    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, EtlError>;
