//! File discovery module for ride data directories
//!
//! Selects files in a flat data directory by filename prefix and suffix,
//! returning them in sorted name order.

use crate::error::{EtlError, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File discovery component for a data directory
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    data_dir: PathBuf,
    prefix: String,
    suffix: String,
}

impl FileDiscovery {
    /// Create a discovery instance matching every file in `data_dir`
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Glob pattern equivalent to the prefix/suffix filter
    pub fn pattern(&self) -> String {
        let dir = Pattern::escape(&self.data_dir.to_string_lossy());
        format!(
            "{}/{}*{}",
            dir,
            Pattern::escape(&self.prefix),
            Pattern::escape(&self.suffix)
        )
    }

    /// Discover all regular files whose names match the prefix and suffix
    pub async fn discover(&self) -> Result<Vec<PathBuf>> {
        if !tokio::fs::try_exists(&self.data_dir).await? {
            return Err(EtlError::DataDirNotFound {
                path: self.data_dir.clone(),
            });
        }

        let pattern = self.pattern();
        debug!("Searching for files with pattern: {}", pattern);

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let entries = glob::glob_with(&pattern, options).map_err(|source| {
            EtlError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            }
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(std::io::Error::from)?;
            if path.is_file() && self.matches(&path) {
                files.push(path);
            }
        }

        files.sort();
        debug!("Found {} matching files in {}", files.len(), self.data_dir.display());

        Ok(files)
    }

    /// Check a path's file name against the prefix and suffix
    pub fn matches(&self, path: &Path) -> bool {
        file_name(path).is_some_and(|name| {
            name.starts_with(self.prefix.as_str()) && name.ends_with(self.suffix.as_str())
        })
    }
}

/// UTF-8 file name of a path
pub fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
