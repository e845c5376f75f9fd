// Copyright (c) 2025 - Cowboy AI, Inc.
//! Dockerfile Label Extraction
//!
//! Reads the `LABEL key=value` lines of a Dockerfile so they can be attached
//! to a container definition as docker labels.
//!
//! # Rules
//!
//! - Only lines starting with `LABEL ` are considered
//! - The remainder splits on the first `=`; lines without one are skipped
//! - Surrounding double quotes are trimmed from the value
//! - A later label overwrites an earlier one with the same key

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{InfrastructureError, InfrastructureResult};

const LABEL_PREFIX: &str = "LABEL ";

#[derive(Debug, Clone, Default)]
pub struct DockerLabelExtractor {
    pub path: PathBuf,
}

impl DockerLabelExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn validate(&self) -> InfrastructureResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(InfrastructureError::missing("DockerLabelExtractor.Path"));
        }
        Ok(())
    }

    /// Labels declared in the Dockerfile
    pub fn extract(&self) -> InfrastructureResult<BTreeMap<String, String>> {
        self.validate()?;

        let contents = std::fs::read_to_string(&self.path).map_err(|e| io_error(&self.path, e))?;
        let labels = parse_labels(&contents);

        debug!("Extracted {} labels from {}", labels.len(), self.path.display());
        Ok(labels)
    }
}

/// Labels declared in Dockerfile text
pub fn parse_labels(contents: &str) -> BTreeMap<String, String> {
    contents
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter_map(|line| line.strip_prefix(LABEL_PREFIX))
        .filter_map(|label| label.split_once('='))
        .map(|(key, value)| (key.to_string(), value.trim_matches('"').to_string()))
        .collect()
}

fn io_error(path: &Path, err: std::io::Error) -> InfrastructureError {
    InfrastructureError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
