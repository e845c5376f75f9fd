// Copyright (c) 2025 - Cowboy AI, Inc.
//! DNS Zone Name Value Object

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Zone name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ZoneNameError {
    #[error("Zone name is empty")]
    Empty,

    #[error("Zone <{0}> must end with trailing period, i.e. <domain.com.>")]
    NotFullyQualified(String),

    #[error("Zone <{0}> contains an empty label")]
    EmptyLabel(String),
}

/// Fully qualified Route53 hosted zone name
///
/// Invariants:
/// - Non-empty
/// - Ends with the root separator (`example.com.`)
/// - No empty labels (`example..com.`)
///
/// # Examples
///
/// ```rust
/// use cim_infrastructure_aws::domain::ZoneName;
///
/// assert!(ZoneName::new("example.com.").is_ok());
/// assert!(ZoneName::new("example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneName(String);

impl ZoneName {
    pub fn new(zone: impl Into<String>) -> Result<Self, ZoneNameError> {
        let zone = zone.into();

        if zone.is_empty() {
            return Err(ZoneNameError::Empty);
        }

        let Some(without_root) = zone.strip_suffix('.') else {
            return Err(ZoneNameError::NotFullyQualified(zone));
        };

        if without_root.split('.').any(str::is_empty) {
            return Err(ZoneNameError::EmptyLabel(zone));
        }

        Ok(Self(zone))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Zone name without the trailing root separator
    pub fn domain(&self) -> &str {
        self.0.trim_end_matches('.')
    }
}

impl fmt::Display for ZoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
