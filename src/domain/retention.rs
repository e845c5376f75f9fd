// Copyright (c) 2025 - Cowboy AI, Inc.
//! CloudWatch Log Retention Value Object

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid log retention: {0} days (allowed: 1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1827, 3653)")]
pub struct RetentionError(pub u32);

/// Number of days CloudWatch keeps log events
///
/// Invariants:
/// - One of the day counts CloudWatch accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LogRetentionDays(u32);

impl LogRetentionDays {
    /// Day counts accepted by CloudWatch Logs
    pub const ALLOWED: [u32; 17] = [
        1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1827, 3653,
    ];

    pub fn new(days: u32) -> Result<Self, RetentionError> {
        if !Self::ALLOWED.contains(&days) {
            return Err(RetentionError(days));
        }

        Ok(Self(days))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for LogRetentionDays {
    fn default() -> Self {
        Self(30)
    }
}

impl fmt::Display for LogRetentionDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for LogRetentionDays {
    type Error = RetentionError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LogRetentionDays> for u32 {
    fn from(value: LogRetentionDays) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_allowed_value() {
        for days in LogRetentionDays::ALLOWED {
            assert_eq!(LogRetentionDays::new(days).unwrap().value(), days);
        }
    }

    #[test]
    fn test_rejected_values() {
        assert_eq!(LogRetentionDays::new(0), Err(RetentionError(0)));
        assert_eq!(LogRetentionDays::new(2), Err(RetentionError(2)));
        assert_eq!(LogRetentionDays::new(3650), Err(RetentionError(3650)));
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<LogRetentionDays>("14").is_ok());
        assert!(serde_json::from_str::<LogRetentionDays>("15").is_err());
    }
}
