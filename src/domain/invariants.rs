// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions
//!
//! Building blocks for the `validate` step of every component. All functions
//! are pure and report the offending field by its qualified name
//! (`Service.Name`, `VPC.PublicSubnetCidrBlocks`, ...).

use crate::errors::{InfrastructureError, InfrastructureResult};

/// Validation result with detailed error information
pub type ValidationResult = InfrastructureResult<()>;

/// Validate a string field is non-empty
pub fn require_non_empty(field: &str, value: &str) -> ValidationResult {
    if value.is_empty() {
        return Err(InfrastructureError::missing(field));
    }
    Ok(())
}

/// Validate an optional field is present
pub fn require_present<T>(field: &str, value: Option<&T>) -> ValidationResult {
    if value.is_none() {
        return Err(InfrastructureError::missing(field));
    }
    Ok(())
}

/// Validate a list has at least `min` entries
///
/// # Rules
/// - An empty list is reported as missing
/// - A non-empty list shorter than `min` is reported as invalid
pub fn require_at_least<T>(field: &str, values: &[T], min: usize) -> ValidationResult {
    if values.is_empty() {
        return Err(InfrastructureError::missing(field));
    }

    if values.len() < min {
        return Err(InfrastructureError::invalid_format(
            field,
            format!("{} entries", values.len()),
            format!("must have at least {min}"),
        ));
    }

    Ok(())
}
