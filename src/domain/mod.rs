// Copyright (c) 2025 - Cowboy AI, Inc.
//! Infrastructure Domain Models
//!
//! Value objects with validation invariants shared by the AWS components.
//!
//! # Value Objects with Invariants
//!
//! - [`CidrBlock`] - IPv4/IPv6 address range in CIDR notation
//! - [`ZoneName`] - Fully qualified Route53 zone name (trailing period)
//! - [`LogRetentionDays`] - CloudWatch retention period from the allowed set
//!
//! # Validation
//!
//! - [`invariants`] - pure field checks used by every component's `validate`

pub mod invariants;
pub mod network;
pub mod retention;
pub mod zone;

// Re-export value objects
pub use invariants::ValidationResult;
pub use network::{CidrBlock, NetworkError};
pub use retention::{LogRetentionDays, RetentionError};
pub use zone::{ZoneName, ZoneNameError};
