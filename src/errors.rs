// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for infrastructure operations

use thiserror::Error;

/// Errors that can occur while validating or provisioning infrastructure
///
/// The type is `Clone` because failures travel through shared deferred
/// values ([`crate::output::Output`]) and every dependent observes the same
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfrastructureError {
    /// A required configuration value was absent or empty
    #[error("missing {field}")]
    MissingField { field: String },

    /// A configuration or resolved value has the wrong format
    #[error("{field} <{value}> is invalid: {reason}")]
    InvalidFormat {
        field: String,
        value: String,
        reason: String,
    },

    /// A deferred value resolved to something of an unexpected shape
    #[error("failed to coerce {what}: {detail}")]
    CoercionFailure { what: String, detail: String },

    /// The orchestration engine or provider rejected a declaration
    #[error("{operation} rejected: {message}")]
    Upstream { operation: String, message: String },

    /// A sidecar container definition failed its own validation
    #[error("sidecar container #{index} ({name}) is invalid: {source}")]
    InvalidSidecar {
        index: usize,
        name: String,
        #[source]
        source: Box<InfrastructureError>,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File system error
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

/// Result type for infrastructure operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

impl InfrastructureError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_format(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn coercion(what: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::CoercionFailure {
            what: what.into(),
            detail: detail.into(),
        }
    }

    pub fn upstream(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field for validation failures
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field } | Self::InvalidFormat { field, .. } => Some(field),
            Self::InvalidSidecar { source, .. } => source.field(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for InfrastructureError {
    fn from(err: serde_json::Error) -> Self {
        InfrastructureError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_of_nested_sidecar_error() {
        let err = InfrastructureError::InvalidSidecar {
            index: 2,
            name: "envoy".to_string(),
            source: Box::new(InfrastructureError::missing("ContainerDefinition.Image")),
        };

        assert_eq!(err.field(), Some("ContainerDefinition.Image"));
        assert_eq!(
            err.to_string(),
            "sidecar container #2 (envoy) is invalid: missing ContainerDefinition.Image"
        );
    }

    #[test]
    fn test_serde_error_maps_to_serialization() {
        let err: InfrastructureError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, InfrastructureError::Serialization(_)));
    }
}
