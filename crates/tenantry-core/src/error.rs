//! Error types for Tenantry.
//!
//! [`TenancyError`] is returned by resolvers, surfaced by the tenant
//! resolution middleware unchanged, and raised at startup for wiring
//! mistakes. Hosts that want to render an error can turn it into an
//! [`ErrorEnvelope`].

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`TenancyError`].
pub type TenancyResult<T> = Result<T, TenancyError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing or inconsistent wiring detected at startup.
    Configuration,
    /// The resolver failed to produce a tenant context.
    Resolution,
    /// The tenant identified by the request does not exist.
    NotFound,
    /// The request carried a malformed tenant identifier.
    Validation,
    /// Anything else.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Configuration | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Resolution => StatusCode::BAD_GATEWAY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation => StatusCode::BAD_REQUEST,
        }
    }
}

/// Standard error type for Tenantry.
///
/// # Example
///
/// ```
/// use tenantry_core::{ErrorCategory, TenancyError};
///
/// let err = TenancyError::tenant_not_found("acme");
/// assert_eq!(err.category(), ErrorCategory::NotFound);
/// assert!(err.to_string().contains("acme"));
/// ```
#[derive(Error, Debug)]
pub enum TenancyError {
    /// A required collaborator was not supplied.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message.
        message: String,
    },

    /// The resolver failed.
    #[error("Tenant resolution failed: {message}")]
    Resolution {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// No tenant exists for the identifier.
    #[error("Tenant not found: {identifier}")]
    TenantNotFound {
        /// The identifier that was looked up.
        identifier: String,
    },

    /// The tenant identifier in the request is malformed.
    #[error("Invalid tenant identifier: {message}")]
    InvalidIdentifier {
        /// Human-readable error message.
        message: String,
    },

    /// Internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl TenancyError {
    /// Creates a configuration (wiring) error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a resolution error.
    #[must_use]
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a resolution error with a source error.
    pub fn resolution_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Resolution {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a tenant-not-found error.
    #[must_use]
    pub fn tenant_not_found(identifier: impl Into<String>) -> Self {
        Self::TenantNotFound {
            identifier: identifier.into(),
        }
    }

    /// Creates an invalid identifier error.
    #[must_use]
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Resolution { .. } => ErrorCategory::Resolution,
            Self::TenantNotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidIdentifier { .. } => ErrorCategory::Validation,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Resolution { .. } => "TENANT_RESOLUTION_FAILED",
            Self::TenantNotFound { .. } => "TENANT_NOT_FOUND",
            Self::InvalidIdentifier { .. } => "INVALID_TENANT_IDENTIFIER",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        let details = match self {
            Self::TenantNotFound { identifier } => Some(serde_json::json!({
                "identifier": identifier
            })),
            _ => None,
        };

        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                details,
            },
            request_id: request_id.map(ToString::to_string),
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
