//! Endpoint descriptors attached to requests by the routing stage.

use serde::{Deserialize, Serialize};

/// Per-route settings consulted by middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointMetadata {
    /// When `true`, tenant resolution never runs for this endpoint.
    #[serde(default)]
    pub exclude_from_resolution: bool,
}

impl EndpointMetadata {
    /// Metadata that opts the endpoint out of tenant resolution.
    #[must_use]
    pub const fn excluded() -> Self {
        Self {
            exclude_from_resolution: true,
        }
    }
}

/// A matched route.
///
/// # Example
///
/// ```
/// use tenantry_core::{Endpoint, EndpointMetadata};
///
/// let health = Endpoint::new("healthCheck", "/health")
///     .with_metadata(EndpointMetadata::excluded());
/// assert!(health.metadata().exclude_from_resolution);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    operation_id: String,
    pattern: String,
    metadata: EndpointMetadata,
}

impl Endpoint {
    /// Creates an endpoint with default metadata.
    #[must_use]
    pub fn new(operation_id: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            pattern: pattern.into(),
            metadata: EndpointMetadata::default(),
        }
    }

    /// Replaces the endpoint metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: EndpointMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the operation ID.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the route pattern this endpoint was registered under.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the endpoint metadata.
    #[must_use]
    pub const fn metadata(&self) -> &EndpointMetadata {
        &self.metadata
    }
}
