//! Request context types.
//!
//! The [`RequestContext`] is the read-only view of per-request state that
//! handlers receive once the middleware pipeline has run.

use crate::tenant::TenantContext;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use tenantry_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request context handed to handlers.
///
/// # Example
///
/// ```
/// use tenantry_core::RequestContext;
///
/// let ctx = RequestContext::new();
/// assert!(ctx.tenant_context().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// The matched operation, if routing found one.
    operation_id: Option<String>,

    /// The tenant context published by the resolution stage.
    tenant: Option<Arc<TenantContext>>,

    /// When the request started processing.
    started_at: Instant,
}

impl RequestContext {
    /// Creates a new request context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a new request context with the specified request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            operation_id: None,
            tenant: None,
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the operation ID if set.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Returns a new context with the specified operation ID.
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Returns the tenant context, if resolution ran.
    #[must_use]
    pub fn tenant_context(&self) -> Option<&Arc<TenantContext>> {
        self.tenant.as_ref()
    }

    /// Returns a new context carrying the given tenant context.
    #[must_use]
    pub fn with_tenant_context(mut self, tenant: Arc<TenantContext>) -> Self {
        self.tenant = Some(tenant);
        self
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
