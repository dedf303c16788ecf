//! Middleware context types.
//!
//! The [`MiddlewareContext`] carries state through the middleware pipeline.
//! Stages enrich it (request ID, matched endpoint, tenant context); once the
//! pipeline is done it can be snapshotted into a
//! [`RequestContext`](tenantry_core::RequestContext) for handlers.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tenantry_core::{Endpoint, RequestId, TenantContext};

/// Context that flows through the middleware pipeline.
///
/// # Tenant publication
///
/// The resolved tenant is visible in two places: the
/// [`tenant_context`](Self::tenant_context) accessor and the typed extension
/// store under `Arc<TenantContext>`. Both always hold the same `Arc`.
/// [`publish_tenant_context`](Self::publish_tenant_context) writes them in one
/// step, and extension writes of `Arc<TenantContext>` go through the same path.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tenantry_core::{TenantContext, TenantInfo};
/// use tenantry_middleware::context::MiddlewareContext;
///
/// let mut ctx = MiddlewareContext::new();
/// let published = ctx.publish_tenant_context(TenantContext::resolved(TenantInfo::new("t-1", "acme")));
///
/// let from_store = ctx.get_extension::<Arc<TenantContext>>().unwrap();
/// assert!(Arc::ptr_eq(ctx.tenant_context().unwrap(), from_store));
/// assert!(Arc::ptr_eq(&published, from_store));
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// The endpoint matched by routing.
    endpoint: Option<Arc<Endpoint>>,

    /// The published tenant context.
    tenant: Option<Arc<TenantContext>>,

    /// When the request started processing.
    started_at: Instant,

    /// Type-erased extension data.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a new middleware context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            endpoint: None,
            tenant: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Sets the request ID.
    ///
    /// This should only be called by the RequestId middleware.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Returns the matched endpoint, if routing found one.
    #[must_use]
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_deref()
    }

    /// Sets the matched endpoint.
    ///
    /// This should only be called by the routing middleware.
    pub fn set_endpoint(&mut self, endpoint: Arc<Endpoint>) {
        self.endpoint = Some(endpoint);
    }

    /// Returns the published tenant context, if resolution ran.
    #[must_use]
    pub fn tenant_context(&self) -> Option<&Arc<TenantContext>> {
        self.tenant.as_ref()
    }

    /// Publishes the tenant context for the rest of the request.
    ///
    /// Sets the accessor slot and the extension store entry to the same
    /// `Arc` and returns it.
    pub fn publish_tenant_context(&mut self, tenant: TenantContext) -> Arc<TenantContext> {
        let tenant = Arc::new(tenant);
        self.store_tenant(Arc::clone(&tenant));
        tenant
    }

    fn store_tenant(&mut self, tenant: Arc<TenantContext>) {
        self.extensions
            .insert(TypeId::of::<Arc<TenantContext>>(), Box::new(Arc::clone(&tenant)));
        self.tenant = Some(tenant);
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    ///
    /// Storing an `Arc<TenantContext>` is the same as publishing it.
    ///
    /// # Example
    ///
    /// ```
    /// use tenantry_middleware::context::MiddlewareContext;
    ///
    /// #[derive(Clone)]
    /// struct Locale(&'static str);
    ///
    /// let mut ctx = MiddlewareContext::new();
    /// ctx.set_extension(Locale("de-CH"));
    ///
    /// assert_eq!(ctx.get_extension::<Locale>().unwrap().0, "de-CH");
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        let value: Box<dyn Any + Send + Sync> = Box::new(value);
        match value.downcast::<Arc<TenantContext>>() {
            Ok(tenant) => self.store_tenant(*tenant),
            Err(value) => {
                self.extensions.insert(TypeId::of::<T>(), value);
            }
        }
    }

    /// Retrieves a typed extension value.
    ///
    /// Returns `None` if no extension of the given type was stored.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    ///
    /// Removing `Arc<TenantContext>` also clears the tenant accessor.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        if TypeId::of::<T>() == TypeId::of::<Arc<TenantContext>>() {
            self.tenant = None;
        }
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of stored extensions.
    #[must_use]
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    /// Converts this middleware context to a [`RequestContext`](tenantry_core::RequestContext).
    #[must_use]
    pub fn to_request_context(&self) -> tenantry_core::RequestContext {
        let mut ctx = tenantry_core::RequestContext::with_request_id(self.request_id);

        if let Some(endpoint) = &self.endpoint {
            ctx = ctx.with_operation_id(endpoint.operation_id());
        }

        if let Some(tenant) = &self.tenant {
            ctx = ctx.with_tenant_context(Arc::clone(tenant));
        }

        ctx
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}
