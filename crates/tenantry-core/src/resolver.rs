//! Tenant resolver trait and built-in resolvers.
//!
//! The resolution middleware only depends on [`TenantResolver`]. The two
//! resolvers shipped here cover fixed single-tenant deployments
//! ([`StaticTenantResolver`]) and header-based lookup against an in-memory
//! store ([`HeaderTenantResolver`]).

use crate::error::{TenancyError, TenancyResult};
use crate::tenant::{StoreInfo, StrategyInfo, TenantContext, TenantInfo};
use crate::{BoxFuture, Request};
use std::collections::HashMap;
use std::sync::Arc;

/// Header read by [`HeaderTenantResolver`] unless configured otherwise.
pub const DEFAULT_TENANT_HEADER: &str = "x-tenant-id";

/// Produces the [`TenantContext`] for a request.
///
/// Implementations may perform I/O. Errors are surfaced by the middleware
/// unchanged; a request that simply names no known tenant should resolve to
/// [`TenantContext::unresolved`] rather than fail.
///
/// # Example
///
/// ```
/// use tenantry_core::{BoxFuture, Request, TenancyResult, TenantContext, TenantResolver};
///
/// struct NoTenant;
///
/// impl TenantResolver for NoTenant {
///     fn resolve<'a>(&'a self, _request: &'a Request) -> BoxFuture<'a, TenancyResult<TenantContext>> {
///         Box::pin(async { Ok(TenantContext::unresolved()) })
///     }
/// }
/// ```
pub trait TenantResolver: Send + Sync + 'static {
    /// Resolves the tenant for `request`.
    fn resolve<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, TenancyResult<TenantContext>>;
}

impl<R: TenantResolver + ?Sized> TenantResolver for Arc<R> {
    fn resolve<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, TenancyResult<TenantContext>> {
        (**self).resolve(request)
    }
}

/// Resolver that returns the same context for every request.
#[derive(Debug, Clone, Default)]
pub struct StaticTenantResolver {
    context: TenantContext,
}

impl StaticTenantResolver {
    /// Always resolves to `tenant`.
    #[must_use]
    pub fn new(tenant: TenantInfo) -> Self {
        Self {
            context: TenantContext::resolved(tenant).with_strategy(StrategyInfo::new("static")),
        }
    }

    /// Always resolves to "no tenant".
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }
}

impl TenantResolver for StaticTenantResolver {
    fn resolve<'a>(&'a self, _request: &'a Request) -> BoxFuture<'a, TenancyResult<TenantContext>> {
        let context = self.context.clone();
        Box::pin(async move { Ok(context) })
    }
}

/// Tenant records keyed by identifier.
///
/// Identifiers are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTenantStore {
    tenants: HashMap<String, TenantInfo>,
}

impl InMemoryTenantStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tenant, replacing any tenant with the same identifier.
    #[must_use]
    pub fn with_tenant(mut self, tenant: TenantInfo) -> Self {
        self.insert(tenant);
        self
    }

    /// Adds a tenant, returning the one it replaced.
    pub fn insert(&mut self, tenant: TenantInfo) -> Option<TenantInfo> {
        self.tenants
            .insert(tenant.identifier.to_lowercase(), tenant)
    }

    /// Looks up a tenant by identifier.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&TenantInfo> {
        self.tenants.get(&identifier.to_lowercase())
    }

    /// Returns the number of tenants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    /// Returns `true` if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

/// Resolver that reads the tenant identifier from a request header.
///
/// A missing header or an unknown identifier resolves to "no tenant". A
/// header value that is not visible ASCII is rejected with
/// [`TenancyError::InvalidIdentifier`].
#[derive(Debug, Clone)]
pub struct HeaderTenantResolver {
    header: String,
    store: InMemoryTenantStore,
}

impl HeaderTenantResolver {
    /// Creates a resolver reading [`DEFAULT_TENANT_HEADER`].
    #[must_use]
    pub fn new(store: InMemoryTenantStore) -> Self {
        Self::with_header(DEFAULT_TENANT_HEADER, store)
    }

    /// Creates a resolver reading a custom header.
    #[must_use]
    pub fn with_header(header: impl Into<String>, store: InMemoryTenantStore) -> Self {
        Self {
            header: header.into().to_lowercase(),
            store,
        }
    }

    /// Returns the header name this resolver reads.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    fn resolve_sync(&self, request: &Request) -> TenancyResult<TenantContext> {
        let Some(value) = request.headers().get(self.header.as_str()) else {
            return Ok(TenantContext::unresolved());
        };

        let identifier = value.to_str().map_err(|_| {
            TenancyError::invalid_identifier(format!("header {} is not valid ASCII", self.header))
        })?;
        let identifier = identifier.trim();

        match self.store.get(identifier) {
            Some(tenant) => {
                tracing::trace!(header = %self.header, identifier, "tenant identified from header");
                Ok(TenantContext::resolved(tenant.clone())
                    .with_strategy(StrategyInfo::new("header"))
                    .with_store(StoreInfo::new("in_memory")))
            }
            None => Ok(TenantContext::unresolved().with_strategy(StrategyInfo::new("header"))),
        }
    }
}

impl TenantResolver for HeaderTenantResolver {
    fn resolve<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, TenancyResult<TenantContext>> {
        Box::pin(async move { self.resolve_sync(request) })
    }
}
