//! Tenant resolution middleware.
//!
//! Runs after routing. For each request it:
//!
//! 1. decides whether resolution applies at all ([`gate`]);
//! 2. awaits the configured [`TenantResolver`];
//! 3. publishes the result on the [`MiddlewareContext`];
//! 4. optionally stops the request with a redirect or an empty response.
//!
//! Resolver errors are returned unchanged and nothing is published.
//!
//! # Example
//!
//! ```
//! use tenantry_core::{HeaderTenantResolver, InMemoryTenantStore, TenantInfo};
//! use tenantry_middleware::options::{FilteringOptions, ShortCircuitOptions};
//! use tenantry_middleware::stages::TenantResolutionMiddleware;
//!
//! let store = InMemoryTenantStore::new().with_tenant(TenantInfo::new("t-1", "acme"));
//!
//! let middleware = TenantResolutionMiddleware::builder()
//!     .resolver(HeaderTenantResolver::new(store))
//!     .filtering(FilteringOptions::bypass_paths(["/health"]))
//!     .short_circuit(
//!         ShortCircuitOptions::when_unresolved().redirect_to("/select-tenant".parse().unwrap()),
//!     )
//!     .build()
//!     .unwrap();
//! # let _ = middleware;
//! ```

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::options::{FilteringOptions, ShortCircuit, ShortCircuitOptions};
use crate::types::{MiddlewareResult, Request, Response, ResponseExt};
use std::fmt;
use std::sync::Arc;
use tenantry_core::{TenancyError, TenancyResult, TenantResolver};

/// Whether tenant resolution runs for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateDecision {
    /// The filter predicate asked to skip resolution.
    Bypass,
    /// The matched endpoint is excluded from resolution.
    Exclude,
    /// Resolution runs.
    Proceed,
}

impl GateDecision {
    /// Returns `true` if the request passes through untouched.
    #[must_use]
    pub const fn is_pass_through(self) -> bool {
        matches!(self, Self::Bypass | Self::Exclude)
    }

    /// Returns the decision name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bypass => "bypass",
            Self::Exclude => "exclude",
            Self::Proceed => "proceed",
        }
    }
}

/// Decides whether tenant resolution runs for `request`.
///
/// Without a matched endpoint the filter is never called and the answer is
/// always [`GateDecision::Proceed`]. The filter is checked before the
/// endpoint's exclusion flag.
#[must_use]
pub fn gate(ctx: &MiddlewareContext, request: &Request, filtering: &FilteringOptions) -> GateDecision {
    let Some(endpoint) = ctx.endpoint() else {
        return GateDecision::Proceed;
    };

    if filtering.evaluate(request) == Some(true) {
        return GateDecision::Bypass;
    }

    if endpoint.metadata().exclude_from_resolution {
        return GateDecision::Exclude;
    }

    GateDecision::Proceed
}

/// Middleware that resolves and publishes the tenant for each request.
pub struct TenantResolutionMiddleware {
    resolver: Arc<dyn TenantResolver>,
    filtering: FilteringOptions,
    short_circuit: ShortCircuitOptions,
}

impl TenantResolutionMiddleware {
    /// Creates the middleware with default options: no filter, no short-circuit.
    pub fn new<R: TenantResolver>(resolver: R) -> Self {
        Self {
            resolver: Arc::new(resolver),
            filtering: FilteringOptions::default(),
            short_circuit: ShortCircuitOptions::default(),
        }
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> TenantResolutionBuilder {
        TenantResolutionBuilder::default()
    }

    /// Returns the filtering options.
    #[must_use]
    pub fn filtering(&self) -> &FilteringOptions {
        &self.filtering
    }

    /// Returns the short-circuit options.
    #[must_use]
    pub fn short_circuit(&self) -> &ShortCircuitOptions {
        &self.short_circuit
    }

    async fn resolve_and_publish<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> MiddlewareResult {
        let tenant = self.resolver.resolve(&request).await?;
        let tenant = ctx.publish_tenant_context(tenant);

        tracing::debug!(
            request_id = %ctx.request_id(),
            tenant_id = tenant.tenant_id().unwrap_or("-"),
            resolved = tenant.is_resolved(),
            "tenant context published"
        );

        match self.short_circuit.evaluate(&tenant) {
            ShortCircuit::Continue => next.run(ctx, request).await,
            ShortCircuit::Redirect(target) => {
                tracing::info!(
                    request_id = %ctx.request_id(),
                    location = %target,
                    "short-circuit redirect"
                );
                Ok(Response::redirect(target))
            }
            ShortCircuit::Terminate(status) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    status = status.as_u16(),
                    "short-circuit triggered without a redirect target"
                );
                Ok(Response::empty(status))
            }
        }
    }
}

impl fmt::Debug for TenantResolutionMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantResolutionMiddleware")
            .field("filtering", &self.filtering)
            .field("short_circuit", &self.short_circuit)
            .finish_non_exhaustive()
    }
}

impl Middleware for TenantResolutionMiddleware {
    fn name(&self) -> &'static str {
        "tenant_resolution"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            let decision = gate(ctx, &request, &self.filtering);

            if decision.is_pass_through() {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    decision = decision.as_str(),
                    "skipping tenant resolution"
                );
                return next.run(ctx, request).await;
            }

            self.resolve_and_publish(ctx, request, next).await
        })
    }
}

/// Builder for [`TenantResolutionMiddleware`].
#[derive(Default)]
pub struct TenantResolutionBuilder {
    resolver: Option<Arc<dyn TenantResolver>>,
    filtering: FilteringOptions,
    short_circuit: ShortCircuitOptions,
}

impl TenantResolutionBuilder {
    /// Sets the resolver.
    #[must_use]
    pub fn resolver<R: TenantResolver>(mut self, resolver: R) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets a shared resolver.
    #[must_use]
    pub fn shared_resolver(mut self, resolver: Arc<dyn TenantResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the filtering options.
    #[must_use]
    pub fn filtering(mut self, filtering: FilteringOptions) -> Self {
        self.filtering = filtering;
        self
    }

    /// Sets the short-circuit options.
    #[must_use]
    pub fn short_circuit(mut self, short_circuit: ShortCircuitOptions) -> Self {
        self.short_circuit = short_circuit;
        self
    }

    /// Builds the middleware.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyError::Configuration`] if no resolver was set.
    pub fn build(self) -> TenancyResult<TenantResolutionMiddleware> {
        let resolver = self
            .resolver
            .ok_or_else(|| TenancyError::configuration("no tenant resolver registered"))?;

        Ok(TenantResolutionMiddleware {
            resolver,
            filtering: self.filtering,
            short_circuit: self.short_circuit,
        })
    }
}

impl fmt::Debug for TenantResolutionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantResolutionBuilder")
            .field("resolver", &self.resolver.as_ref().map(|_| "<resolver>"))
            .field("filtering", &self.filtering)
            .field("short_circuit", &self.short_circuit)
            .finish()
    }
}
