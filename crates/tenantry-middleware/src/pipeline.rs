//! Ordered middleware pipeline.
//!
//! A [`Pipeline`] owns its stages and runs every request through them in
//! registration order before invoking the terminal handler. Any stage may
//! answer early by not calling [`Next::run`], and errors travel back out
//! unchanged.
//!
//! ## Canonical order
//!
//! 1. **Request ID** - generate or propagate the request ID
//! 2. **Routing** - attach the matched endpoint and its metadata
//! 3. **Tenant resolution** - gate, resolve, publish, short-circuit
//!
//! Tenant resolution reads the endpoint set by routing, so it must be
//! registered after it.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{MiddlewareResult, Request};
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable, ordered middleware pipeline.
///
/// # Example
///
/// ```
/// use tenantry_core::StaticTenantResolver;
/// use tenantry_middleware::pipeline::Pipeline;
/// use tenantry_middleware::stages::{
///     EndpointTable, RequestIdMiddleware, RoutingMiddleware, TenantResolutionMiddleware,
/// };
///
/// let pipeline = Pipeline::builder()
///     .add_stage(RequestIdMiddleware::new())
///     .add_stage(RoutingMiddleware::new(EndpointTable::new()))
///     .add_stage(TenantResolutionMiddleware::new(StaticTenantResolver::unresolved()))
///     .build();
///
/// assert_eq!(pipeline.stage_names(), ["request_id", "routing", "tenant_resolution"]);
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Processes a request through every stage and then `handler`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a stage or the handler.
    pub async fn process<H>(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
        handler: H,
    ) -> MiddlewareResult
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'static,
    {
        let next = self.build_chain(handler);
        next.run(ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'a,
    {
        let mut next = Next::handler(handler);

        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }

        next
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn add_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends a shared stage.
    #[must_use]
    pub fn add_shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// Canonical stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: request ID generation/propagation
    RequestId = 1,
    /// Stage 2: endpoint routing
    Routing = 2,
    /// Stage 3: tenant resolution
    TenantResolution = 3,
}

impl Stage {
    /// Returns the stage name, matching [`Middleware::name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequestId => "request_id",
            Self::Routing => "routing",
            Self::TenantResolution => "tenant_resolution",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 3] {
        [Self::RequestId, Self::Routing, Self::TenantResolution]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Response, ResponseExt};
    use bytes::Bytes;
    use http::{Request as HttpRequest, StatusCode};
    use http_body_util::Full;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tenantry_core::TenancyError;

    /// A test middleware that records its invocation order.
    struct OrderTrackingMiddleware {
        name: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for OrderTrackingMiddleware {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, MiddlewareResult> {
            Box::pin(async move {
                self.order.lock().unwrap().push(self.name);
                next.run(ctx, request).await
            })
        }
    }

    fn test_request() -> Request {
        HttpRequest::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_executes_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::builder()
            .add_stage(OrderTrackingMiddleware {
                name: "first",
                order: Arc::clone(&order),
            })
            .add_stage(OrderTrackingMiddleware {
                name: "second",
                order: Arc::clone(&order),
            })
            .build();

        let mut ctx = MiddlewareContext::new();
        let response = pipeline
            .process(&mut ctx, test_request(), |_ctx, _req| {
                Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
            })
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(pipeline.stage_names(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_empty_pipeline() {
        let pipeline = Pipeline::builder().build();
        assert_eq!(pipeline.stage_count(), 0);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut ctx = MiddlewareContext::new();
        let response = pipeline
            .process(&mut ctx, test_request(), move |_ctx, _req| {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Ok(Response::empty(StatusCode::ACCEPTED)) })
            })
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_error_surfaces() {
        let pipeline = Pipeline::builder()
            .add_stage(OrderTrackingMiddleware {
                name: "only",
                order: Arc::new(Mutex::new(Vec::new())),
            })
            .build();

        let mut ctx = MiddlewareContext::new();
        let err = pipeline
            .process(&mut ctx, test_request(), |_ctx, _req| {
                Box::pin(async { Err(TenancyError::internal("boom")) })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TenancyError::Internal { .. }));
    }

    #[test]
    fn test_stage_order() {
        let stages = Stage::all();
        assert_eq!(stages.len(), 3);
        assert!(stages.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(stages[0].name(), "request_id");
        assert_eq!(stages[2].name(), "tenant_resolution");
    }
}
