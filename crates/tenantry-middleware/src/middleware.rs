//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that all pipeline stages
//! implement. A stage receives the mutable request context, the request and a
//! [`Next`] callback, and either continues the chain or answers on its own.
//!
//! # Example
//!
//! ```
//! use tenantry_middleware::{BoxFuture, Middleware, MiddlewareResult, Next, Request};
//! use tenantry_middleware::context::MiddlewareContext;
//!
//! struct LoggingMiddleware;
//!
//! impl Middleware for LoggingMiddleware {
//!     fn name(&self) -> &'static str {
//!         "logging"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, MiddlewareResult> {
//!         Box::pin(async move {
//!             tracing::info!(request_id = %ctx.request_id(), "request");
//!             next.run(ctx, request).await
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use crate::types::{MiddlewareResult, Request};
use std::future::Future;

pub use tenantry_core::BoxFuture;

/// The core middleware trait.
///
/// # Invariants
///
/// - Middleware MUST call `next.run()` at most once
/// - Middleware MUST NOT swallow errors from downstream stages
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this middleware stage.
    ///
    /// This name is used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Process the request through this middleware.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The mutable middleware context
    /// * `request` - The incoming HTTP request
    /// * `next` - Callback to invoke the next middleware
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult>;
}

/// The terminal handler at the end of a chain.
pub type Handler<'a> =
    Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult> + Send + 'a>;

/// Callback to invoke the next middleware in the chain.
///
/// Consumed by [`Next::run`], so it can be called at most once. Dropping it
/// without calling short-circuits the rest of the pipeline.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(Handler<'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke the given middleware.
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next middleware or handler in the chain.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> MiddlewareResult {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                middleware.process(ctx, request, *next).await
            }
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

/// A middleware that can be created from a function.
///
/// # Example
///
/// ```ignore
/// let stamp = FnMiddleware::new("stamp", |ctx, req, next| {
///     ctx.set_extension(Stamp);
///     boxed(next.run(ctx, req))
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext, Request, Next<'a>) -> BoxFuture<'a, MiddlewareResult>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new function-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext, Request, Next<'a>) -> BoxFuture<'a, MiddlewareResult>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        (self.func)(ctx, request, next)
    }
}

/// Wraps a future into a [`BoxFuture`].
pub fn boxed<'a, Fut>(future: Fut) -> BoxFuture<'a, MiddlewareResult>
where
    Fut: Future<Output = MiddlewareResult> + Send + 'a,
{
    Box::pin(future)
}
