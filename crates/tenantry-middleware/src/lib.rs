//! # Tenantry Middleware
//!
//! Middleware pipeline and tenant resolution stage for Tenantry.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → RequestId → Routing → TenantResolution → Handler
//!                                      │
//!                                      ├─ bypass / exclude ──→ Handler
//!                                      ├─ resolver error ────→ Err
//!                                      └─ short-circuit ─────→ 302 / fallback
//! ```
//!
//! | Stage | Middleware          | Purpose                                  |
//! |-------|---------------------|------------------------------------------|
//! | 1     | Request ID          | Generate/propagate request ID (UUID v7)  |
//! | 2     | Routing             | Attach matched endpoint and its metadata |
//! | 3     | Tenant Resolution   | Resolve and publish the tenant context   |
//!
//! The resolved tenant is published on the [`MiddlewareContext`] both through
//! [`MiddlewareContext::tenant_context`] and as an `Arc<TenantContext>`
//! extension; the two always point at the same value.
//!
//! ## Example
//!
//! ```
//! use tenantry_middleware::pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages[0].name(), "request_id");
//! assert_eq!(stages[2].name(), "tenant_resolution");
//! ```
//!
//! [`TenantContext`]: tenantry_core::TenantContext

#![doc(html_root_url = "https://docs.rs/tenantry-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod options;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use context::MiddlewareContext;
pub use middleware::{boxed, BoxFuture, FnMiddleware, Middleware, Next};
pub use options::{FilteringOptions, ShortCircuit, ShortCircuitOptions};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use stages::{
    gate, EndpointTable, GateDecision, RequestIdMiddleware, RoutingMiddleware,
    TenantResolutionBuilder, TenantResolutionMiddleware,
};
pub use types::{MiddlewareResult, Request, Response, ResponseExt};
