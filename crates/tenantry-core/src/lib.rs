//! # Tenantry Core
//!
//! Core types and traits shared by the Tenantry crates.
//!
//! - [`TenantContext`] - The result of resolving a request to a tenant
//! - [`TenantResolver`] - Async capability that produces a [`TenantContext`]
//! - [`Endpoint`] / [`EndpointMetadata`] - Per-route descriptors set by routing
//! - [`RequestContext`] - Handler-facing snapshot of per-request state
//! - [`TenancyError`] - Standard error type

#![doc(html_root_url = "https://docs.rs/tenantry-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod endpoint;
mod error;
pub mod resolver;
mod tenant;

use bytes::Bytes;
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;

pub use context::{RequestContext, RequestId};
pub use endpoint::{Endpoint, EndpointMetadata};
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, TenancyError, TenancyResult};
pub use resolver::{HeaderTenantResolver, InMemoryTenantStore, StaticTenantResolver, TenantResolver};
pub use tenant::{StoreInfo, StrategyInfo, TenantContext, TenantInfo};

/// The HTTP request type seen by resolvers and middleware.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
