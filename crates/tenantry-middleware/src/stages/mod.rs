//! Built-in middleware stages.
//!
//! Stages run in this order:
//!
//! 1. [`request_id`] - generate or propagate the request ID
//! 2. [`routing`] - match the endpoint and its metadata
//! 3. [`tenant_resolution`] - resolve, publish and optionally short-circuit

pub mod request_id;
pub mod routing;
pub mod tenant_resolution;

pub use request_id::RequestIdMiddleware;
pub use routing::{EndpointTable, RouteParams, RoutingMiddleware};
pub use tenant_resolution::{
    gate, GateDecision, TenantResolutionBuilder, TenantResolutionMiddleware,
};
