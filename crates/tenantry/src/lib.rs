//! # Tenantry
//!
//! Tenant resolution middleware for multi-tenant HTTP services.
//!
//! Each request passes through a fixed stage order. The tenant resolution
//! stage decides whether the request needs a tenant, asks a
//! [`TenantResolver`](core::TenantResolver) for one, publishes the result on
//! the request context and, if configured, stops the request with a redirect.
//!
//! ```text
//! Request → RequestId → Routing → TenantResolution → Handler
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use tenantry::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_string(
//!         r#"
//!         [filtering]
//!         bypass_paths = ["/health"]
//!
//!         [[resolver.tenants]]
//!         id = "t-1"
//!         identifier = "acme"
//!         "#,
//!         "toml",
//!     )?
//!     .load()?;
//!
//! let endpoints = EndpointTable::new()
//!     .any("/health", Endpoint::new("health", "/health"))
//!     .any("/orders", Endpoint::new("listOrders", "/orders"));
//!
//! let pipeline = Pipeline::builder()
//!     .add_stage(RequestIdMiddleware::new())
//!     .add_stage(RoutingMiddleware::new(endpoints))
//!     .add_stage(config.tenant_resolution()?)
//!     .build();
//!
//! assert_eq!(pipeline.stage_count(), Stage::all().len());
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/tenantry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use tenantry_config as config;
pub use tenantry_core as core;
pub use tenantry_middleware as middleware;
pub use tenantry_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```
/// use tenantry::prelude::*;
/// ```
pub mod prelude {
    pub use tenantry_core::{
        Endpoint, EndpointMetadata, HeaderTenantResolver, InMemoryTenantStore, RequestContext,
        RequestId, StaticTenantResolver, TenancyError, TenancyResult, TenantContext, TenantInfo,
        TenantResolver,
    };

    pub use tenantry_middleware::{
        EndpointTable, FilteringOptions, Middleware, MiddlewareContext, MiddlewareResult, Next,
        Pipeline, RequestIdMiddleware, ResponseExt, RoutingMiddleware, ShortCircuitOptions, Stage,
        TenantResolutionMiddleware,
    };

    pub use tenantry_config::{ConfigError, ConfigLoader, TenancyConfig};

    pub use tenantry_telemetry::{init_logging, LogConfig};
}
