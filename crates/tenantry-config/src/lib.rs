//! Typed configuration for Tenantry tenant resolution.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (fails on unknown fields) and validation on load
//!
//! # Example
//!
//! ```no_run
//! use tenantry_config::ConfigLoader;
//!
//! # fn main() -> Result<(), tenantry_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("tenancy.toml")?
//!     .with_env_prefix("TENANTRY")
//!     .load()?;
//!
//! let stage = config.tenant_resolution()?;
//! # let _ = stage;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [filtering]
//! bypass_paths = ["/health", "/metrics"]
//!
//! [short_circuit]
//! when_unresolved = true
//! redirect_to = "https://app.example.com/select-tenant"
//! fallback_status = 200
//!
//! [resolver]
//! header = "x-tenant-id"
//!
//! [[resolver.tenants]]
//! id = "t-1"
//! identifier = "acme"
//! name = "Acme Corp"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values use the format `PREFIX__SECTION__KEY`:
//!
//! - `TENANTRY__FILTERING__BYPASS_PATHS=/health,/metrics`
//! - `TENANTRY__SHORT_CIRCUIT__WHEN_UNRESOLVED=true`
//! - `TENANTRY__SHORT_CIRCUIT__REDIRECT_TO=/select-tenant`
//! - `TENANTRY__SHORT_CIRCUIT__FALLBACK_STATUS=404`
//! - `TENANTRY__RESOLVER__HEADER=x-org`
//! - `TENANTRY__LOGGING__LEVEL=debug`
//! - `TENANTRY__LOGGING__FORMAT=pretty`

#![doc(html_root_url = "https://docs.rs/tenantry-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::TenancyConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{FilteringConfig, LoggingConfig, ResolverConfig, ShortCircuitConfig};
