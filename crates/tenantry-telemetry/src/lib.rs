//! Structured logging for Tenantry services.
//!
//! Tenantry stages emit `tracing` events; this crate installs the subscriber
//! that renders them, as JSON in production or pretty-printed during
//! development.
//!
//! | Event                         | Level   | Fields                          |
//! |-------------------------------|---------|---------------------------------|
//! | resolution skipped            | `debug` | `request_id`, `decision`        |
//! | tenant context published      | `debug` | `request_id`, `tenant_id`       |
//! | short-circuit redirect        | `info`  | `request_id`, `location`        |
//! | short-circuit without target  | `warn`  | `request_id`, `status`          |
//!
//! # Example
//!
//! ```rust,ignore
//! use tenantry_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! tracing::info!(tenant_id = "t-1", "ready");
//! ```

#![doc(html_root_url = "https://docs.rs/tenantry-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
