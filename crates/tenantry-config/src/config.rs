//! Root configuration type.

use http::{HeaderName, StatusCode, Uri};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tenantry_core::{HeaderTenantResolver, InMemoryTenantStore};
use tenantry_middleware::{FilteringOptions, ShortCircuitOptions, TenantResolutionMiddleware};
use tenantry_telemetry::LogConfig;

use crate::{ConfigError, FilteringConfig, LoggingConfig, ResolverConfig, ShortCircuitConfig};

/// Complete tenant resolution configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use tenantry_config::TenancyConfig;
///
/// let config = TenancyConfig::default();
/// assert!(config.filtering.bypass_paths.is_empty());
/// assert_eq!(config.short_circuit.fallback_status, 200);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TenancyConfig {
    /// Resolution bypass rules.
    #[serde(default)]
    pub filtering: FilteringConfig,

    /// Short-circuit behavior after resolution.
    #[serde(default)]
    pub short_circuit: ShortCircuitConfig,

    /// Header resolver and tenant table.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TenancyConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - a bypass path does not start with `/`, or is `/` itself
    /// - the redirect target is neither an absolute URI nor an absolute path
    /// - the fallback status is not a final (2xx-5xx) HTTP status
    /// - the resolver header is not a valid header name
    /// - a tenant has an empty ID or identifier, or identifiers collide
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in &self.filtering.bypass_paths {
            if !path.starts_with('/') {
                return Err(ConfigError::invalid_value(
                    "filtering.bypass_paths",
                    format!("path must start with '/': {path}"),
                ));
            }
            if path.trim_end_matches('/').is_empty() {
                return Err(ConfigError::invalid_value(
                    "filtering.bypass_paths",
                    "'/' would bypass resolution for every path",
                ));
            }
        }

        if let Some(target) = &self.short_circuit.redirect_to {
            parse_redirect_target(target)?;
        }

        parse_fallback_status(self.short_circuit.fallback_status)?;

        if HeaderName::from_bytes(self.resolver.header.as_bytes()).is_err() {
            return Err(ConfigError::invalid_value(
                "resolver.header",
                format!("invalid header name: {}", self.resolver.header),
            ));
        }

        let mut seen = HashSet::new();
        for tenant in &self.resolver.tenants {
            if tenant.id.is_empty() || tenant.identifier.is_empty() {
                return Err(ConfigError::invalid_value(
                    "resolver.tenants",
                    "id and identifier must not be empty",
                ));
            }
            if !seen.insert(tenant.identifier.to_lowercase()) {
                return Err(ConfigError::invalid_value(
                    "resolver.tenants",
                    format!("duplicate identifier: {}", tenant.identifier),
                ));
            }
        }

        Ok(())
    }

    /// Create a development configuration preset with pretty debug logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: tenantry_telemetry::LogFormat::Pretty,
                ..LoggingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Builds the filtering options.
    #[must_use]
    pub fn filtering_options(&self) -> FilteringOptions {
        if self.filtering.bypass_paths.is_empty() {
            FilteringOptions::new()
        } else {
            FilteringOptions::bypass_paths(self.filtering.bypass_paths.iter().cloned())
        }
    }

    /// Builds the short-circuit options.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the redirect target or fallback
    /// status is invalid.
    pub fn short_circuit_options(&self) -> Result<ShortCircuitOptions, ConfigError> {
        let section = &self.short_circuit;
        if !section.when_unresolved {
            return Ok(ShortCircuitOptions::new());
        }

        let mut options = ShortCircuitOptions::when_unresolved()
            .fallback_status(parse_fallback_status(section.fallback_status)?);
        if let Some(target) = &section.redirect_to {
            options = options.redirect_to(parse_redirect_target(target)?);
        }
        Ok(options)
    }

    /// Builds the header resolver over the configured tenant table.
    #[must_use]
    pub fn header_resolver(&self) -> HeaderTenantResolver {
        let store = self
            .resolver
            .tenants
            .iter()
            .cloned()
            .fold(InMemoryTenantStore::new(), InMemoryTenantStore::with_tenant);
        HeaderTenantResolver::with_header(&self.resolver.header, store)
    }

    /// Builds the tenant resolution stage from every section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the short-circuit section is
    /// invalid.
    pub fn tenant_resolution(&self) -> Result<TenantResolutionMiddleware, ConfigError> {
        TenantResolutionMiddleware::builder()
            .resolver(self.header_resolver())
            .filtering(self.filtering_options())
            .short_circuit(self.short_circuit_options()?)
            .build()
            .map_err(|e| ConfigError::validation_error(e.to_string()))
    }

    /// Builds the logging configuration.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.logging.enabled,
            ..LogConfig::default()
        }
        .with_level(self.logging.level.clone())
        .with_format(self.logging.format)
    }
}

fn parse_redirect_target(target: &str) -> Result<Uri, ConfigError> {
    if target.is_empty() {
        return Err(ConfigError::invalid_value(
            "short_circuit.redirect_to",
            "must not be empty",
        ));
    }
    let uri = target.parse::<Uri>().map_err(|e| {
        ConfigError::invalid_value("short_circuit.redirect_to", format!("{target}: {e}"))
    })?;

    let absolute = uri.scheme().is_some() && uri.authority().is_some();
    let origin_path = uri.scheme().is_none()
        && uri.authority().is_none()
        && uri.path().starts_with('/');
    if !absolute && !origin_path {
        return Err(ConfigError::invalid_value(
            "short_circuit.redirect_to",
            format!("must be an absolute URI or start with '/': {target}"),
        ));
    }
    Ok(uri)
}

fn parse_fallback_status(status: u16) -> Result<StatusCode, ConfigError> {
    match StatusCode::from_u16(status) {
        Ok(code) if !code.is_informational() && status < 600 => Ok(code),
        _ => Err(ConfigError::invalid_value(
            "short_circuit.fallback_status",
            format!("not a final HTTP status code: {status}"),
        )),
    }
}
