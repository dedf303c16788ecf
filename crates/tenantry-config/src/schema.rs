//! Configuration section types.

use serde::{Deserialize, Serialize};
use tenantry_core::resolver::DEFAULT_TENANT_HEADER;
use tenantry_core::TenantInfo;
use tenantry_telemetry::LogFormat;

/// Which requests skip tenant resolution.
///
/// ```toml
/// [filtering]
/// bypass_paths = ["/health", "/metrics"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilteringConfig {
    /// Path prefixes that bypass resolution on matched endpoints.
    #[serde(default)]
    pub bypass_paths: Vec<String>,
}

/// When a resolved request stops before reaching the handler.
///
/// ```toml
/// [short_circuit]
/// when_unresolved = true
/// redirect_to = "https://app.example.com/select-tenant"
/// fallback_status = 200
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShortCircuitConfig {
    /// Short-circuit requests that resolved to no tenant.
    #[serde(default)]
    pub when_unresolved: bool,

    /// Redirect target used when short-circuiting.
    #[serde(default)]
    pub redirect_to: Option<String>,

    /// Status used when short-circuiting without a redirect target.
    #[serde(default = "default_fallback_status")]
    pub fallback_status: u16,
}

impl Default for ShortCircuitConfig {
    fn default() -> Self {
        Self {
            when_unresolved: false,
            redirect_to: None,
            fallback_status: default_fallback_status(),
        }
    }
}

const fn default_fallback_status() -> u16 {
    200
}

/// The header-based resolver and its tenant table.
///
/// ```toml
/// [resolver]
/// header = "x-tenant-id"
///
/// [[resolver.tenants]]
/// id = "t-1"
/// identifier = "acme"
/// name = "Acme Corp"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Header carrying the tenant identifier.
    #[serde(default = "default_header")]
    pub header: String,

    /// Known tenants.
    #[serde(default)]
    pub tenants: Vec<TenantInfo>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            tenants: Vec::new(),
        }
    }
}

fn default_header() -> String {
    DEFAULT_TENANT_HEADER.to_string()
}

/// Logging output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether logging is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            format: LogFormat::Json,
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_circuit_defaults() {
        let config = ShortCircuitConfig::default();
        assert!(!config.when_unresolved);
        assert!(config.redirect_to.is_none());
        assert_eq!(config.fallback_status, 200);
    }

    #[test]
    fn test_resolver_defaults_to_standard_header() {
        let config: ResolverConfig = toml::from_str("").unwrap();
        assert_eq!(config.header, "x-tenant-id");
        assert!(config.tenants.is_empty());
    }

    #[test]
    fn test_tenant_table() {
        let config: ResolverConfig = toml::from_str(
            r#"
            [[tenants]]
            id = "t-1"
            identifier = "acme"
            name = "Acme Corp"

            [[tenants]]
            id = "t-2"
            identifier = "globex"
            properties = { region = "eu-west-1" }
            "#,
        )
        .unwrap();

        assert_eq!(config.tenants.len(), 2);
        assert_eq!(config.tenants[0].name.as_deref(), Some("Acme Corp"));
        assert_eq!(config.tenants[1].property("region"), Some("eu-west-1"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = toml::from_str::<FilteringConfig>("bypass = [\"/health\"]");
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_format_from_toml() {
        let config: LoggingConfig = toml::from_str("format = \"pretty\"").unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.enabled);
        assert_eq!(config.level, "info");
    }
}
