//! Layered configuration loader.
//!
//! Layers apply in order, later ones overriding earlier ones:
//!
//! 1. Defaults
//! 2. Configuration file or string (TOML or JSON)
//! 3. Environment variables (`PREFIX__SECTION__KEY`)

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, TenancyConfig};

/// Configuration loader with layered approach.
///
/// # Example
///
/// ```no_run
/// use tenantry_config::ConfigLoader;
///
/// # fn main() -> Result<(), tenantry_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("tenancy.toml")?
///     .with_dotenv()?
///     .with_env_prefix("TENANTRY")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: TenancyConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a new loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use tenantry_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = TenancyConfig::development();
        self
    }

    /// Load configuration from a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// contains unknown fields, or has an unsupported extension.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| {
                ConfigError::validation_error(format!(
                    "unsupported configuration file format: {}",
                    path.display()
                ))
            })?;

        self.config = parse(&content, &extension)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`toml` or `json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unsupported.
    ///
    /// # Example
    ///
    /// ```
    /// use tenantry_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [filtering]
    ///     bypass_paths = ["/health"]
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.filtering.bypass_paths, ["/health"]);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// With prefix `TENANTRY`:
    /// - `TENANTRY__FILTERING__BYPASS_PATHS=/health,/metrics`
    /// - `TENANTRY__SHORT_CIRCUIT__REDIRECT_TO=/select-tenant`
    /// - `TENANTRY__LOGGING__LEVEL=debug`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load variables from a `.env` file in the working directory, if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or validation
    /// fails.
    pub fn load(mut self) -> Result<TenancyConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without env overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> TenancyConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["FILTERING", "BYPASS_PATHS"] => {
                self.config.filtering.bypass_paths = value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect();
            }

            ["SHORT_CIRCUIT", "WHEN_UNRESOLVED"] => {
                self.config.short_circuit.when_unresolved = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["SHORT_CIRCUIT", "REDIRECT_TO"] => {
                self.config.short_circuit.redirect_to = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["SHORT_CIRCUIT", "FALLBACK_STATUS"] => {
                self.config.short_circuit.fallback_status = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }

            ["RESOLVER", "HEADER"] => {
                self.config.resolver.header = value.to_string();
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected 'json' or 'pretty'"))?;
            }

            _ => {
                tracing::debug!(var = key, "ignoring unknown configuration variable");
            }
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<TenancyConfig, ConfigError> {
    match format {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        _ => Err(ConfigError::validation_error(format!(
            "unsupported configuration format: {format}"
        ))),
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
