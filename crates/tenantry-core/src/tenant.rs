//! Tenant data types.
//!
//! A [`TenantContext`] is what a resolver hands back for one request. It
//! either carries a resolved [`TenantInfo`] or represents "no tenant", and
//! records which strategy and store produced the result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptive record for a single tenant.
///
/// # Example
///
/// ```
/// use tenantry_core::TenantInfo;
///
/// let tenant = TenantInfo::new("t-1", "acme")
///     .with_name("Acme Corp")
///     .with_property("plan", "enterprise");
///
/// assert_eq!(tenant.identifier, "acme");
/// assert_eq!(tenant.property("plan"), Some("enterprise"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantInfo {
    /// Stable internal ID.
    pub id: String,

    /// Identifier the request carries (host segment, header value, ...).
    pub identifier: String,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Free-form per-tenant settings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl TenantInfo {
    /// Creates a tenant record with an ID and identifier.
    #[must_use]
    pub fn new(id: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            identifier: identifier.into(),
            name: None,
            properties: BTreeMap::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Looks up a property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Names the strategy that identified the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Strategy name, e.g. `"header"`.
    pub strategy: String,
}

impl StrategyInfo {
    /// Creates strategy info.
    #[must_use]
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
        }
    }
}

/// Names the store that supplied the tenant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    /// Store name, e.g. `"in_memory"`.
    pub store: String,
}

impl StoreInfo {
    /// Creates store info.
    #[must_use]
    pub fn new(store: impl Into<String>) -> Self {
        Self {
            store: store.into(),
        }
    }
}

/// The outcome of resolving a request to a tenant.
///
/// Once published for a request the context is shared immutably, so it has
/// no setters beyond the `with_*` constructors.
///
/// # Example
///
/// ```
/// use tenantry_core::{StrategyInfo, TenantContext, TenantInfo};
///
/// let unresolved = TenantContext::unresolved();
/// assert!(!unresolved.is_resolved());
///
/// let ctx = TenantContext::resolved(TenantInfo::new("t-1", "acme"))
///     .with_strategy(StrategyInfo::new("header"));
/// assert!(ctx.is_resolved());
/// assert_eq!(ctx.tenant_identifier(), Some("acme"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    tenant_info: Option<TenantInfo>,
    strategy_info: Option<StrategyInfo>,
    store_info: Option<StoreInfo>,
}

impl TenantContext {
    /// A context representing "no tenant".
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// A context for a resolved tenant.
    #[must_use]
    pub fn resolved(tenant_info: TenantInfo) -> Self {
        Self {
            tenant_info: Some(tenant_info),
            strategy_info: None,
            store_info: None,
        }
    }

    /// Records the strategy that produced this context.
    #[must_use]
    pub fn with_strategy(mut self, strategy_info: StrategyInfo) -> Self {
        self.strategy_info = Some(strategy_info);
        self
    }

    /// Records the store that produced this context.
    #[must_use]
    pub fn with_store(mut self, store_info: StoreInfo) -> Self {
        self.store_info = Some(store_info);
        self
    }

    /// Returns `true` if a tenant was resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.tenant_info.is_some()
    }

    /// Returns the resolved tenant, if any.
    #[must_use]
    pub fn tenant_info(&self) -> Option<&TenantInfo> {
        self.tenant_info.as_ref()
    }

    /// Returns the resolved tenant's ID, if any.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_info.as_ref().map(|t| t.id.as_str())
    }

    /// Returns the resolved tenant's identifier, if any.
    #[must_use]
    pub fn tenant_identifier(&self) -> Option<&str> {
        self.tenant_info.as_ref().map(|t| t.identifier.as_str())
    }

    /// Returns the strategy info, if recorded.
    #[must_use]
    pub fn strategy_info(&self) -> Option<&StrategyInfo> {
        self.strategy_info.as_ref()
    }

    /// Returns the store info, if recorded.
    #[must_use]
    pub fn store_info(&self) -> Option<&StoreInfo> {
        self.store_info.as_ref()
    }
}
