//! Startup options for the tenant resolution stage.
//!
//! Both option types are built once and shared read-only by every request.

use crate::types::Request;
use http::{StatusCode, Uri};
use std::fmt;
use std::sync::Arc;
use tenantry_core::TenantContext;

/// Predicate deciding whether a request skips tenant resolution.
pub type FilterPredicate = Arc<dyn Fn(&Request) -> bool + Send + Sync + 'static>;

/// Predicate over a resolved tenant deciding whether to short-circuit.
pub type TenantPredicate = Arc<dyn Fn(&TenantContext) -> bool + Send + Sync + 'static>;

/// Controls which requests bypass tenant resolution.
///
/// The predicate is only consulted once routing has matched an endpoint.
///
/// # Example
///
/// ```
/// use tenantry_middleware::options::FilteringOptions;
///
/// let options = FilteringOptions::bypass_paths(["/health", "/metrics"]);
/// assert!(options.is_configured());
/// ```
#[derive(Clone, Default)]
pub struct FilteringOptions {
    filter: Option<FilterPredicate>,
}

impl FilteringOptions {
    /// Options with no filter: every request proceeds to resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bypasses resolution whenever `filter` returns `true`.
    #[must_use]
    pub fn with_filter<F>(filter: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        Self {
            filter: Some(Arc::new(filter)),
        }
    }

    /// Bypasses resolution for requests whose path equals one of `prefixes`
    /// or continues below it (`/health` matches `/health/live`, not `/healthz`).
    ///
    /// Trailing slashes are ignored, so a `/` prefix matches every path and
    /// turns tenant resolution off for all matched endpoints.
    #[must_use]
    pub fn bypass_paths<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes
            .into_iter()
            .map(|p| p.into().trim_end_matches('/').to_string())
            .collect();

        Self::with_filter(move |request| {
            let path = request.uri().path();
            prefixes.iter().any(|prefix| path_has_prefix(path, prefix))
        })
    }

    /// Returns `true` if a filter predicate is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.filter.is_some()
    }

    /// Evaluates the filter; `None` when no filter is configured.
    #[must_use]
    pub fn evaluate(&self, request: &Request) -> Option<bool> {
        self.filter.as_ref().map(|filter| filter(request))
    }
}

impl fmt::Debug for FilteringOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteringOptions")
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

fn path_has_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Outcome of evaluating [`ShortCircuitOptions`] against a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortCircuit<'a> {
    /// Continue down the pipeline.
    Continue,
    /// Stop and redirect to the target.
    Redirect(&'a Uri),
    /// Stop and answer with the fallback status.
    Terminate(StatusCode),
}

/// Controls whether a resolved request stops before reaching downstream stages.
///
/// When the predicate fires and a redirect target is set, the request is
/// answered with `302 Found`. Without a target, the request is answered with
/// `fallback_status` (default `200 OK`, empty body) and no redirect.
///
/// # Example
///
/// ```
/// use tenantry_core::TenantContext;
/// use tenantry_middleware::options::{ShortCircuit, ShortCircuitOptions};
///
/// let options = ShortCircuitOptions::when_unresolved()
///     .redirect_to("https://example.com/pick-tenant".parse().unwrap());
///
/// assert!(matches!(
///     options.evaluate(&TenantContext::unresolved()),
///     ShortCircuit::Redirect(_)
/// ));
/// ```
#[derive(Clone)]
pub struct ShortCircuitOptions {
    predicate: Option<TenantPredicate>,
    redirect_to: Option<Uri>,
    fallback_status: StatusCode,
}

impl Default for ShortCircuitOptions {
    fn default() -> Self {
        Self {
            predicate: None,
            redirect_to: None,
            fallback_status: StatusCode::OK,
        }
    }
}

impl ShortCircuitOptions {
    /// Options that never short-circuit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Short-circuits whenever `predicate` returns `true`.
    #[must_use]
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&TenantContext) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Arc::new(predicate)),
            ..Self::default()
        }
    }

    /// Short-circuits requests that resolved to no tenant.
    #[must_use]
    pub fn when_unresolved() -> Self {
        Self::when(|tenant| !tenant.is_resolved())
    }

    /// Sets the redirect target.
    #[must_use]
    pub fn redirect_to(mut self, target: Uri) -> Self {
        self.redirect_to = Some(target);
        self
    }

    /// Sets the status used when short-circuiting without a redirect target.
    #[must_use]
    pub fn fallback_status(mut self, status: StatusCode) -> Self {
        self.fallback_status = status;
        self
    }

    /// Returns `true` if a predicate is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.predicate.is_some()
    }

    /// Returns the redirect target, if configured.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&Uri> {
        self.redirect_to.as_ref()
    }

    /// Returns the fallback status.
    #[must_use]
    pub fn fallback(&self) -> StatusCode {
        self.fallback_status
    }

    /// Decides what happens after `tenant` has been published.
    #[must_use]
    pub fn evaluate(&self, tenant: &TenantContext) -> ShortCircuit<'_> {
        let Some(predicate) = &self.predicate else {
            return ShortCircuit::Continue;
        };

        if !predicate(tenant) {
            return ShortCircuit::Continue;
        }

        match &self.redirect_to {
            Some(target) => ShortCircuit::Redirect(target),
            None => ShortCircuit::Terminate(self.fallback_status),
        }
    }
}

impl fmt::Debug for ShortCircuitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortCircuitOptions")
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .field("redirect_to", &self.redirect_to)
            .field("fallback_status", &self.fallback_status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use tenantry_core::TenantInfo;

    fn request(path: &str) -> Request {
        http::Request::builder()
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_unconfigured_filter() {
        let options = FilteringOptions::new();
        assert!(!options.is_configured());
        assert_eq!(options.evaluate(&request("/health")), None);
    }

    #[test]
    fn test_bypass_paths_match_on_segment_boundary() {
        let options = FilteringOptions::bypass_paths(["/health", "/static/"]);

        assert_eq!(options.evaluate(&request("/health")), Some(true));
        assert_eq!(options.evaluate(&request("/health/live")), Some(true));
        assert_eq!(options.evaluate(&request("/static/app.js")), Some(true));
        assert_eq!(options.evaluate(&request("/healthz")), Some(false));
        assert_eq!(options.evaluate(&request("/orders")), Some(false));
    }

    #[test]
    fn test_root_prefix_bypasses_every_path() {
        let options = FilteringOptions::bypass_paths(["/"]);
        assert_eq!(options.evaluate(&request("/")), Some(true));
        assert_eq!(options.evaluate(&request("/orders/1")), Some(true));
    }

    #[test]
    fn test_custom_filter() {
        let options = FilteringOptions::with_filter(|req| req.method() == http::Method::OPTIONS);
        let preflight = http::Request::builder()
            .method(http::Method::OPTIONS)
            .uri("/orders")
            .body(Full::new(Bytes::new()))
            .unwrap();

        assert_eq!(options.evaluate(&preflight), Some(true));
        assert_eq!(options.evaluate(&request("/orders")), Some(false));
    }

    #[test]
    fn test_short_circuit_absent_continues() {
        let options = ShortCircuitOptions::new();
        assert_eq!(options.evaluate(&TenantContext::unresolved()), ShortCircuit::Continue);
    }

    #[test]
    fn test_short_circuit_false_continues() {
        let options = ShortCircuitOptions::when_unresolved();
        let tenant = TenantContext::resolved(TenantInfo::new("t-1", "acme"));
        assert_eq!(options.evaluate(&tenant), ShortCircuit::Continue);
    }

    #[test]
    fn test_short_circuit_redirects_to_exact_target() {
        let target: Uri = "/select-tenant".parse().unwrap();
        let options = ShortCircuitOptions::when_unresolved().redirect_to(target.clone());

        assert_eq!(
            options.evaluate(&TenantContext::unresolved()),
            ShortCircuit::Redirect(&target)
        );
    }

    #[test]
    fn test_short_circuit_without_target_uses_fallback() {
        let options = ShortCircuitOptions::when(|_| true);
        assert_eq!(
            options.evaluate(&TenantContext::unresolved()),
            ShortCircuit::Terminate(StatusCode::OK)
        );

        let options = options.fallback_status(StatusCode::NOT_FOUND);
        assert_eq!(
            options.evaluate(&TenantContext::unresolved()),
            ShortCircuit::Terminate(StatusCode::NOT_FOUND)
        );
    }

    #[test]
    fn test_debug_elides_closures() {
        let debug = format!("{:?}", ShortCircuitOptions::when_unresolved());
        assert!(debug.contains("<fn>"));
        assert!(debug.contains("fallback_status"));
    }
}
