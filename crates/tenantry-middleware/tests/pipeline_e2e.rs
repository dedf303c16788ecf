//! End-to-end pipeline integration tests.
//!
//! These tests run requests through the full stage order:
//!
//! 1. Request ID - Generate/propagate request ID
//! 2. Routing - Match the endpoint and its metadata
//! 3. Tenant Resolution - Gate, resolve, publish, short-circuit

use bytes::Bytes;
use http::{header, Method, Request as HttpRequest, StatusCode};
use http_body_util::Full;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tenantry_core::{
    BoxFuture, Endpoint, EndpointMetadata, HeaderTenantResolver, InMemoryTenantStore,
    TenancyError, TenancyResult, TenantContext, TenantInfo, TenantResolver,
};
use tenantry_middleware::{
    context::MiddlewareContext,
    options::{FilteringOptions, ShortCircuitOptions},
    pipeline::{Pipeline, Stage},
    stages::{
        request_id::REQUEST_ID_HEADER, EndpointTable, RequestIdMiddleware, RoutingMiddleware,
        TenantResolutionMiddleware,
    },
    types::{MiddlewareResult, Request, Response, ResponseExt},
};

/// Resolver that counts calls and returns a fixed outcome.
struct CountingResolver {
    calls: Arc<AtomicUsize>,
    outcome: Outcome,
}

#[derive(Clone)]
enum Outcome {
    Tenant(TenantContext),
    Fail,
}

impl TenantResolver for CountingResolver {
    fn resolve<'a>(&'a self, _request: &'a Request) -> BoxFuture<'a, TenancyResult<TenantContext>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.clone();
        Box::pin(async move {
            match outcome {
                Outcome::Tenant(tenant) => Ok(tenant),
                Outcome::Fail => Err(TenancyError::resolution("tenant store unreachable")),
            }
        })
    }
}

/// Shared counters observed by the assertions.
#[derive(Default, Clone)]
struct Probe {
    resolver_calls: Arc<AtomicUsize>,
    filter_calls: Arc<AtomicUsize>,
    handler_calls: Arc<AtomicUsize>,
}

impl Probe {
    fn resolver(&self, outcome: Outcome) -> CountingResolver {
        CountingResolver {
            calls: Arc::clone(&self.resolver_calls),
            outcome,
        }
    }

    fn health_filter(&self) -> FilteringOptions {
        let calls = Arc::clone(&self.filter_calls);
        FilteringOptions::with_filter(move |request| {
            calls.fetch_add(1, Ordering::SeqCst);
            request.uri().path() == "/health"
        })
    }

    fn resolver_calls(&self) -> usize {
        self.resolver_calls.load(Ordering::SeqCst)
    }

    fn filter_calls(&self) -> usize {
        self.filter_calls.load(Ordering::SeqCst)
    }

    fn handler_calls(&self) -> usize {
        self.handler_calls.load(Ordering::SeqCst)
    }
}

fn acme() -> TenantContext {
    TenantContext::resolved(TenantInfo::new("t-1", "acme").with_name("Acme Corp"))
}

fn endpoints() -> EndpointTable {
    EndpointTable::new()
        .route(Method::GET, "/orders", Endpoint::new("listOrders", "/orders"))
        .route(Method::GET, "/orders/{id}", Endpoint::new("getOrder", "/orders/{id}"))
        .any("/health", Endpoint::new("health", "/health"))
        .any(
            "/ready",
            Endpoint::new("ready", "/ready").with_metadata(EndpointMetadata::excluded()),
        )
}

fn build_pipeline(resolution: TenantResolutionMiddleware) -> Pipeline {
    Pipeline::builder()
        .add_stage(RequestIdMiddleware::new())
        .add_stage(RoutingMiddleware::new(endpoints()))
        .add_stage(resolution)
        .build()
}

fn make_request(path: &str) -> Request {
    HttpRequest::builder()
        .method(Method::GET)
        .uri(path)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

async fn run(pipeline: &Pipeline, probe: &Probe, path: &str) -> (MiddlewareContext, MiddlewareResult) {
    let mut ctx = MiddlewareContext::new();
    let handler_calls = Arc::clone(&probe.handler_calls);
    let result = pipeline
        .process(&mut ctx, make_request(path), move |_ctx, _req| {
            handler_calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
        })
        .await;
    (ctx, result)
}

fn nothing_published(ctx: &MiddlewareContext) -> bool {
    ctx.tenant_context().is_none() && !ctx.has_extension::<Arc<TenantContext>>()
}

#[test]
fn test_pipeline_has_canonical_order() {
    let pipeline = build_pipeline(TenantResolutionMiddleware::new(
        tenantry_core::StaticTenantResolver::unresolved(),
    ));
    let expected: Vec<_> = Stage::all().iter().map(|s| s.name()).collect();
    assert_eq!(pipeline.stage_names(), expected);
}

#[tokio::test]
async fn test_filter_bypass_skips_resolution() {
    let probe = Probe::default();
    let middleware = TenantResolutionMiddleware::builder()
        .resolver(probe.resolver(Outcome::Tenant(acme())))
        .filtering(probe.health_filter())
        .build()
        .unwrap();
    let pipeline = build_pipeline(middleware);

    let (ctx, result) = run(&pipeline, &probe, "/health").await;

    let response = result.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(probe.filter_calls(), 1);
    assert_eq!(probe.resolver_calls(), 0);
    assert_eq!(probe.handler_calls(), 1);
    assert!(nothing_published(&ctx));
}

#[tokio::test]
async fn test_excluded_endpoint_skips_resolution_regardless_of_filter() {
    let probe = Probe::default();
    let middleware = TenantResolutionMiddleware::builder()
        .resolver(probe.resolver(Outcome::Tenant(acme())))
        .filtering(probe.health_filter())
        .build()
        .unwrap();
    let pipeline = build_pipeline(middleware);

    let (ctx, result) = run(&pipeline, &probe, "/ready").await;

    assert!(result.is_ok());
    assert_eq!(probe.filter_calls(), 1);
    assert_eq!(probe.resolver_calls(), 0);
    assert_eq!(probe.handler_calls(), 1);
    assert!(nothing_published(&ctx));
}

#[tokio::test]
async fn test_unmatched_request_never_calls_filter() {
    let probe = Probe::default();
    let middleware = TenantResolutionMiddleware::builder()
        .resolver(probe.resolver(Outcome::Tenant(acme())))
        .filtering(probe.health_filter())
        .build()
        .unwrap();
    let pipeline = build_pipeline(middleware);

    let (ctx, result) = run(&pipeline, &probe, "/unrouted").await;

    assert!(result.is_ok());
    assert!(ctx.endpoint().is_none());
    assert_eq!(probe.filter_calls(), 0);
    assert_eq!(probe.resolver_calls(), 1);
    assert!(ctx.tenant_context().is_some());
}

#[tokio::test]
async fn test_default_options_resolve_once_and_continue() {
    let probe = Probe::default();
    let pipeline = build_pipeline(TenantResolutionMiddleware::new(
        probe.resolver(Outcome::Tenant(acme())),
    ));

    let (ctx, result) = run(&pipeline, &probe, "/orders/42").await;

    let response = result.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    assert_eq!(probe.resolver_calls(), 1);
    assert_eq!(probe.handler_calls(), 1);

    let accessor = ctx.tenant_context().unwrap();
    let stored = ctx.get_extension::<Arc<TenantContext>>().unwrap();
    assert!(Arc::ptr_eq(accessor, stored));
    assert_eq!(**accessor, acme());
}

#[tokio::test]
async fn test_request_context_sees_published_tenant() {
    let probe = Probe::default();
    let pipeline = build_pipeline(TenantResolutionMiddleware::new(
        probe.resolver(Outcome::Tenant(acme())),
    ));

    let (ctx, _) = run(&pipeline, &probe, "/orders").await;
    let request_ctx = ctx.to_request_context();

    assert_eq!(request_ctx.operation_id(), Some("listOrders"));
    assert_eq!(
        request_ctx.tenant_context().and_then(|t| t.tenant_id()),
        Some("t-1")
    );
}

#[tokio::test]
async fn test_short_circuit_predicate_false_continues() {
    let probe = Probe::default();
    let middleware = TenantResolutionMiddleware::builder()
        .resolver(probe.resolver(Outcome::Tenant(acme())))
        .short_circuit(
            ShortCircuitOptions::when_unresolved().redirect_to("/select-tenant".parse().unwrap()),
        )
        .build()
        .unwrap();
    let pipeline = build_pipeline(middleware);

    let (_, result) = run(&pipeline, &probe, "/orders").await;

    assert_eq!(result.unwrap().status(), StatusCode::OK);
    assert_eq!(probe.handler_calls(), 1);
}

#[tokio::test]
async fn test_short_circuit_redirects_to_target() {
    let probe = Probe::default();
    let middleware = TenantResolutionMiddleware::builder()
        .resolver(probe.resolver(Outcome::Tenant(TenantContext::unresolved())))
        .short_circuit(
            ShortCircuitOptions::when_unresolved()
                .redirect_to("https://login.example.com/tenants?next=%2Forders".parse().unwrap()),
        )
        .build()
        .unwrap();
    let pipeline = build_pipeline(middleware);

    let (ctx, result) = run(&pipeline, &probe, "/orders").await;

    let response = result.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://login.example.com/tenants?next=%2Forders"
    );
    assert_eq!(probe.handler_calls(), 0);

    let accessor = ctx.tenant_context().unwrap();
    assert!(Arc::ptr_eq(
        accessor,
        ctx.get_extension::<Arc<TenantContext>>().unwrap()
    ));
}

#[tokio::test]
async fn test_short_circuit_without_target_answers_with_fallback() {
    let probe = Probe::default();
    let middleware = TenantResolutionMiddleware::builder()
        .resolver(probe.resolver(Outcome::Tenant(TenantContext::unresolved())))
        .short_circuit(ShortCircuitOptions::when_unresolved())
        .build()
        .unwrap();
    let pipeline = build_pipeline(middleware);

    let (_, result) = run(&pipeline, &probe, "/orders").await;

    let response = result.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(probe.handler_calls(), 0);
}

#[tokio::test]
async fn test_short_circuit_custom_fallback_status() {
    let probe = Probe::default();
    let middleware = TenantResolutionMiddleware::builder()
        .resolver(probe.resolver(Outcome::Tenant(TenantContext::unresolved())))
        .short_circuit(ShortCircuitOptions::when_unresolved().fallback_status(StatusCode::NOT_FOUND))
        .build()
        .unwrap();
    let pipeline = build_pipeline(middleware);

    let (_, result) = run(&pipeline, &probe, "/orders").await;

    assert_eq!(result.unwrap().status(), StatusCode::NOT_FOUND);
    assert_eq!(probe.handler_calls(), 0);
}

#[tokio::test]
async fn test_resolver_error_propagates_unchanged() {
    let probe = Probe::default();
    let pipeline = build_pipeline(TenantResolutionMiddleware::new(probe.resolver(Outcome::Fail)));

    let (ctx, result) = run(&pipeline, &probe, "/orders").await;

    let err = result.unwrap_err();
    assert!(matches!(err, TenancyError::Resolution { .. }));
    assert!(err.to_string().contains("tenant store unreachable"));
    assert_eq!(probe.resolver_calls(), 1);
    assert_eq!(probe.handler_calls(), 0);
    assert!(nothing_published(&ctx));

    let rendered = Response::from_error(&err, Some(&ctx.request_id().to_string()));
    assert_eq!(rendered.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_header_resolver_end_to_end() {
    let store = InMemoryTenantStore::new()
        .with_tenant(TenantInfo::new("t-1", "acme"))
        .with_tenant(TenantInfo::new("t-2", "globex"));
    let middleware = TenantResolutionMiddleware::builder()
        .resolver(HeaderTenantResolver::new(store))
        .filtering(FilteringOptions::bypass_paths(["/health"]))
        .build()
        .unwrap();
    let pipeline = build_pipeline(middleware);

    let mut ctx = MiddlewareContext::new();
    let request = HttpRequest::builder()
        .uri("/orders")
        .header("x-tenant-id", "Globex")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let response = pipeline
        .process(&mut ctx, request, |_ctx, _req| {
            Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
        })
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let tenant = ctx.tenant_context().unwrap();
    assert_eq!(tenant.tenant_id(), Some("t-2"));
    assert_eq!(tenant.strategy_info().map(|s| s.strategy.as_str()), Some("header"));
}

#[test]
fn test_builder_without_resolver_is_configuration_error() {
    let err = TenantResolutionMiddleware::builder()
        .short_circuit(ShortCircuitOptions::when_unresolved())
        .build()
        .unwrap_err();
    assert!(matches!(err, TenancyError::Configuration { .. }));
}
