//! Configuration-driven pipeline tests.

use bytes::Bytes;
use http::{header, Request as HttpRequest, StatusCode};
use http_body_util::Full;
use std::sync::Arc;
use tenantry::middleware::Response;
use tenantry::prelude::*;

const CONFIG: &str = r#"
[filtering]
bypass_paths = ["/health"]

[short_circuit]
when_unresolved = true
redirect_to = "/select-tenant"

[resolver]
header = "x-org"

[[resolver.tenants]]
id = "t-1"
identifier = "acme"
name = "Acme Corp"
"#;

fn pipeline() -> Pipeline {
    let config = ConfigLoader::new()
        .with_string(CONFIG, "toml")
        .unwrap()
        .load()
        .unwrap();

    let endpoints = EndpointTable::new()
        .any("/health", Endpoint::new("health", "/health"))
        .any("/orders", Endpoint::new("listOrders", "/orders"));

    Pipeline::builder()
        .add_stage(RequestIdMiddleware::new())
        .add_stage(RoutingMiddleware::new(endpoints))
        .add_stage(config.tenant_resolution().unwrap())
        .build()
}

async fn send(pipeline: &Pipeline, path: &str, org: Option<&str>) -> (MiddlewareContext, Response) {
    let mut builder = HttpRequest::builder().uri(path);
    if let Some(org) = org {
        builder = builder.header("x-org", org);
    }
    let request = builder.body(Full::new(Bytes::new())).unwrap();

    let mut ctx = MiddlewareContext::new();
    let response = pipeline
        .process(&mut ctx, request, |_ctx, _req| {
            Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
        })
        .await
        .unwrap();
    (ctx, response)
}

#[tokio::test]
async fn test_known_tenant_reaches_handler() {
    let (ctx, response) = send(&pipeline(), "/orders", Some("acme")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let tenant = ctx.tenant_context().unwrap();
    assert_eq!(tenant.tenant_info().and_then(|t| t.name.as_deref()), Some("Acme Corp"));
    assert!(Arc::ptr_eq(
        tenant,
        ctx.get_extension::<Arc<TenantContext>>().unwrap()
    ));
}

#[tokio::test]
async fn test_unknown_tenant_is_redirected() {
    let (ctx, response) = send(&pipeline(), "/orders", Some("initech")).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/select-tenant");
    assert!(!ctx.tenant_context().unwrap().is_resolved());
}

#[tokio::test]
async fn test_health_bypasses_resolution() {
    let (ctx, response) = send(&pipeline(), "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(ctx.tenant_context().is_none());
}
