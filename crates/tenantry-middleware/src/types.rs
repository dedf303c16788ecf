//! Common types used throughout the middleware pipeline.

use bytes::Bytes;
use http::{header, StatusCode, Uri};
use http_body_util::Full;
use tenantry_core::TenancyError;

pub use tenantry_core::Request;

/// The HTTP response type used in the middleware pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// What every middleware stage and handler produces.
///
/// Errors travel up the chain untouched; rendering them is the host's call
/// (see [`ResponseExt::from_error`]).
pub type MiddlewareResult = Result<Response, TenancyError>;

/// Extension trait for building framework responses.
pub trait ResponseExt {
    /// Creates an error response with the given status code and message.
    fn error(status: StatusCode, message: &str) -> Response;

    /// Creates a JSON error response.
    fn json_error(status: StatusCode, code: &str, message: &str) -> Response;

    /// Creates a `302 Found` response pointing at `location`.
    fn redirect(location: &Uri) -> Response;

    /// Creates a response with the given status and no body.
    fn empty(status: StatusCode) -> Response;

    /// Renders a [`TenancyError`] as a JSON error envelope.
    fn from_error(error: &TenancyError, request_id: Option<&str>) -> Response;
}

impl ResponseExt for Response {
    fn error(status: StatusCode, message: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(message.to_string())))
            .expect("failed to build error response")
    }

    fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        http::Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build JSON error response")
    }

    fn redirect(location: &Uri) -> Response {
        http::Response::builder()
            .status(StatusCode::FOUND)
            .header(header::LOCATION, location.to_string())
            .body(Full::new(Bytes::new()))
            .expect("failed to build redirect response")
    }

    fn empty(status: StatusCode) -> Response {
        http::Response::builder()
            .status(status)
            .body(Full::new(Bytes::new()))
            .expect("failed to build empty response")
    }

    fn from_error(error: &TenancyError, request_id: Option<&str>) -> Response {
        let envelope = error.to_envelope(request_id);
        let body = serde_json::to_vec(&envelope).unwrap_or_default();

        http::Response::builder()
            .status(error.status_code())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .expect("failed to build error envelope response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_error_response() {
        let response = Response::error(StatusCode::BAD_REQUEST, "Invalid input");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_redirect_response() {
        let target: Uri = "https://example.com/select-tenant?from=%2F".parse().unwrap();
        let response = Response::redirect(&target);

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://example.com/select-tenant?from=%2F"
        );
    }

    #[test]
    fn test_empty_response() {
        let response = Response::empty(StatusCode::NOT_FOUND);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn test_from_error_renders_envelope() {
        let error = TenancyError::tenant_not_found("acme");
        let response = Response::from_error(&error, Some("req-1"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "TENANT_NOT_FOUND");
        assert_eq!(json["request_id"], "req-1");
    }
}
