//! Session API middleware

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use subtle::ConstantTimeEq;

use super::types::ErrorResponse;

/// Expected API key, shared with the auth middleware
#[derive(Clone)]
pub struct ApiKey(pub String);

/// API key authentication middleware
///
/// Accepts either `x-api-key: <key>` or `Authorization: Bearer <key>`.
pub async fn auth_middleware(
    State(expected): State<ApiKey>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let authorized =
        extract_api_key(&request).is_some_and(|key| constant_time_eq(key, &expected.0));
    if authorized {
        return next.run(request).await;
    }

    tracing::warn!("Rejected request to {} with missing or invalid API key", request.uri());
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::authentication_error()),
    )
        .into_response()
}

fn extract_api_key(request: &Request<Body>) -> Option<&str> {
    let headers = request.headers();
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        })
}

/// Constant-time comparison, so response timing does not leak the key
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// CORS layer allowing any origin, method and header
pub fn cors_layer() -> tower_http::cors::CorsLayer {
    use tower_http::cors::{Any, CorsLayer};

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, value: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/session")
            .header(name, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_x_api_key() {
        let req = request("x-api-key", "secret");
        assert_eq!(extract_api_key(&req), Some("secret"));
    }

    #[test]
    fn test_extract_bearer() {
        let req = request("authorization", "Bearer secret");
        assert_eq!(extract_api_key(&req), Some("secret"));

        let req = request("authorization", "Basic abc");
        assert_eq!(extract_api_key(&req), None);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("secret", "secret"));
        assert!(!constant_time_eq("secret", "secreT"));
        assert!(!constant_time_eq("secret", "secret-longer"));
    }
}
