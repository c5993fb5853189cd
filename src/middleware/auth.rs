use axum::{
    extract::Request,
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{verify_token, Claims, TOKEN_COOKIE};
use crate::error::ApiError;

/// Verified caller identity, reconstructed per request from the token
/// cookie and discarded when the request ends.
#[derive(Clone, Debug)]
pub struct AuthIdentity {
    pub email: String,
    pub role: Option<String>,
}

impl From<Claims> for AuthIdentity {
    fn from(claims: Claims) -> Self {
        Self { email: claims.email, role: claims.role }
    }
}

/// Access guard applied to the protected route group. A request either
/// carries a verifiable `token` cookie and proceeds with its identity in
/// the request extensions, or stops here with 401.
pub async fn access_guard(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = token_from_cookies(&headers)
        .ok_or_else(|| ApiError::unauthorized("unauthorized access"))?;

    let claims = verify_token(&token)?;

    request.extensions_mut().insert(AuthIdentity::from(claims));
    Ok(next.run(request).await)
}

/// Pull the token out of the request's cookie headers.
fn token_from_cookies(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else { continue };
        for pair in value.split(';') {
            if let Some(token) = pair.trim().strip_prefix(&format!("{}=", TOKEN_COOKIE)) {
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn token_found_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; token=abc.def.ghi; lang=bn");
        assert_eq!(token_from_cookies(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_and_empty_tokens_are_absent() {
        assert!(token_from_cookies(&HeaderMap::new()).is_none());
        assert!(token_from_cookies(&headers_with_cookie("theme=dark")).is_none());
        assert!(token_from_cookies(&headers_with_cookie("token=")).is_none());
    }

    #[test]
    fn other_cookie_names_do_not_match() {
        let headers = headers_with_cookie("refresh_token=abc");
        assert!(token_from_cookies(&headers).is_none());
    }

    mod guard {
        use super::super::*;
        use axum::{body::Body, http::Request as HttpRequest, http::StatusCode, routing::get, Extension, Router};
        use tower::ServiceExt;

        use crate::auth::{issue_token, Claims};

        async fn probe(Extension(identity): Extension<AuthIdentity>) -> String {
            identity.email
        }

        fn guarded_app() -> Router {
            Router::new()
                .route("/probe", get(probe))
                .route_layer(axum::middleware::from_fn(access_guard))
        }

        #[tokio::test]
        async fn request_without_cookie_is_rejected() {
            let response = guarded_app()
                .oneshot(HttpRequest::builder().uri("/probe").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn request_with_corrupted_cookie_is_rejected() {
            let response = guarded_app()
                .oneshot(
                    HttpRequest::builder()
                        .uri("/probe")
                        .header(COOKIE, "token=not-a-real-token")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn verified_identity_reaches_the_handler() {
            let claims = Claims::new("writer@example.com".to_string(), None);
            let token = issue_token(&claims).unwrap();

            let response = guarded_app()
                .oneshot(
                    HttpRequest::builder()
                        .uri("/probe")
                        .header(COOKIE, format!("token={}", token))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&body[..], b"writer@example.com");
        }
    }
}
