use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use super::access::{AccessDecision, AccessPolicy, Principal};
use crate::auth::{Claims, TokenCodec};
use crate::config::AppConfig;
use crate::error::ApiError;

/// Request context handed to handlers once access is granted
#[derive(Clone, Debug)]
pub struct Session {
    pub principal: Principal,
    pub claims: Option<Claims>,
}

impl Session {
    /// Token subject, or `"anonymous"` for public requests
    pub fn actor(&self) -> &str {
        self.claims
            .as_ref()
            .map(|claims| claims.sub.as_str())
            .unwrap_or("anonymous")
    }
}

/// Shared state of the access-control middleware
pub struct AccessGate {
    codec: TokenCodec,
    session_cookie: String,
    policy: AccessPolicy,
}

impl AccessGate {
    pub fn new(codec: TokenCodec, session_cookie: impl Into<String>) -> Self {
        Self {
            codec,
            session_cookie: session_cookie.into(),
            policy: AccessPolicy,
        }
    }

    pub fn from_config(codec: TokenCodec, config: &AppConfig) -> Self {
        Self::new(codec, config.security.session_cookie.clone())
    }

    /// Bearer header first, then the session cookie
    fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());
        if let Some(token) = bearer {
            return Some(token.to_string());
        }

        CookieJar::from_headers(headers)
            .get(&self.session_cookie)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    }

    /// Decode the session; anything unverifiable is treated as no session
    fn claims(&self, headers: &HeaderMap) -> Option<Claims> {
        let token = self.extract_token(headers)?;
        match self.codec.verify(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::warn!("Ignoring session token: {}", e);
                None
            }
        }
    }
}

/// Access-control middleware applied to the whole router
pub async fn access_control_middleware(
    State(gate): State<Arc<AccessGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = gate.claims(request.headers());
    let principal = Principal::from_claims(claims.as_ref());
    let path = request.uri().path().to_string();

    let decision = gate.policy.evaluate(request.method(), &path, principal);
    tracing::debug!(
        method = %request.method(),
        path = %path,
        principal = ?principal,
        decision = ?decision,
        "Access decision"
    );

    match decision {
        AccessDecision::Allow => {
            request.extensions_mut().insert(Session { principal, claims });
            next.run(request).await
        }
        AccessDecision::SignIn { callback } => {
            let callback = match request.uri().query() {
                Some(query) => format!("{}?{}", callback, query),
                None => callback,
            };
            let encoded: String = url::form_urlencoded::byte_serialize(callback.as_bytes()).collect();
            Redirect::temporary(&format!("/login?callbackUrl={}", encoded)).into_response()
        }
        AccessDecision::RedirectToLogin => Redirect::temporary("/login").into_response(),
        AccessDecision::Unauthorized => ApiError::unauthorized("Unauthorized").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    const SECRET: &str = "middleware-test-secret";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, 1).unwrap()
    }

    fn token(role: Option<&str>) -> String {
        codec()
            .issue("user-1", Some("buyer@example.com".into()), role.map(str::to_string))
            .unwrap()
    }

    async fn whoami(Extension(session): Extension<Session>) -> String {
        session.actor().to_string()
    }

    fn router() -> Router {
        let gate = Arc::new(AccessGate::new(codec(), "session_token"));
        Router::new()
            .route("/api/products", get(|| async { "catalog" }).post(|| async { "created" }))
            .route("/dashboard", get(whoami))
            .route("/account", get(whoami))
            .layer(middleware::from_fn_with_state(gate, access_control_middleware))
    }

    fn request(method: Method, uri: &str, bearer: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn member_cannot_create_products() {
        let response = router()
            .oneshot(request(Method::POST, "/api/products", Some(&token(Some("user")))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await, serde_json::json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn admin_can_create_products() {
        let response = router()
            .oneshot(request(Method::POST, "/api/products", Some(&token(Some("admin")))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn catalog_reads_ignore_tokens() {
        for bearer in [None, Some(token(Some("user"))), Some("garbage".to_string())] {
            let response = router()
                .oneshot(request(Method::GET, "/api/products", bearer.as_deref()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn anonymous_head_on_catalog_is_served() {
        let response = router()
            .oneshot(request(Method::HEAD, "/api/products", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn member_on_dashboard_is_redirected_to_login() {
        let response = router()
            .oneshot(request(Method::GET, "/dashboard", Some(&token(None))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        assert!(to_bytes(response.into_body(), usize::MAX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn anonymous_page_visit_goes_through_sign_in() {
        let response = router()
            .oneshot(request(Method::GET, "/dashboard?tab=orders", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?callbackUrl=%2Fdashboard%3Ftab%3Dorders"
        );
    }

    #[tokio::test]
    async fn expired_token_counts_as_anonymous() {
        let mut claims = Claims::new("user-1".into(), None, Some("admin".into()), 1);
        claims.exp = chrono::Utc::now().timestamp() - 3600;
        let expired = codec().encode(&claims).unwrap();

        let response = router()
            .oneshot(request(Method::POST, "/api/products", Some(&expired)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn session_cookie_is_accepted() {
        let cookie = format!("theme=dark; session_token={}", token(Some("admin")));
        let request = axum::http::Request::builder()
            .uri("/dashboard")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"user-1");
    }

    #[tokio::test]
    async fn member_reaches_unguarded_pages_with_session() {
        let response = router()
            .oneshot(request(Method::GET, "/account", Some(&token(Some("user")))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
