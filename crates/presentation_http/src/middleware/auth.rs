//! App token authentication middleware
//!
//! Protected routes expect the token issued at login in the `app_token`
//! header, or as `Authorization: Bearer <token>`. A verified token must carry
//! session claims; they end up in the request extensions as a
//! [`RequestContext`] for the handlers.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use application::{ApplicationError, RequestContext, TokenPort};
use axum::{
    extract::Request,
    http::{HeaderMap, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use domain::{SessionClaims, TokenPayload};
use tower::{Layer, Service};
use tracing::debug;

use crate::{error::ApiError, middleware::RequestId};

/// Header carrying the app token
pub const APP_TOKEN_HEADER: &str = "app_token";

/// Marker on the response naming the user the request ran as
///
/// Lets the request logger attribute entries without re-verifying the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Layer that requires a valid app token
#[derive(Clone)]
pub struct AppTokenAuthLayer {
    tokens: Arc<dyn TokenPort>,
}

impl fmt::Debug for AppTokenAuthLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppTokenAuthLayer").finish_non_exhaustive()
    }
}

impl AppTokenAuthLayer {
    pub fn new(tokens: Arc<dyn TokenPort>) -> Self {
        Self { tokens }
    }
}

impl<S> Layer<S> for AppTokenAuthLayer {
    type Service = AppTokenAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AppTokenAuth {
            inner,
            tokens: Arc::clone(&self.tokens),
        }
    }
}

/// Middleware service for app token authentication
#[derive(Clone)]
pub struct AppTokenAuth<S> {
    inner: S,
    tokens: Arc<dyn TokenPort>,
}

impl<S: fmt::Debug> fmt::Debug for AppTokenAuth<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppTokenAuth")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<S> Service<Request> for AppTokenAuth<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let tokens = Arc::clone(&self.tokens);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let claims = match authenticate(tokens.as_ref(), req.headers()) {
                Ok(claims) => claims,
                Err(e) => return Ok(e.into_response()),
            };

            let user = AuthenticatedUser(claims.user_id.to_string());
            inject_request_context(&mut req, claims);

            let mut response = inner.call(req).await?;
            response.extensions_mut().insert(user);
            Ok(response)
        })
    }
}

/// Pull the app token out of the headers
///
/// `app_token` wins over `Authorization`; a non-Bearer authorization scheme
/// counts as no token.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers.get(APP_TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authenticate(tokens: &dyn TokenPort, headers: &HeaderMap) -> Result<SessionClaims, ApiError> {
    let token = extract_token(headers).ok_or_else(|| ApiError::Unauthorized {
        message: "Missing app token".into(),
        code: "missing_token",
    })?;

    let payload: TokenPayload = tokens
        .verify(token)
        .map_err(|e| ApiError::from(ApplicationError::Token(e)))?;

    let claims = SessionClaims::try_from(&payload).map_err(|e| ApiError::Unauthorized {
        message: format!("Token does not carry a session: {e}"),
        code: "malformed_token",
    })?;

    debug!(user_id = %claims.user_id, "App token verified");
    Ok(claims)
}

/// Inject `RequestContext` into request extensions
///
/// The request ID from [`RequestIdLayer`](crate::middleware::RequestIdLayer)
/// is carried along when present so upstream calls can forward it.
fn inject_request_context(req: &mut Request, claims: SessionClaims) {
    let mut ctx = RequestContext::new(claims);
    if let Some(request_id) = req.extensions().get::<RequestId>() {
        ctx = ctx.with_request_id(request_id.as_str());
    }
    req.extensions_mut().insert(ctx);
}

#[cfg(test)]
mod tests {
    use application::TokenError;
    use axum::{Extension, Router, body::Body, http::StatusCode, routing::get};
    use domain::{Region, UserId};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::middleware::RequestIdLayer;

    /// Accepts `good`, `expired` fails, `plain` verifies without session claims
    struct FakeTokens;

    impl TokenPort for FakeTokens {
        fn issue(&self, payload: &TokenPayload) -> Result<String, TokenError> {
            Ok(payload.get_str("user_id").unwrap_or("plain").to_string())
        }

        fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
            match token {
                "good" => Ok(SessionClaims::new(Region::Eu, UserId::parse("blt1").unwrap())
                    .to_payload()),
                "plain" => Ok(TokenPayload::from_value(json!({"id": 1})).unwrap()),
                "expired" => Err(TokenError::Expired),
                _ => Err(TokenError::InvalidSignature),
            }
        }
    }

    async fn whoami(Extension(ctx): Extension<RequestContext>) -> String {
        format!("{}:{}", ctx.user_id(), ctx.request_id().unwrap_or("-"))
    }

    fn router() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(AppTokenAuthLayer::new(Arc::new(FakeTokens)))
            .layer(RequestIdLayer::new())
    }

    async fn call(req: Request<Body>) -> Response {
        router().oneshot(req).await.unwrap()
    }

    async fn code(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice::<Value>(&bytes).unwrap()["code"].clone()
    }

    fn get_with(header: &str, value: &str) -> Request<Body> {
        Request::builder()
            .uri("/whoami")
            .header(header, value)
            .header("X-Request-Id", "req-7")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn app_token_header_passes() {
        let response = call(get_with(APP_TOKEN_HEADER, "good")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.extensions().get::<AuthenticatedUser>(),
            Some(&AuthenticatedUser("blt1".into()))
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"blt1:req-7");
    }

    #[tokio::test]
    async fn bearer_token_passes() {
        let response = call(get_with("authorization", "Bearer good")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_token_rejected() {
        let response = call(Request::builder().uri("/whoami").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(code(response).await, "missing_token");
    }

    #[tokio::test]
    async fn non_bearer_auth_rejected() {
        let response = call(get_with("authorization", "Basic dXNlcjpwYXNz")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(code(response).await, "missing_token");
    }

    #[tokio::test]
    async fn expired_token_rejected() {
        let response = call(get_with(APP_TOKEN_HEADER, "expired")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(code(response).await, "token_expired");
    }

    #[tokio::test]
    async fn tampered_token_rejected() {
        let response = call(get_with(APP_TOKEN_HEADER, "forged")).await;
        assert_eq!(code(response).await, "invalid_signature");
    }

    #[tokio::test]
    async fn token_without_session_claims_rejected() {
        let response = call(get_with(APP_TOKEN_HEADER, "plain")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(code(response).await, "malformed_token");
    }

    #[test]
    fn app_token_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(APP_TOKEN_HEADER, "a".parse().unwrap());
        headers.insert(AUTHORIZATION, "Bearer b".parse().unwrap());
        assert_eq!(extract_token(&headers), Some("a"));

        headers.remove(APP_TOKEN_HEADER);
        assert_eq!(extract_token(&headers), Some("b"));
    }

    #[test]
    fn blank_tokens_are_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(APP_TOKEN_HEADER, " ".parse().unwrap());
        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(extract_token(&headers), None);
    }
}
