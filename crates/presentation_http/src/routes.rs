//! Route definitions and the middleware stack

use std::{any::Any, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use infrastructure::ServerConfig;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use tracing::Span;

use crate::{
    error::ApiError,
    handlers,
    middleware::{AppTokenAuthLayer, RequestIdLayer, RequestLogLayer},
    state::AppState,
};

/// Create the router with all routes
///
/// Everything except health, login and the SMS token request sits behind
/// app token authentication.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/profile", get(handlers::user::profile))
        .route(
            "/test-stack/{orgId}/{projectId}",
            post(handlers::projects::field_mapping),
        )
        .route(
            "/test-stack/{projectId}",
            post(handlers::projects::delete_test_stack),
        )
        .route(
            "/project/{projectId}",
            get(handlers::projects::project_details),
        )
        .route("/logs", get(handlers::logs::search_logs))
        .route_layer(AppTokenAuthLayer::new(Arc::clone(&state.tokens)));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/user-session", post(handlers::auth::login))
        .route("/request-token-sms", post(handlers::auth::request_sms_token))
        .merge(protected)
        .with_state(state)
}

/// Wrap a router in the full request pipeline
///
/// Outermost first: request id, tracing, request log, CORS, body limit,
/// optional timeout, panic recovery. Layers added later wrap earlier ones.
pub fn with_middleware(router: Router, state: &AppState, server: &ServerConfig) -> Router {
    let mut app = router.layer(CatchPanicLayer::custom(handle_panic));

    if let Some(secs) = server.request_timeout_secs.filter(|s| *s > 0) {
        app = app.layer(TimeoutLayer::new(Duration::from_secs(secs)));
    }

    app = app.layer(RequestBodyLimitLayer::new(server.max_body_size_json_bytes));

    if server.cors_enabled {
        app = app.layer(cors_layer(&server.allowed_origins));
    }

    app.layer(RequestLogLayer::new(Arc::clone(&state.log_service)))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(RequestIdLayer::new())
}

/// Routes plus middleware, ready to serve
pub fn create_app(state: AppState, server: &ServerConfig) -> Router {
    let router = create_router(state.clone());
    with_middleware(router, &state, server)
}

/// CORS policy: any origin when none are configured, otherwise exactly those
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(AnyOrigin)
            .allow_methods(AnyOrigin)
            .allow_headers(AnyOrigin);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AnyOrigin)
}

/// Transport span without the query string, which may carry tokens
pub(crate) fn request_span(request: &Request) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        version = ?request.version(),
    )
}

/// Turn a handler panic into the same JSON 500 every other failure produces
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    ApiError::Internal(format!("Handler panicked: {detail}")).into_response()
}
