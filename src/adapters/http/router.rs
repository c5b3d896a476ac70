//! Top-level router.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::main_page::main_page_routes;
use super::middleware::{auth_filter, logout_filter};
use super::socket::socket_routes;
use super::state::AppState;
use crate::adapters::websocket::ws_handler;
use crate::config::ServerConfig;

/// Routes and filters without transport layers. Used directly by tests.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/main", main_page_routes(state.clone()))
        .nest("/api/socket", socket_routes(state.clone()))
        .route("/ws", get(ws_handler))
        // filters below must also see unmatched paths such as /api/logout
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn_with_state(state.clone(), auth_filter))
        .layer(middleware::from_fn_with_state(state.clone(), logout_filter))
        .with_state(state)
}

/// Full application router with tracing, request ids, CORS, timeout and
/// compression.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    api_router(state)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}
