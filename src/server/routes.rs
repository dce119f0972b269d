// server/routes.rs

//! Routes of the configuration and health services.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::USER_AGENT;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{routing::get, Json, Router};
use log::*;
use serde_json::{json, Value};

use super::metrics::record_request;
use crate::backend::client::{ConfigResponse, CONFIG_PATH};

/// Router serving the configuration resource with the given `mode`.
pub fn config_app(mode: Option<String>) -> Router {
    let config = Arc::new(ConfigResponse { mode });
    Router::new()
        .route(CONFIG_PATH, get(config_data))
        .with_state(config)
        .layer(middleware::from_fn(log_request))
}

/// Router of the health service.
pub fn health_app() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .layer(middleware::from_fn(log_request))
}

async fn config_data(State(config): State<Arc<ConfigResponse>>) -> Json<ConfigResponse> {
    Json(config.as_ref().clone())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME")
    }))
}

async fn ready_check() -> Json<Value> {
    Json(json!({
        "status": "ready"
    }))
}

/// Logs one line per request, at error level for server errors,
/// and records it in the request metrics.
async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let response = next.run(request).await;

    let status = response.status();
    let latency = start.elapsed();
    record_request(method.as_str(), &path, status.as_u16(), latency.as_secs_f64());
    let level = if status.is_server_error() {
        Level::Error
    } else {
        Level::Info
    };
    log!(
        level,
        "status={} method={} path={} ip={} latency={:?} user-agent={:?}",
        status.as_u16(),
        method,
        path,
        ip,
        latency,
        user_agent
    );
    response
}
