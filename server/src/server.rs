use std::time::Instant;

use axum::{
  Json, Router,
  extract::{DefaultBodyLimit, Request},
  http::StatusCode,
  middleware::{self, Next},
  response::{IntoResponse, Response},
  routing::{delete, get, post},
};
use tracing::info;

use crate::analyze::analyze;
use crate::error::ErrorResponse;
use crate::principles::marketing_principles;
use crate::reports::{delete_report, list_reports};
use crate::sso::sso_user;
use crate::state::AppState;

/// Screenshots and exported designs can be large.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
  Router::new()
    .route("/healthz", get(health))
    .route("/api/analyze", post(analyze))
    .route("/api/reports", get(list_reports))
    .route("/api/reports/:id", delete(delete_report))
    .route("/api/marketing-principles", get(marketing_principles))
    .route("/api/auth/sso/user", get(sso_user))
    .fallback(fallback_404)
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    .layer(middleware::from_fn(method_not_allowed))
    .with_state(state)
    .layer(middleware::from_fn(log_requests))
}

async fn health() -> impl IntoResponse {
  StatusCode::OK
}

async fn fallback_404() -> impl IntoResponse {
  (
    StatusCode::NOT_FOUND,
    Json(ErrorResponse::new("HTTP ERROR 404 Not Found")),
  )
}

async fn method_not_allowed(req: Request, next: Next) -> Response {
  let method = req.method().clone();
  let response = next.run(req).await;
  if response.status() != StatusCode::METHOD_NOT_ALLOWED {
    return response;
  }
  let body = Json(ErrorResponse::new(format!(
    "HTTP ERROR 405 Method Not Allowed ({method})"
  )));
  (StatusCode::METHOD_NOT_ALLOWED, body).into_response()
}

async fn log_requests(req: Request, next: Next) -> Response {
  let method = req.method().clone();
  let uri = req.uri().clone();
  let start = Instant::now();
  let response = next.run(req).await;
  info!(
    status = response.status().as_u16(),
    %method,
    %uri,
    elapsed_ms = start.elapsed().as_millis() as u64,
    "request"
  );
  response
}
