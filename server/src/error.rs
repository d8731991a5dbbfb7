use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure body shared by every `/api` route.
#[derive(Serialize, Debug, Clone)]
pub struct ErrorResponse {
  pub success: bool,
  pub error: String,
}

impl ErrorResponse {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      success: false,
      error: message.into(),
    }
  }
}

#[derive(Error, Debug)]
pub enum ApiError {
  #[error("login required")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("upstream request failed (status {status:?}): {body}")]
  UpstreamFailure {
    status: Option<u16>,
    body: String,
    context: &'static str,
  },

  #[error("upstream returned malformed response: {0}")]
  MalformedUpstreamResponse(String),

  #[error("analysis rejected by upstream: {0}")]
  AnalysisRejected(String),

  #[error("database error: {0}")]
  PersistenceFailure(#[from] sea_orm::DbErr),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
  pub fn upstream(context: &'static str, status: Option<u16>, body: impl Into<String>) -> Self {
    Self::UpstreamFailure {
      status,
      body: body.into(),
      context,
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::Forbidden(_) => StatusCode::FORBIDDEN,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::UpstreamFailure { .. } | Self::MalformedUpstreamResponse(_) => {
        StatusCode::BAD_GATEWAY
      }
      Self::AnalysisRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Self::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Short message shown to the browser. Details stay in the server log.
  pub fn public_message(&self) -> String {
    match self {
      Self::Unauthorized => "login_required".to_string(),
      Self::Forbidden(message) | Self::NotFound(message) | Self::BadRequest(message) => {
        message.clone()
      }
      Self::UpstreamFailure { context, .. } => (*context).to_string(),
      Self::MalformedUpstreamResponse(_) => {
        "Analysis service returned an invalid response".to_string()
      }
      Self::AnalysisRejected(message) => message.clone(),
      Self::PersistenceFailure(_) => "Failed to store analysis data".to_string(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(status = status.as_u16(), "{self}");
    } else {
      tracing::warn!(status = status.as_u16(), "{self}");
    }
    (status, Json(ErrorResponse::new(self.public_message()))).into_response()
  }
}
