use axum::{
  async_trait,
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entity::sessions;
use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session_token";

/// Authenticated caller. Extracting it rejects with `ApiError::Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser {
  pub user_id: i32,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    Self::from_headers(state, &parts.headers).await
  }
}

impl SessionUser {
  pub async fn from_headers(state: &AppState, headers: &HeaderMap) -> Result<Self, ApiError> {
    let token = session_token(headers).ok_or(ApiError::Unauthorized)?;
    let user_id = lookup_session(&state.db, &token)
      .await?
      .ok_or(ApiError::Unauthorized)?;
    Ok(Self { user_id })
  }
}

/// Bearer token first, then the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .map(|v| v.trim())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty());
  if bearer.is_some() {
    return bearer;
  }

  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == SESSION_COOKIE)
    .map(|(_, value)| value.trim().to_string())
    .filter(|v| !v.is_empty())
}

async fn lookup_session(db: &DatabaseConnection, token: &str) -> Result<Option<i32>, ApiError> {
  let session = sessions::Entity::find()
    .filter(sessions::Column::SessionToken.eq(token))
    .one(db)
    .await?;
  Ok(
    session
      .filter(|session| session.expires > Utc::now())
      .map(|session| session.user_id),
  )
}
