use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use sea_orm::EntityTrait;
use serde::Serialize;
use tracing::error;

use crate::entity::users;
use crate::error::ApiError;
use crate::session::SessionUser;
use crate::state::AppState;

const DEFAULT_AVATAR: &str =
  "https://wpimg.wallstcn.com/f778738c-e4f8-4870-b634-56703b4acafe.gif";
const SUCCESS_CODE: i32 = 20000;

#[derive(Serialize)]
struct SsoEnvelope<T> {
  code: i32,
  #[serde(skip_serializing_if = "Option::is_none")]
  data: Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  message: Option<String>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct SsoProfile {
  pub roles: Vec<String>,
  pub name: Option<String>,
  pub avatar: String,
  pub introduction: String,
}

impl SsoProfile {
  pub fn from_user(user: &users::Model) -> Self {
    Self {
      roles: vec![user.role.clone().unwrap_or_else(|| "admin".to_string())],
      name: user.name.clone(),
      avatar: user
        .image
        .clone()
        .filter(|image| !image.is_empty())
        .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
      introduction: format!("User ID: {}", user.id),
    }
  }
}

/// Session-to-profile adapter in the envelope the embedded admin UI expects.
pub async fn sso_user(State(state): State<AppState>, headers: HeaderMap) -> Response {
  let Some(user) = current_user(&state, &headers).await else {
    return unauthorized();
  };
  Json(SsoEnvelope {
    code: SUCCESS_CODE,
    data: Some(SsoProfile::from_user(&user)),
    message: None,
  })
  .into_response()
}

async fn current_user(state: &AppState, headers: &HeaderMap) -> Option<users::Model> {
  let session = match SessionUser::from_headers(state, headers).await {
    Ok(session) => session,
    Err(ApiError::Unauthorized) => return None,
    Err(err) => {
      error!("sso session lookup failed: {err}");
      return None;
    }
  };
  match users::Entity::find_by_id(session.user_id).one(&state.db).await {
    Ok(user) => user,
    Err(err) => {
      error!(user_id = session.user_id, "sso user lookup failed: {err}");
      None
    }
  }
}

fn unauthorized() -> Response {
  let body = Json(SsoEnvelope::<()> {
    code: StatusCode::UNAUTHORIZED.as_u16() as i32,
    data: None,
    message: Some("Unauthorized".to_string()),
  });
  (StatusCode::UNAUTHORIZED, body).into_response()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fills_defaults_for_sparse_users() {
    let user = users::Model {
      id: 7,
      name: Some("Ada".to_string()),
      email: "ada@example.com".to_string(),
      image: None,
      role: None,
    };
    let profile = SsoProfile::from_user(&user);
    assert_eq!(profile.roles, vec!["admin".to_string()]);
    assert_eq!(profile.avatar, DEFAULT_AVATAR);
    assert_eq!(profile.introduction, "User ID: 7");
  }
}
