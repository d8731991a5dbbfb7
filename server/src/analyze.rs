use axum::{
  Json,
  extract::{FromRequest, Multipart, Request, State},
  http::header,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::entity::analyses;
use crate::error::{ApiError, ApiResult};
use crate::plan::{Plan, apply_plan_policy, resolve_plan};
use crate::session::SessionUser;
use crate::state::AppState;
use crate::upstream::{AnalysisResult, Upload};

#[derive(Deserialize)]
pub struct AnalyzeUrlRequest {
  #[serde(default)]
  pub url: String,
}

/// Inbound payload after content-type dispatch.
#[derive(Debug)]
pub enum AnalyzeInput {
  File(Upload),
  Url(String),
}

/// The upstream analysis passed through with its snake_case keys, plus `id` and `plan`.
#[derive(Serialize)]
pub struct AnalyzeResponse {
  pub id: i32,
  pub plan: Plan,
  #[serde(flatten)]
  pub result: AnalysisResult,
}

pub async fn analyze(
  State(state): State<AppState>,
  user: SessionUser,
  request: Request,
) -> ApiResult<Json<AnalyzeResponse>> {
  let input = read_input(&state, request).await?;
  let plan = resolve_plan(&state.db, user.user_id).await?;

  let result = match input {
    AnalyzeInput::File(upload) => {
      info!(
        user_id = user.user_id,
        %plan,
        bytes = upload.bytes.len(),
        file_name = %upload.file_name,
        "analyze file"
      );
      state.analysis.analyze_file(upload, plan).await?
    }
    AnalyzeInput::Url(url) => {
      info!(user_id = user.user_id, %plan, %url, "analyze url");
      state.analysis.analyze_url(&url, plan).await?
    }
  };

  let result = apply_plan_policy(plan, result);
  let record = insert_analysis(&state.db, user.user_id, &result).await?;
  info!(
    user_id = user.user_id,
    record_id = record.id,
    subscription_limited = result.subscription_limited,
    "analysis stored"
  );

  Ok(Json(AnalyzeResponse {
    id: record.id,
    plan,
    result,
  }))
}

async fn read_input(state: &AppState, request: Request) -> ApiResult<AnalyzeInput> {
  let content_type = request
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or("")
    .to_ascii_lowercase();

  if content_type.starts_with("multipart/form-data") {
    let multipart = Multipart::from_request(request, state)
      .await
      .map_err(|err| ApiError::BadRequest(format!("Invalid multipart body: {err}")))?;
    return read_upload(multipart).await.map(AnalyzeInput::File);
  }

  if content_type.starts_with("application/json") {
    let Json(body) = Json::<AnalyzeUrlRequest>::from_request(request, state)
      .await
      .map_err(|err| ApiError::BadRequest(format!("Invalid JSON body: {err}")))?;
    let url = body.url.trim();
    if url.is_empty() {
      return Err(ApiError::BadRequest("Missing `url` in request body".to_string()));
    }
    return Ok(AnalyzeInput::Url(url.to_string()));
  }

  Err(ApiError::BadRequest(
    "Expected multipart/form-data or application/json".to_string(),
  ))
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|err| ApiError::BadRequest(format!("Failed to read multipart: {err}")))?
  {
    if field.name() != Some("file") {
      continue;
    }
    let file_name = field
      .file_name()
      .map(str::trim)
      .filter(|name| !name.is_empty())
      .map(str::to_string)
      .unwrap_or_else(|| format!("{}.png", Uuid::new_v4()));
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
      .bytes()
      .await
      .map_err(|err| ApiError::BadRequest(format!("Failed to read upload bytes: {err}")))?;
    if bytes.is_empty() {
      return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    return Ok(Upload {
      file_name,
      content_type,
      bytes: bytes.to_vec(),
    });
  }
  Err(ApiError::BadRequest("Missing `file` field in multipart".to_string()))
}

async fn insert_analysis(
  db: &DatabaseConnection,
  user_id: i32,
  result: &AnalysisResult,
) -> ApiResult<analyses::Model> {
  let active = analyses::ActiveModel {
    user_id: Set(user_id),
    original_image: Set(result.original_image.clone()),
    saliency_map: Set(result.saliency_map.clone()),
    report: Set(result.report.clone()),
    ia_structure: Set(result.ia_structure.clone()),
    redesign_suggestion: Set(result.redesign_suggestion.clone()),
    marketing_consultation: Set(result.marketing_consultation.clone()),
    metrics: Set(result.metrics.clone()),
    created_at: Set(Utc::now()),
    ..Default::default()
  };
  Ok(active.insert(db).await?)
}
