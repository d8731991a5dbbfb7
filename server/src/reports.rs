use axum::{
  Json,
  extract::{Path, State},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::{info, warn};

use crate::entity::analyses;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionUser;
use crate::state::AppState;
use crate::upstream::{AnalysisService, relative_file_path};

#[derive(Serialize)]
pub struct ReportList {
  pub success: bool,
  pub data: Vec<analyses::Model>,
}

#[derive(Serialize)]
pub struct Deleted {
  pub success: bool,
}

pub async fn list_reports(
  State(state): State<AppState>,
  user: SessionUser,
) -> ApiResult<Json<ReportList>> {
  let data = reports_for_user(&state.db, user.user_id).await?;
  Ok(Json(ReportList {
    success: true,
    data,
  }))
}

/// The owner's analyses, newest first.
pub async fn reports_for_user(
  db: &DatabaseConnection,
  user_id: i32,
) -> ApiResult<Vec<analyses::Model>> {
  Ok(
    analyses::Entity::find()
      .filter(analyses::Column::UserId.eq(user_id))
      .order_by_desc(analyses::Column::CreatedAt)
      .order_by_desc(analyses::Column::Id)
      .all(db)
      .await?,
  )
}

pub async fn delete_report(
  State(state): State<AppState>,
  user: SessionUser,
  Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
  let report_id: i32 = id
    .trim()
    .parse()
    .map_err(|_| ApiError::BadRequest("Invalid report ID".to_string()))?;

  let report = analyses::Entity::find_by_id(report_id)
    .one(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;

  if report.user_id != user.user_id {
    return Err(ApiError::Forbidden("Report belongs to another user".to_string()));
  }

  cleanup_files(&state.analysis, &report).await;

  report.delete(&state.db).await?;
  info!(user_id = user.user_id, report_id, "report deleted");
  Ok(Json(Deleted { success: true }))
}

/// Best-effort removal of the generated files. Failures are logged only.
async fn cleanup_files(analysis: &AnalysisService, report: &analyses::Model) {
  let files: Vec<String> = report
    .file_references()
    .into_iter()
    .filter_map(relative_file_path)
    .collect();
  if files.is_empty() {
    return;
  }

  match analysis.delete_files(&files).await {
    Ok(outcome) => {
      for error in &outcome.errors {
        warn!(report_id = report.id, "file cleanup: {error}");
      }
      info!(
        report_id = report.id,
        deleted = outcome.deleted.len(),
        requested = files.len(),
        "file cleanup finished"
      );
    }
    Err(err) => {
      warn!(report_id = report.id, "file cleanup failed: {err}");
    }
  }
}
