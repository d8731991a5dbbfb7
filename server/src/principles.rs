use axum::{Json, extract::State};
use serde_json::Value;

use crate::error::ApiResult;
use crate::state::AppState;

/// Knowledge-base payload from the analysis service, passed through as-is.
pub async fn marketing_principles(State(state): State<AppState>) -> ApiResult<Json<Value>> {
  Ok(Json(state.analysis.marketing_principles().await?))
}
