//! Client for the external analysis service.
//!
//! The service owns the saliency model and every generated file. This side only
//! forwards requests, tags them with the caller's plan and parses the replies.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::plan::Plan;

const ANALYZE_CONTEXT: &str = "Failed to process image analysis";
const PRINCIPLES_CONTEXT: &str = "Failed to fetch marketing principles";
const DELETE_CONTEXT: &str = "Failed to delete analysis files";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
  /// Required; a 2xx body without it is not an analysis reply.
  pub success: bool,
  #[serde(default)]
  pub original_image: String,
  #[serde(default)]
  pub saliency_map: String,
  #[serde(default)]
  pub report: String,
  #[serde(default)]
  pub ia_structure: Option<Value>,
  #[serde(default)]
  pub redesign_suggestion: Option<Value>,
  #[serde(default)]
  pub marketing_consultation: Option<Value>,
  #[serde(default)]
  pub metrics: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(default)]
  pub subscription_limited: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteFilesReport {
  #[serde(default)]
  pub deleted: Vec<String>,
  #[serde(default)]
  pub errors: Vec<String>,
}

#[derive(Serialize)]
struct AnalyzeUrlBody<'a> {
  url: &'a str,
  plan: &'a str,
}

#[derive(Serialize)]
struct DeleteFilesBody<'a> {
  files: &'a [String],
}

/// A file received from the browser, ready to forward.
#[derive(Debug, Clone)]
pub struct Upload {
  pub file_name: String,
  pub content_type: Option<String>,
  pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct AnalysisService {
  client: reqwest::Client,
  base_url: String,
}

impl AnalysisService {
  pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
    let base_url = base_url.into();
    Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
    }
  }

  pub async fn analyze_file(&self, upload: Upload, plan: Plan) -> ApiResult<AnalysisResult> {
    let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
    if let Some(content_type) = upload.content_type.as_deref() {
      part = part
        .mime_str(content_type)
        .map_err(|err| ApiError::BadRequest(format!("Invalid content type: {err}")))?;
    }
    let form = Form::new().part("file", part);

    let response = self
      .client
      .post(format!("{}/analyze", self.base_url))
      .query(&[("plan", plan.as_str())])
      .multipart(form)
      .send()
      .await
      .map_err(|err| ApiError::upstream(ANALYZE_CONTEXT, None, err.to_string()))?;
    read_analysis(response).await
  }

  pub async fn analyze_url(&self, url: &str, plan: Plan) -> ApiResult<AnalysisResult> {
    let response = self
      .client
      .post(format!("{}/analyze-url", self.base_url))
      .json(&AnalyzeUrlBody {
        url,
        plan: plan.as_str(),
      })
      .send()
      .await
      .map_err(|err| ApiError::upstream(ANALYZE_CONTEXT, None, err.to_string()))?;
    read_analysis(response).await
  }

  /// Asks the service to remove generated files. The reply body is informational.
  pub async fn delete_files(&self, files: &[String]) -> ApiResult<DeleteFilesReport> {
    let response = self
      .client
      .post(format!("{}/delete-files", self.base_url))
      .json(&DeleteFilesBody { files })
      .send()
      .await
      .map_err(|err| ApiError::upstream(DELETE_CONTEXT, None, err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ApiError::upstream(DELETE_CONTEXT, Some(status.as_u16()), body));
    }
    Ok(response.json().await.unwrap_or_default())
  }

  pub async fn marketing_principles(&self) -> ApiResult<Value> {
    let response = self
      .client
      .get(format!("{}/marketing-principles", self.base_url))
      .send()
      .await
      .map_err(|err| ApiError::upstream(PRINCIPLES_CONTEXT, None, err.to_string()))?;
    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|err| {
        ApiError::upstream(PRINCIPLES_CONTEXT, Some(status.as_u16()), err.to_string())
      })?;
    if !status.is_success() {
      return Err(ApiError::upstream(PRINCIPLES_CONTEXT, Some(status.as_u16()), body));
    }
    serde_json::from_str(&body)
      .map_err(|err| ApiError::MalformedUpstreamResponse(format!("{err}; body: {body}")))
  }
}

async fn read_analysis(response: reqwest::Response) -> ApiResult<AnalysisResult> {
  let status = response.status();
  let body = response
    .text()
    .await
    .map_err(|err| ApiError::upstream(ANALYZE_CONTEXT, Some(status.as_u16()), err.to_string()))?;
  if !status.is_success() {
    return Err(ApiError::upstream(ANALYZE_CONTEXT, Some(status.as_u16()), body));
  }

  let result: AnalysisResult = serde_json::from_str(&body)
    .map_err(|err| ApiError::MalformedUpstreamResponse(format!("{err}; body: {body}")))?;
  if !result.success {
    let message = result
      .error
      .clone()
      .filter(|message| !message.trim().is_empty())
      .unwrap_or_else(|| "Analysis failed".to_string());
    return Err(ApiError::AnalysisRejected(message));
  }
  if result.original_image.is_empty()
    || result.saliency_map.is_empty()
    || result.report.is_empty()
  {
    return Err(ApiError::MalformedUpstreamResponse(format!(
      "successful analysis without file references; body: {body}"
    )));
  }
  Ok(result)
}

/// Path the service accepts for `/delete-files`, e.g. `uploads/a.png`.
/// Stored references may be absolute URLs on the service origin.
pub fn relative_file_path(reference: &str) -> Option<String> {
  let reference = reference.trim();
  if reference.is_empty() {
    return None;
  }
  let path = match reqwest::Url::parse(reference) {
    Ok(url) if url.has_host() => url.path().to_string(),
    _ => reference.to_string(),
  };
  let path = path.trim_start_matches('/');
  if path.is_empty() {
    None
  } else {
    Some(path.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_service_origin_from_references() {
    assert_eq!(
      relative_file_path("http://localhost:8000/uploads/a.png").as_deref(),
      Some("uploads/a.png")
    );
    assert_eq!(
      relative_file_path("https://ai.example.com/reports/report_a_20260101.html").as_deref(),
      Some("reports/report_a_20260101.html")
    );
  }

  #[test]
  fn keeps_relative_references() {
    assert_eq!(relative_file_path("uploads/a.png").as_deref(), Some("uploads/a.png"));
    assert_eq!(relative_file_path("/outputs/s.png").as_deref(), Some("outputs/s.png"));
    assert_eq!(relative_file_path("   "), None);
    assert_eq!(relative_file_path("http://localhost:8000/"), None);
  }

  #[test]
  fn parses_minimal_failure_body() {
    let body = r#"{"success": false, "error": "Failed to capture screenshot"}"#;
    let result: AnalysisResult = serde_json::from_str(body).unwrap();
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Failed to capture screenshot"));
    assert!(result.metrics.is_none());
  }

  #[test]
  fn bodies_without_success_flag_do_not_parse() {
    assert!(serde_json::from_str::<AnalysisResult>("{}").is_err());
    assert!(serde_json::from_str::<AnalysisResult>(r#"{"status": "healthy"}"#).is_err());
  }
}
