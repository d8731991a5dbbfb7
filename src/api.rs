use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as _;
use thiserror::Error;
use tracing::debug;

const DEFAULT_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("Could not connect to the server at {0}. Is it running?")]
  Connect(String),

  #[error("The request timed out after {0}s. Please try again.")]
  Timeout(u64),

  #[error("Error ({status}): {message}")]
  Api { status: u16, message: String },

  #[error("Server returned an invalid response. Please try again or check server logs.")]
  InvalidResponse,

  #[error("Request failed: {0}")]
  Request(String),

  #[error("Could not read {path}: {source}")]
  File {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("Config error: {0}")]
  Config(String),
}

impl ClientError {
  pub fn is_unauthorized(&self) -> bool {
    matches!(self, Self::Api { status: 401, .. })
  }
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicMetrics {
  pub clutter_score: f64,
  pub focus_ratio: f64,
  pub hotspot_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedMetrics {
  pub acs: f64,
  pub vci: f64,
  pub cle: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
  #[serde(default)]
  pub basic: Option<BasicMetrics>,
  #[serde(default)]
  pub advanced: Option<AdvancedMetrics>,
}

/// A stored analysis as listed by `/api/reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
  pub id: i64,
  pub original_image: String,
  pub saliency_map: String,
  pub report: String,
  #[serde(default)]
  pub ia_structure: Option<Value>,
  #[serde(default)]
  pub redesign_suggestion: Option<Value>,
  #[serde(default)]
  pub marketing_consultation: Option<Value>,
  #[serde(default)]
  pub metrics: Option<ReportMetrics>,
  pub created_at: String,
}

impl AnalysisReport {
  pub fn has_premium_sections(&self) -> bool {
    self.ia_structure.is_some()
      || self.redesign_suggestion.is_some()
      || self.marketing_consultation.is_some()
  }
}

/// Reply from `/api/analyze`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisOutcome {
  pub id: i64,
  #[serde(default)]
  pub plan: Option<String>,
  pub original_image: String,
  pub saliency_map: String,
  pub report: String,
  #[serde(default)]
  pub ia_structure: Option<Value>,
  #[serde(default)]
  pub redesign_suggestion: Option<Value>,
  #[serde(default)]
  pub marketing_consultation: Option<Value>,
  #[serde(default)]
  pub metrics: Option<ReportMetrics>,
  #[serde(default)]
  pub subscription_limited: bool,
}

#[derive(Debug, Deserialize)]
struct ReportList {
  data: Vec<AnalysisReport>,
}

#[derive(Debug, Clone)]
pub enum AnalysisTarget {
  File(PathBuf),
  Url(String),
}

pub enum WorkerResult {
  Uploading(u64),
  Ok(u64, AnalysisOutcome),
  Err(u64, String),
}

#[derive(Clone)]
pub struct DashboardClient {
  client: Client,
  api_url: String,
  session_token: Option<String>,
  timeout_secs: u64,
}

impl DashboardClient {
  pub fn new(api_url: &str, session_token: Option<String>) -> Result<Self, ClientError> {
    let timeout_secs = std::env::var("API_TIMEOUT_SECS")
      .ok()
      .and_then(|val| val.parse::<u64>().ok())
      .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let client = Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .connect_timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| ClientError::Request(e.to_string()))?;
    Ok(Self {
      client,
      api_url: api_url.trim_end_matches('/').to_string(),
      session_token: session_token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty()),
      timeout_secs,
    })
  }

  pub fn api_url(&self) -> &str {
    &self.api_url
  }

  pub fn analyze(&self, target: &AnalysisTarget) -> Result<AnalysisOutcome, ClientError> {
    match target {
      AnalysisTarget::File(path) => self.analyze_file(path),
      AnalysisTarget::Url(url) => self.analyze_url(url),
    }
  }

  pub fn analyze_file(&self, path: &Path) -> Result<AnalysisOutcome, ClientError> {
    let bytes = fs::read(path).map_err(|source| ClientError::File {
      path: path.to_path_buf(),
      source,
    })?;
    let file_name = path
      .file_name()
      .and_then(|name| name.to_str())
      .unwrap_or("upload.png")
      .to_string();
    let part = reqwest::blocking::multipart::Part::bytes(bytes)
      .file_name(file_name)
      .mime_str(mime_for_path(path))
      .map_err(|e| ClientError::Request(e.to_string()))?;
    let form = reqwest::blocking::multipart::Form::new().part("file", part);
    self.execute(self.client.post(self.url("/api/analyze")).multipart(form))
  }

  pub fn analyze_url(&self, url: &str) -> Result<AnalysisOutcome, ClientError> {
    let body = serde_json::json!({ "url": url });
    self.execute(self.client.post(self.url("/api/analyze")).json(&body))
  }

  pub fn list_reports(&self) -> Result<Vec<AnalysisReport>, ClientError> {
    let list: ReportList = self.execute(self.client.get(self.url("/api/reports")))?;
    Ok(list.data)
  }

  pub fn delete_report(&self, id: i64) -> Result<(), ClientError> {
    let _: Value = self.execute(self.client.delete(self.url(&format!("/api/reports/{id}"))))?;
    Ok(())
  }

  pub fn marketing_principles(&self) -> Result<Value, ClientError> {
    self.execute(self.client.get(self.url("/api/marketing-principles")))
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.api_url, path)
  }

  fn execute<T: DeserializeOwned>(&self, mut request: RequestBuilder) -> Result<T, ClientError> {
    if let Some(token) = self.session_token.as_deref() {
      request = request.bearer_auth(token);
    }
    let request = request.build().map_err(|e| self.map_request_error(e))?;
    log_request_details(&request);

    let response = self
      .client
      .execute(request)
      .map_err(|e| self.map_request_error(e))?;
    let status = response.status();
    let body_bytes = response.bytes().map_err(|e| self.map_request_error(e))?;
    parse_body(status, &body_bytes)
  }

  fn map_request_error(&self, err: reqwest::Error) -> ClientError {
    debug!(
      connect = err.is_connect(),
      timeout = err.is_timeout(),
      body = err.is_body(),
      decode = err.is_decode(),
      "network error for {}: {err}",
      self.api_url
    );
    let mut source = err.source();
    while let Some(src) = source {
      debug!("  caused by: {src}");
      source = src.source();
    }
    if err.is_connect() {
      return ClientError::Connect(self.api_url.clone());
    }
    if err.is_timeout() {
      return ClientError::Timeout(self.timeout_secs);
    }
    if err.is_body() || err.is_decode() {
      return ClientError::InvalidResponse;
    }
    ClientError::Request(err.to_string())
  }
}

/// Runs one analysis on a worker thread, reporting progress over `tx`.
pub fn spawn_analysis(
  client: DashboardClient,
  target: AnalysisTarget,
  tx: Sender<WorkerResult>,
  request_id: u64,
) -> thread::JoinHandle<()> {
  thread::spawn(move || {
    let _ = tx.send(WorkerResult::Uploading(request_id));
    match client.analyze(&target) {
      Ok(outcome) => {
        let _ = tx.send(WorkerResult::Ok(request_id, outcome));
      }
      Err(err) => {
        let _ = tx.send(WorkerResult::Err(request_id, err.to_string()));
      }
    }
  })
}

fn parse_body<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ClientError> {
  if !status.is_success() {
    let message = serde_json::from_slice::<ErrorBody>(body)
      .map(|parsed| parsed.error)
      .ok()
      .filter(|message| !message.is_empty())
      .unwrap_or_else(|| {
        let text = String::from_utf8_lossy(body).trim().to_string();
        if text.is_empty() {
          status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
        } else {
          text
        }
      });
    return Err(ClientError::Api {
      status: status.as_u16(),
      message,
    });
  }

  serde_json::from_slice::<T>(body).map_err(|err| {
    debug!(
      "API response parse error: {err}. Body: {}",
      String::from_utf8_lossy(body)
    );
    ClientError::InvalidResponse
  })
}

fn mime_for_path(path: &Path) -> &'static str {
  let ext = path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| ext.to_ascii_lowercase());
  match ext.as_deref() {
    Some("png") => "image/png",
    Some("jpg") | Some("jpeg") => "image/jpeg",
    Some("webp") => "image/webp",
    Some("gif") => "image/gif",
    _ => "application/octet-stream",
  }
}

fn log_request_details(request: &reqwest::blocking::Request) {
  debug!("Request: {} {}", request.method(), request.url());
  for (name, value) in request.headers() {
    if name == AUTHORIZATION {
      debug!("  {name}: Bearer ***");
    } else {
      debug!("  {name}: {}", value.to_str().unwrap_or("<binary>"));
    }
  }
}
