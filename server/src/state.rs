use sea_orm::DatabaseConnection;

use crate::upstream::AnalysisService;

#[derive(Clone)]
pub struct AppState {
  pub db: DatabaseConnection,
  pub analysis: AnalysisService,
}

impl AppState {
  pub fn new(db: DatabaseConnection, analysis_api_url: impl Into<String>) -> Self {
    Self {
      db,
      analysis: AnalysisService::new(reqwest::Client::new(), analysis_api_url),
    }
  }
}
