//! Report list state for the dashboard.
//!
//! Deletes are applied to the local list first, then sent to the server, then
//! the list is always refetched so the local copy ends up matching the server
//! whether the delete went through or not.

use crate::api::{AnalysisReport, ClientError, DashboardClient};

pub trait ReportStore {
  fn fetch_reports(&self) -> Result<Vec<AnalysisReport>, ClientError>;
  fn remove_report(&self, id: i64) -> Result<(), ClientError>;
}

impl ReportStore for DashboardClient {
  fn fetch_reports(&self) -> Result<Vec<AnalysisReport>, ClientError> {
    self.list_reports()
  }

  fn remove_report(&self, id: i64) -> Result<(), ClientError> {
    self.delete_report(id)
  }
}

#[derive(Debug, Default)]
pub struct ReportsView {
  reports: Vec<AnalysisReport>,
  selected: Option<i64>,
  loaded: bool,
  last_error: Option<String>,
}

impl ReportsView {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn reports(&self) -> &[AnalysisReport] {
    &self.reports
  }

  pub fn is_loading(&self) -> bool {
    !self.loaded && self.last_error.is_none()
  }

  pub fn last_error(&self) -> Option<&str> {
    self.last_error.as_deref()
  }

  pub fn selected(&self) -> Option<&AnalysisReport> {
    let id = self.selected?;
    self.reports.iter().find(|report| report.id == id)
  }

  /// Returns false when `id` is not in the current list.
  pub fn select(&mut self, id: i64) -> bool {
    if self.reports.iter().any(|report| report.id == id) {
      self.selected = Some(id);
      true
    } else {
      false
    }
  }

  pub fn clear_selection(&mut self) {
    self.selected = None;
  }

  pub fn revalidate(&mut self, store: &impl ReportStore) {
    match store.fetch_reports() {
      Ok(reports) => {
        self.reports = reports;
        self.loaded = true;
        self.last_error = None;
      }
      Err(err) => {
        tracing::warn!("Failed to fetch reports: {err}");
        self.last_error = Some(format!("Failed to fetch reports: {err}"));
      }
    }
  }

  pub fn delete(&mut self, store: &impl ReportStore, id: i64) -> Result<(), ClientError> {
    self.reports.retain(|report| report.id != id);

    let outcome = store.remove_report(id);
    if outcome.is_ok() && self.selected == Some(id) {
      self.selected = None;
    }

    self.revalidate(store);
    if let Err(err) = &outcome {
      tracing::warn!(report_id = id, "Failed to delete report: {err}");
      self.last_error = Some(format!("Failed to delete report: {err}"));
    }
    outcome
  }
}
