//! Dashboard client for the Uvolution analysis backend.

pub mod api;
pub mod config;
pub mod progress;
pub mod reports;

pub use api::{AnalysisOutcome, AnalysisReport, AnalysisTarget, ClientError, DashboardClient};
pub use reports::{ReportStore, ReportsView};
