//! Uvolution dashboard backend.
//!
//! Authenticates browser sessions, forwards analysis requests to the external
//! analysis service with the caller's plan attached, strips premium fields for
//! unpaid plans and stores each result as an analysis record.

pub mod analyze;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod plan;
pub mod principles;
pub mod reports;
pub mod server;
pub mod session;
pub mod sso;
pub mod state;
pub mod upstream;

pub use server::create_router;
pub use state::AppState;
