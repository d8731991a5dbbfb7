use std::env;

use uvolution_server::config::{ServerConfig, sanitize_db_url};
use uvolution_server::{AppState, create_router, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .init();

  let config = ServerConfig::load();

  let args: Vec<String> = env::args().collect();
  let run_migrations_only = args.iter().any(|arg| arg == "migrate");
  let run_seed_only = args.iter().any(|arg| arg == "seed");
  let run_reset = args.iter().any(|arg| arg == "reset");

  if run_reset {
    db::reset(&config).await?;
    tracing::info!("Database reset and migrations applied.");
    return Ok(());
  }

  let db = db::connect(&config).await?;
  db::init_db(&db, config.database_name.as_deref()).await?;
  if run_migrations_only {
    tracing::info!("Migrations applied.");
    return Ok(());
  }
  if run_seed_only {
    db::seed_db(&db).await?;
    tracing::info!("Seed data applied.");
    return Ok(());
  }

  let state = AppState::new(db, config.analysis_api_url.clone());
  let app = create_router(state);

  tracing::info!(
    "Server running on http://{} (db: {}, analysis service: {})",
    config.server_addr,
    sanitize_db_url(&config.database_url),
    config.analysis_api_url
  );
  let listener = tokio::net::TcpListener::bind(&config.server_addr).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
