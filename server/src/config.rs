use std::env;

use tracing::info;

const DEFAULT_ANALYSIS_API_URL: &str = "http://localhost:8000";
const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3005";

#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub database_url: String,
  pub database_name: Option<String>,
  pub analysis_api_url: String,
  pub server_addr: String,
}

impl ServerConfig {
  /// Reads `server/.env`, then `.env`, then the process environment.
  pub fn load() -> Self {
    dotenvy::from_path("server/.env").ok();
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
      let host = env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string());
      let port = env::var("DATABASE_PORT").unwrap_or_else(|_| "3306".to_string());
      let name = env::var("DATABASE_NAME").unwrap_or_default();
      let user = env::var("DATABASE_USER").unwrap_or_default();
      let password = env::var("DATABASE_PASSWORD").unwrap_or_default();
      mysql_url(&host, &port, &name, &user, &password)
    });
    let database_name = env::var("DATABASE_NAME")
      .ok()
      .or_else(|| database_name_from_url(&database_url));

    let analysis_api_url = env::var("ANALYSIS_API_URL")
      .or_else(|_| env::var("PYTHON_API_URL"))
      .unwrap_or_else(|_| {
        info!("ANALYSIS_API_URL not set, using default: {DEFAULT_ANALYSIS_API_URL}");
        DEFAULT_ANALYSIS_API_URL.to_string()
      });
    let server_addr =
      env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string());

    Self {
      database_url,
      database_name,
      analysis_api_url: analysis_api_url.trim_end_matches('/').to_string(),
      server_addr,
    }
  }

  pub fn is_mysql(&self) -> bool {
    self.database_url.starts_with("mysql://")
  }
}

fn mysql_url(host: &str, port: &str, name: &str, user: &str, password: &str) -> String {
  if user.is_empty() {
    format!("mysql://{host}:{port}/{name}")
  } else if password.is_empty() {
    format!("mysql://{user}@{host}:{port}/{name}")
  } else {
    format!("mysql://{user}:{password}@{host}:{port}/{name}")
  }
}

/// Masks the password portion of a connection URL for logging.
pub fn sanitize_db_url(url: &str) -> String {
  let Some(scheme_idx) = url.find("://") else {
    return url.to_string();
  };
  let (scheme, rest) = url.split_at(scheme_idx + 3);
  let Some(at_idx) = rest.find('@') else {
    return url.to_string();
  };
  let (creds, host) = rest.split_at(at_idx);
  if let Some(colon_idx) = creds.find(':') {
    let user = &creds[..colon_idx];
    return format!("{scheme}{user}:***{host}");
  }
  format!("{scheme}{creds}{host}")
}

pub fn database_name_from_url(url: &str) -> Option<String> {
  if url.starts_with("sqlite:") {
    return None;
  }
  let without_params = url.split('?').next().unwrap_or(url);
  let after_scheme = without_params.split_once("://").map(|(_, rest)| rest)?;
  let (_, name) = after_scheme.split_once('/')?;
  if name.is_empty() {
    None
  } else {
    Some(name.to_string())
  }
}

pub fn database_url_with_db(url: &str, db_name: &str) -> String {
  format!("{}/{db_name}", server_url(url))
}

/// Connection URL pointing at the server rather than a schema.
pub fn server_url(url: &str) -> String {
  let base = url.split('?').next().unwrap_or(url);
  match base.split_once("://") {
    Some((scheme, rest)) => {
      let authority = rest.split('/').next().unwrap_or(rest);
      format!("{scheme}://{authority}")
    }
    None => base.trim_end_matches('/').to_string(),
  }
}
