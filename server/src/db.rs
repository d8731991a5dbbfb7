use chrono::{Duration, Utc};
use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection,
  DbErr, EntityTrait, QueryFilter, Set, Statement, Value,
};
use sea_orm_migration::migrator::MigratorTrait;
use tracing::info;

use crate::config::{ServerConfig, database_url_with_db, server_url};
use crate::entity::{sessions, users};

pub async fn connect(config: &ServerConfig) -> Result<DatabaseConnection, DbErr> {
  Database::connect(&config.database_url).await
}

/// Brings the schema up to date. Safe to call on every start.
pub async fn init_db(db: &DatabaseConnection, db_name: Option<&str>) -> Result<(), DbErr> {
  if db.get_database_backend() == DatabaseBackend::MySql {
    if let Some(name) = db_name {
      ensure_database_charset(db, name).await?;
    }
    ensure_default_storage_engine(db).await?;
    ensure_migrations_table(db).await?;
  }
  migration::Migrator::up(db, None).await
}

/// Drops and recreates the MySQL schema, then migrates it.
pub async fn reset(config: &ServerConfig) -> anyhow::Result<()> {
  if !config.is_mysql() {
    anyhow::bail!("reset is only supported for MySQL databases");
  }
  let Some(name) = config.database_name.as_deref() else {
    anyhow::bail!("reset needs DATABASE_NAME or a database in DATABASE_URL");
  };

  let server = Database::connect(&server_url(&config.database_url)).await?;
  server
    .execute_unprepared(&format!("DROP DATABASE IF EXISTS `{name}`"))
    .await?;
  server
    .execute_unprepared(&format!(
      "CREATE DATABASE `{name}` CHARACTER SET utf8mb4 COLLATE utf8mb4_bin"
    ))
    .await?;

  let db = Database::connect(&database_url_with_db(&config.database_url, name)).await?;
  init_db(&db, Some(name)).await?;
  Ok(())
}

async fn ensure_database_charset(db: &DatabaseConnection, db_name: &str) -> Result<(), DbErr> {
  db.execute_unprepared(&format!(
    "ALTER DATABASE `{db_name}` CHARACTER SET utf8mb4 COLLATE utf8mb4_bin"
  ))
  .await?;
  Ok(())
}

async fn ensure_default_storage_engine(db: &DatabaseConnection) -> Result<(), DbErr> {
  db.execute_unprepared("SET SESSION default_storage_engine=InnoDB")
    .await?;
  Ok(())
}

async fn ensure_migrations_table(db: &DatabaseConnection) -> Result<(), DbErr> {
  let sql = r#"
    CREATE TABLE IF NOT EXISTS seaql_migrations (
      version VARCHAR(255) NOT NULL PRIMARY KEY,
      applied_at BIGINT NOT NULL
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_bin
  "#;
  db.execute_unprepared(sql).await?;
  Ok(())
}

/// Development accounts, one per plan, each with a 30 day session token.
pub async fn seed_db(db: &DatabaseConnection) -> Result<(), DbErr> {
  let accounts = [
    ("free@example.com", "Free User", "user", "Free Team", "free", "dev-session-free"),
    ("basic@example.com", "Basic User", "user", "Basic Team", "basic", "dev-session-basic"),
    ("pro@example.com", "Pro Admin", "admin", "Pro Team", "pro", "dev-session-pro"),
  ];

  for (email, name, role, team_name, plan_name, token) in accounts {
    let existing = users::Entity::find()
      .filter(users::Column::Email.eq(email))
      .one(db)
      .await?;
    if existing.is_some() {
      info!(email, "seed user exists, skipping");
      continue;
    }

    let user = users::ActiveModel {
      name: Set(Some(name.to_string())),
      email: Set(email.to_string()),
      image: Set(None),
      role: Set(Some(role.to_string())),
      ..Default::default()
    }
    .insert(db)
    .await?;

    sessions::ActiveModel {
      session_token: Set(token.to_string()),
      user_id: Set(user.id),
      expires: Set(Utc::now() + Duration::days(30)),
      ..Default::default()
    }
    .insert(db)
    .await?;

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
      backend,
      "INSERT INTO teams (name, plan_name) VALUES (?, ?)",
      vec![Value::from(team_name), Value::from(plan_name)],
    ))
    .await?;
    db.execute(Statement::from_sql_and_values(
      backend,
      "INSERT INTO team_members (user_id, team_id, role) \
       SELECT ?, id, 'owner' FROM teams WHERE name = ? ORDER BY id DESC LIMIT 1",
      vec![Value::from(user.id), Value::from(team_name)],
    ))
    .await?;

    info!(email, plan_name, "seeded account");
  }
  Ok(())
}
