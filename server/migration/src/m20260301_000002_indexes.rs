use sea_orm_migration::prelude::*;

use crate::tables::{Analyses, Sessions, TeamMembers};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    let statements = [
      // Report list: owner filter, newest first
      Index::create()
        .name("idx_analyses_user_id_created_at")
        .table(Analyses::Table)
        .col(Analyses::UserId)
        .col(Analyses::CreatedAt)
        .to_owned(),
      Index::create()
        .name("idx_sessions_user_id")
        .table(Sessions::Table)
        .col(Sessions::UserId)
        .to_owned(),
      Index::create()
        .name("idx_team_members_user_id")
        .table(TeamMembers::Table)
        .col(TeamMembers::UserId)
        .to_owned(),
    ];

    for stmt in statements {
      if let Err(err) = manager.create_index(stmt).await {
        if is_duplicate_index(&err) {
          continue;
        }
        return Err(DbErr::Custom(format!(
          "Migration failed while creating index\nError: {err}"
        )));
      }
    }

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_index(
        Index::drop()
          .name("idx_team_members_user_id")
          .table(TeamMembers::Table)
          .to_owned(),
      )
      .await?;
    manager
      .drop_index(
        Index::drop()
          .name("idx_sessions_user_id")
          .table(Sessions::Table)
          .to_owned(),
      )
      .await?;
    manager
      .drop_index(
        Index::drop()
          .name("idx_analyses_user_id_created_at")
          .table(Analyses::Table)
          .to_owned(),
      )
      .await?;
    Ok(())
  }
}

// MySQL 1061 (duplicate key name) / SQLite "already exists"
fn is_duplicate_index(err: &DbErr) -> bool {
  let message = err.to_string();
  message.contains("1061") || message.contains("already exists")
}
