use sea_orm_migration::prelude::*;

use crate::tables::{Analyses, Sessions, TeamMembers, Teams, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    let statements = [
      (
        "users",
        Table::create()
          .table(Users::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Users::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Users::Name).string().null())
          .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
          .col(ColumnDef::new(Users::Image).string().null())
          .col(ColumnDef::new(Users::Role).string().null())
          .to_owned(),
      ),
      (
        "sessions",
        Table::create()
          .table(Sessions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Sessions::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Sessions::SessionToken)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(ColumnDef::new(Sessions::UserId).integer().not_null())
          .col(ColumnDef::new(Sessions::Expires).timestamp_with_time_zone().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_sessions_user_id")
              .from(Sessions::Table, Sessions::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      ),
      (
        "teams",
        Table::create()
          .table(Teams::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Teams::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Teams::Name).string().not_null())
          .col(ColumnDef::new(Teams::PlanName).string().null())
          .to_owned(),
      ),
      (
        "team_members",
        Table::create()
          .table(TeamMembers::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(TeamMembers::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(TeamMembers::UserId).integer().not_null())
          .col(ColumnDef::new(TeamMembers::TeamId).integer().not_null())
          .col(
            ColumnDef::new(TeamMembers::Role)
              .string()
              .not_null()
              .default("member"),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_team_members_user_id")
              .from(TeamMembers::Table, TeamMembers::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_team_members_team_id")
              .from(TeamMembers::Table, TeamMembers::TeamId)
              .to(Teams::Table, Teams::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      ),
      (
        "analyses",
        Table::create()
          .table(Analyses::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Analyses::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Analyses::UserId).integer().not_null())
          .col(ColumnDef::new(Analyses::OriginalImage).string().not_null())
          .col(ColumnDef::new(Analyses::SaliencyMap).string().not_null())
          .col(ColumnDef::new(Analyses::Report).string().not_null())
          .col(ColumnDef::new(Analyses::IaStructure).json().null())
          .col(ColumnDef::new(Analyses::RedesignSuggestion).json().null())
          .col(ColumnDef::new(Analyses::MarketingConsultation).json().null())
          .col(ColumnDef::new(Analyses::Metrics).json().null())
          .col(
            ColumnDef::new(Analyses::CreatedAt)
              .timestamp_with_time_zone()
              .not_null()
              .default(Expr::current_timestamp()),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_analyses_user_id")
              .from(Analyses::Table, Analyses::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      ),
    ];

    for (name, statement) in statements {
      if let Err(err) = manager.create_table(statement).await {
        return Err(DbErr::Custom(format!(
          "Migration failed for table {name}\nError: {err}"
        )));
      }
    }
    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Analyses::Table).if_exists().to_owned())
      .await?;
    manager
      .drop_table(Table::drop().table(TeamMembers::Table).if_exists().to_owned())
      .await?;
    manager
      .drop_table(Table::drop().table(Teams::Table).if_exists().to_owned())
      .await?;
    manager
      .drop_table(Table::drop().table(Sessions::Table).if_exists().to_owned())
      .await?;
    manager
      .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
      .await?;
    Ok(())
  }
}
