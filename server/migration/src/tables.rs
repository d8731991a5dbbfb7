use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Users {
  Table,
  Id,
  Name,
  Email,
  Image,
  Role,
}

#[derive(DeriveIden)]
pub enum Sessions {
  Table,
  Id,
  SessionToken,
  UserId,
  Expires,
}

#[derive(DeriveIden)]
pub enum Teams {
  Table,
  Id,
  Name,
  PlanName,
}

#[derive(DeriveIden)]
pub enum TeamMembers {
  Table,
  Id,
  UserId,
  TeamId,
  Role,
}

#[derive(DeriveIden)]
pub enum Analyses {
  Table,
  Id,
  UserId,
  OriginalImage,
  SaliencyMap,
  Report,
  IaStructure,
  RedesignSuggestion,
  MarketingConsultation,
  Metrics,
  CreatedAt,
}
