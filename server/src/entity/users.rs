use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: Option<String>,
  #[sea_orm(unique)]
  pub email: String,
  pub image: Option<String>,
  pub role: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::analyses::Entity")]
  Analyses,
  #[sea_orm(has_many = "super::sessions::Entity")]
  Sessions,
}

impl Related<super::analyses::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Analyses.def()
  }
}

impl Related<super::sessions::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Sessions.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
