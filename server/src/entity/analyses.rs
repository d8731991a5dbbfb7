use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "analyses")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub user_id: i32,
  pub original_image: String,
  pub saliency_map: String,
  pub report: String,
  pub ia_structure: Option<Json>,
  pub redesign_suggestion: Option<Json>,
  pub marketing_consultation: Option<Json>,
  pub metrics: Option<Json>,
  pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::users::Entity",
    from = "Column::UserId",
    to = "super::users::Column::Id"
  )]
  User,
}

impl Related<super::users::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
  /// File references held by the analysis service, in storage order.
  pub fn file_references(&self) -> Vec<&str> {
    [
      self.original_image.as_str(),
      self.saliency_map.as_str(),
      self.report.as_str(),
    ]
    .into_iter()
    .filter(|reference| !reference.trim().is_empty())
    .collect()
  }
}
