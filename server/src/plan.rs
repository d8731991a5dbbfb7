use std::fmt;

use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, Value};
use serde::Serialize;

use crate::error::ApiResult;
use crate::upstream::AnalysisResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
  Free,
  Basic,
  Pro,
}

/// What a plan is allowed to keep from an analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
  Redacted,
  Full,
}

impl Plan {
  /// Unknown names fall back to `Free`.
  pub fn from_name(name: &str) -> Self {
    match name.trim().to_ascii_lowercase().as_str() {
      "basic" => Self::Basic,
      "pro" => Self::Pro,
      _ => Self::Free,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Free => "free",
      Self::Basic => "basic",
      Self::Pro => "pro",
    }
  }

  pub fn access(self) -> Access {
    match self {
      Self::Free => Access::Redacted,
      Self::Basic | Self::Pro => Access::Full,
    }
  }
}

impl fmt::Display for Plan {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Applies the premium-field policy for `plan` to an upstream result.
pub fn apply_plan_policy(plan: Plan, mut result: AnalysisResult) -> AnalysisResult {
  match plan.access() {
    Access::Full => {
      result.subscription_limited = false;
    }
    Access::Redacted => {
      result.ia_structure = None;
      result.redesign_suggestion = None;
      result.marketing_consultation = None;
      result.subscription_limited = true;
    }
  }
  result
}

/// Looks up the caller's plan through team membership. No membership means `Free`.
pub async fn resolve_plan(db: &DatabaseConnection, user_id: i32) -> ApiResult<Plan> {
  let stmt = Statement::from_sql_and_values(
    db.get_database_backend(),
    "SELECT t.plan_name AS plan_name FROM team_members tm \
     INNER JOIN teams t ON t.id = tm.team_id \
     WHERE tm.user_id = ? ORDER BY tm.id ASC LIMIT 1",
    vec![Value::from(user_id)],
  );
  let row = db.query_one(stmt).await?;
  let plan = row
    .and_then(|row| row.try_get::<Option<String>>("", "plan_name").ok().flatten())
    .map(|name| Plan::from_name(&name))
    .unwrap_or(Plan::Free);
  Ok(plan)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn upstream_result() -> AnalysisResult {
    serde_json::from_value(json!({
      "success": true,
      "original_image": "uploads/a.png",
      "saliency_map": "outputs/saliency_a.png",
      "report": "reports/report_a.html",
      "ia_structure": { "sections": ["hero", "pricing"] },
      "redesign_suggestion": { "html": "<div/>" },
      "marketing_consultation": { "summary": "tighten the CTA" },
      "metrics": { "basic": { "clutter_score": 0.4 } }
    }))
    .unwrap()
  }

  #[test]
  fn parses_plan_names() {
    assert_eq!(Plan::from_name("pro"), Plan::Pro);
    assert_eq!(Plan::from_name(" Basic "), Plan::Basic);
    assert_eq!(Plan::from_name("PRO"), Plan::Pro);
    assert_eq!(Plan::from_name("free"), Plan::Free);
    assert_eq!(Plan::from_name("enterprise"), Plan::Free);
    assert_eq!(Plan::from_name(""), Plan::Free);
  }

  #[test]
  fn only_paid_plans_get_full_access() {
    assert_eq!(Plan::Free.access(), Access::Redacted);
    assert_eq!(Plan::Basic.access(), Access::Full);
    assert_eq!(Plan::Pro.access(), Access::Full);
  }

  #[test]
  fn free_plan_nulls_premium_fields_and_keeps_metrics() {
    let redacted = apply_plan_policy(Plan::Free, upstream_result());
    assert!(redacted.ia_structure.is_none());
    assert!(redacted.redesign_suggestion.is_none());
    assert!(redacted.marketing_consultation.is_none());
    assert!(redacted.subscription_limited);
    assert_eq!(
      redacted.metrics,
      Some(json!({ "basic": { "clutter_score": 0.4 } }))
    );
    assert_eq!(redacted.original_image, "uploads/a.png");
  }

  #[test]
  fn paid_plans_pass_premium_fields_through() {
    for plan in [Plan::Basic, Plan::Pro] {
      let original = upstream_result();
      let result = apply_plan_policy(plan, original.clone());
      assert!(!result.subscription_limited);
      assert_eq!(result.ia_structure, original.ia_structure);
      assert_eq!(result.redesign_suggestion, original.redesign_suggestion);
      assert_eq!(result.marketing_consultation, original.marketing_consultation);
    }
  }

  #[test]
  fn redacted_fields_serialize_as_null() {
    let redacted = apply_plan_policy(Plan::Free, upstream_result());
    let value = serde_json::to_value(&redacted).unwrap();
    assert_eq!(value["ia_structure"], serde_json::Value::Null);
    assert_eq!(value["subscription_limited"], json!(true));
  }
}
