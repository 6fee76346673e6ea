//! Classes: the real rosters students are assigned to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The school level a class belongs to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Grade {
  Middle,
  High,
}

impl Grade {
  /// Human-facing label used on reports and prompts.
  pub fn title(self) -> &'static str {
    match self {
      Self::Middle => "Middle",
      Self::High => "High",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
  pub class_id:   Uuid,
  pub grade:      Grade,
  pub name:       String,
  pub teacher_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
}

impl Class {
  /// `"Middle 1"`, `"High Joshua"`, ...
  pub fn label(&self) -> String { format!("{} {}", self.grade.title(), self.name) }
}

/// Input to [`crate::store::WorshipStore::add_class`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewClass {
  pub grade:      Grade,
  pub name:       String,
  pub teacher_id: Option<Uuid>,
}
