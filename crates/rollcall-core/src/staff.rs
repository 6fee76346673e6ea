//! Teachers and staff, whose attendance is recorded alongside students'.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TeacherRole {
  Teacher,
  Staff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
  pub teacher_id: Uuid,
  pub name:       String,
  pub role:       TeacherRole,
  pub is_active:  bool,
}

/// Input to [`crate::store::WorshipStore::add_teacher`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewTeacher {
  pub name: String,
  pub role: TeacherRole,
}
