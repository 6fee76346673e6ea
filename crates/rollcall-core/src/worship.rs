//! Worship logs and everything recorded against them.
//!
//! A [`WorshipLog`] exists at most once per calendar date. Its `date` is the
//! reference date roster visibility is evaluated against.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── WorshipLog ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorshipLog {
  pub log_id:  Uuid,
  pub date:    NaiveDate,
  #[serde(flatten)]
  pub details: LogDetails,
}

impl WorshipLog {
  pub fn total_coupons(&self) -> u32 {
    self
      .details
      .coupon_recipient_count
      .saturating_mul(self.details.coupons_per_person)
  }
}

/// The editable part of a worship log; written as a whole on upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogDetails {
  pub prayer:                  String,
  pub prayer_role:             String,
  pub sermon_title:            String,
  pub sermon_text:             String,
  pub preacher:                String,
  pub coupon_recipient_count:  u32,
  pub coupons_per_person:      u32,
  pub online_attendance_count: u32,
  /// Free-text list of people who joined online.
  pub online_attendance_names: String,
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
  #[default]
  Present,
  Online,
}

/// At most one per `(log_id, student_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
  pub log_id:     Uuid,
  pub student_id: Uuid,
  pub status:     AttendanceStatus,
}

/// At most one per `(log_id, teacher_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherAttendance {
  pub log_id:     Uuid,
  pub teacher_id: Uuid,
}

// ─── Offerings ───────────────────────────────────────────────────────────────

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
  strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OfferingKind {
  Sunday,
  Tithe,
  Thanksgiving,
  Other,
}

/// At most one per `(log_id, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offering {
  pub log_id: Uuid,
  pub kind:   OfferingKind,
  /// Whole currency units.
  pub amount: i64,
  pub memo:   String,
}
