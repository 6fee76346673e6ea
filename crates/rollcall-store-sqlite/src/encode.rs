//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD` (so lexical order is chronological), tag sets as compact
//! JSON arrays and UUIDs as hyphenated lowercase strings. Enums use their
//! lowercase `strum` names.

use std::{collections::BTreeSet, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rollcall_core::{
  class::Class,
  staff::Teacher,
  student::Student,
  worship::{Attendance, LogDetails, Offering, TeacherAttendance, WorshipLog},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Enums ────────────────────────────────────────────────────────────────────

pub fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::UnknownVariant { column, value: s.to_owned() })
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &BTreeSet<String>) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<BTreeSet<String>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawStudent::from_row`].
pub const STUDENT_COLUMNS: &str = "student_id, name, class_id, tags, first_visit_date, \
                                   class_assigned_date, is_active, created_at";

/// Raw values read directly from a `students` row.
pub struct RawStudent {
  pub student_id:          String,
  pub name:                String,
  pub class_id:            Option<String>,
  pub tags:                String,
  pub first_visit_date:    Option<String>,
  pub class_assigned_date: Option<String>,
  pub is_active:           bool,
  pub created_at:          String,
}

impl RawStudent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      student_id:          row.get(0)?,
      name:                row.get(1)?,
      class_id:            row.get(2)?,
      tags:                row.get(3)?,
      first_visit_date:    row.get(4)?,
      class_assigned_date: row.get(5)?,
      is_active:           row.get(6)?,
      created_at:          row.get(7)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      student_id:          decode_uuid(&self.student_id)?,
      name:                self.name,
      class_id:            self.class_id.as_deref().map(decode_uuid).transpose()?,
      tags:                decode_tags(&self.tags)?,
      first_visit_date:    self.first_visit_date.as_deref().map(decode_date).transpose()?,
      class_assigned_date: self
        .class_assigned_date
        .as_deref()
        .map(decode_date)
        .transpose()?,
      is_active:           self.is_active,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}

pub const CLASS_COLUMNS: &str = "class_id, grade, name, teacher_id, created_at";

/// Raw values read directly from a `classes` row.
pub struct RawClass {
  pub class_id:   String,
  pub grade:      String,
  pub name:       String,
  pub teacher_id: Option<String>,
  pub created_at: String,
}

impl RawClass {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      class_id:   row.get(0)?,
      grade:      row.get(1)?,
      name:       row.get(2)?,
      teacher_id: row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_class(self) -> Result<Class> {
    Ok(Class {
      class_id:   decode_uuid(&self.class_id)?,
      grade:      decode_enum("grade", &self.grade)?,
      name:       self.name,
      teacher_id: self.teacher_id.as_deref().map(decode_uuid).transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const TEACHER_COLUMNS: &str = "teacher_id, name, role, is_active";

/// Raw values read directly from a `teachers` row.
pub struct RawTeacher {
  pub teacher_id: String,
  pub name:       String,
  pub role:       String,
  pub is_active:  bool,
}

impl RawTeacher {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      teacher_id: row.get(0)?,
      name:       row.get(1)?,
      role:       row.get(2)?,
      is_active:  row.get(3)?,
    })
  }

  pub fn into_teacher(self) -> Result<Teacher> {
    Ok(Teacher {
      teacher_id: decode_uuid(&self.teacher_id)?,
      name:       self.name,
      role:       decode_enum("role", &self.role)?,
      is_active:  self.is_active,
    })
  }
}

pub const LOG_COLUMNS: &str = "log_id, date, prayer, prayer_role, sermon_title, sermon_text, \
                               preacher, coupon_recipient_count, coupons_per_person, \
                               online_attendance_count, online_attendance_names";

/// Raw values read directly from a `worship_logs` row.
pub struct RawLog {
  pub log_id:  String,
  pub date:    String,
  pub details: LogDetails,
}

impl RawLog {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      log_id:  row.get(0)?,
      date:    row.get(1)?,
      details: LogDetails {
        prayer:                  row.get(2)?,
        prayer_role:             row.get(3)?,
        sermon_title:            row.get(4)?,
        sermon_text:             row.get(5)?,
        preacher:                row.get(6)?,
        coupon_recipient_count:  row.get(7)?,
        coupons_per_person:      row.get(8)?,
        online_attendance_count: row.get(9)?,
        online_attendance_names: row.get(10)?,
      },
    })
  }

  pub fn into_log(self) -> Result<WorshipLog> {
    Ok(WorshipLog {
      log_id:  decode_uuid(&self.log_id)?,
      date:    decode_date(&self.date)?,
      details: self.details,
    })
  }
}

/// Raw values read directly from an `attendance` row.
pub struct RawAttendance {
  pub log_id:     String,
  pub student_id: String,
  pub status:     String,
}

impl RawAttendance {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { log_id: row.get(0)?, student_id: row.get(1)?, status: row.get(2)? })
  }

  pub fn into_attendance(self) -> Result<Attendance> {
    Ok(Attendance {
      log_id:     decode_uuid(&self.log_id)?,
      student_id: decode_uuid(&self.student_id)?,
      status:     decode_enum("status", &self.status)?,
    })
  }
}

/// Raw values read directly from a `teacher_attendance` row.
pub struct RawTeacherAttendance {
  pub log_id:     String,
  pub teacher_id: String,
}

impl RawTeacherAttendance {
  pub fn into_teacher_attendance(self) -> Result<TeacherAttendance> {
    Ok(TeacherAttendance {
      log_id:     decode_uuid(&self.log_id)?,
      teacher_id: decode_uuid(&self.teacher_id)?,
    })
  }
}

/// Raw values read directly from an `offerings` row.
pub struct RawOffering {
  pub log_id: String,
  pub kind:   String,
  pub amount: i64,
  pub memo:   String,
}

impl RawOffering {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      log_id: row.get(0)?,
      kind:   row.get(1)?,
      amount: row.get(2)?,
      memo:   row.get(3)?,
    })
  }

  pub fn into_offering(self) -> Result<Offering> {
    Ok(Offering {
      log_id: decode_uuid(&self.log_id)?,
      kind:   decode_enum("kind", &self.kind)?,
      amount: self.amount,
      memo:   self.memo,
    })
  }
}
