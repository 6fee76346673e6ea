//! The store traits and supporting query types.
//!
//! Both are implemented by storage backends (e.g. `rollcall-store-sqlite`).
//! The rule engines in [`crate::naming`] and [`crate::roster`] only need
//! [`StudentStore`]; the surrounding data-entry surface uses
//! [`WorshipStore`], which extends it.
//!
//! Writes are last-write-wins. Nothing here coordinates concurrent editors.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  class::{Class, NewClass},
  staff::{NewTeacher, Teacher},
  student::{NewStudent, Student, StudentPatch},
  worship::{
    Attendance, AttendanceStatus, LogDetails, Offering, TeacherAttendance,
    WorshipLog,
  },
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`StudentStore::list_students`].
#[derive(Debug, Clone, Default)]
pub struct StudentQuery {
  /// Restrict to students assigned to this class.
  pub class_id:         Option<Uuid>,
  /// Restrict to students without a class. Ignored when `class_id` is set.
  pub unassigned:       bool,
  /// Restrict to students carrying this tag.
  pub tag:              Option<String>,
  /// Also return soft-deleted students.
  pub include_inactive: bool,
}

impl StudentQuery {
  pub fn in_class(class_id: Uuid) -> Self {
    Self { class_id: Some(class_id), ..Self::default() }
  }
}

// ─── StudentStore ────────────────────────────────────────────────────────────

/// Student records plus the few lookups the rule engines depend on.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait StudentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new, active student. `class_assigned_date` starts unset.
  fn add_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// Retrieve a student by UUID. Returns `None` if not found.
  fn get_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// List students matching `query`, ordered by name.
  fn list_students(
    &self,
    query: StudentQuery,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Active students whose name starts with `prefix`, compared literally
  /// (no wildcard interpretation).
  fn find_by_name_prefix(
    &self,
    prefix: String,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Apply `patch` to one student in a single atomic write and return the
  /// updated record, or `None` if the student does not exist.
  fn update_student(
    &self,
    id: Uuid,
    patch: StudentPatch,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Hard-delete a student and every attendance row referencing them.
  /// Returns `false` if the student did not exist.
  fn delete_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Retrieve a class by UUID. Returns `None` if not found.
  fn get_class(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Class>, Self::Error>> + Send + '_;

  /// Number of attendance rows for `student_id` on logs dated strictly
  /// before `date`.
  fn count_attendance_before(
    &self,
    student_id: Uuid,
    date: NaiveDate,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}

// ─── WorshipStore ────────────────────────────────────────────────────────────

/// Classes, staff, worship logs and the rows recorded against them.
pub trait WorshipStore: StudentStore {
  // ── Classes ───────────────────────────────────────────────────────────

  fn add_class(
    &self,
    input: NewClass,
  ) -> impl Future<Output = Result<Class, Self::Error>> + Send + '_;

  /// All classes, Middle before High, then by name.
  fn list_classes(
    &self,
  ) -> impl Future<Output = Result<Vec<Class>, Self::Error>> + Send + '_;

  /// Delete a class. Its students become unassigned; their dates are kept.
  fn delete_class(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Teachers ──────────────────────────────────────────────────────────

  fn add_teacher(
    &self,
    input: NewTeacher,
  ) -> impl Future<Output = Result<Teacher, Self::Error>> + Send + '_;

  fn list_teachers(
    &self,
    include_inactive: bool,
  ) -> impl Future<Output = Result<Vec<Teacher>, Self::Error>> + Send + '_;

  fn set_teacher_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<Option<Teacher>, Self::Error>> + Send + '_;

  // ── Worship logs ──────────────────────────────────────────────────────

  /// Create the log for `date`, or overwrite its details if it exists.
  fn upsert_log(
    &self,
    date: NaiveDate,
    details: LogDetails,
  ) -> impl Future<Output = Result<WorshipLog, Self::Error>> + Send + '_;

  fn get_log(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<WorshipLog>, Self::Error>> + Send + '_;

  /// Logs with `from <= date <= to`, oldest first. Open bounds are
  /// unbounded.
  fn list_logs(
    &self,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
  ) -> impl Future<Output = Result<Vec<WorshipLog>, Self::Error>> + Send + '_;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Record `status` for the pair, replacing any previous status.
  fn set_attendance(
    &self,
    log_id: Uuid,
    student_id: Uuid,
    status: AttendanceStatus,
  ) -> impl Future<Output = Result<Attendance, Self::Error>> + Send + '_;

  fn clear_attendance(
    &self,
    log_id: Uuid,
    student_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_attendance(
    &self,
    log_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Attendance>, Self::Error>> + Send + '_;

  /// Attendance on every log with `from <= date <= to`.
  fn list_attendance_between(
    &self,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
  ) -> impl Future<Output = Result<Vec<Attendance>, Self::Error>> + Send + '_;

  /// One student's attendance on logs with `from <= date <= to`, oldest
  /// first.
  fn list_student_attendance(
    &self,
    student_id: Uuid,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
  ) -> impl Future<Output = Result<Vec<Attendance>, Self::Error>> + Send + '_;

  // ── Staff attendance ──────────────────────────────────────────────────

  fn mark_teacher(
    &self,
    log_id: Uuid,
    teacher_id: Uuid,
  ) -> impl Future<Output = Result<TeacherAttendance, Self::Error>> + Send + '_;

  fn clear_teacher(
    &self,
    log_id: Uuid,
    teacher_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_teacher_attendance(
    &self,
    log_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TeacherAttendance>, Self::Error>> + Send + '_;

  // ── Offerings ─────────────────────────────────────────────────────────

  /// Insert or replace the offering for `(log_id, kind)`.
  fn upsert_offering(
    &self,
    offering: Offering,
  ) -> impl Future<Output = Result<Offering, Self::Error>> + Send + '_;

  fn list_offerings(
    &self,
    log_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Offering>, Self::Error>> + Send + '_;
}
