//! Handlers for worship logs and the rows recorded against them.
//!
//! A log is addressed by its date. Writing attendance, staff or offerings for
//! a date with no log creates an empty log first.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/logs` | Optional `from`, `to` (inclusive) |
//! | `GET`    | `/logs/:date` | 404 if no log |
//! | `PUT`    | `/logs/:date` | Body: [`LogDetails`]; replaces every field |
//! | `GET`    | `/logs/:date/attendance` | |
//! | `PUT`    | `/logs/:date/attendance/:student_id` | Body: `{"status":"present"\|"online"}` |
//! | `DELETE` | `/logs/:date/attendance/:student_id` | |
//! | `GET`    | `/logs/:date/staff` | |
//! | `PUT`    | `/logs/:date/staff/:teacher_id` | |
//! | `DELETE` | `/logs/:date/staff/:teacher_id` | |
//! | `GET`    | `/logs/:date/offerings` | |
//! | `PUT`    | `/logs/:date/offerings` | Body: `{"kind":"tithe","amount":50000,"memo":""}` |
//! | `GET`    | `/logs/:date/snapshot` | Everything the paper form needs |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use chrono::NaiveDate;
use rollcall_core::{
  report::{self, SnapshotInput, WorshipSnapshot},
  store::{StudentQuery, WorshipStore},
  worship::{
    Attendance, AttendanceStatus, LogDetails, Offering, OfferingKind, TeacherAttendance,
    WorshipLog,
  },
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

async fn find_log<S: WorshipStore>(store: &S, date: NaiveDate) -> Result<WorshipLog, ApiError> {
  store
    .get_log(date)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no worship log for {date}")))
}

async fn log_or_create<S: WorshipStore>(store: &S, date: NaiveDate) -> Result<WorshipLog, ApiError> {
  if let Some(log) = store.get_log(date).await.map_err(ApiError::store)? {
    return Ok(log);
  }
  info!(%date, "creating worship log");
  store
    .upsert_log(date, LogDetails::default())
    .await
    .map_err(ApiError::store)
}

// ─── Logs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

/// `GET /logs[?from=..][&to=..]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<WorshipLog>>, ApiError>
where
  S: WorshipStore,
{
  let logs = store
    .list_logs(params.from, params.to)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(logs))
}

/// `GET /logs/:date`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<WorshipLog>, ApiError>
where
  S: WorshipStore,
{
  Ok(Json(find_log(&*store, date).await?))
}

/// `PUT /logs/:date`
pub async fn upsert<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
  Json(details): Json<LogDetails>,
) -> Result<Json<WorshipLog>, ApiError>
where
  S: WorshipStore,
{
  let log = store.upsert_log(date, details).await.map_err(ApiError::store)?;
  Ok(Json(log))
}

// ─── Attendance ───────────────────────────────────────────────────────────────

/// `GET /logs/:date/attendance`
pub async fn list_attendance<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<Attendance>>, ApiError>
where
  S: WorshipStore,
{
  let log = find_log(&*store, date).await?;
  let rows = store.list_attendance(log.log_id).await.map_err(ApiError::store)?;
  Ok(Json(rows))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusBody {
  #[serde(default)]
  pub status: AttendanceStatus,
}

/// `PUT /logs/:date/attendance/:student_id`
pub async fn set_attendance<S>(
  State(store): State<Arc<S>>,
  Path((date, student_id)): Path<(NaiveDate, Uuid)>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Attendance>, ApiError>
where
  S: WorshipStore,
{
  store
    .get_student(student_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("student {student_id} not found")))?;

  let log = log_or_create(&*store, date).await?;
  let row = store
    .set_attendance(log.log_id, student_id, body.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(row))
}

/// `DELETE /logs/:date/attendance/:student_id`
pub async fn clear_attendance<S>(
  State(store): State<Arc<S>>,
  Path((date, student_id)): Path<(NaiveDate, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: WorshipStore,
{
  let log = find_log(&*store, date).await?;
  if store
    .clear_attendance(log.log_id, student_id)
    .await
    .map_err(ApiError::store)?
  {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("no attendance for {student_id} on {date}")))
  }
}

// ─── Staff ────────────────────────────────────────────────────────────────────

/// `GET /logs/:date/staff`
pub async fn list_staff<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<TeacherAttendance>>, ApiError>
where
  S: WorshipStore,
{
  let log = find_log(&*store, date).await?;
  let rows = store
    .list_teacher_attendance(log.log_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}

/// `PUT /logs/:date/staff/:teacher_id`
pub async fn mark_staff<S>(
  State(store): State<Arc<S>>,
  Path((date, teacher_id)): Path<(NaiveDate, Uuid)>,
) -> Result<Json<TeacherAttendance>, ApiError>
where
  S: WorshipStore,
{
  let known = store
    .list_teachers(true)
    .await
    .map_err(ApiError::store)?
    .iter()
    .any(|t| t.teacher_id == teacher_id);
  if !known {
    return Err(ApiError::NotFound(format!("teacher {teacher_id} not found")));
  }

  let log = log_or_create(&*store, date).await?;
  let row = store
    .mark_teacher(log.log_id, teacher_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(row))
}

/// `DELETE /logs/:date/staff/:teacher_id`
pub async fn clear_staff<S>(
  State(store): State<Arc<S>>,
  Path((date, teacher_id)): Path<(NaiveDate, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: WorshipStore,
{
  let log = find_log(&*store, date).await?;
  if store
    .clear_teacher(log.log_id, teacher_id)
    .await
    .map_err(ApiError::store)?
  {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("{teacher_id} was not marked on {date}")))
  }
}

// ─── Offerings ────────────────────────────────────────────────────────────────

/// `GET /logs/:date/offerings`
pub async fn list_offerings<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<Offering>>, ApiError>
where
  S: WorshipStore,
{
  let log = find_log(&*store, date).await?;
  let rows = store.list_offerings(log.log_id).await.map_err(ApiError::store)?;
  Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct OfferingBody {
  pub kind:   OfferingKind,
  pub amount: i64,
  #[serde(default)]
  pub memo:   String,
}

/// `PUT /logs/:date/offerings`
pub async fn upsert_offering<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
  Json(body): Json<OfferingBody>,
) -> Result<Json<Offering>, ApiError>
where
  S: WorshipStore,
{
  if body.amount < 0 {
    return Err(ApiError::BadRequest("offering amount must not be negative".into()));
  }
  let log = log_or_create(&*store, date).await?;
  let offering = store
    .upsert_offering(Offering {
      log_id: log.log_id,
      kind:   body.kind,
      amount: body.amount,
      memo:   body.memo,
    })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(offering))
}

// ─── Snapshot ─────────────────────────────────────────────────────────────────

/// `GET /logs/:date/snapshot`
pub async fn snapshot<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<WorshipSnapshot>, ApiError>
where
  S: WorshipStore,
{
  let log = find_log(&*store, date).await?;
  let classes = store.list_classes().await.map_err(ApiError::store)?;
  let students = store
    .list_students(StudentQuery::default())
    .await
    .map_err(ApiError::store)?;
  let attendance = store.list_attendance(log.log_id).await.map_err(ApiError::store)?;
  let teachers = store.list_teachers(true).await.map_err(ApiError::store)?;
  let teacher_attendance = store
    .list_teacher_attendance(log.log_id)
    .await
    .map_err(ApiError::store)?;
  let offerings = store.list_offerings(log.log_id).await.map_err(ApiError::store)?;

  Ok(Json(report::snapshot(&SnapshotInput {
    log:                &log,
    classes:            &classes,
    students:           &students,
    attendance:         &attendance,
    teachers:           &teachers,
    teacher_attendance: &teacher_attendance,
    offerings:          &offerings,
  })))
}
