//! Attendance statistics over a date range.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/stats` | Optional `from`, `to`; one row per active student |
//! | `GET` | `/stats/:student_id` | Same range; the student's per-service history, newest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use rollcall_core::{
  report::{self, HistoryEntry, StudentStat},
  store::{StudentQuery, WorshipStore},
  student::Student,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::ApiError, logs::RangeParams};

/// `GET /stats[?from=..][&to=..]`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  Query(range): Query<RangeParams>,
) -> Result<Json<Vec<StudentStat>>, ApiError>
where
  S: WorshipStore,
{
  let logs = store.list_logs(range.from, range.to).await.map_err(ApiError::store)?;
  let students = store
    .list_students(StudentQuery::default())
    .await
    .map_err(ApiError::store)?;
  let classes = store.list_classes().await.map_err(ApiError::store)?;
  let attendance = store
    .list_attendance_between(range.from, range.to)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(report::attendance_stats(&logs, &students, &classes, &attendance)))
}

#[derive(Debug, Serialize)]
pub struct StudentReport {
  pub student:  Student,
  pub present:  usize,
  pub services: usize,
  pub history:  Vec<HistoryEntry>,
}

/// `GET /stats/:student_id[?from=..][&to=..]`
pub async fn student<S>(
  State(store): State<Arc<S>>,
  Path(student_id): Path<Uuid>,
  Query(range): Query<RangeParams>,
) -> Result<Json<StudentReport>, ApiError>
where
  S: WorshipStore,
{
  let student = store
    .get_student(student_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("student {student_id} not found")))?;

  let logs = store.list_logs(range.from, range.to).await.map_err(ApiError::store)?;
  let attendance = store
    .list_student_attendance(student_id, range.from, range.to)
    .await
    .map_err(ApiError::store)?;

  let history = report::student_history(&logs, &attendance, student_id);
  let present = history.iter().filter(|h| h.status.is_some()).count();
  Ok(Json(StudentReport { student, present, services: history.len(), history }))
}
