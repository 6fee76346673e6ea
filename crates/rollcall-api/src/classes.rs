//! Handlers for classes and the date-aware roster views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/classes` | Middle before High, then by name |
//! | `POST`   | `/classes` | Body: `{"grade":"middle","name":"1","teacher_id":null}` |
//! | `DELETE` | `/classes/:id` | Students become unassigned |
//! | `GET`    | `/classes/:id/roster` | Optional `?date=`; visibility on that date |
//! | `GET`    | `/new-friends` | Optional `?date=`; the new-friend pseudo-class |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use rollcall_core::{
  class::{Class, NewClass},
  roster::{RosterContext, visible_students},
  store::{StudentQuery, WorshipStore},
  student::Student,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{error::ApiError, today};

/// `GET /classes`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Class>>, ApiError>
where
  S: WorshipStore,
{
  Ok(Json(store.list_classes().await.map_err(ApiError::store)?))
}

/// `POST /classes`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewClass>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WorshipStore,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("class name must not be empty".into()));
  }
  let class = store.add_class(body).await.map_err(ApiError::store)?;
  info!(class_id = %class.class_id, label = %class.label(), "added class");
  Ok((StatusCode::CREATED, Json(class)))
}

/// `DELETE /classes/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: WorshipStore,
{
  if store.delete_class(id).await.map_err(ApiError::store)? {
    info!(class_id = %id, "deleted class");
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("class {id} not found")))
  }
}

// ─── Rosters ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RosterParams {
  pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct Roster {
  pub context:  RosterContext,
  pub date:     NaiveDate,
  pub students: Vec<Student>,
}

/// `GET /classes/:id/roster[?date=YYYY-MM-DD]`
pub async fn roster<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<RosterParams>,
) -> Result<Json<Roster>, ApiError>
where
  S: WorshipStore,
{
  store
    .get_class(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("class {id} not found")))?;

  let date = params.date.unwrap_or_else(today);
  let context = RosterContext::Class(id);
  let members = store
    .list_students(StudentQuery::in_class(id))
    .await
    .map_err(ApiError::store)?;
  let students = visible_students(&members, &context, date);
  Ok(Json(Roster { context, date, students }))
}

/// `GET /new-friends[?date=YYYY-MM-DD]`
pub async fn new_friends<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<RosterParams>,
) -> Result<Json<Roster>, ApiError>
where
  S: WorshipStore,
{
  let date = params.date.unwrap_or_else(today);
  let context = RosterContext::NewFriends;
  // Graduated new friends have left the tag behind, so the whole active set
  // is the candidate pool.
  let everyone = store
    .list_students(StudentQuery::default())
    .await
    .map_err(ApiError::store)?;
  let students = visible_students(&everyone, &context, date);
  Ok(Json(Roster { context, date, students }))
}
