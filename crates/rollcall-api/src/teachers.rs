//! Handlers for `/teachers` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/teachers` | Optional `?include_inactive=true` |
//! | `POST` | `/teachers` | Body: `{"name":"...","role":"teacher"\|"staff"}` |
//! | `PUT`  | `/teachers/:id` | Body: `{"is_active":false}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_core::{
  staff::{NewTeacher, Teacher},
  store::WorshipStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub include_inactive: bool,
}

/// `GET /teachers[?include_inactive=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Teacher>>, ApiError>
where
  S: WorshipStore,
{
  let teachers = store
    .list_teachers(params.include_inactive)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(teachers))
}

/// `POST /teachers`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewTeacher>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WorshipStore,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("teacher name must not be empty".into()));
  }
  let teacher = store.add_teacher(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(teacher)))
}

#[derive(Debug, Deserialize)]
pub struct ActiveBody {
  pub is_active: bool,
}

/// `PUT /teachers/:id`
pub async fn set_active<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ActiveBody>,
) -> Result<Json<Teacher>, ApiError>
where
  S: WorshipStore,
{
  let teacher = store
    .set_teacher_active(id, body.is_active)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("teacher {id} not found")))?;
  Ok(Json(teacher))
}
