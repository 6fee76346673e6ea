//! Handlers for `/students` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/students` | Optional `class_id`, `tag`, `unassigned`, `include_inactive` |
//! | `POST`   | `/students` | Body: [`CreateBody`]; 201, or 409 on an unconfirmed same-name collision |
//! | `GET`    | `/students/:id` | 404 if not found |
//! | `DELETE` | `/students/:id` | Hard delete, attendance included |
//! | `POST`   | `/students/:id/deactivate` | Soft delete |
//! | `POST`   | `/students/:id/new-friend` | Body: `{"date":"2024-03-03"}`; `{}` means today |
//! | `POST`   | `/students/:id/assign` | Body: `{"class_id":"...","date":"..."}` |
//! | `POST`   | `/students/:id/unassign` | |
//! | `PUT`    | `/students/:id/tags/:tag` | `new-friend` behaves like `/new-friend` for today |
//! | `DELETE` | `/students/:id/tags/:tag` | |

use std::{collections::BTreeSet, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rollcall_core::{
  class::Class,
  naming::{self, AddStudentOutcome, Notice, Operator, Rename},
  roster::{self, TagNewFriendOutcome, Transition},
  store::{StudentQuery, WorshipStore},
  student::{Inconsistency, NEW_FRIEND, NewStudent, Student},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{error::ApiError, today};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub class_id:         Option<Uuid>,
  pub tag:              Option<String>,
  #[serde(default)]
  pub unassigned:       bool,
  #[serde(default)]
  pub include_inactive: bool,
}

/// `GET /students[?class_id=..][&tag=..][&unassigned=true][&include_inactive=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Student>>, ApiError>
where
  S: WorshipStore,
{
  let query = StudentQuery {
    class_id:         params.class_id,
    unassigned:       params.unassigned,
    tag:              params.tag,
    include_inactive: params.include_inactive,
  };
  let students = store.list_students(query).await.map_err(ApiError::store)?;
  Ok(Json(students))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:              String,
  pub class_id:          Option<Uuid>,
  #[serde(default)]
  pub tags:              BTreeSet<String>,
  /// First-visit date when `tags` contains `new-friend`.
  pub reference_date:    Option<NaiveDate>,
  /// Answer to the same-name prompt: `true` means the new student is a
  /// different person from the existing one.
  #[serde(default)]
  pub confirm_same_name: bool,
}

impl CreateBody {
  fn into_new_student(self) -> NewStudent {
    let mut input = NewStudent {
      name: self.name,
      class_id: self.class_id,
      ..NewStudent::default()
    };
    for tag in self.tags {
      if tag == NEW_FRIEND {
        input = input.new_friend(self.reference_date.unwrap_or_else(today));
      } else {
        input = input.with_tag(tag);
      }
    }
    input
  }
}

#[derive(Debug, Serialize)]
pub struct Created {
  pub student: Student,
  pub rename:  Option<Rename>,
  pub notices: Vec<Notice>,
}

/// Answers the same-name prompt from the request body. Notices travel back
/// in the response instead of being pushed anywhere.
struct RequestOperator {
  confirmed: bool,
}

impl Operator for RequestOperator {
  fn confirm_same_name(&self, _existing: &Student, _class: Option<&Class>) -> bool {
    self.confirmed
  }

  fn notify(&self, notice: &Notice) { info!(%notice, "operator notice"); }
}

/// `POST /students`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WorshipStore,
{
  let operator = RequestOperator { confirmed: body.confirm_same_name };
  let input = body.into_new_student();
  let requested = input.name.clone();

  match naming::add_student(&*store, &operator, input).await? {
    AddStudentOutcome::Added { student, rename, notices } => {
      Ok((StatusCode::CREATED, Json(Created { student, rename, notices })))
    }
    AddStudentOutcome::Declined { existing } => Err(ApiError::Conflict {
      message:  format!(
        "a student named {:?} already exists; set confirm_same_name to add a different person",
        requested.trim()
      ),
      existing: Box::new(existing),
    }),
  }
}

// ─── Get / delete ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StudentDetail {
  #[serde(flatten)]
  pub student:  Student,
  /// Stored field combinations the transitions would never produce.
  pub warnings: Vec<Inconsistency>,
}

/// `GET /students/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StudentDetail>, ApiError>
where
  S: WorshipStore,
{
  let student = store
    .get_student(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("student {id} not found")))?;
  let warnings = student.inconsistencies();
  Ok(Json(StudentDetail { student, warnings }))
}

/// `DELETE /students/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: WorshipStore,
{
  if store.delete_student(id).await.map_err(ApiError::store)? {
    info!(student_id = %id, "deleted student");
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("student {id} not found")))
  }
}

/// `POST /students/:id/deactivate`
pub async fn deactivate<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Transition>, ApiError>
where
  S: WorshipStore,
{
  Ok(Json(roster::deactivate(&*store, id).await?))
}

// ─── Roster transitions ───────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DateBody {
  pub date: Option<NaiveDate>,
}

/// `POST /students/:id/new-friend`
pub async fn tag_new_friend<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<DateBody>,
) -> Result<Json<TagNewFriendOutcome>, ApiError>
where
  S: WorshipStore,
{
  let date = body.date.unwrap_or_else(today);
  Ok(Json(roster::tag_new_friend(&*store, id, date).await?))
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub class_id: Uuid,
  pub date:     Option<NaiveDate>,
}

/// `POST /students/:id/assign`
pub async fn assign<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AssignBody>,
) -> Result<Json<Transition>, ApiError>
where
  S: WorshipStore,
{
  let transition = roster::assign_to_class(&*store, id, body.class_id, body.date).await?;
  Ok(Json(transition))
}

/// `POST /students/:id/unassign`
pub async fn unassign<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Transition>, ApiError>
where
  S: WorshipStore,
{
  Ok(Json(roster::remove_from_class(&*store, id).await?))
}

/// `PUT /students/:id/tags/:tag`
pub async fn add_tag<S>(
  State(store): State<Arc<S>>,
  Path((id, tag)): Path<(Uuid, String)>,
) -> Result<Response, ApiError>
where
  S: WorshipStore,
{
  let tag = tag.trim();
  if tag.is_empty() {
    return Err(ApiError::BadRequest("tag must not be empty".into()));
  }
  if tag == NEW_FRIEND {
    let outcome = roster::tag_new_friend(&*store, id, today()).await?;
    return Ok(Json(outcome).into_response());
  }
  let transition = roster::add_tag(&*store, id, tag).await?;
  Ok(Json(transition).into_response())
}

/// `DELETE /students/:id/tags/:tag`
pub async fn remove_tag<S>(
  State(store): State<Arc<S>>,
  Path((id, tag)): Path<(Uuid, String)>,
) -> Result<Json<Transition>, ApiError>
where
  S: WorshipStore,
{
  Ok(Json(roster::remove_tag(&*store, id, &tag).await?))
}
