//! Roster membership over time.
//!
//! Whether a student appears in a roster is computed, never stored. Two
//! dates drive it:
//!
//! - `first_visit_date` opens the new-friend window;
//! - `class_assigned_date` closes it and opens the class window.
//!
//! ```text
//!  [unassigned] --tag_new_friend--> [new friend, visible from first visit]
//!  [new friend] --assign_to_class--> [in class, visible from assignment]
//!  [in class]   --remove_from_class--> [unassigned]  (dates retained)
//!  [unassigned] --assign_to_class--> [in class, no assignment date unless
//!                                     coming from new friend]
//! ```
//!
//! Each transition is planned as a [`StudentPatch`] by a pure function and
//! written with a single [`StudentStore::update_student`] call.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result, WriteStep,
  store::StudentStore,
  student::{NEW_FRIEND, Student, StudentPatch},
};

// ─── Visibility ──────────────────────────────────────────────────────────────

/// The roster being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "class_id", rename_all = "snake_case")]
pub enum RosterContext {
  /// A real class.
  Class(Uuid),
  /// The virtual roster of new friends not yet placed in a class.
  NewFriends,
}

/// Does `student` appear in `context` on `date`?
///
/// Inactive students never appear. Legacy rows with conflicting fields are
/// judged on the fields that still make sense rather than rejected.
pub fn is_visible(student: &Student, context: &RosterContext, date: NaiveDate) -> bool {
  if !student.is_active {
    return false;
  }

  match *context {
    RosterContext::Class(class_id) => {
      if student.class_id != Some(class_id) {
        return false;
      }
      // A new friend is never shown in a class before their first visit.
      if student.is_new_friend()
        && student.first_visit_date.is_some_and(|first| date < first)
      {
        return false;
      }
      student.class_assigned_date.is_none_or(|assigned| assigned <= date)
    }

    RosterContext::NewFriends => {
      was_new_friend(student)
        && student.first_visit_date.is_none_or(|first| first <= date)
        && student.class_assigned_date.is_none_or(|assigned| date < assigned)
    }
  }
}

/// Tagged now, or tagged until an assignment retired the tag. The second
/// case keeps past new-friend rosters intact after the student moves on.
fn was_new_friend(student: &Student) -> bool {
  student.is_new_friend()
    || (student.first_visit_date.is_some() && student.class_assigned_date.is_some())
}

/// Filter `students` down to those visible in `context` on `date`,
/// preserving order.
pub fn visible_students(
  students: &[Student],
  context: &RosterContext,
  date: NaiveDate,
) -> Vec<Student> {
  students
    .iter()
    .filter(|s| is_visible(s, context, date))
    .cloned()
    .collect()
}

// ─── Planning ────────────────────────────────────────────────────────────────

/// Tag as new friend: stamp the first visit, clear class and assignment.
pub fn plan_tag_new_friend(student: &Student, date: NaiveDate) -> StudentPatch {
  let mut tags = student.tags.clone();
  tags.insert(NEW_FRIEND.to_owned());
  StudentPatch {
    class_id: Some(None),
    tags: Some(tags),
    first_visit_date: Some(Some(date)),
    class_assigned_date: Some(None),
    ..StudentPatch::default()
  }
}

/// Move into `class_id`. Coming from new-friend status retires the tag and
/// stamps `date` as the assignment date; plain moves leave dates alone.
///
/// Assigning a student to the class they already sit in is a no-op, so an
/// existing assignment date is never moved forward.
pub fn plan_assign_to_class(
  student: &Student,
  class_id: Uuid,
  date: NaiveDate,
) -> Result<StudentPatch> {
  if student.class_id == Some(class_id) && !student.is_new_friend() {
    return Ok(StudentPatch::default());
  }

  let mut patch = StudentPatch { class_id: Some(Some(class_id)), ..StudentPatch::default() };

  if student.is_new_friend() || student.first_visit_date.is_some() {
    if let Some(first_visit) = student.first_visit_date
      && date < first_visit
    {
      return Err(Error::AssignedBeforeFirstVisit {
        student_id: student.student_id,
        first_visit,
        assigned: date,
      });
    }
    let mut tags = student.tags.clone();
    tags.remove(NEW_FRIEND);
    patch.tags = Some(tags);
    patch.class_assigned_date = Some(Some(date));
  }

  Ok(patch)
}

/// Back to the unassigned pool. Tags and dates are kept.
pub fn plan_remove_from_class() -> StudentPatch {
  StudentPatch { class_id: Some(None), ..StudentPatch::default() }
}

/// `None` if the student does not carry `tag`.
pub fn plan_remove_tag(student: &Student, tag: &str) -> Option<StudentPatch> {
  let mut tags = student.tags.clone();
  tags.remove(tag).then(|| StudentPatch { tags: Some(tags), ..StudentPatch::default() })
}

/// `None` if the student already carries `tag`. Does not touch dates, so
/// use [`plan_tag_new_friend`] for the `new-friend` tag.
pub fn plan_add_tag(student: &Student, tag: &str) -> Option<StudentPatch> {
  let mut tags = student.tags.clone();
  tags
    .insert(tag.to_owned())
    .then(|| StudentPatch { tags: Some(tags), ..StudentPatch::default() })
}

// ─── Transitions ─────────────────────────────────────────────────────────────

/// The result of a transition: the stored record and the fields written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
  pub student: Student,
  /// Empty when nothing needed to change.
  pub changed: StudentPatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagNewFriendOutcome {
  #[serde(flatten)]
  pub transition:    Transition,
  /// The student had history before `first_visit_date` that normal roster
  /// views will no longer reach. The operator should be warned.
  pub hides_history: bool,
}

async fn fetch<S: StudentStore>(store: &S, id: Uuid) -> Result<Student> {
  let student = store
    .get_student(id)
    .await
    .map_err(Error::store(WriteStep::Lookup))?
    .ok_or(Error::StudentNotFound(id))?;

  for issue in student.inconsistencies() {
    if issue.is_retained_history() {
      debug!(student_id = %id, %issue, "student keeps dates from an earlier class");
    } else {
      warn!(student_id = %id, %issue, "inconsistent student record");
    }
  }
  Ok(student)
}

async fn write<S: StudentStore>(
  store: &S,
  student: Student,
  patch: StudentPatch,
) -> Result<Transition> {
  if patch.is_empty() {
    return Ok(Transition { student, changed: patch });
  }
  let id = student.student_id;
  let updated = store
    .update_student(id, patch.clone())
    .await
    .map_err(Error::store(WriteStep::Transition))?
    .ok_or(Error::StudentNotFound(id))?;
  Ok(Transition { student: updated, changed: patch })
}

/// Tag a student as a new friend first seen on `date`.
///
/// Attendance rows are never deleted, but rows dated before `date` stop
/// being reachable through roster views; `hides_history` reports that.
pub async fn tag_new_friend<S: StudentStore>(
  store: &S,
  student_id: Uuid,
  date: NaiveDate,
) -> Result<TagNewFriendOutcome> {
  let student = fetch(store, student_id).await?;
  let earlier = store
    .count_attendance_before(student_id, date)
    .await
    .map_err(Error::store(WriteStep::Lookup))?;
  let hides_history = earlier > 0 || student.class_id.is_some();

  let patch = plan_tag_new_friend(&student, date);
  let transition = write(store, student, patch).await?;
  info!(%student_id, %date, hides_history, "tagged new friend");

  Ok(TagNewFriendOutcome { transition, hides_history })
}

/// Assign a student to `class_id`. `date` defaults to today in local time.
pub async fn assign_to_class<S: StudentStore>(
  store: &S,
  student_id: Uuid,
  class_id: Uuid,
  date: Option<NaiveDate>,
) -> Result<Transition> {
  let date = date.unwrap_or_else(|| Local::now().date_naive());
  let student = fetch(store, student_id).await?;
  store
    .get_class(class_id)
    .await
    .map_err(Error::store(WriteStep::Lookup))?
    .ok_or(Error::ClassNotFound(class_id))?;

  let patch = plan_assign_to_class(&student, class_id, date)?;
  let transition = write(store, student, patch).await?;
  if !transition.changed.is_empty() {
    info!(%student_id, %class_id, %date, "assigned student to class");
  }
  Ok(transition)
}

pub async fn remove_from_class<S: StudentStore>(
  store: &S,
  student_id: Uuid,
) -> Result<Transition> {
  let student = fetch(store, student_id).await?;
  let patch = if student.class_id.is_some() {
    plan_remove_from_class()
  } else {
    StudentPatch::default()
  };
  let transition = write(store, student, patch).await?;
  info!(%student_id, "removed student from class");
  Ok(transition)
}

pub async fn remove_tag<S: StudentStore>(
  store: &S,
  student_id: Uuid,
  tag: &str,
) -> Result<Transition> {
  let student = fetch(store, student_id).await?;
  let patch = plan_remove_tag(&student, tag).unwrap_or_default();
  write(store, student, patch).await
}

pub async fn add_tag<S: StudentStore>(
  store: &S,
  student_id: Uuid,
  tag: &str,
) -> Result<Transition> {
  let student = fetch(store, student_id).await?;
  let patch = plan_add_tag(&student, tag).unwrap_or_default();
  write(store, student, patch).await
}

/// Soft-delete: the student disappears from every roster but keeps all rows.
pub async fn deactivate<S: StudentStore>(store: &S, student_id: Uuid) -> Result<Transition> {
  let student = fetch(store, student_id).await?;
  let patch = if student.is_active {
    StudentPatch { is_active: Some(false), ..StudentPatch::default() }
  } else {
    StudentPatch::default()
  };
  let transition = write(store, student, patch).await?;
  info!(%student_id, "deactivated student");
  Ok(transition)
}
