//! Students, the records both rule engines operate on.
//!
//! A student's roster membership is never stored as a flag. It is derived
//! from `class_id`, the `new-friend` tag and the two dates below; see
//! [`crate::roster`].

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Tags ────────────────────────────────────────────────────────────────────

/// Marks a recent first-time visitor who has not yet joined a class.
pub const NEW_FRIEND: &str = "new-friend";

/// Marks members of the special group shown on its own row of the paper form.
pub const SPECIAL_GROUP: &str = "special-group";

// ─── Student ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub student_id:          Uuid,
  /// Display name. Not unique; see [`crate::naming`].
  pub name:                String,
  /// `None` means unassigned.
  pub class_id:            Option<Uuid>,
  pub tags:                BTreeSet<String>,
  /// Set when the student is tagged as a new friend.
  pub first_visit_date:    Option<NaiveDate>,
  /// Set when a new friend is moved into a class. Only written by
  /// [`crate::roster::assign_to_class`].
  pub class_assigned_date: Option<NaiveDate>,
  /// Soft-delete flag.
  pub is_active:           bool,
  pub created_at:          DateTime<Utc>,
}

impl Student {
  pub fn has_tag(&self, tag: &str) -> bool { self.tags.contains(tag) }

  pub fn is_new_friend(&self) -> bool { self.has_tag(NEW_FRIEND) }

  /// Field combinations the transitions never produce but legacy rows may
  /// still carry. None of them is fatal.
  pub fn inconsistencies(&self) -> Vec<Inconsistency> {
    let mut found = Vec::new();
    let Some(assigned) = self.class_assigned_date else {
      return found;
    };

    if self.class_id.is_none() {
      found.push(Inconsistency::AssignedDateWithoutClass { assigned });
    }
    if self.is_new_friend() {
      found.push(Inconsistency::NewFriendWithAssignedDate { assigned });
    }
    if let Some(first_visit) = self.first_visit_date
      && assigned < first_visit
    {
      found.push(Inconsistency::AssignedBeforeFirstVisit {
        first_visit,
        assigned,
      });
    }
    found
  }
}

/// A soft warning about a student's stored fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconsistency {
  /// Also left behind by [`crate::roster::remove_from_class`], which keeps
  /// dates.
  AssignedDateWithoutClass {
    assigned: NaiveDate,
  },
  NewFriendWithAssignedDate {
    assigned: NaiveDate,
  },
  AssignedBeforeFirstVisit {
    first_visit: NaiveDate,
    assigned:    NaiveDate,
  },
}

impl Inconsistency {
  /// The normal aftermath of leaving a class rather than a conflict only
  /// legacy data can carry.
  pub fn is_retained_history(&self) -> bool {
    matches!(self, Self::AssignedDateWithoutClass { .. })
  }
}

impl fmt::Display for Inconsistency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::AssignedDateWithoutClass { assigned } => {
        write!(f, "class assignment date {assigned} set without a class")
      }
      Self::NewFriendWithAssignedDate { assigned } => {
        write!(f, "new-friend tag present alongside assignment date {assigned}")
      }
      Self::AssignedBeforeFirstVisit { first_visit, assigned } => write!(
        f,
        "assigned to a class on {assigned}, before first visit on {first_visit}"
      ),
    }
  }
}

// ─── NewStudent ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::StudentStore::add_student`].
///
/// There is deliberately no `class_assigned_date` here: a student created
/// straight into a class is visible in that class for every date.
#[derive(Debug, Clone, Default)]
pub struct NewStudent {
  pub name:             String,
  pub class_id:         Option<Uuid>,
  pub tags:             BTreeSet<String>,
  pub first_visit_date: Option<NaiveDate>,
}

impl NewStudent {
  /// An unassigned, untagged student.
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  pub fn in_class(mut self, class_id: Uuid) -> Self {
    self.class_id = Some(class_id);
    self
  }

  /// Register the student as a new friend first seen on `first_visit`.
  pub fn new_friend(mut self, first_visit: NaiveDate) -> Self {
    self.tags.insert(NEW_FRIEND.to_owned());
    self.first_visit_date = Some(first_visit);
    self.class_id = None;
    self
  }

  pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
    self.tags.insert(tag.into());
    self
  }
}

// ─── StudentPatch ────────────────────────────────────────────────────────────

/// A partial update applied to one student in a single store call.
///
/// Outer `None` leaves a field untouched; `Some(None)` clears a nullable
/// field. Serialises to only the fields that change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name:                Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub class_id:            Option<Option<Uuid>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags:                Option<BTreeSet<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_visit_date:    Option<Option<NaiveDate>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub class_assigned_date: Option<Option<NaiveDate>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_active:           Option<bool>,
}

impl StudentPatch {
  pub fn rename(name: impl Into<String>) -> Self {
    Self { name: Some(name.into()), ..Self::default() }
  }

  pub fn is_empty(&self) -> bool { self == &Self::default() }

  /// Apply the patch to an in-memory copy.
  pub fn apply(&self, student: &mut Student) {
    if let Some(name) = &self.name {
      student.name.clone_from(name);
    }
    if let Some(class_id) = self.class_id {
      student.class_id = class_id;
    }
    if let Some(tags) = &self.tags {
      student.tags.clone_from(tags);
    }
    if let Some(first_visit) = self.first_visit_date {
      student.first_visit_date = first_visit;
    }
    if let Some(assigned) = self.class_assigned_date {
      student.class_assigned_date = assigned;
    }
    if let Some(active) = self.is_active {
      student.is_active = active;
    }
  }
}
