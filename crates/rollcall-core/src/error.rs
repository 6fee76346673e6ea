//! Error types for `rollcall-core`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// The store call that was in flight when a persistence error occurred.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum WriteStep {
  /// Reading candidates or the record being transitioned.
  Lookup,
  /// Renaming an existing student during name disambiguation.
  Rename,
  /// Inserting the new student.
  Insert,
  /// A roster transition (tagging, assignment, removal).
  Transition,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("student not found: {0}")]
  StudentNotFound(Uuid),

  #[error("class not found: {0}")]
  ClassNotFound(Uuid),

  #[error("student name must not be empty")]
  EmptyName,

  #[error("every suffix from A to Z is already used for {0:?}")]
  SuffixesExhausted(String),

  #[error(
    "student {student_id} cannot join a class on {assigned}, before their \
     first visit on {first_visit}"
  )]
  AssignedBeforeFirstVisit {
    student_id:  Uuid,
    first_visit: NaiveDate,
    assigned:    NaiveDate,
  },

  #[error("store error during {step}: {source}")]
  Store {
    step:   WriteStep,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl Error {
  /// Adapter for `map_err` that tags a backend error with the step it
  /// interrupted.
  pub fn store<E>(step: WriteStep) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| Self::Store { step, source: Box::new(e) }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
