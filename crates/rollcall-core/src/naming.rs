//! Name disambiguation for new students.
//!
//! Names are not unique in the store. When a new student shares a name with
//! an existing one, both end up with a single uppercase letter appended so
//! historical attendance stays attributed to the right person:
//!
//! | Existing              | Requested | Result                                |
//! |-----------------------|-----------|---------------------------------------|
//! | —                     | `Kim`     | `Kim`                                 |
//! | `Kim`                 | `Kim`     | old → `KimA`, new → `KimB`            |
//! | `Kim`, `KimA`, `KimC` | `Kim`     | new → `KimD` (gaps are never filled)  |
//! | `ParkA`, `ParkB`      | `Park`    | new → `ParkC`, nothing renamed        |
//!
//! The check runs once, at creation. Later edits never re-trigger it.

use std::{collections::BTreeSet, fmt};

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result, WriteStep,
  class::Class,
  store::StudentStore,
  student::{NEW_FRIEND, NewStudent, Student, StudentPatch},
};

// ─── Operator callbacks ──────────────────────────────────────────────────────

/// The human in the loop, injected so the engine stays UI-agnostic.
pub trait Operator: Send + Sync {
  /// Asked when the requested name exactly matches `existing`. Return `true`
  /// if the new student is a different person; `false` aborts without
  /// changes.
  fn confirm_same_name(&self, existing: &Student, class: Option<&Class>) -> bool;

  /// Told about every name the engine changed or chose on the operator's
  /// behalf.
  fn notify(&self, notice: &Notice);
}

/// Something the operator must be told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
  /// An existing student was renamed to make room for the new one.
  Renamed {
    student_id:    Uuid,
    /// Where the renamed student sits, e.g. `"Middle 1"` or `"Unassigned"`.
    class_label:   String,
    old_name:      String,
    new_name:      String,
    /// The name the new student was given.
    assigned_name: String,
  },
  /// Suffixed siblings already existed; the new student got the next letter.
  AutoSuffixed {
    requested:     String,
    assigned_name: String,
  },
  /// The operator confirmed a same-name collision but `A` was already taken,
  /// so the existing student kept the bare name.
  NameKept {
    student_id:    Uuid,
    class_label:   String,
    existing_name: String,
    assigned_name: String,
  },
}

impl fmt::Display for Notice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Renamed { class_label, old_name, new_name, assigned_name, .. } => {
        write!(
          f,
          "existing \"{class_label} {old_name}\" is now \"{new_name}\"; the new \
           student is saved as \"{assigned_name}\""
        )
      }
      Self::AutoSuffixed { requested, assigned_name } => write!(
        f,
        "\"{requested}\" already exists with suffixes; the new student is saved \
         as \"{assigned_name}\""
      ),
      Self::NameKept { class_label, existing_name, assigned_name, .. } => write!(
        f,
        "existing \"{class_label} {existing_name}\" keeps its name because \
         \"{existing_name}A\" is taken; the new student is saved as \"{assigned_name}\""
      ),
    }
  }
}

// ─── Planning ────────────────────────────────────────────────────────────────

/// A rename of an existing student required by a collision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
  pub student_id: Uuid,
  pub old_name:   String,
  pub new_name:   String,
}

/// What to do with a requested name, before anyone is asked or anything is
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePlan {
  /// No exact or suffixed match: keep the name as typed.
  Unique { final_name: String },
  /// Only suffixed siblings exist: take the next letter, rename nobody.
  AutoSuffix { final_name: String },
  /// An exact match exists and needs confirmation.
  Collision {
    existing:   Student,
    /// `None` when the `A` suffix is already taken by someone else.
    rename:     Option<Rename>,
    final_name: String,
  },
}

/// The suffix letter of `name` relative to `base`, if `name` is exactly
/// `base` followed by one ASCII uppercase letter.
pub fn suffix_of(base: &str, name: &str) -> Option<char> {
  let mut rest = name.strip_prefix(base)?.chars();
  let letter = rest.next()?;
  (rest.next().is_none() && letter.is_ascii_uppercase()).then_some(letter)
}

fn next_letter(base: &str, highest: Option<char>) -> Result<char> {
  match highest {
    None => Ok('A'),
    Some('Z') => Err(Error::SuffixesExhausted(base.to_owned())),
    Some(c) => Ok(char::from(c as u8 + 1)),
  }
}

/// Decide the name for a new student given every active student whose name
/// starts with `base`. Candidates that merely share the prefix are ignored.
pub fn plan_name(base: &str, candidates: &[Student]) -> Result<NamePlan> {
  let mut exact_matches = candidates.iter().filter(|s| s.name == base);
  let exact = exact_matches.next();
  let extra = exact_matches.count();
  if extra > 0 {
    warn!(
      name = base,
      count = extra + 1,
      "several active students share the bare name; only the first is renamed",
    );
  }
  let mut letters: BTreeSet<char> = candidates
    .iter()
    .filter_map(|s| suffix_of(base, &s.name))
    .collect();

  let Some(existing) = exact else {
    if letters.is_empty() {
      return Ok(NamePlan::Unique { final_name: base.to_owned() });
    }
    let next = next_letter(base, letters.last().copied())?;
    return Ok(NamePlan::AutoSuffix { final_name: format!("{base}{next}") });
  };

  // The bare record becomes `A` unless someone else already holds it.
  let rename = letters.insert('A').then(|| Rename {
    student_id: existing.student_id,
    old_name:   existing.name.clone(),
    new_name:   format!("{base}A"),
  });
  let next = next_letter(base, letters.last().copied())?;

  Ok(NamePlan::Collision {
    existing: existing.clone(),
    rename,
    final_name: format!("{base}{next}"),
  })
}

// ─── Resolution ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// The operator said the new student is the same person as `existing`.
  Declined { existing: Student },
  /// The name to persist. `rename` has already been written.
  Resolved {
    final_name: String,
    rename:     Option<Rename>,
  },
}

/// Decide the final name for a new student named `base` and persist any
/// rename of a colliding record. Notices are sent before returning.
///
/// The new student itself is not inserted; see [`add_student`].
pub async fn resolve_new_student_name<S, O>(
  store: &S,
  operator: &O,
  base: &str,
) -> Result<Resolution>
where
  S: StudentStore,
  O: Operator,
{
  let (resolution, notices) = resolve(store, operator, base.trim()).await?;
  for notice in &notices {
    operator.notify(notice);
  }
  Ok(resolution)
}

async fn resolve<S, O>(
  store: &S,
  operator: &O,
  base: &str,
) -> Result<(Resolution, Vec<Notice>)>
where
  S: StudentStore,
  O: Operator,
{
  if base.is_empty() {
    return Err(Error::EmptyName);
  }

  let candidates = store
    .find_by_name_prefix(base.to_owned())
    .await
    .map_err(Error::store(WriteStep::Lookup))?;

  match plan_name(base, &candidates)? {
    NamePlan::Unique { final_name } => {
      Ok((Resolution::Resolved { final_name, rename: None }, vec![]))
    }

    NamePlan::AutoSuffix { final_name } => {
      info!(requested = base, assigned = %final_name, "auto-suffixed new student");
      let notice = Notice::AutoSuffixed {
        requested:     base.to_owned(),
        assigned_name: final_name.clone(),
      };
      Ok((Resolution::Resolved { final_name, rename: None }, vec![notice]))
    }

    NamePlan::Collision { existing, rename, final_name } => {
      let class = match existing.class_id {
        Some(class_id) => store
          .get_class(class_id)
          .await
          .map_err(Error::store(WriteStep::Lookup))?,
        None => None,
      };

      if !operator.confirm_same_name(&existing, class.as_ref()) {
        info!(name = base, "same-name collision declined by operator");
        return Ok((Resolution::Declined { existing }, vec![]));
      }

      let class_label = class.as_ref().map_or_else(|| "Unassigned".to_owned(), Class::label);
      let mut notices = Vec::new();
      if let Some(rename) = &rename {
        store
          .update_student(rename.student_id, StudentPatch::rename(&rename.new_name))
          .await
          .map_err(Error::store(WriteStep::Rename))?
          .ok_or(Error::StudentNotFound(rename.student_id))?;

        info!(
          student_id = %rename.student_id,
          from = %rename.old_name,
          to = %rename.new_name,
          "renamed existing student to disambiguate",
        );
        notices.push(Notice::Renamed {
          student_id: rename.student_id,
          class_label,
          old_name: rename.old_name.clone(),
          new_name: rename.new_name.clone(),
          assigned_name: final_name.clone(),
        });
      } else {
        info!(
          student_id = %existing.student_id,
          assigned = %final_name,
          "suffix A taken; existing student keeps the bare name",
        );
        notices.push(Notice::NameKept {
          student_id: existing.student_id,
          class_label,
          existing_name: existing.name.clone(),
          assigned_name: final_name.clone(),
        });
      }

      Ok((Resolution::Resolved { final_name, rename }, notices))
    }
  }
}

// ─── Creation ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddStudentOutcome {
  Added {
    student: Student,
    rename:  Option<Rename>,
    notices: Vec<Notice>,
  },
  /// Nothing was written.
  Declined { existing: Student },
}

/// Create a student, disambiguating the name first.
///
/// The rename of a colliding record is written before the insert so the two
/// names never coincide. If the insert fails, the rename is reverted on a
/// best-effort basis and the insert failure is returned. Notices are only
/// sent once the insert has succeeded.
pub async fn add_student<S, O>(
  store: &S,
  operator: &O,
  mut input: NewStudent,
) -> Result<AddStudentOutcome>
where
  S: StudentStore,
  O: Operator,
{
  let base = input.name.trim().to_owned();
  let (resolution, notices) = resolve(store, operator, &base).await?;

  let (final_name, rename) = match resolution {
    Resolution::Declined { existing } => {
      return Ok(AddStudentOutcome::Declined { existing });
    }
    Resolution::Resolved { final_name, rename } => (final_name, rename),
  };

  input.name = final_name;
  if input.tags.contains(NEW_FRIEND) {
    input.class_id = None;
  }

  let student = match store.add_student(input).await {
    Ok(student) => student,
    Err(insert_err) => {
      if let Some(rename) = &rename {
        revert_rename(store, rename).await;
      }
      return Err(Error::Store {
        step:   WriteStep::Insert,
        source: Box::new(insert_err),
      });
    }
  };

  info!(student_id = %student.student_id, name = %student.name, "added student");
  for notice in &notices {
    operator.notify(notice);
  }

  Ok(AddStudentOutcome::Added { student, rename, notices })
}

async fn revert_rename<S: StudentStore>(store: &S, rename: &Rename) {
  match store
    .update_student(rename.student_id, StudentPatch::rename(&rename.old_name))
    .await
  {
    Ok(_) => warn!(
      student_id = %rename.student_id,
      name = %rename.old_name,
      "insert failed; restored original name",
    ),
    Err(e) => error!(
      student_id = %rename.student_id,
      kept = %rename.new_name,
      error = %e,
      "insert failed and the rename could not be reverted",
    ),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use chrono::NaiveDate;

  use super::*;
  use crate::{class::Grade, memory::MemoryStore};

  /// Answers every confirmation with `answer` and records notices.
  struct Scripted {
    answer:  bool,
    asked:   Mutex<Vec<(String, Option<String>)>>,
    notices: Mutex<Vec<Notice>>,
  }

  impl Scripted {
    fn new(answer: bool) -> Self {
      Self { answer, asked: Mutex::default(), notices: Mutex::default() }
    }

    fn notices(&self) -> Vec<Notice> { self.notices.lock().unwrap().clone() }
  }

  impl Operator for Scripted {
    fn confirm_same_name(&self, existing: &Student, class: Option<&Class>) -> bool {
      self
        .asked
        .lock()
        .unwrap()
        .push((existing.name.clone(), class.map(Class::label)));
      self.answer
    }

    fn notify(&self, notice: &Notice) { self.notices.lock().unwrap().push(notice.clone()); }
  }

  async fn seeded(names: &[&str]) -> MemoryStore {
    let store = MemoryStore::default();
    for name in names {
      store.add_student(NewStudent::new(*name)).await.unwrap();
    }
    store
  }

  fn names(store: &MemoryStore) -> Vec<String> {
    let mut names: Vec<_> = store.all_students().into_iter().map(|s| s.name).collect();
    names.sort();
    names
  }

  // ─── plan_name ─────────────────────────────────────────────────────────────

  #[test]
  fn suffix_requires_exactly_one_uppercase_letter() {
    assert_eq!(suffix_of("Kim", "KimA"), Some('A'));
    assert_eq!(suffix_of("Kim", "Kim"), None);
    assert_eq!(suffix_of("Kim", "KimAB"), None);
    assert_eq!(suffix_of("Kim", "Kima"), None);
    assert_eq!(suffix_of("Kim", "Kim1"), None);
    assert_eq!(suffix_of("Kim", "Park"), None);
  }

  #[tokio::test]
  async fn unrelated_prefix_matches_are_ignored() {
    let store = seeded(&["Kimberly", "KimAB", "Kim Jr"]).await;
    let candidates = store.find_by_name_prefix("Kim".into()).await.unwrap();
    assert_eq!(candidates.len(), 3);
    assert_eq!(
      plan_name("Kim", &candidates).unwrap(),
      NamePlan::Unique { final_name: "Kim".into() }
    );
  }

  #[tokio::test]
  async fn exhausted_suffixes_are_refused() {
    let store = seeded(&["LeeZ"]).await;
    let candidates = store.find_by_name_prefix("Lee".into()).await.unwrap();
    assert!(matches!(
      plan_name("Lee", &candidates),
      Err(Error::SuffixesExhausted(base)) if base == "Lee"
    ));
  }

  // ─── add_student ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unique_name_is_kept_without_rename() {
    let store = seeded(&["Park"]).await;
    let op = Scripted::new(true);

    let outcome = add_student(&store, &op, NewStudent::new("  Kim ")).await.unwrap();
    let AddStudentOutcome::Added { student, rename, notices } = outcome else {
      panic!("expected Added");
    };
    assert_eq!(student.name, "Kim");
    assert!(rename.is_none());
    assert!(notices.is_empty());
    assert!(op.asked.lock().unwrap().is_empty());
    assert_eq!(names(&store), ["Kim", "Park"]);
  }

  #[tokio::test]
  async fn first_collision_promotes_existing_to_a() {
    let store = MemoryStore::default();
    let class = store.insert_class(Grade::Middle, "1");
    let old = store
      .add_student(NewStudent::new("Kim").in_class(class.class_id))
      .await
      .unwrap();
    let op = Scripted::new(true);

    let outcome = add_student(&store, &op, NewStudent::new("Kim")).await.unwrap();
    let AddStudentOutcome::Added { student, rename, notices } = outcome else {
      panic!("expected Added");
    };

    assert_eq!(student.name, "KimB");
    assert_eq!(
      rename,
      Some(Rename {
        student_id: old.student_id,
        old_name:   "Kim".into(),
        new_name:   "KimA".into(),
      })
    );
    let renamed = store.get_student(old.student_id).await.unwrap().unwrap();
    assert_eq!(renamed.name, "KimA");
    assert_eq!(
      op.asked.lock().unwrap().as_slice(),
      [("Kim".to_owned(), Some("Middle 1".to_owned()))]
    );
    assert_eq!(notices.len(), 1);
    assert_eq!(op.notices(), notices);
    assert!(matches!(
      &notices[0],
      Notice::Renamed { new_name, assigned_name, class_label, .. }
        if new_name == "KimA" && assigned_name == "KimB" && class_label == "Middle 1"
    ));
  }

  #[tokio::test]
  async fn next_suffix_is_past_the_highest_letter() {
    let store = seeded(&["Kim", "KimA", "KimC"]).await;
    let op = Scripted::new(true);

    let outcome = add_student(&store, &op, NewStudent::new("Kim")).await.unwrap();
    let AddStudentOutcome::Added { student, rename, notices } = outcome else {
      panic!("expected Added");
    };
    assert_eq!(student.name, "KimD");
    // `KimA` is taken, so the bare record keeps its name.
    assert!(rename.is_none());
    assert_eq!(names(&store), ["Kim", "KimA", "KimC", "KimD"]);

    assert_eq!(notices.len(), 1);
    assert_eq!(op.notices(), notices);
    assert!(matches!(
      &notices[0],
      Notice::NameKept { existing_name, assigned_name, class_label, .. }
        if existing_name == "Kim" && assigned_name == "KimD" && class_label == "Unassigned"
    ));
  }

  #[tokio::test]
  async fn duplicate_bare_names_rename_only_one() {
    let store = seeded(&["Kim", "Kim"]).await;
    let first = store.all_students().remove(0);
    let op = Scripted::new(true);

    let outcome = add_student(&store, &op, NewStudent::new("Kim")).await.unwrap();
    let AddStudentOutcome::Added { student, rename, .. } = outcome else {
      panic!("expected Added");
    };
    assert_eq!(student.name, "KimB");
    assert_eq!(rename.map(|r| r.student_id), Some(first.student_id));
    assert_eq!(names(&store), ["Kim", "KimA", "KimB"]);
    assert_eq!(op.asked.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn bare_record_takes_a_when_it_is_free() {
    let store = seeded(&["Kim", "KimC"]).await;
    let op = Scripted::new(true);

    let outcome = add_student(&store, &op, NewStudent::new("Kim")).await.unwrap();
    let AddStudentOutcome::Added { student, rename, .. } = outcome else {
      panic!("expected Added");
    };
    assert_eq!(student.name, "KimD");
    assert_eq!(rename.map(|r| r.new_name).as_deref(), Some("KimA"));
    assert_eq!(names(&store), ["KimA", "KimC", "KimD"]);
  }

  #[tokio::test]
  async fn bare_name_with_only_suffixed_siblings() {
    let store = seeded(&["ParkA", "ParkB"]).await;
    let op = Scripted::new(false);

    let outcome = add_student(&store, &op, NewStudent::new("Park")).await.unwrap();
    let AddStudentOutcome::Added { student, rename, notices } = outcome else {
      panic!("expected Added");
    };
    assert_eq!(student.name, "ParkC");
    assert!(rename.is_none());
    assert!(op.asked.lock().unwrap().is_empty());
    assert_eq!(
      notices,
      [Notice::AutoSuffixed {
        requested:     "Park".into(),
        assigned_name: "ParkC".into(),
      }]
    );
    assert_eq!(names(&store), ["ParkA", "ParkB", "ParkC"]);
  }

  #[tokio::test]
  async fn declining_changes_nothing() {
    let store = seeded(&["Kim"]).await;
    let op = Scripted::new(false);

    let outcome = add_student(&store, &op, NewStudent::new("Kim")).await.unwrap();
    assert!(matches!(
      outcome,
      AddStudentOutcome::Declined { ref existing } if existing.name == "Kim"
    ));
    assert!(op.notices().is_empty());
    assert_eq!(names(&store), ["Kim"]);
  }

  #[tokio::test]
  async fn inactive_students_do_not_collide() {
    let store = seeded(&["Kim"]).await;
    let old = store.all_students().remove(0);
    store
      .update_student(old.student_id, StudentPatch {
        is_active: Some(false),
        ..StudentPatch::default()
      })
      .await
      .unwrap();

    let op = Scripted::new(true);
    let outcome = add_student(&store, &op, NewStudent::new("Kim")).await.unwrap();
    assert!(matches!(
      outcome,
      AddStudentOutcome::Added { ref student, .. } if student.name == "Kim"
    ));
  }

  #[tokio::test]
  async fn failed_insert_reverts_the_rename() {
    let store = seeded(&["Kim"]).await;
    store.fail_inserts(true);
    let op = Scripted::new(true);

    let err = add_student(&store, &op, NewStudent::new("Kim")).await.unwrap_err();
    assert!(matches!(err, Error::Store { step: WriteStep::Insert, .. }));
    assert_eq!(names(&store), ["Kim"]);
    assert!(op.notices().is_empty());
  }

  #[tokio::test]
  async fn empty_name_is_rejected() {
    let store = MemoryStore::default();
    let op = Scripted::new(true);
    let err = add_student(&store, &op, NewStudent::new("   ")).await.unwrap_err();
    assert!(matches!(err, Error::EmptyName));
  }

  #[tokio::test]
  async fn new_friend_is_created_without_class_or_assignment_date() {
    let store = MemoryStore::default();
    let class = store.insert_class(Grade::High, "2");
    let op = Scripted::new(true);
    let first: NaiveDate = "2024-01-05".parse().unwrap();

    let mut input = NewStudent::new("Choi").new_friend(first);
    input.class_id = Some(class.class_id);
    let AddStudentOutcome::Added { student, .. } =
      add_student(&store, &op, input).await.unwrap()
    else {
      panic!("expected Added");
    };
    assert!(student.is_new_friend());
    assert_eq!(student.class_id, None);
    assert_eq!(student.first_visit_date, Some(first));
    assert_eq!(student.class_assigned_date, None);
  }

  #[tokio::test]
  async fn resolve_alone_renames_and_notifies() {
    let store = seeded(&["Kim"]).await;
    let op = Scripted::new(true);

    let resolution = resolve_new_student_name(&store, &op, "Kim").await.unwrap();
    assert!(matches!(
      resolution,
      Resolution::Resolved { ref final_name, rename: Some(_) } if final_name == "KimB"
    ));
    assert_eq!(names(&store), ["KimA"]);
    assert_eq!(op.notices().len(), 1);
  }
}
