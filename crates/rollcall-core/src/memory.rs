//! In-memory [`StudentStore`] used by the engine tests.

use std::sync::{
  Mutex,
  atomic::{AtomicBool, Ordering},
};

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  class::{Class, Grade},
  store::{StudentQuery, StudentStore},
  student::{NewStudent, Student, StudentPatch},
};

#[derive(Debug, Error)]
#[error("memory store: {0}")]
pub struct MemoryError(&'static str);

#[derive(Default)]
struct Inner {
  students:   Vec<Student>,
  classes:    Vec<Class>,
  /// `(student_id, log date)`
  attendance: Vec<(Uuid, NaiveDate)>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner:        Mutex<Inner>,
  fail_inserts: AtomicBool,
  fail_updates: AtomicBool,
}

impl MemoryStore {
  pub fn fail_inserts(&self, fail: bool) { self.fail_inserts.store(fail, Ordering::SeqCst); }

  pub fn fail_updates(&self, fail: bool) { self.fail_updates.store(fail, Ordering::SeqCst); }

  pub fn insert_class(&self, grade: Grade, name: &str) -> Class {
    let class = Class {
      class_id: Uuid::new_v4(),
      grade,
      name: name.to_owned(),
      teacher_id: None,
      created_at: Utc::now(),
    };
    self.inner.lock().unwrap().classes.push(class.clone());
    class
  }

  pub fn record_attendance(&self, student_id: Uuid, date: NaiveDate) {
    self.inner.lock().unwrap().attendance.push((student_id, date));
  }

  pub fn all_students(&self) -> Vec<Student> { self.inner.lock().unwrap().students.clone() }
}

impl StudentStore for MemoryStore {
  type Error = MemoryError;

  async fn add_student(&self, input: NewStudent) -> Result<Student, MemoryError> {
    if self.fail_inserts.load(Ordering::SeqCst) {
      return Err(MemoryError("insert rejected"));
    }
    let student = Student {
      student_id:          Uuid::new_v4(),
      name:                input.name,
      class_id:            input.class_id,
      tags:                input.tags,
      first_visit_date:    input.first_visit_date,
      class_assigned_date: None,
      is_active:           true,
      created_at:          Utc::now(),
    };
    self.inner.lock().unwrap().students.push(student.clone());
    Ok(student)
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.students.iter().find(|s| s.student_id == id).cloned())
  }

  async fn list_students(&self, query: StudentQuery) -> Result<Vec<Student>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    let mut found: Vec<Student> = inner
      .students
      .iter()
      .filter(|s| query.include_inactive || s.is_active)
      .filter(|s| match query.class_id {
        Some(class_id) => s.class_id == Some(class_id),
        None => !query.unassigned || s.class_id.is_none(),
      })
      .filter(|s| query.tag.as_deref().is_none_or(|t| s.has_tag(t)))
      .cloned()
      .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
  }

  async fn find_by_name_prefix(&self, prefix: String) -> Result<Vec<Student>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .students
        .iter()
        .filter(|s| s.is_active && s.name.starts_with(&prefix))
        .cloned()
        .collect(),
    )
  }

  async fn update_student(
    &self,
    id: Uuid,
    patch: StudentPatch,
  ) -> Result<Option<Student>, MemoryError> {
    if self.fail_updates.load(Ordering::SeqCst) {
      return Err(MemoryError("update rejected"));
    }
    let mut inner = self.inner.lock().unwrap();
    Ok(inner.students.iter_mut().find(|s| s.student_id == id).map(|s| {
      patch.apply(s);
      s.clone()
    }))
  }

  async fn delete_student(&self, id: Uuid) -> Result<bool, MemoryError> {
    let mut inner = self.inner.lock().unwrap();
    let before = inner.students.len();
    inner.students.retain(|s| s.student_id != id);
    inner.attendance.retain(|(student_id, _)| *student_id != id);
    Ok(inner.students.len() != before)
  }

  async fn get_class(&self, id: Uuid) -> Result<Option<Class>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.classes.iter().find(|c| c.class_id == id).cloned())
  }

  async fn count_attendance_before(
    &self,
    student_id: Uuid,
    date: NaiveDate,
  ) -> Result<usize, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .attendance
        .iter()
        .filter(|(id, on)| *id == student_id && *on < date)
        .count(),
    )
  }
}
