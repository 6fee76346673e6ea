//! [`SqliteStore`], the SQLite implementation of [`StudentStore`] and
//! [`WorshipStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use rollcall_core::{
  class::{Class, NewClass},
  staff::{NewTeacher, Teacher},
  store::{StudentQuery, StudentStore, WorshipStore},
  student::{NewStudent, Student, StudentPatch},
  worship::{
    Attendance, AttendanceStatus, LogDetails, Offering, TeacherAttendance, WorshipLog,
  },
};

use crate::{
  Result,
  encode::{
    CLASS_COLUMNS, LOG_COLUMNS, RawAttendance, RawClass, RawLog, RawOffering, RawStudent,
    RawTeacher, RawTeacherAttendance, STUDENT_COLUMNS, TEACHER_COLUMNS, encode_date,
    encode_dt, encode_tags, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rollcall store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_student(&self, id: Uuid) -> Result<Option<Student>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawStudent::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawStudent::into_student).transpose()
  }

  async fn fetch_teacher(&self, id: Uuid) -> Result<Option<Teacher>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {TEACHER_COLUMNS} FROM teachers WHERE teacher_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawTeacher::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawTeacher::into_teacher).transpose()
  }
}

fn nullable(value: Option<String>) -> Value { value.map_or(Value::Null, Value::Text) }

/// Translate a patch into `(column, value)` assignments, in column order.
fn patch_assignments(patch: &StudentPatch) -> Result<Vec<(&'static str, Value)>> {
  let mut sets = Vec::new();
  if let Some(name) = &patch.name {
    sets.push(("name", Value::Text(name.clone())));
  }
  if let Some(class_id) = patch.class_id {
    sets.push(("class_id", nullable(class_id.map(encode_uuid))));
  }
  if let Some(tags) = &patch.tags {
    sets.push(("tags", Value::Text(encode_tags(tags)?)));
  }
  if let Some(first_visit) = patch.first_visit_date {
    sets.push(("first_visit_date", nullable(first_visit.map(encode_date))));
  }
  if let Some(assigned) = patch.class_assigned_date {
    sets.push(("class_assigned_date", nullable(assigned.map(encode_date))));
  }
  if let Some(active) = patch.is_active {
    sets.push(("is_active", Value::Integer(i64::from(active))));
  }
  Ok(sets)
}

// ─── StudentStore impl ───────────────────────────────────────────────────────

impl StudentStore for SqliteStore {
  type Error = crate::Error;

  async fn add_student(&self, input: NewStudent) -> Result<Student> {
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

    let id_str = encode_uuid(student.student_id);
    let name = student.name.clone();
    let class_str = student.class_id.map(encode_uuid);
    let tags_str = encode_tags(&student.tags)?;
    let first_visit_str = student.first_visit_date.map(encode_date);
    let created_str = encode_dt(student.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO students \
           (student_id, name, class_id, tags, first_visit_date, class_assigned_date, \
           is_active, created_at) \
           VALUES (?1, ?2, ?3, ?4, ?5, NULL, 1, ?6)",
          rusqlite::params![id_str, name, class_str, tags_str, first_visit_str, created_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(student)
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
    self.fetch_student(id).await
  }

  async fn list_students(&self, query: StudentQuery) -> Result<Vec<Student>> {
    let class_str = query.class_id.map(encode_uuid);
    let unassigned = query.unassigned && query.class_id.is_none();
    let include_inactive = query.include_inactive;

    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {STUDENT_COLUMNS} FROM students \
           WHERE (?1 IS NULL OR class_id = ?1) \
             AND (?2 = 0 OR class_id IS NULL) \
             AND (?3 = 1 OR is_active = 1) \
           ORDER BY name, created_at"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![class_str, unassigned, include_inactive],
            RawStudent::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut students = Vec::with_capacity(raws.len());
    for raw in raws {
      let student = raw.into_student()?;
      if query.tag.as_deref().is_none_or(|t| student.has_tag(t)) {
        students.push(student);
      }
    }
    Ok(students)
  }

  async fn find_by_name_prefix(&self, prefix: String) -> Result<Vec<Student>> {
    // `substr` compares literally, unlike LIKE which would treat `%` and `_`
    // in a name as wildcards.
    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {STUDENT_COLUMNS} FROM students \
           WHERE is_active = 1 AND substr(name, 1, length(?1)) = ?1 \
           ORDER BY name"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![prefix], RawStudent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawStudent::into_student).collect()
  }

  async fn update_student(&self, id: Uuid, patch: StudentPatch) -> Result<Option<Student>> {
    let sets = patch_assignments(&patch)?;
    if sets.is_empty() {
      return self.fetch_student(id).await;
    }

    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let assignments = sets
          .iter()
          .enumerate()
          .map(|(i, (column, _))| format!("{column} = ?{}", i + 2))
          .collect::<Vec<_>>()
          .join(", ");
        let sql = format!("UPDATE students SET {assignments} WHERE student_id = ?1");

        let mut params = vec![Value::Text(id_str.clone())];
        params.extend(sets.into_iter().map(|(_, value)| value));

        let tx = conn.transaction()?;
        let changed = tx.execute(&sql, rusqlite::params_from_iter(params))?;
        let raw = if changed == 0 {
          None
        } else {
          let select = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = ?1");
          Some(tx.query_row(&select, rusqlite::params![id_str], RawStudent::from_row)?)
        };
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn delete_student(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM attendance WHERE student_id = ?1", rusqlite::params![id_str])?;
        let n = tx.execute("DELETE FROM students WHERE student_id = ?1", rusqlite::params![
          id_str
        ])?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  async fn get_class(&self, id: Uuid) -> Result<Option<Class>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {CLASS_COLUMNS} FROM classes WHERE class_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawClass::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawClass::into_class).transpose()
  }

  async fn count_attendance_before(&self, student_id: Uuid, date: NaiveDate) -> Result<usize> {
    let id_str = encode_uuid(student_id);
    let date_str = encode_date(date);
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM attendance a \
           JOIN worship_logs l ON l.log_id = a.log_id \
           WHERE a.student_id = ?1 AND l.date < ?2",
          rusqlite::params![id_str, date_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(usize::try_from(count).unwrap_or_default())
  }
}

// ─── WorshipStore impl ───────────────────────────────────────────────────────

impl WorshipStore for SqliteStore {
  // ── Classes ───────────────────────────────────────────────────────────

  async fn add_class(&self, input: NewClass) -> Result<Class> {
    let class = Class {
      class_id:   Uuid::new_v4(),
      grade:      input.grade,
      name:       input.name,
      teacher_id: input.teacher_id,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(class.class_id);
    let grade_str = class.grade.to_string();
    let name = class.name.clone();
    let teacher_str = class.teacher_id.map(encode_uuid);
    let created_str = encode_dt(class.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO classes (class_id, grade, name, teacher_id, created_at) \
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, grade_str, name, teacher_str, created_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(class)
  }

  async fn list_classes(&self) -> Result<Vec<Class>> {
    let raws: Vec<RawClass> = self
      .conn
      .call(|conn| {
        let sql = format!(
          "SELECT {CLASS_COLUMNS} FROM classes \
           ORDER BY CASE grade WHEN 'middle' THEN 0 WHEN 'high' THEN 1 ELSE 2 END, name"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawClass::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawClass::into_class).collect()
  }

  async fn delete_class(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("UPDATE students SET class_id = NULL WHERE class_id = ?1", rusqlite::params![
          id_str
        ])?;
        let n = tx.execute("DELETE FROM classes WHERE class_id = ?1", rusqlite::params![id_str])?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  // ── Teachers ──────────────────────────────────────────────────────────

  async fn add_teacher(&self, input: NewTeacher) -> Result<Teacher> {
    let teacher = Teacher {
      teacher_id: Uuid::new_v4(),
      name:       input.name,
      role:       input.role,
      is_active:  true,
    };

    let id_str = encode_uuid(teacher.teacher_id);
    let name = teacher.name.clone();
    let role_str = teacher.role.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO teachers (teacher_id, name, role, is_active) VALUES (?1, ?2, ?3, 1)",
          rusqlite::params![id_str, name, role_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(teacher)
  }

  async fn list_teachers(&self, include_inactive: bool) -> Result<Vec<Teacher>> {
    let raws: Vec<RawTeacher> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {TEACHER_COLUMNS} FROM teachers WHERE (?1 = 1 OR is_active = 1) ORDER BY name"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![include_inactive], RawTeacher::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawTeacher::into_teacher).collect()
  }

  async fn set_teacher_active(&self, id: Uuid, active: bool) -> Result<Option<Teacher>> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE teachers SET is_active = ?2 WHERE teacher_id = ?1",
          rusqlite::params![id_str, active],
        )?)
      })
      .await?;
    if changed == 0 {
      return Ok(None);
    }
    self.fetch_teacher(id).await
  }

  // ── Worship logs ──────────────────────────────────────────────────────

  async fn upsert_log(&self, date: NaiveDate, details: LogDetails) -> Result<WorshipLog> {
    let new_id_str = encode_uuid(Uuid::new_v4());
    let date_str = encode_date(date);
    let d = details;

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO worship_logs \
           (log_id, date, prayer, prayer_role, sermon_title, sermon_text, preacher, \
           coupon_recipient_count, coupons_per_person, online_attendance_count, \
           online_attendance_names) \
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
           ON CONFLICT(date) DO UPDATE SET \
             prayer = excluded.prayer, \
             prayer_role = excluded.prayer_role, \
             sermon_title = excluded.sermon_title, \
             sermon_text = excluded.sermon_text, \
             preacher = excluded.preacher, \
             coupon_recipient_count = excluded.coupon_recipient_count, \
             coupons_per_person = excluded.coupons_per_person, \
             online_attendance_count = excluded.online_attendance_count, \
             online_attendance_names = excluded.online_attendance_names",
          rusqlite::params![
            new_id_str,
            date_str,
            d.prayer,
            d.prayer_role,
            d.sermon_title,
            d.sermon_text,
            d.preacher,
            d.coupon_recipient_count,
            d.coupons_per_person,
            d.online_attendance_count,
            d.online_attendance_names,
          ],
        )?;
        let sql = format!("SELECT {LOG_COLUMNS} FROM worship_logs WHERE date = ?1");
        Ok(conn.query_row(&sql, rusqlite::params![date_str], RawLog::from_row)?)
      })
      .await?;

    raw.into_log()
  }

  async fn get_log(&self, date: NaiveDate) -> Result<Option<WorshipLog>> {
    let date_str = encode_date(date);
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {LOG_COLUMNS} FROM worship_logs WHERE date = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![date_str], RawLog::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawLog::into_log).transpose()
  }

  async fn list_logs(
    &self,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
  ) -> Result<Vec<WorshipLog>> {
    let from_str = from.map(encode_date);
    let to_str = to.map(encode_date);

    let raws: Vec<RawLog> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {LOG_COLUMNS} FROM worship_logs \
           WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2) \
           ORDER BY date"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![from_str, to_str], RawLog::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawLog::into_log).collect()
  }

  // ── Attendance ────────────────────────────────────────────────────────

  async fn set_attendance(
    &self,
    log_id: Uuid,
    student_id: Uuid,
    status: AttendanceStatus,
  ) -> Result<Attendance> {
    let log_str = encode_uuid(log_id);
    let student_str = encode_uuid(student_id);
    let status_str = status.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO attendance (log_id, student_id, status) VALUES (?1, ?2, ?3) \
           ON CONFLICT(log_id, student_id) DO UPDATE SET status = excluded.status",
          rusqlite::params![log_str, student_str, status_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(Attendance { log_id, student_id, status })
  }

  async fn clear_attendance(&self, log_id: Uuid, student_id: Uuid) -> Result<bool> {
    let log_str = encode_uuid(log_id);
    let student_str = encode_uuid(student_id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM attendance WHERE log_id = ?1 AND student_id = ?2",
          rusqlite::params![log_str, student_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  async fn list_attendance(&self, log_id: Uuid) -> Result<Vec<Attendance>> {
    let log_str = encode_uuid(log_id);
    let raws: Vec<RawAttendance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT log_id, student_id, status FROM attendance WHERE log_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![log_str], RawAttendance::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAttendance::into_attendance).collect()
  }

  async fn list_attendance_between(
    &self,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
  ) -> Result<Vec<Attendance>> {
    let from_str = from.map(encode_date);
    let to_str = to.map(encode_date);

    let raws: Vec<RawAttendance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT a.log_id, a.student_id, a.status FROM attendance a \
           JOIN worship_logs l ON l.log_id = a.log_id \
           WHERE (?1 IS NULL OR l.date >= ?1) AND (?2 IS NULL OR l.date <= ?2) \
           ORDER BY l.date",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![from_str, to_str], RawAttendance::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAttendance::into_attendance).collect()
  }

  async fn list_student_attendance(
    &self,
    student_id: Uuid,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
  ) -> Result<Vec<Attendance>> {
    let student_str = encode_uuid(student_id);
    let from_str = from.map(encode_date);
    let to_str = to.map(encode_date);

    let raws: Vec<RawAttendance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT a.log_id, a.student_id, a.status FROM attendance a \
           JOIN worship_logs l ON l.log_id = a.log_id \
           WHERE a.student_id = ?1 \
             AND (?2 IS NULL OR l.date >= ?2) AND (?3 IS NULL OR l.date <= ?3) \
           ORDER BY l.date",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![student_str, from_str, to_str],
            RawAttendance::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAttendance::into_attendance).collect()
  }

  // ── Staff attendance ──────────────────────────────────────────────────

  async fn mark_teacher(&self, log_id: Uuid, teacher_id: Uuid) -> Result<TeacherAttendance> {
    let log_str = encode_uuid(log_id);
    let teacher_str = encode_uuid(teacher_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO teacher_attendance (log_id, teacher_id) VALUES (?1, ?2)",
          rusqlite::params![log_str, teacher_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(TeacherAttendance { log_id, teacher_id })
  }

  async fn clear_teacher(&self, log_id: Uuid, teacher_id: Uuid) -> Result<bool> {
    let log_str = encode_uuid(log_id);
    let teacher_str = encode_uuid(teacher_id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM teacher_attendance WHERE log_id = ?1 AND teacher_id = ?2",
          rusqlite::params![log_str, teacher_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  async fn list_teacher_attendance(&self, log_id: Uuid) -> Result<Vec<TeacherAttendance>> {
    let log_str = encode_uuid(log_id);
    let raws: Vec<RawTeacherAttendance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare("SELECT log_id, teacher_id FROM teacher_attendance WHERE log_id = ?1")?;
        let rows = stmt
          .query_map(rusqlite::params![log_str], |r| {
            Ok(RawTeacherAttendance { log_id: r.get(0)?, teacher_id: r.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws
      .into_iter()
      .map(RawTeacherAttendance::into_teacher_attendance)
      .collect()
  }

  // ── Offerings ─────────────────────────────────────────────────────────

  async fn upsert_offering(&self, offering: Offering) -> Result<Offering> {
    let log_str = encode_uuid(offering.log_id);
    let kind_str = offering.kind.to_string();
    let amount = offering.amount;
    let memo = offering.memo.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO offerings (log_id, kind, amount, memo) VALUES (?1, ?2, ?3, ?4) \
           ON CONFLICT(log_id, kind) DO UPDATE SET \
             amount = excluded.amount, memo = excluded.memo",
          rusqlite::params![log_str, kind_str, amount, memo],
        )?;
        Ok(())
      })
      .await?;

    Ok(offering)
  }

  async fn list_offerings(&self, log_id: Uuid) -> Result<Vec<Offering>> {
    let log_str = encode_uuid(log_id);
    let raws: Vec<RawOffering> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare("SELECT log_id, kind, amount, memo FROM offerings WHERE log_id = ?1")?;
        let rows = stmt
          .query_map(rusqlite::params![log_str], RawOffering::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    let mut offerings = raws
      .into_iter()
      .map(RawOffering::into_offering)
      .collect::<Result<Vec<_>>>()?;
    offerings.sort_by_key(|o| o.kind);
    Ok(offerings)
  }
}
