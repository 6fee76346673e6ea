//! Read-only summaries assembled from fetched rows.
//!
//! Nothing here touches a store: callers fetch, these functions fold. The
//! [`WorshipSnapshot`] is the fully-resolved input for the paper-form
//! renderer, which lives outside this workspace.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use strum::IntoEnumIterator as _;
use uuid::Uuid;

use crate::{
  class::{Class, Grade},
  roster::{RosterContext, is_visible, visible_students},
  staff::{Teacher, TeacherRole},
  student::{SPECIAL_GROUP, Student},
  worship::{
    Attendance, AttendanceStatus, Offering, OfferingKind, TeacherAttendance,
    WorshipLog,
  },
};

// ─── Attendance statistics ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentStat {
  pub student_id:  Uuid,
  pub name:        String,
  pub class_label: String,
  /// Services attended, on-site or online.
  pub present:     usize,
  pub services:    usize,
  /// Percentage rounded to one decimal.
  pub rate:        f64,
  pub is_perfect:  bool,
}

/// Per-student attendance over `logs`, best attendance first.
///
/// Every active student is listed, whether or not they were on a roster for
/// the whole range. Returns nothing when `logs` is empty.
pub fn attendance_stats(
  logs: &[WorshipLog],
  students: &[Student],
  classes: &[Class],
  attendance: &[Attendance],
) -> Vec<StudentStat> {
  let services = logs.len();
  if services == 0 {
    return Vec::new();
  }

  let in_range: HashSet<Uuid> = logs.iter().map(|l| l.log_id).collect();
  let mut counts: HashMap<Uuid, usize> = HashMap::new();
  for a in attendance.iter().filter(|a| in_range.contains(&a.log_id)) {
    *counts.entry(a.student_id).or_default() += 1;
  }
  let labels: HashMap<Uuid, String> =
    classes.iter().map(|c| (c.class_id, c.label())).collect();

  let mut stats: Vec<StudentStat> = students
    .iter()
    .filter(|s| s.is_active)
    .map(|s| {
      let present = counts.get(&s.student_id).copied().unwrap_or(0);
      let rate = present as f64 / services as f64 * 100.0;
      StudentStat {
        student_id: s.student_id,
        name: s.name.clone(),
        class_label: s
          .class_id
          .and_then(|id| labels.get(&id).cloned())
          .unwrap_or_else(|| "Unassigned".to_owned()),
        present,
        services,
        rate: (rate * 10.0).round() / 10.0,
        is_perfect: present == services,
      }
    })
    .collect();

  stats.sort_by(|a, b| b.present.cmp(&a.present).then_with(|| a.name.cmp(&b.name)));
  stats
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
  pub log_id: Uuid,
  pub date:   chrono::NaiveDate,
  /// `None` means absent.
  pub status: Option<AttendanceStatus>,
}

/// One student's record across `logs`, newest first.
pub fn student_history(
  logs: &[WorshipLog],
  attendance: &[Attendance],
  student_id: Uuid,
) -> Vec<HistoryEntry> {
  let statuses: HashMap<Uuid, AttendanceStatus> = attendance
    .iter()
    .filter(|a| a.student_id == student_id)
    .map(|a| (a.log_id, a.status))
    .collect();

  let mut entries: Vec<HistoryEntry> = logs
    .iter()
    .map(|l| HistoryEntry {
      log_id: l.log_id,
      date:   l.date,
      status: statuses.get(&l.log_id).copied(),
    })
    .collect();
  entries.sort_by(|a, b| b.date.cmp(&a.date));
  entries
}

// ─── Worship snapshot ────────────────────────────────────────────────────────

/// Everything recorded for one worship log, as fetched from the store.
#[derive(Debug, Clone)]
pub struct SnapshotInput<'a> {
  pub log:                &'a WorshipLog,
  pub classes:            &'a [Class],
  /// Candidate students; visibility on the log's date is applied here.
  pub students:           &'a [Student],
  pub attendance:         &'a [Attendance],
  pub teachers:           &'a [Teacher],
  pub teacher_attendance: &'a [TeacherAttendance],
  pub offerings:          &'a [Offering],
}

/// One row of the paper form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
  pub class_id:   Option<Uuid>,
  pub label:      String,
  pub teacher:    Option<String>,
  /// Students on the roster on the log's date.
  pub registered: usize,
  pub attended:   usize,
  pub attending:  Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
  pub registered: usize,
  pub attended:   usize,
}

impl Tally {
  fn add(&mut self, row: &RosterRow) {
    self.registered += row.registered;
    self.attended += row.attended;
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferingLine {
  pub kind:   OfferingKind,
  /// `None` when nothing was recorded for this kind.
  pub amount: Option<i64>,
  pub memo:   String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorshipSnapshot {
  pub log:             WorshipLog,
  pub middle:          Vec<RosterRow>,
  pub middle_subtotal: Tally,
  pub high:            Vec<RosterRow>,
  pub high_subtotal:   Tally,
  pub new_friends:     RosterRow,
  pub special_group:   RosterRow,
  pub total:           Tally,
  pub offerings:       Vec<OfferingLine>,
  pub offering_total:  i64,
  pub teachers:        Vec<String>,
  pub staff:           Vec<String>,
  pub total_coupons:   u32,
}

fn row(
  class_id: Option<Uuid>,
  label: String,
  teacher: Option<String>,
  roster: &[Student],
  attended: &HashSet<Uuid>,
) -> RosterRow {
  let attending: Vec<String> = roster
    .iter()
    .filter(|s| attended.contains(&s.student_id))
    .map(|s| s.name.clone())
    .collect();
  RosterRow {
    class_id,
    label,
    teacher,
    registered: roster.len(),
    attended: attending.len(),
    attending,
  }
}

/// Resolve every roster on the log's date and fold attendance, staff and
/// offerings into one structure.
///
/// The special-group row holds tagged students who are neither in a class
/// nor in the new-friend window, so nobody is counted twice.
pub fn snapshot(input: &SnapshotInput<'_>) -> WorshipSnapshot {
  let date = input.log.date;
  let attended: HashSet<Uuid> = input
    .attendance
    .iter()
    .filter(|a| a.log_id == input.log.log_id)
    .map(|a| a.student_id)
    .collect();
  let teacher_names: HashMap<Uuid, &str> = input
    .teachers
    .iter()
    .map(|t| (t.teacher_id, t.name.as_str()))
    .collect();

  let mut classes: Vec<&Class> = input.classes.iter().collect();
  classes.sort_by(|a, b| a.grade.cmp(&b.grade).then_with(|| a.name.cmp(&b.name)));

  let mut middle = Vec::new();
  let mut high = Vec::new();
  let mut middle_subtotal = Tally::default();
  let mut high_subtotal = Tally::default();
  for class in classes {
    let roster =
      visible_students(input.students, &RosterContext::Class(class.class_id), date);
    let teacher = class
      .teacher_id
      .and_then(|id| teacher_names.get(&id))
      .map(|name| (*name).to_owned());
    let r = row(Some(class.class_id), class.label(), teacher, &roster, &attended);
    match class.grade {
      Grade::Middle => {
        middle_subtotal.add(&r);
        middle.push(r);
      }
      Grade::High => {
        high_subtotal.add(&r);
        high.push(r);
      }
    }
  }

  let new_friend_roster = visible_students(input.students, &RosterContext::NewFriends, date);
  let new_friends = row(None, "New friends".to_owned(), None, &new_friend_roster, &attended);

  let special_roster: Vec<Student> = input
    .students
    .iter()
    .filter(|s| {
      s.is_active
        && s.has_tag(SPECIAL_GROUP)
        && s.class_id.is_none()
        && !is_visible(s, &RosterContext::NewFriends, date)
    })
    .cloned()
    .collect();
  let special_group = row(None, "Special group".to_owned(), None, &special_roster, &attended);

  let mut total = Tally {
    registered: middle_subtotal.registered + high_subtotal.registered,
    attended:   middle_subtotal.attended + high_subtotal.attended,
  };
  total.add(&new_friends);
  total.add(&special_group);

  let offerings: Vec<OfferingLine> = OfferingKind::iter()
    .map(|kind| {
      let found = input
        .offerings
        .iter()
        .find(|o| o.log_id == input.log.log_id && o.kind == kind);
      OfferingLine {
        kind,
        amount: found.map(|o| o.amount),
        memo: found.map(|o| o.memo.clone()).unwrap_or_default(),
      }
    })
    .collect();
  let offering_total = offerings.iter().filter_map(|o| o.amount).sum();

  let present_staff: HashSet<Uuid> = input
    .teacher_attendance
    .iter()
    .filter(|t| t.log_id == input.log.log_id)
    .map(|t| t.teacher_id)
    .collect();
  let names_for = |role: TeacherRole| -> Vec<String> {
    let mut names: Vec<String> = input
      .teachers
      .iter()
      .filter(|t| t.role == role && present_staff.contains(&t.teacher_id))
      .map(|t| t.name.clone())
      .collect();
    names.sort();
    names
  };

  WorshipSnapshot {
    log: input.log.clone(),
    middle,
    middle_subtotal,
    high,
    high_subtotal,
    new_friends,
    special_group,
    total,
    offerings,
    offering_total,
    teachers: names_for(TeacherRole::Teacher),
    staff: names_for(TeacherRole::Staff),
    total_coupons: input.log.total_coupons(),
  }
}
