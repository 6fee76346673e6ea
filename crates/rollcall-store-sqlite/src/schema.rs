//! SQL schema for the Rollcall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS teachers (
    teacher_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    role        TEXT NOT NULL,              -- 'teacher' | 'staff'
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS classes (
    class_id    TEXT PRIMARY KEY,
    grade       TEXT NOT NULL,              -- 'middle' | 'high'
    name        TEXT NOT NULL,
    teacher_id  TEXT REFERENCES teachers(teacher_id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL
);

-- Names are deliberately not UNIQUE; disambiguation happens on creation.
CREATE TABLE IF NOT EXISTS students (
    student_id          TEXT PRIMARY KEY,
    name                TEXT NOT NULL,
    class_id            TEXT REFERENCES classes(class_id) ON DELETE SET NULL,
    tags                TEXT NOT NULL DEFAULT '[]',   -- JSON array
    first_visit_date    TEXT,                         -- YYYY-MM-DD
    class_assigned_date TEXT,                         -- YYYY-MM-DD
    is_active           INTEGER NOT NULL DEFAULT 1,
    created_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS worship_logs (
    log_id                  TEXT PRIMARY KEY,
    date                    TEXT NOT NULL UNIQUE,     -- YYYY-MM-DD
    prayer                  TEXT NOT NULL DEFAULT '',
    prayer_role             TEXT NOT NULL DEFAULT '',
    sermon_title            TEXT NOT NULL DEFAULT '',
    sermon_text             TEXT NOT NULL DEFAULT '',
    preacher                TEXT NOT NULL DEFAULT '',
    coupon_recipient_count  INTEGER NOT NULL DEFAULT 0,
    coupons_per_person      INTEGER NOT NULL DEFAULT 0,
    online_attendance_count INTEGER NOT NULL DEFAULT 0,
    online_attendance_names TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS attendance (
    log_id      TEXT NOT NULL REFERENCES worship_logs(log_id) ON DELETE CASCADE,
    student_id  TEXT NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
    status      TEXT NOT NULL,              -- 'present' | 'online'
    PRIMARY KEY (log_id, student_id)
);

CREATE TABLE IF NOT EXISTS teacher_attendance (
    log_id      TEXT NOT NULL REFERENCES worship_logs(log_id) ON DELETE CASCADE,
    teacher_id  TEXT NOT NULL REFERENCES teachers(teacher_id) ON DELETE CASCADE,
    PRIMARY KEY (log_id, teacher_id)
);

CREATE TABLE IF NOT EXISTS offerings (
    log_id      TEXT NOT NULL REFERENCES worship_logs(log_id) ON DELETE CASCADE,
    kind        TEXT NOT NULL,              -- 'sunday' | 'tithe' | 'thanksgiving' | 'other'
    amount      INTEGER NOT NULL DEFAULT 0,
    memo        TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (log_id, kind)
);

CREATE INDEX IF NOT EXISTS students_class_idx    ON students(class_id);
CREATE INDEX IF NOT EXISTS students_name_idx     ON students(name);
CREATE INDEX IF NOT EXISTS attendance_student_idx ON attendance(student_id);

PRAGMA user_version = 1;
";
