//! SQLite-based store implementation

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Weekday};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use rollcall_api::{
    AttendanceRecord, AttendanceStatus, ScanMethod, ScheduleEntry, Session, SessionStatus,
    StudentProfile,
};
use rollcall_util::{
    format_date, format_time, parse_date, parse_time, parse_weekday, weekday_name, ClassId,
    RecordId, SessionId, StudentId,
};

use crate::{
    AttendanceStore, Directory, NewRecord, NewSession, SessionStore, StoreError, StoreResult,
};

const SESSION_COLS: &str =
    "id, class_id, date, scheduled_start, scheduled_end, actual_start, actual_end, \
     subject, status, created_at";

const RECORD_COLS: &str =
    "id, student_id, student_name, grade, attendance_date, scan_time, status, \
     scan_method, session_id, created_at";

/// SQLite-based store backing all three store traits
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- Directory tables, owned by the surrounding school system.
            -- Created here so a fresh deployment is self-contained; the
            -- core only ever reads them.
            CREATE TABLE IF NOT EXISTS classes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                class_name TEXT NOT NULL,
                grade TEXT,
                active INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS students (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id TEXT NOT NULL UNIQUE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                grade TEXT NOT NULL,
                class_id INTEGER REFERENCES classes(id)
            );

            CREATE TABLE IF NOT EXISTS class_schedules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                class_id INTEGER NOT NULL REFERENCES classes(id),
                day_of_week TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                subject TEXT NOT NULL
            );

            -- Concrete dated sessions
            CREATE TABLE IF NOT EXISTS attendance_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                class_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                scheduled_start TEXT NOT NULL,
                scheduled_end TEXT NOT NULL,
                actual_start TEXT,
                actual_end TEXT,
                subject TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'SCHEDULED',
                created_at TEXT NOT NULL
            );

            -- Materializer idempotency safety net
            CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_class_date_subject
                ON attendance_sessions(class_id, date, subject);

            CREATE INDEX IF NOT EXISTS idx_sessions_date_status
                ON attendance_sessions(date, status);

            -- Attendance records
            CREATE TABLE IF NOT EXISTS attendance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id TEXT NOT NULL,
                student_name TEXT NOT NULL,
                grade TEXT NOT NULL,
                attendance_date TEXT NOT NULL,
                scan_time TEXT NOT NULL,
                status TEXT NOT NULL,
                scan_method TEXT NOT NULL,
                session_id INTEGER,
                created_at TEXT NOT NULL
            );

            -- Turns a duplicate-scan race into a constraint rejection
            CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_student_session
                ON attendance(student_id, session_id)
                WHERE session_id IS NOT NULL;

            CREATE INDEX IF NOT EXISTS idx_attendance_student
                ON attendance(student_id);

            CREATE INDEX IF NOT EXISTS idx_attendance_date
                ON attendance(attendance_date);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }

    /// Check if the store is healthy
    pub fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => false,
        }
    }

    // Directory ingestion primitives. These belong to the surrounding
    // student/class management system; the attendance core never calls
    // them.

    /// Insert a class, returning its id
    pub fn add_class(&self, class_name: &str, grade: &str, active: bool) -> StoreResult<ClassId> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO classes (class_name, grade, active) VALUES (?, ?, ?)",
            params![class_name, grade, active as i64],
        )?;
        Ok(ClassId::new(conn.last_insert_rowid()))
    }

    /// Insert or replace a student
    pub fn add_student(&self, student: &StudentProfile) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO students (student_id, first_name, last_name, grade, class_id)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(student_id)
            DO UPDATE SET first_name = excluded.first_name,
                          last_name = excluded.last_name,
                          grade = excluded.grade,
                          class_id = excluded.class_id
            "#,
            params![
                student.student_id.as_str(),
                student.first_name,
                student.last_name,
                student.grade,
                student.class_id.map(|c| c.as_i64()),
            ],
        )?;
        Ok(())
    }

    /// Insert a weekly schedule template entry
    pub fn add_schedule_entry(
        &self,
        class_id: ClassId,
        day: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        subject: &str,
    ) -> StoreResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO class_schedules (class_id, day_of_week, start_time, end_time, subject) \
             VALUES (?, ?, ?, ?, ?)",
            params![
                class_id.as_i64(),
                weekday_name(day),
                format_time(start_time),
                format_time(end_time),
                subject,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

// Raw row shapes: TEXT columns come out as strings and are decoded in a
// second step so query_map closures stay fallible only at the SQL layer.

struct SessionRow {
    id: i64,
    class_id: i64,
    date: String,
    scheduled_start: String,
    scheduled_end: String,
    actual_start: Option<String>,
    actual_end: Option<String>,
    subject: String,
    status: String,
    created_at: String,
}

fn read_session_row(row: &Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get(0)?,
        class_id: row.get(1)?,
        date: row.get(2)?,
        scheduled_start: row.get(3)?,
        scheduled_end: row.get(4)?,
        actual_start: row.get(5)?,
        actual_end: row.get(6)?,
        subject: row.get(7)?,
        status: row.get(8)?,
        created_at: row.get(9)?,
    })
}

impl SessionRow {
    fn into_session(self) -> StoreResult<Session> {
        Ok(Session {
            id: SessionId::new(self.id),
            class_id: ClassId::new(self.class_id),
            date: decode_date(&self.date, "session date")?,
            scheduled_start: decode_time(&self.scheduled_start, "scheduled_start")?,
            scheduled_end: decode_time(&self.scheduled_end, "scheduled_end")?,
            actual_start: decode_opt_time(self.actual_start.as_deref(), "actual_start")?,
            actual_end: decode_opt_time(self.actual_end.as_deref(), "actual_end")?,
            subject: self.subject,
            status: SessionStatus::parse(&self.status)
                .ok_or_else(|| StoreError::Database(format!("bad session status: {}", self.status)))?,
            created_at: decode_timestamp(&self.created_at),
        })
    }
}

struct RecordRow {
    id: i64,
    student_id: String,
    student_name: String,
    grade: String,
    attendance_date: String,
    scan_time: String,
    status: String,
    scan_method: String,
    session_id: Option<i64>,
    created_at: String,
}

fn read_record_row(row: &Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        id: row.get(0)?,
        student_id: row.get(1)?,
        student_name: row.get(2)?,
        grade: row.get(3)?,
        attendance_date: row.get(4)?,
        scan_time: row.get(5)?,
        status: row.get(6)?,
        scan_method: row.get(7)?,
        session_id: row.get(8)?,
        created_at: row.get(9)?,
    })
}

impl RecordRow {
    fn into_record(self) -> StoreResult<AttendanceRecord> {
        Ok(AttendanceRecord {
            id: RecordId::new(self.id),
            student_id: StudentId::new(self.student_id),
            student_name: self.student_name,
            grade: self.grade,
            attendance_date: decode_date(&self.attendance_date, "attendance_date")?,
            scan_time: decode_timestamp(&self.scan_time),
            status: AttendanceStatus::parse(&self.status).ok_or_else(|| {
                StoreError::Database(format!("bad attendance status: {}", self.status))
            })?,
            scan_method: ScanMethod::parse(&self.scan_method).ok_or_else(|| {
                StoreError::Database(format!("bad scan method: {}", self.scan_method))
            })?,
            session_id: self.session_id.map(SessionId::new),
            created_at: decode_timestamp(&self.created_at),
        })
    }
}

fn decode_date(s: &str, col: &str) -> StoreResult<NaiveDate> {
    parse_date(s).ok_or_else(|| StoreError::Database(format!("bad {col}: {s}")))
}

fn decode_time(s: &str, col: &str) -> StoreResult<NaiveTime> {
    parse_time(s).ok_or_else(|| StoreError::Database(format!("bad {col}: {s}")))
}

fn decode_opt_time(s: Option<&str>, col: &str) -> StoreResult<Option<NaiveTime>> {
    s.map(|s| decode_time(s, col)).transpose()
}

fn decode_timestamp(s: &str) -> DateTime<Local> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .unwrap_or_else(|_| rollcall_util::now())
}

impl SessionStore for SqliteStore {
    fn create_session(&self, new: NewSession) -> StoreResult<Session> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO attendance_sessions
                (class_id, date, scheduled_start, scheduled_end, subject, status, created_at)
            VALUES (?, ?, ?, ?, ?, 'SCHEDULED', ?)
            "#,
            params![
                new.class_id.as_i64(),
                format_date(new.date),
                format_time(new.scheduled_start),
                format_time(new.scheduled_end),
                new.subject,
                new.created_at.to_rfc3339(),
            ],
        )?;

        let id = SessionId::new(conn.last_insert_rowid());
        debug!(session_id = %id, class_id = %new.class_id, "Session created");

        Ok(Session {
            id,
            class_id: new.class_id,
            date: new.date,
            scheduled_start: new.scheduled_start,
            scheduled_end: new.scheduled_end,
            actual_start: None,
            actual_end: None,
            subject: new.subject,
            status: SessionStatus::Scheduled,
            created_at: new.created_at,
        })
    }

    fn session(&self, id: SessionId) -> StoreResult<Option<Session>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!("SELECT {SESSION_COLS} FROM attendance_sessions WHERE id = ?"),
                [id.as_i64()],
                read_session_row,
            )
            .optional()?;
        row.map(SessionRow::into_session).transpose()
    }

    fn find_session(
        &self,
        class_id: ClassId,
        date: NaiveDate,
        subject: &str,
    ) -> StoreResult<Option<Session>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!(
                    "SELECT {SESSION_COLS} FROM attendance_sessions \
                     WHERE class_id = ? AND date = ? AND subject = ?"
                ),
                params![class_id.as_i64(), format_date(date), subject],
                read_session_row,
            )
            .optional()?;
        row.map(SessionRow::into_session).transpose()
    }

    fn sessions_for_class(&self, class_id: ClassId, date: NaiveDate) -> StoreResult<Vec<Session>> {
        self.query_sessions(
            &format!(
                "SELECT {SESSION_COLS} FROM attendance_sessions \
                 WHERE class_id = ? AND date = ? ORDER BY scheduled_start"
            ),
            params![class_id.as_i64(), format_date(date)],
        )
    }

    fn active_sessions(&self, date: NaiveDate) -> StoreResult<Vec<Session>> {
        self.query_sessions(
            &format!(
                "SELECT {SESSION_COLS} FROM attendance_sessions \
                 WHERE date = ? AND status = 'ACTIVE' ORDER BY scheduled_start"
            ),
            params![format_date(date)],
        )
    }

    fn sessions_to_activate(&self, date: NaiveDate, now: NaiveTime) -> StoreResult<Vec<Session>> {
        let now = format_time(now);
        self.query_sessions(
            &format!(
                "SELECT {SESSION_COLS} FROM attendance_sessions \
                 WHERE date = ? AND status = 'SCHEDULED' \
                   AND scheduled_start <= ? AND scheduled_end >= ? \
                 ORDER BY scheduled_start"
            ),
            params![format_date(date), now, now],
        )
    }

    fn sessions_to_complete(&self, date: NaiveDate, now: NaiveTime) -> StoreResult<Vec<Session>> {
        self.query_sessions(
            &format!(
                "SELECT {SESSION_COLS} FROM attendance_sessions \
                 WHERE date = ? AND status = 'ACTIVE' AND scheduled_end <= ? \
                 ORDER BY scheduled_start"
            ),
            params![format_date(date), format_time(now)],
        )
    }

    fn update_session_status(
        &self,
        id: SessionId,
        from: SessionStatus,
        to: SessionStatus,
        at: NaiveTime,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let changed = match to {
            SessionStatus::Active => conn.execute(
                "UPDATE attendance_sessions SET status = ?, actual_start = ? \
                 WHERE id = ? AND status = ?",
                params![to.as_str(), format_time(at), id.as_i64(), from.as_str()],
            )?,
            SessionStatus::Completed => conn.execute(
                "UPDATE attendance_sessions SET status = ?, actual_end = ? \
                 WHERE id = ? AND status = ?",
                params![to.as_str(), format_time(at), id.as_i64(), from.as_str()],
            )?,
            _ => conn.execute(
                "UPDATE attendance_sessions SET status = ? WHERE id = ? AND status = ?",
                params![to.as_str(), id.as_i64(), from.as_str()],
            )?,
        };

        if changed > 0 {
            debug!(session_id = %id, from = from.as_str(), to = to.as_str(), "Session status updated");
        }

        Ok(changed > 0)
    }
}

impl SqliteStore {
    fn query_sessions(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<Session>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, read_session_row)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }
        Ok(sessions)
    }

    fn query_records(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, read_record_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }
}

impl AttendanceStore for SqliteStore {
    fn insert_record(&self, new: NewRecord) -> StoreResult<AttendanceRecord> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO attendance \
             (student_id, student_name, grade, attendance_date, scan_time, \
              status, scan_method, session_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                new.student_id.as_str(),
                new.student_name,
                new.grade,
                format_date(new.attendance_date),
                new.scan_time.to_rfc3339(),
                new.status.as_str(),
                new.scan_method.as_str(),
                new.session_id.map(|s| s.as_i64()),
                new.created_at.to_rfc3339(),
            ],
        )?;

        let id = RecordId::new(conn.last_insert_rowid());
        debug!(record_id = %id, student_id = %new.student_id, "Attendance record inserted");

        Ok(AttendanceRecord {
            id,
            student_id: new.student_id,
            student_name: new.student_name,
            grade: new.grade,
            attendance_date: new.attendance_date,
            scan_time: new.scan_time,
            status: new.status,
            scan_method: new.scan_method,
            session_id: new.session_id,
            created_at: new.created_at,
        })
    }

    fn record_for_session(
        &self,
        student_id: &StudentId,
        session_id: SessionId,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!(
                    "SELECT {RECORD_COLS} FROM attendance \
                     WHERE student_id = ? AND session_id = ?"
                ),
                params![student_id.as_str(), session_id.as_i64()],
                read_record_row,
            )
            .optional()?;
        row.map(RecordRow::into_record).transpose()
    }

    fn record_for_date(
        &self,
        student_id: &StudentId,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!(
                    "SELECT {RECORD_COLS} FROM attendance \
                     WHERE student_id = ? AND attendance_date = ? \
                     ORDER BY id LIMIT 1"
                ),
                params![student_id.as_str(), format_date(date)],
                read_record_row,
            )
            .optional()?;
        row.map(RecordRow::into_record).transpose()
    }

    fn update_record(
        &self,
        id: RecordId,
        status: AttendanceStatus,
        session_id: Option<SessionId>,
    ) -> StoreResult<AttendanceRecord> {
        let conn = self.conn.lock().unwrap();

        let changed = conn.execute(
            "UPDATE attendance \
             SET status = ?, session_id = COALESCE(?, session_id) \
             WHERE id = ?",
            params![
                status.as_str(),
                session_id.map(|s| s.as_i64()),
                id.as_i64()
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(format!("attendance record {id}")));
        }

        let row = conn.query_row(
            &format!("SELECT {RECORD_COLS} FROM attendance WHERE id = ?"),
            [id.as_i64()],
            read_record_row,
        )?;
        row.into_record()
    }

    fn records_for_student(&self, student_id: &StudentId) -> StoreResult<Vec<AttendanceRecord>> {
        self.query_records(
            &format!(
                "SELECT {RECORD_COLS} FROM attendance \
                 WHERE student_id = ? ORDER BY attendance_date DESC, scan_time DESC"
            ),
            params![student_id.as_str()],
        )
    }

    fn records_for_date(&self, date: NaiveDate) -> StoreResult<Vec<AttendanceRecord>> {
        self.query_records(
            &format!(
                "SELECT {RECORD_COLS} FROM attendance \
                 WHERE attendance_date = ? ORDER BY scan_time ASC"
            ),
            params![format_date(date)],
        )
    }

    fn records_for_session(&self, session_id: SessionId) -> StoreResult<Vec<AttendanceRecord>> {
        self.query_records(
            &format!(
                "SELECT {RECORD_COLS} FROM attendance \
                 WHERE session_id = ? ORDER BY scan_time ASC"
            ),
            params![session_id.as_i64()],
        )
    }

    fn count_attended(&self, student_id: &StudentId) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM attendance \
             WHERE student_id = ? AND status IN ('PRESENT', 'LATE')",
            [student_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl Directory for SqliteStore {
    fn student(&self, student_id: &StudentId) -> StoreResult<Option<StudentProfile>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT student_id, first_name, last_name, grade, class_id \
                 FROM students WHERE student_id = ?",
                [student_id.as_str()],
                |row| {
                    Ok(StudentProfile {
                        student_id: StudentId::new(row.get::<_, String>(0)?),
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        grade: row.get(3)?,
                        class_id: row.get::<_, Option<i64>>(4)?.map(ClassId::new),
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn class_exists(&self, class_id: ClassId) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM classes WHERE id = ?",
                [class_id.as_i64()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn active_class_ids(&self) -> StoreResult<Vec<ClassId>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id FROM classes WHERE active = 1 ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(ClassId::new(row?));
        }
        Ok(ids)
    }

    fn schedule_for_day(
        &self,
        class_id: ClassId,
        day: Weekday,
    ) -> StoreResult<Vec<ScheduleEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, class_id, day_of_week, start_time, end_time, subject \
             FROM class_schedules WHERE class_id = ? AND day_of_week = ? \
             ORDER BY start_time",
        )?;
        let rows = stmt.query_map(params![class_id.as_i64(), weekday_name(day)], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, class_id, day_str, start, end, subject) = row?;
            entries.push(ScheduleEntry {
                id,
                class_id: ClassId::new(class_id),
                day_of_week: parse_weekday(&day_str)
                    .ok_or_else(|| StoreError::Database(format!("bad day_of_week: {day_str}")))?,
                start_time: decode_time(&start, "start_time")?,
                end_time: decode_time(&end, "end_time")?,
                subject,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn new_session(class_id: ClassId, d: NaiveDate, subject: &str) -> NewSession {
        NewSession {
            class_id,
            date: d,
            scheduled_start: time(9, 0),
            scheduled_end: time(10, 0),
            subject: subject.into(),
            created_at: rollcall_util::now(),
        }
    }

    fn new_record(student: &str, session_id: Option<SessionId>) -> NewRecord {
        NewRecord {
            student_id: StudentId::new(student),
            student_name: "Test Student".into(),
            grade: "Grade 8".into(),
            attendance_date: date(2026, 3, 9),
            scan_time: rollcall_util::now(),
            status: AttendanceStatus::Present,
            scan_method: ScanMethod::Qr,
            session_id,
            created_at: rollcall_util::now(),
        }
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_session_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        let d = date(2026, 3, 9);

        let created = store
            .create_session(new_session(ClassId::new(1), d, "Mathematics"))
            .unwrap();
        assert_eq!(created.status, SessionStatus::Scheduled);

        let loaded = store.session(created.id).unwrap().unwrap();
        assert_eq!(loaded, created);

        let found = store
            .find_session(ClassId::new(1), d, "Mathematics")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);

        assert!(store
            .find_session(ClassId::new(1), d, "Physics")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_duplicate_session_conflicts() {
        let store = SqliteStore::in_memory().unwrap();
        let d = date(2026, 3, 9);

        store
            .create_session(new_session(ClassId::new(1), d, "Mathematics"))
            .unwrap();
        let result = store.create_session(new_session(ClassId::new(1), d, "Mathematics"));
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        // Same subject on another date is fine
        store
            .create_session(new_session(ClassId::new(1), date(2026, 3, 10), "Mathematics"))
            .unwrap();
    }

    #[test]
    fn test_status_update_is_compare_and_swap() {
        let store = SqliteStore::in_memory().unwrap();
        let session = store
            .create_session(new_session(ClassId::new(1), date(2026, 3, 9), "Mathematics"))
            .unwrap();

        // Wrong `from` leaves the row alone
        let changed = store
            .update_session_status(
                session.id,
                SessionStatus::Active,
                SessionStatus::Completed,
                time(10, 0),
            )
            .unwrap();
        assert!(!changed);

        // Correct transition stamps actual_start
        let changed = store
            .update_session_status(
                session.id,
                SessionStatus::Scheduled,
                SessionStatus::Active,
                time(9, 5),
            )
            .unwrap();
        assert!(changed);

        let loaded = store.session(session.id).unwrap().unwrap();
        assert_eq!(loaded.status, SessionStatus::Active);
        assert_eq!(loaded.actual_start, Some(time(9, 5)));
        assert_eq!(loaded.actual_end, None);

        // Completion stamps actual_end
        store
            .update_session_status(
                session.id,
                SessionStatus::Active,
                SessionStatus::Completed,
                time(10, 0),
            )
            .unwrap();
        let loaded = store.session(session.id).unwrap().unwrap();
        assert_eq!(loaded.status, SessionStatus::Completed);
        assert_eq!(loaded.actual_end, Some(time(10, 0)));
    }

    #[test]
    fn test_clock_queries() {
        let store = SqliteStore::in_memory().unwrap();
        let d = date(2026, 3, 9);

        let morning = store
            .create_session(new_session(ClassId::new(1), d, "Mathematics"))
            .unwrap();
        let mut afternoon = new_session(ClassId::new(1), d, "Physics");
        afternoon.scheduled_start = time(14, 0);
        afternoon.scheduled_end = time(15, 0);
        store.create_session(afternoon).unwrap();

        // 09:05: only the morning session is due to start
        let due = store.sessions_to_activate(d, time(9, 5)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, morning.id);

        // Nothing active yet, so nothing to complete
        assert!(store.sessions_to_complete(d, time(10, 0)).unwrap().is_empty());

        store
            .update_session_status(morning.id, SessionStatus::Scheduled, SessionStatus::Active, time(9, 5))
            .unwrap();
        assert_eq!(store.active_sessions(d).unwrap().len(), 1);

        // 09:30: session still running
        assert!(store.sessions_to_complete(d, time(9, 30)).unwrap().is_empty());

        // 10:00: end of window reached
        let due = store.sessions_to_complete(d, time(10, 0)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, morning.id);
    }

    #[test]
    fn test_duplicate_record_conflicts() {
        let store = SqliteStore::in_memory().unwrap();
        let session = store
            .create_session(new_session(ClassId::new(1), date(2026, 3, 9), "Mathematics"))
            .unwrap();

        store
            .insert_record(new_record("STU-001", Some(session.id)))
            .unwrap();
        let result = store.insert_record(new_record("STU-001", Some(session.id)));
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        // A different student in the same session is fine
        store
            .insert_record(new_record("STU-002", Some(session.id)))
            .unwrap();

        // Session-less records never trip the partial index
        store.insert_record(new_record("STU-001", None)).unwrap();
        store.insert_record(new_record("STU-001", None)).unwrap();
    }

    #[test]
    fn test_record_lookups_and_ordering() {
        let store = SqliteStore::in_memory().unwrap();

        let mut early = new_record("STU-001", None);
        early.attendance_date = date(2026, 3, 2);
        store.insert_record(early).unwrap();

        let mut late = new_record("STU-001", None);
        late.attendance_date = date(2026, 3, 9);
        store.insert_record(late).unwrap();

        let records = store
            .records_for_student(&StudentId::new("STU-001"))
            .unwrap();
        assert_eq!(records.len(), 2);
        // Newest attendance date first
        assert_eq!(records[0].attendance_date, date(2026, 3, 9));

        let found = store
            .record_for_date(&StudentId::new("STU-001"), date(2026, 3, 2))
            .unwrap();
        assert!(found.is_some());
        assert!(store
            .record_for_date(&StudentId::new("STU-001"), date(2026, 3, 3))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_update_record_keeps_session_when_none() {
        let store = SqliteStore::in_memory().unwrap();
        let session = store
            .create_session(new_session(ClassId::new(1), date(2026, 3, 9), "Mathematics"))
            .unwrap();

        let record = store
            .insert_record(new_record("STU-001", Some(session.id)))
            .unwrap();

        let updated = store
            .update_record(record.id, AttendanceStatus::Absent, None)
            .unwrap();
        assert_eq!(updated.status, AttendanceStatus::Absent);
        assert_eq!(updated.session_id, Some(session.id));

        let missing = store.update_record(RecordId::new(999), AttendanceStatus::Late, None);
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_count_attended() {
        let store = SqliteStore::in_memory().unwrap();

        let mut present = new_record("STU-001", None);
        present.attendance_date = date(2026, 3, 2);
        store.insert_record(present).unwrap();

        let mut late = new_record("STU-001", None);
        late.attendance_date = date(2026, 3, 3);
        late.status = AttendanceStatus::Late;
        store.insert_record(late).unwrap();

        let mut absent = new_record("STU-001", None);
        absent.attendance_date = date(2026, 3, 4);
        absent.status = AttendanceStatus::Absent;
        absent.scan_method = ScanMethod::Manual;
        store.insert_record(absent).unwrap();

        assert_eq!(
            store.count_attended(&StudentId::new("STU-001")).unwrap(),
            2
        );
    }

    #[test]
    fn test_directory() {
        let store = SqliteStore::in_memory().unwrap();

        let math_class = store.add_class("8-A", "Grade 8", true).unwrap();
        let retired = store.add_class("7-B", "Grade 7", false).unwrap();

        store
            .add_student(&StudentProfile {
                student_id: StudentId::new("STU-001"),
                first_name: "Amara".into(),
                last_name: "Perera".into(),
                grade: "Grade 8".into(),
                class_id: Some(math_class),
            })
            .unwrap();

        store
            .add_schedule_entry(math_class, Weekday::Mon, time(9, 0), time(10, 0), "Mathematics")
            .unwrap();
        store
            .add_schedule_entry(math_class, Weekday::Tue, time(9, 0), time(10, 0), "Physics")
            .unwrap();

        let student = store.student(&StudentId::new("STU-001")).unwrap().unwrap();
        assert_eq!(student.class_id, Some(math_class));
        assert!(store.student(&StudentId::new("STU-404")).unwrap().is_none());

        assert!(store.class_exists(math_class).unwrap());
        assert!(!store.class_exists(ClassId::new(99)).unwrap());

        // Only the active class materializes
        assert_eq!(store.active_class_ids().unwrap(), vec![math_class]);
        let _ = retired;

        let monday = store.schedule_for_day(math_class, Weekday::Mon).unwrap();
        assert_eq!(monday.len(), 1);
        assert_eq!(monday[0].subject, "Mathematics");
        assert!(store
            .schedule_for_day(math_class, Weekday::Wed)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollcall.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .create_session(new_session(ClassId::new(1), date(2026, 3, 9), "Mathematics"))
                .unwrap();
        }

        // Reopen and find the row again
        let store = SqliteStore::open(&path).unwrap();
        let found = store
            .find_session(ClassId::new(1), date(2026, 3, 9), "Mathematics")
            .unwrap();
        assert!(found.is_some());
    }
}
