//! Store trait definitions

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Weekday};
use rollcall_api::{
    AttendanceRecord, AttendanceStatus, ScanMethod, ScheduleEntry, Session, SessionStatus,
    StudentProfile,
};
use rollcall_util::{ClassId, RecordId, SessionId, StudentId};

use crate::StoreResult;

/// Persisted collection of dated, concrete sessions
pub trait SessionStore: Send + Sync {
    /// Insert a new SCHEDULED session. A `(class, date, subject)` that
    /// already exists surfaces as `StoreError::Conflict`.
    fn create_session(&self, new: NewSession) -> StoreResult<Session>;

    /// Fetch a session by id
    fn session(&self, id: SessionId) -> StoreResult<Option<Session>>;

    /// The materializer's existence check
    fn find_session(
        &self,
        class_id: ClassId,
        date: NaiveDate,
        subject: &str,
    ) -> StoreResult<Option<Session>>;

    /// All sessions for a class on a date
    fn sessions_for_class(&self, class_id: ClassId, date: NaiveDate) -> StoreResult<Vec<Session>>;

    /// ACTIVE sessions on a date
    fn active_sessions(&self, date: NaiveDate) -> StoreResult<Vec<Session>>;

    /// SCHEDULED sessions on `date` whose window contains `now`
    fn sessions_to_activate(&self, date: NaiveDate, now: NaiveTime) -> StoreResult<Vec<Session>>;

    /// ACTIVE sessions on `date` whose window has ended by `now`
    fn sessions_to_complete(&self, date: NaiveDate, now: NaiveTime) -> StoreResult<Vec<Session>>;

    /// Compare-and-swap status update: applies `from -> to` and stamps
    /// `actual_start`/`actual_end` as appropriate for `to`. Returns false
    /// when the row was no longer in `from` (lost race), leaving it
    /// untouched.
    fn update_session_status(
        &self,
        id: SessionId,
        from: SessionStatus,
        to: SessionStatus,
        at: NaiveTime,
    ) -> StoreResult<bool>;
}

/// Persisted collection of attendance records
pub trait AttendanceStore: Send + Sync {
    /// Insert a new record. A duplicate `(student, session)` surfaces as
    /// `StoreError::Conflict`.
    fn insert_record(&self, new: NewRecord) -> StoreResult<AttendanceRecord>;

    /// Record for a student in a specific session
    fn record_for_session(
        &self,
        student_id: &StudentId,
        session_id: SessionId,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Record for a student on a date (the manual path's session-less lookup)
    fn record_for_date(
        &self,
        student_id: &StudentId,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Overwrite a record's status (manual override), optionally linking
    /// it to a session
    fn update_record(
        &self,
        id: RecordId,
        status: AttendanceStatus,
        session_id: Option<SessionId>,
    ) -> StoreResult<AttendanceRecord>;

    /// All records for a student, newest attendance date first
    fn records_for_student(&self, student_id: &StudentId) -> StoreResult<Vec<AttendanceRecord>>;

    /// All records on a date, scan time ascending
    fn records_for_date(&self, date: NaiveDate) -> StoreResult<Vec<AttendanceRecord>>;

    /// All records for a session, scan time ascending
    fn records_for_session(&self, session_id: SessionId) -> StoreResult<Vec<AttendanceRecord>>;

    /// Count of PRESENT/LATE records for a student
    fn count_attended(&self, student_id: &StudentId) -> StoreResult<u64>;
}

/// Read-only view of the student/class/schedule tables owned by the
/// wider school system
pub trait Directory: Send + Sync {
    /// Look up a student by external student code
    fn student(&self, student_id: &StudentId) -> StoreResult<Option<StudentProfile>>;

    /// Whether a class exists
    fn class_exists(&self, class_id: ClassId) -> StoreResult<bool>;

    /// Ids of all active classes
    fn active_class_ids(&self) -> StoreResult<Vec<ClassId>>;

    /// A class's schedule template entries for one weekday
    fn schedule_for_day(
        &self,
        class_id: ClassId,
        day: Weekday,
    ) -> StoreResult<Vec<ScheduleEntry>>;
}

/// Input for `SessionStore::create_session`
#[derive(Debug, Clone)]
pub struct NewSession {
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub scheduled_start: NaiveTime,
    pub scheduled_end: NaiveTime,
    pub subject: String,
    pub created_at: DateTime<Local>,
}

/// Input for `AttendanceStore::insert_record`
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub student_id: StudentId,
    pub student_name: String,
    pub grade: String,
    pub attendance_date: NaiveDate,
    pub scan_time: DateTime<Local>,
    pub status: AttendanceStatus,
    pub scan_method: ScanMethod,
    pub session_id: Option<SessionId>,
    pub created_at: DateTime<Local>,
}
