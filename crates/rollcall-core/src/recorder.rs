//! Attendance recording

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use rollcall_api::{
    AttendanceRecord, AttendanceStatus, AttendanceSummary, ScanMethod, SessionStatus,
    StudentProfile,
};
use rollcall_store::{AttendanceStore, Directory, NewRecord, SessionStore, StoreError};
use rollcall_util::{format_time, AttendanceError, Result, SessionId, StudentId};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Default minutes after scheduled start before a scan counts as LATE
pub const DEFAULT_LATE_THRESHOLD: Duration = Duration::from_secs(15 * 60);

/// The single gate through which a scan (QR or manual) becomes a
/// persisted attendance record.
pub struct AttendanceRecorder {
    sessions: Arc<dyn SessionStore>,
    attendance: Arc<dyn AttendanceStore>,
    directory: Arc<dyn Directory>,
    late_threshold: chrono::Duration,
}

impl AttendanceRecorder {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        attendance: Arc<dyn AttendanceStore>,
        directory: Arc<dyn Directory>,
        late_threshold: Duration,
    ) -> Self {
        Self {
            sessions,
            attendance,
            directory,
            late_threshold: chrono::Duration::from_std(late_threshold)
                .unwrap_or_else(|_| chrono::Duration::minutes(15)),
        }
    }

    /// Validate and persist a QR scan against a session.
    ///
    /// Check order matters and is part of the contract: student, session,
    /// session active, scan inside the scheduled window, class membership,
    /// no prior record.
    pub fn record_scan(
        &self,
        student_id: &StudentId,
        session_id: SessionId,
        scan_time: DateTime<Local>,
    ) -> Result<AttendanceRecord> {
        let student = self.lookup_student(student_id)?;

        let session = self
            .sessions
            .session(session_id)
            .map_err(store_err)?
            .ok_or(AttendanceError::SessionNotFound(session_id))?;

        if session.status != SessionStatus::Active {
            return Err(AttendanceError::SessionNotActive {
                status: session.status.as_str().into(),
            });
        }

        let scan_tod = scan_time.time();
        if !session.contains_time(scan_tod) {
            return Err(AttendanceError::OutOfWindow {
                start: format_time(session.scheduled_start),
                end: format_time(session.scheduled_end),
            });
        }

        let student_class = student
            .class_id
            .ok_or_else(|| AttendanceError::StudentUnassigned(student_id.clone()))?;
        if student_class != session.class_id {
            return Err(AttendanceError::ClassMismatch {
                student_class: student_class.as_i64(),
                session_class: session.class_id.as_i64(),
            });
        }

        if self
            .attendance
            .record_for_session(student_id, session_id)
            .map_err(store_err)?
            .is_some()
        {
            return Err(AttendanceError::DuplicateRecord {
                student_id: student_id.clone(),
            });
        }

        let status = self.derive_status(scan_tod, session.scheduled_start);

        let new = NewRecord {
            student_id: student_id.clone(),
            student_name: student.full_name(),
            grade: student.grade.clone(),
            attendance_date: scan_time.date_naive(),
            scan_time,
            status,
            scan_method: ScanMethod::Qr,
            session_id: Some(session_id),
            created_at: scan_time,
        };

        let record = match self.attendance.insert_record(new) {
            Ok(record) => record,
            // A concurrent scan for the same (student, session) beat us
            // between the check and the insert; the unique index turns
            // that into a rejection instead of a double record.
            Err(StoreError::Conflict(_)) => {
                return Err(AttendanceError::DuplicateRecord {
                    student_id: student_id.clone(),
                });
            }
            Err(e) => return Err(store_err(e)),
        };

        info!(
            student_id = %record.student_id,
            session_id = %session_id,
            status = record.status.as_str(),
            "Attendance recorded"
        );

        Ok(record)
    }

    /// Teacher-override path: upsert a record with an explicit status.
    ///
    /// Deliberately skips the active-status and time-window checks; only
    /// class membership is validated when a session is given. Not subject
    /// to duplicate rejection: a second call overwrites the status.
    pub fn record_manual(
        &self,
        student_id: &StudentId,
        date: NaiveDate,
        status: AttendanceStatus,
        session_id: Option<SessionId>,
        now: DateTime<Local>,
    ) -> Result<AttendanceRecord> {
        let student = self.lookup_student(student_id)?;

        if let Some(session_id) = session_id {
            let session = self
                .sessions
                .session(session_id)
                .map_err(store_err)?
                .ok_or(AttendanceError::SessionNotFound(session_id))?;

            let student_class = student
                .class_id
                .ok_or_else(|| AttendanceError::StudentUnassigned(student_id.clone()))?;
            if student_class != session.class_id {
                return Err(AttendanceError::ClassMismatch {
                    student_class: student_class.as_i64(),
                    session_class: session.class_id.as_i64(),
                });
            }
        }

        let existing = match session_id {
            Some(session_id) => self
                .attendance
                .record_for_session(student_id, session_id)
                .map_err(store_err)?,
            None => self
                .attendance
                .record_for_date(student_id, date)
                .map_err(store_err)?,
        };

        let record = match existing {
            Some(record) => {
                let updated = self
                    .attendance
                    .update_record(record.id, status, session_id)
                    .map_err(store_err)?;
                info!(
                    student_id = %student_id,
                    record_id = %record.id,
                    status = status.as_str(),
                    "Manual attendance updated"
                );
                updated
            }
            None => {
                let new = NewRecord {
                    student_id: student_id.clone(),
                    student_name: student.full_name(),
                    grade: student.grade.clone(),
                    attendance_date: date,
                    scan_time: now,
                    status,
                    scan_method: ScanMethod::Manual,
                    session_id,
                    created_at: now,
                };
                let record = self.attendance.insert_record(new).map_err(store_err)?;
                info!(
                    student_id = %student_id,
                    record_id = %record.id,
                    status = status.as_str(),
                    "Manual attendance recorded"
                );
                record
            }
        };

        Ok(record)
    }

    /// Per-student attendance summary over all recorded days
    pub fn summary(&self, student_id: &StudentId) -> Result<AttendanceSummary> {
        let total = self
            .attendance
            .records_for_student(student_id)
            .map_err(store_err)?
            .len() as u64;
        let present = self
            .attendance
            .count_attended(student_id)
            .map_err(store_err)?;

        let attendance_percentage = if total > 0 {
            present as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Ok(AttendanceSummary {
            student_id: student_id.clone(),
            present_days: present,
            absent_days: total - present,
            total_days: total,
            attendance_percentage,
        })
    }

    fn lookup_student(&self, student_id: &StudentId) -> Result<StudentProfile> {
        self.directory
            .student(student_id)
            .map_err(store_err)?
            .ok_or_else(|| AttendanceError::StudentNotFound(student_id.clone()))
    }

    fn derive_status(&self, scan: NaiveTime, scheduled_start: NaiveTime) -> AttendanceStatus {
        if scan <= scheduled_start + self.late_threshold {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Late
        }
    }
}

fn store_err(e: StoreError) -> AttendanceError {
    AttendanceError::store(e.to_string())
}
