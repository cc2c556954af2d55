//! Error types for rollcall

use thiserror::Error;

use crate::{SessionId, StudentId};

/// Core error type for attendance operations
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("Student not found with ID: {0}")]
    StudentNotFound(StudentId),

    #[error("Session not found with id: {0}")]
    SessionNotFound(SessionId),

    #[error("Class not found with id: {0}")]
    ClassNotFound(i64),

    #[error("Student {0} is not assigned to any class")]
    StudentUnassigned(StudentId),

    #[error("Attendance session is not active. Current status: {status}")]
    SessionNotActive { status: String },

    #[error("Attendance can only be recorded during session hours: {start} - {end}")]
    OutOfWindow { start: String, end: String },

    #[error("Student belongs to class {student_class}, but this session is for class {session_class}")]
    ClassMismatch {
        student_class: i64,
        session_class: i64,
    },

    #[error("Attendance already recorded for student {student_id} in this session")]
    DuplicateRecord { student_id: StudentId },

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid attendance status: {0}")]
    InvalidStatus(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl AttendanceError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Whether this error is a missing-resource lookup failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::StudentNotFound(_) | Self::SessionNotFound(_) | Self::ClassNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AttendanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = AttendanceError::StudentNotFound(StudentId::new("STU-404"));
        assert!(err.to_string().contains("STU-404"));

        let err = AttendanceError::SessionNotActive {
            status: "COMPLETED".into(),
        };
        assert!(err.to_string().contains("COMPLETED"));
    }

    #[test]
    fn not_found_classification() {
        assert!(AttendanceError::SessionNotFound(SessionId::new(9)).is_not_found());
        assert!(!AttendanceError::DuplicateRecord {
            student_id: StudentId::new("STU-001"),
        }
        .is_not_found());
    }
}
