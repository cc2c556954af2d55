//! Request and response DTOs for the HTTP surface

use chrono::{NaiveDate, NaiveTime};
use rollcall_util::{ClassId, SessionId, StudentId};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/attendance/record`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordScanRequest {
    pub student_id: StudentId,
    pub session_id: SessionId,
}

/// Query parameters of `POST /api/attendance/manual`.
///
/// `status` stays a raw string here so the daemon can reject unknown
/// values with its own error body instead of a framework rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualAttendanceParams {
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub status: String,
    pub session_id: Option<SessionId>,
}

/// Body of `POST /api/attendance/sessions` (ad-hoc session creation)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub scheduled_start: NaiveTime,
    pub scheduled_end: NaiveTime,
    pub subject: String,
}

/// Optional `?date=` filter used by the session listing endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

/// Per-student attendance summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub student_id: StudentId,
    pub present_days: u64,
    pub absent_days: u64,
    pub total_days: u64,
    pub attendance_percentage: f64,
}

/// Error body returned with every 4xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Liveness/readiness report for `GET /healthz`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub live: bool,
    pub store_ok: bool,
    pub api_version: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_request_uses_camel_case() {
        let req: RecordScanRequest =
            serde_json::from_str(r#"{"studentId":"STU-001","sessionId":5}"#).unwrap();
        assert_eq!(req.student_id.as_str(), "STU-001");
        assert_eq!(req.session_id.as_i64(), 5);
    }

    #[test]
    fn manual_params_session_optional() {
        let params: ManualAttendanceParams = serde_json::from_str(
            r#"{"studentId":"STU-001","date":"2026-03-09","status":"ABSENT"}"#,
        )
        .unwrap();
        assert!(params.session_id.is_none());
        assert_eq!(params.status, "ABSENT");
    }

    #[test]
    fn error_body_shape() {
        let body = ErrorBody::new("Session not found with id: 9");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"Session not found with id: 9"}"#);
    }
}
