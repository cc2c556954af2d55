//! HTTP surface for rollcalld
//!
//! JSON in/out under `/api`, plus `/healthz`. Rule violations from the
//! recorder come back as 400 with an `{"error": ...}` body; missing
//! resources on pure lookups come back as 404 with the same shape.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use rollcall_api::{
    AttendanceRecord, AttendanceStatus, CreateSessionRequest, DateQuery, ErrorBody, HealthStatus,
    ManualAttendanceParams, RecordScanRequest, Session, API_VERSION,
};
use rollcall_core::{AttendanceRecorder, SessionClock};
use rollcall_store::{
    AttendanceStore, Directory, NewSession, SessionStore, SqliteStore, StoreError,
};
use rollcall_util::{AttendanceError, ClassId, SessionId, StudentId};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub recorder: Arc<AttendanceRecorder>,
    pub clock: Arc<SessionClock>,
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/record", post(record_scan))
        .route("/manual", post(record_manual))
        .route("/today", get(today_records))
        .route("/date/:date", get(records_by_date))
        .route("/session/:session_id", get(records_by_session))
        .route("/student/:student_id", get(student_records))
        .route("/student/:student_id/summary", get(student_summary))
        .route("/sessions", post(create_session))
        .route("/sessions/active", get(active_sessions))
        .route("/sessions/class/:class_id", get(class_sessions))
        .route("/sessions/:session_id/start", post(start_session))
        .route("/sessions/:session_id/end", post(end_session));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api/attendance", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler error, rendered as `{"error": ...}` with the right status
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn bad_request(e: impl ToString) -> Self {
        Self::BadRequest(e.to_string())
    }

    /// 404 for missing resources, 400 for everything else
    fn from_domain(e: AttendanceError) -> Self {
        if e.is_not_found() {
            Self::NotFound(e.to_string())
        } else {
            Self::BadRequest(e.to_string())
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}

async fn healthz(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        live: true,
        store_ok: state.store.is_healthy(),
        api_version: API_VERSION,
    })
}

/// POST /api/attendance/record; any rule violation is a 400
async fn record_scan(
    State(state): State<AppState>,
    Json(req): Json<RecordScanRequest>,
) -> Result<Json<AttendanceRecord>, ApiError> {
    let record = state
        .recorder
        .record_scan(&req.student_id, req.session_id, rollcall_util::now())
        .map_err(ApiError::bad_request)?;
    Ok(Json(record))
}

/// POST /api/attendance/manual, the teacher-override upsert
async fn record_manual(
    State(state): State<AppState>,
    Query(params): Query<ManualAttendanceParams>,
) -> Result<Json<AttendanceRecord>, ApiError> {
    let status = AttendanceStatus::parse(&params.status)
        .ok_or_else(|| ApiError::bad_request(AttendanceError::InvalidStatus(params.status.clone())))?;

    let record = state
        .recorder
        .record_manual(
            &params.student_id,
            params.date,
            status,
            params.session_id,
            rollcall_util::now(),
        )
        .map_err(ApiError::bad_request)?;
    Ok(Json(record))
}

async fn today_records(
    State(state): State<AppState>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    Ok(Json(state.store.records_for_date(rollcall_util::today())?))
}

async fn records_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    let date = rollcall_util::parse_date(&date)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid date: {date}")))?;
    Ok(Json(state.store.records_for_date(date)?))
}

async fn records_by_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    let session_id = SessionId::new(session_id);
    state
        .store
        .session(session_id)?
        .ok_or_else(|| ApiError::from_domain(AttendanceError::SessionNotFound(session_id)))?;
    Ok(Json(state.store.records_for_session(session_id)?))
}

async fn student_records(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    let student_id = StudentId::new(student_id);
    Ok(Json(state.store.records_for_student(&student_id)?))
}

async fn student_summary(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<rollcall_api::AttendanceSummary>, ApiError> {
    let student_id = StudentId::new(student_id);
    let summary = state
        .recorder
        .summary(&student_id)
        .map_err(ApiError::from_domain)?;
    Ok(Json(summary))
}

/// POST /api/attendance/sessions: an ad-hoc session outside the template
/// flow; always starts out SCHEDULED
async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<Session>, ApiError> {
    let session = state
        .store
        .create_session(NewSession {
            class_id: req.class_id,
            date: req.date,
            scheduled_start: req.scheduled_start,
            scheduled_end: req.scheduled_end,
            subject: req.subject,
            created_at: rollcall_util::now(),
        })
        .map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::BadRequest(
                "A session already exists for this class, date and subject".into(),
            ),
            other => other.into(),
        })?;
    Ok(Json(session))
}

async fn active_sessions(State(state): State<AppState>) -> Result<Json<Vec<Session>>, ApiError> {
    Ok(Json(state.store.active_sessions(rollcall_util::today())?))
}

async fn class_sessions(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<Session>>, ApiError> {
    let class_id = ClassId::new(class_id);
    if !state.store.class_exists(class_id)? {
        return Err(ApiError::from_domain(AttendanceError::ClassNotFound(
            class_id.as_i64(),
        )));
    }

    let date = query.date.unwrap_or_else(rollcall_util::today);
    Ok(Json(state.store.sessions_for_class(class_id, date)?))
}

async fn start_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<Json<Session>, ApiError> {
    let session = state
        .clock
        .start_session(SessionId::new(session_id), rollcall_util::now().time())
        .map_err(ApiError::from_domain)?;
    Ok(Json(session))
}

async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<Json<Session>, ApiError> {
    let session = state
        .clock
        .end_session(SessionId::new(session_id), rollcall_util::now().time())
        .map_err(ApiError::from_domain)?;
    Ok(Json(session))
}
