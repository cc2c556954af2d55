//! Wall-clock driven session status transitions

use chrono::{NaiveDate, NaiveTime};
use rollcall_api::{Session, SessionStatus};
use rollcall_store::SessionStore;
use rollcall_util::{AttendanceError, Result, SessionId};
use std::sync::Arc;
use tracing::{info, warn};

/// Summary of one clock tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Sessions moved SCHEDULED -> ACTIVE
    pub activated: usize,
    /// Sessions moved ACTIVE -> COMPLETED
    pub completed: usize,
    /// Sessions that failed to update and stay eligible for the next tick
    pub failed: usize,
}

/// Advances session status purely from wall-clock time, independent of
/// any attendance activity. Also carries the manual start/end path, which
/// applies the same transitions immediately.
pub struct SessionClock {
    sessions: Arc<dyn SessionStore>,
}

impl SessionClock {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// One polling tick. The activation and completion rules are
    /// independent; a failure on one session never stops the rest.
    pub fn tick(&self, today: NaiveDate, now: NaiveTime) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        match self.sessions.sessions_to_activate(today, now) {
            Ok(due) => {
                for session in due {
                    match self.sessions.update_session_status(
                        session.id,
                        SessionStatus::Scheduled,
                        SessionStatus::Active,
                        now,
                    ) {
                        Ok(true) => {
                            info!(
                                session_id = %session.id,
                                class_id = %session.class_id,
                                subject = %session.subject,
                                at = %now,
                                "Session activated"
                            );
                            outcome.activated += 1;
                        }
                        // Lost a race with a manual start; nothing to do
                        Ok(false) => {}
                        Err(e) => {
                            warn!(session_id = %session.id, error = %e, "Failed to activate session");
                            outcome.failed += 1;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to query sessions due for activation");
                outcome.failed += 1;
            }
        }

        match self.sessions.sessions_to_complete(today, now) {
            Ok(due) => {
                for session in due {
                    match self.sessions.update_session_status(
                        session.id,
                        SessionStatus::Active,
                        SessionStatus::Completed,
                        now,
                    ) {
                        Ok(true) => {
                            info!(
                                session_id = %session.id,
                                class_id = %session.class_id,
                                subject = %session.subject,
                                at = %now,
                                "Session completed"
                            );
                            outcome.completed += 1;
                        }
                        Ok(false) => {}
                        Err(e) => {
                            warn!(session_id = %session.id, error = %e, "Failed to complete session");
                            outcome.failed += 1;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to query sessions due for completion");
                outcome.failed += 1;
            }
        }

        outcome
    }

    /// Manual SCHEDULED -> ACTIVE transition (teacher pressing "start")
    pub fn start_session(&self, id: SessionId, now: NaiveTime) -> Result<Session> {
        self.transition(id, SessionStatus::Active, now)
    }

    /// Manual ACTIVE -> COMPLETED transition
    pub fn end_session(&self, id: SessionId, now: NaiveTime) -> Result<Session> {
        self.transition(id, SessionStatus::Completed, now)
    }

    fn transition(&self, id: SessionId, to: SessionStatus, at: NaiveTime) -> Result<Session> {
        let session = self
            .sessions
            .session(id)
            .map_err(|e| AttendanceError::store(e.to_string()))?
            .ok_or(AttendanceError::SessionNotFound(id))?;

        if !session.status.can_transition_to(to) {
            return Err(AttendanceError::invalid_transition(
                session.status.as_str(),
                to.as_str(),
            ));
        }

        let applied = self
            .sessions
            .update_session_status(id, session.status, to, at)
            .map_err(|e| AttendanceError::store(e.to_string()))?;

        if !applied {
            // The clock (or another caller) got there first
            let current = self
                .sessions
                .session(id)
                .map_err(|e| AttendanceError::store(e.to_string()))?
                .ok_or(AttendanceError::SessionNotFound(id))?;
            return Err(AttendanceError::invalid_transition(
                current.status.as_str(),
                to.as_str(),
            ));
        }

        self.sessions
            .session(id)
            .map_err(|e| AttendanceError::store(e.to_string()))?
            .ok_or(AttendanceError::SessionNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_store::{NewSession, SqliteStore};
    use rollcall_util::ClassId;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    fn make_session(store: &SqliteStore, start: NaiveTime, end: NaiveTime, subject: &str) -> Session {
        store
            .create_session(NewSession {
                class_id: ClassId::new(1),
                date: date(),
                scheduled_start: start,
                scheduled_end: end,
                subject: subject.into(),
                created_at: rollcall_util::now(),
            })
            .unwrap()
    }

    #[test]
    fn tick_activates_and_completes_on_schedule() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let clock = SessionClock::new(store.clone());
        let session = make_session(&store, time(9, 0), time(10, 0), "Mathematics");

        // Before the window: nothing moves
        let outcome = clock.tick(date(), time(8, 59));
        assert_eq!(outcome, TickOutcome::default());

        // 09:05: SCHEDULED -> ACTIVE, actual_start stamped
        let outcome = clock.tick(date(), time(9, 5));
        assert_eq!(outcome.activated, 1);
        let loaded = store.session(session.id).unwrap().unwrap();
        assert_eq!(loaded.status, SessionStatus::Active);
        assert_eq!(loaded.actual_start, Some(time(9, 5)));

        // Mid-window ticks are no-ops
        let outcome = clock.tick(date(), time(9, 30));
        assert_eq!(outcome, TickOutcome::default());

        // 10:00: ACTIVE -> COMPLETED, actual_end stamped
        let outcome = clock.tick(date(), time(10, 0));
        assert_eq!(outcome.completed, 1);
        let loaded = store.session(session.id).unwrap().unwrap();
        assert_eq!(loaded.status, SessionStatus::Completed);
        assert_eq!(loaded.actual_end, Some(time(10, 0)));
    }

    #[test]
    fn missed_window_stays_scheduled() {
        // A session whose whole window elapsed before any tick ran is not
        // picked up: activation requires now inside the window.
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let clock = SessionClock::new(store.clone());
        let session = make_session(&store, time(9, 0), time(10, 0), "Mathematics");

        let outcome = clock.tick(date(), time(11, 0));
        assert_eq!(outcome, TickOutcome::default());
        let loaded = store.session(session.id).unwrap().unwrap();
        assert_eq!(loaded.status, SessionStatus::Scheduled);
    }

    #[test]
    fn activation_and_completion_happen_in_one_tick_for_different_sessions() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let clock = SessionClock::new(store.clone());

        let running = make_session(&store, time(8, 0), time(9, 30), "Physics");
        clock.start_session(running.id, time(8, 0)).unwrap();
        let upcoming = make_session(&store, time(9, 30), time(10, 30), "Mathematics");

        let outcome = clock.tick(date(), time(9, 30));
        assert_eq!(outcome.activated, 1);
        assert_eq!(outcome.completed, 1);

        assert_eq!(
            store.session(running.id).unwrap().unwrap().status,
            SessionStatus::Completed
        );
        assert_eq!(
            store.session(upcoming.id).unwrap().unwrap().status,
            SessionStatus::Active
        );
    }

    #[test]
    fn manual_start_and_end() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let clock = SessionClock::new(store.clone());
        let session = make_session(&store, time(9, 0), time(10, 0), "Mathematics");

        let started = clock.start_session(session.id, time(8, 55)).unwrap();
        assert_eq!(started.status, SessionStatus::Active);
        assert_eq!(started.actual_start, Some(time(8, 55)));

        let ended = clock.end_session(session.id, time(9, 40)).unwrap();
        assert_eq!(ended.status, SessionStatus::Completed);
        assert_eq!(ended.actual_end, Some(time(9, 40)));
    }

    #[test]
    fn manual_transitions_respect_monotonic_status() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let clock = SessionClock::new(store.clone());
        let session = make_session(&store, time(9, 0), time(10, 0), "Mathematics");

        // Can't end a session that never started
        let result = clock.end_session(session.id, time(9, 30));
        assert!(matches!(
            result,
            Err(AttendanceError::InvalidTransition { .. })
        ));

        clock.start_session(session.id, time(9, 0)).unwrap();
        clock.end_session(session.id, time(10, 0)).unwrap();

        // Can't restart a completed session
        let result = clock.start_session(session.id, time(10, 5));
        assert!(matches!(
            result,
            Err(AttendanceError::InvalidTransition { .. })
        ));

        let result = clock.start_session(SessionId::new(404), time(9, 0));
        assert!(matches!(result, Err(AttendanceError::SessionNotFound(_))));
    }
}
