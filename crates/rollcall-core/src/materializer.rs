//! Daily session materialization

use chrono::{DateTime, Datelike, Local, NaiveDate};
use rollcall_store::{Directory, NewSession, SessionStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Summary of one materializer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeOutcome {
    /// Sessions newly created
    pub created: usize,
    /// Template entries that already had a session
    pub skipped: usize,
    /// Entries that failed and will be retried on the next run
    pub failed: usize,
}

/// Expands weekly schedule templates into concrete sessions, once per
/// (class, date, subject).
pub struct SessionMaterializer {
    sessions: Arc<dyn SessionStore>,
    directory: Arc<dyn Directory>,
}

impl SessionMaterializer {
    pub fn new(sessions: Arc<dyn SessionStore>, directory: Arc<dyn Directory>) -> Self {
        Self {
            sessions,
            directory,
        }
    }

    /// Materialize sessions for `today`. Re-running for the same date is a
    /// no-op: the existence check skips entries that already have a
    /// session, and the unique index on (class, date, subject) catches a
    /// concurrent run racing past the check.
    pub fn run(&self, today: NaiveDate, now: DateTime<Local>) -> MaterializeOutcome {
        let weekday = today.weekday();
        let mut outcome = MaterializeOutcome::default();

        let class_ids = match self.directory.active_class_ids() {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Failed to list active classes, skipping run");
                outcome.failed += 1;
                return outcome;
            }
        };

        for class_id in class_ids {
            let entries = match self.directory.schedule_for_day(class_id, weekday) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(class_id = %class_id, error = %e, "Failed to load schedule for class");
                    outcome.failed += 1;
                    continue;
                }
            };

            for entry in entries {
                match self.sessions.find_session(class_id, today, &entry.subject) {
                    Ok(Some(_)) => {
                        outcome.skipped += 1;
                    }
                    Ok(None) => {
                        let new = NewSession {
                            class_id,
                            date: today,
                            scheduled_start: entry.start_time,
                            scheduled_end: entry.end_time,
                            subject: entry.subject.clone(),
                            created_at: now,
                        };
                        match self.sessions.create_session(new) {
                            Ok(session) => {
                                debug!(
                                    session_id = %session.id,
                                    class_id = %class_id,
                                    subject = %session.subject,
                                    "Session materialized"
                                );
                                outcome.created += 1;
                            }
                            Err(StoreError::Conflict(_)) => {
                                // Another run created it between check and insert
                                outcome.skipped += 1;
                            }
                            Err(e) => {
                                warn!(
                                    class_id = %class_id,
                                    subject = %entry.subject,
                                    error = %e,
                                    "Failed to materialize session"
                                );
                                outcome.failed += 1;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(
                            class_id = %class_id,
                            subject = %entry.subject,
                            error = %e,
                            "Session lookup failed"
                        );
                        outcome.failed += 1;
                    }
                }
            }
        }

        info!(
            date = %today,
            created = outcome.created,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "Materializer run finished"
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Weekday};
    use rollcall_api::Session;
    use rollcall_store::{SqliteStore, StoreResult};
    use rollcall_util::{ClassId, SessionId};

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // 2026-03-09 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    fn store_with_schedule() -> (Arc<SqliteStore>, ClassId) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let class = store.add_class("8-A", "Grade 8", true).unwrap();
        store
            .add_schedule_entry(class, Weekday::Mon, time(9, 0), time(10, 0), "Mathematics")
            .unwrap();
        store
            .add_schedule_entry(class, Weekday::Mon, time(11, 0), time(12, 0), "Physics")
            .unwrap();
        store
            .add_schedule_entry(class, Weekday::Tue, time(9, 0), time(10, 0), "Chemistry")
            .unwrap();
        (store, class)
    }

    #[test]
    fn materializes_todays_entries_only() {
        let (store, class) = store_with_schedule();
        let materializer = SessionMaterializer::new(store.clone(), store.clone());

        let outcome = materializer.run(monday(), rollcall_util::now());
        assert_eq!(
            outcome,
            MaterializeOutcome {
                created: 2,
                skipped: 0,
                failed: 0
            }
        );

        let sessions = store.sessions_for_class(class, monday()).unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|s| s.status == rollcall_api::SessionStatus::Scheduled));
        // Tuesday's Chemistry slot stayed a template
        assert!(store
            .find_session(class, monday(), "Chemistry")
            .unwrap()
            .is_none());
    }

    #[test]
    fn rerun_is_idempotent() {
        let (store, class) = store_with_schedule();
        let materializer = SessionMaterializer::new(store.clone(), store.clone());

        materializer.run(monday(), rollcall_util::now());
        let second = materializer.run(monday(), rollcall_util::now());

        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(store.sessions_for_class(class, monday()).unwrap().len(), 2);
    }

    #[test]
    fn inactive_classes_are_ignored() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let retired = store.add_class("7-B", "Grade 7", false).unwrap();
        store
            .add_schedule_entry(retired, Weekday::Mon, time(9, 0), time(10, 0), "History")
            .unwrap();

        let materializer = SessionMaterializer::new(store.clone(), store.clone());
        let outcome = materializer.run(monday(), rollcall_util::now());

        assert_eq!(outcome.created, 0);
        assert!(store
            .find_session(retired, monday(), "History")
            .unwrap()
            .is_none());
    }

    /// Session store that refuses to create sessions for one subject,
    /// for exercising per-entry failure isolation.
    struct FlakyStore {
        inner: Arc<SqliteStore>,
        poison_subject: &'static str,
    }

    impl SessionStore for FlakyStore {
        fn create_session(&self, new: NewSession) -> StoreResult<Session> {
            if new.subject == self.poison_subject {
                return Err(StoreError::Database("disk on fire".into()));
            }
            self.inner.create_session(new)
        }

        fn session(&self, id: SessionId) -> StoreResult<Option<Session>> {
            self.inner.session(id)
        }

        fn find_session(
            &self,
            class_id: ClassId,
            date: NaiveDate,
            subject: &str,
        ) -> StoreResult<Option<Session>> {
            self.inner.find_session(class_id, date, subject)
        }

        fn sessions_for_class(
            &self,
            class_id: ClassId,
            date: NaiveDate,
        ) -> StoreResult<Vec<Session>> {
            self.inner.sessions_for_class(class_id, date)
        }

        fn active_sessions(&self, date: NaiveDate) -> StoreResult<Vec<Session>> {
            self.inner.active_sessions(date)
        }

        fn sessions_to_activate(
            &self,
            date: NaiveDate,
            now: NaiveTime,
        ) -> StoreResult<Vec<Session>> {
            self.inner.sessions_to_activate(date, now)
        }

        fn sessions_to_complete(
            &self,
            date: NaiveDate,
            now: NaiveTime,
        ) -> StoreResult<Vec<Session>> {
            self.inner.sessions_to_complete(date, now)
        }

        fn update_session_status(
            &self,
            id: SessionId,
            from: rollcall_api::SessionStatus,
            to: rollcall_api::SessionStatus,
            at: NaiveTime,
        ) -> StoreResult<bool> {
            self.inner.update_session_status(id, from, to, at)
        }
    }

    #[test]
    fn one_failing_entry_does_not_abort_the_batch() {
        let (store, class) = store_with_schedule();
        let flaky = Arc::new(FlakyStore {
            inner: store.clone(),
            poison_subject: "Mathematics",
        });

        let materializer = SessionMaterializer::new(flaky, store.clone());
        let outcome = materializer.run(monday(), rollcall_util::now());

        // Mathematics failed, Physics still went through
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.failed, 1);
        assert!(store
            .find_session(class, monday(), "Physics")
            .unwrap()
            .is_some());
    }
}
