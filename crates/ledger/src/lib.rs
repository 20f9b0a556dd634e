use std::sync::Arc;

use aggregate::{aggregate, Sources};
use eyre::{Context as _, Result};
use log::error;
use model::{
    ids::DayRange,
    rights::{Rule, Viewer},
    session::CalendarSession,
};
use presentation::Command;
use service::{
    bookings::{BookingSource, Bookings, MutationError},
    cache::{FetchKey, SessionCache},
};
use storage::backend::ScheduleBackend;
use view::{CalendarView, Outcome};

pub mod aggregate;
pub mod normalize;
pub mod policy;
pub mod presentation;
pub mod service;
pub mod view;

/// What the engine did with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Edits and session cancellation are UI navigation; the engine does not
    /// execute them.
    OpenEditor(Command),
    Done,
    MarkedAll(u32),
}

#[derive(Clone)]
pub struct Ledger {
    backend: Arc<dyn ScheduleBackend>,
    pub cache: Arc<SessionCache>,
    pub bookings: Bookings,
}

impl Ledger {
    pub fn new(backend: Arc<dyn ScheduleBackend>) -> Self {
        let cache = Arc::new(SessionCache::new());
        let bookings = Bookings::new(backend.clone(), cache.clone());
        Ledger {
            backend,
            cache,
            bookings,
        }
    }

    /// Raw records for `range`, refetching only what is stale. Coach-facing
    /// collections are scoped to the trainer.
    pub async fn load(&self, range: DayRange, viewer: &Viewer) -> Result<Sources> {
        let key = FetchKey::new(range, viewer.scoped_coach());
        let backend = self.backend.as_ref();
        let (class_sessions, class_bookings, pt_bookings) = futures::try_join!(
            self.cache.class_sessions(backend, key),
            self.cache.class_bookings(backend, range),
            self.cache.pt_bookings(backend, key),
        )
        .context("load calendar")?;
        Ok(Sources {
            class_sessions,
            class_bookings,
            pt_bookings,
        })
    }

    pub async fn calendar(&self, view: &CalendarView) -> Result<Vec<CalendarSession>> {
        let sources = self.load(view.range(), view.viewer()).await?;
        Ok(aggregate(&sources, view.filter(), view.viewer()))
    }

    pub async fn dispatch(
        &self,
        viewer: &Viewer,
        command: Command,
    ) -> Result<Dispatch, MutationError> {
        match command {
            Command::EditClassSession(_)
            | Command::CancelClassSession(_)
            | Command::EditClassBooking(_)
            | Command::EditPtBooking(_) => Ok(Dispatch::OpenEditor(command)),
            Command::CancelClassBooking(id) => {
                self.bookings
                    .cancel_booking(BookingSource::Class, id)
                    .await?;
                Ok(Dispatch::Done)
            }
            Command::CancelPtBooking(id) => {
                self.bookings.cancel_pt_booking(id).await?;
                Ok(Dispatch::Done)
            }
            Command::MarkClassAttendance { booking_id, status } => {
                ensure_rule(viewer, Rule::MarkAttendance)?;
                self.bookings
                    .set_attendance(BookingSource::Class, booking_id, status)
                    .await?;
                Ok(Dispatch::Done)
            }
            Command::MarkPtAttendance { booking_id, status } => {
                ensure_rule(viewer, Rule::MarkAttendance)?;
                self.bookings
                    .set_attendance(BookingSource::Pt, booking_id, status)
                    .await?;
                Ok(Dispatch::Done)
            }
            Command::MarkAllAttended(session) => {
                ensure_rule(viewer, Rule::MarkAttendance)?;
                let changed = self.bookings.mark_all_attended(session).await?;
                Ok(Dispatch::MarkedAll(changed))
            }
        }
    }

    /// Runs a command on behalf of a mounted view. The outcome carries the
    /// view's token so a remounted view can drop it.
    pub async fn submit(&self, view: &CalendarView, command: Command) -> Outcome<Dispatch> {
        let token = view.token();
        Outcome::new(token, self.dispatch(view.viewer(), command).await)
    }
}

fn ensure_rule(viewer: &Viewer, rule: Rule) -> Result<(), MutationError> {
    if viewer.has_rule(rule) {
        Ok(())
    } else {
        error!("Viewer {} ({}) has no rule {:?}", viewer.id, viewer.role, rule);
        Err(MutationError::Forbidden(rule))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, Utc};
    use model::{
        ids::{BookingId, CoachId, CustomerId, SessionId, WeekId},
        raw::{RawClassSchedule, RawCoach, RawCoachSession, RawCustomer, RawMemberBooking},
        rights::Role,
        session::SessionType,
        status::BookingStatus,
    };
    use storage::memory::{Fixture, MemoryStore};

    use super::*;

    fn class(id: i64, coach: i64) -> RawCoachSession {
        RawCoachSession {
            id: SessionId(id),
            start_time: Some(Utc::now()),
            end_time: None,
            duration: Some(60),
            schedule: Some(RawClassSchedule {
                class_name: Some(format!("Class {}", id)),
                coach: Some(RawCoach {
                    id: Some(CoachId(coach)),
                    first_name: Some("Coach".to_string()),
                    last_name: Some(coach.to_string()),
                }),
                capacity: Some(10),
                ..Default::default()
            }),
            attendance_count: None,
            notes: None,
        }
    }

    fn ledger() -> (Arc<MemoryStore>, Ledger) {
        let store = Arc::new(MemoryStore::new(Fixture {
            customers: vec![RawCustomer {
                id: Some(CustomerId(1)),
                first_name: Some("Jane".to_string()),
                last_name: Some("Doe".to_string()),
            }],
            class_sessions: vec![class(1, 7), class(2, 8)],
            class_bookings: vec![RawMemberBooking {
                id: BookingId(1),
                session_id: SessionId(1),
                customer_id: Some(CustomerId(1)),
                customer: None,
                status: BookingStatus::Booked,
                session: None,
                notes: None,
            }],
            ..Default::default()
        }));
        let ledger = Ledger::new(store.clone());
        (store, ledger)
    }

    fn mount(viewer: Viewer) -> CalendarView {
        CalendarView::mount(viewer, WeekId::new(Local::now()), 7, std::iter::empty())
    }

    #[tokio::test]
    async fn test_calendar_for_trainer() {
        let (_, ledger) = ledger();
        let view = mount(Viewer::trainer(CoachId(7)));
        let sessions = ledger.calendar(&view).await.unwrap();
        assert!(!sessions.is_empty());
        assert!(sessions
            .iter()
            .all(|session| session.coach.id == Some(CoachId(7))));
    }

    #[tokio::test]
    async fn test_mark_then_reload_reflects_status() {
        let (_, ledger) = ledger();
        let view = mount(Viewer::admin());
        ledger.calendar(&view).await.unwrap();

        let command = Command::MarkClassAttendance {
            booking_id: BookingId(1),
            status: BookingStatus::Attended,
        };
        let outcome = ledger.submit(&view, command).await;
        assert_eq!(outcome.token, view.token());
        assert_eq!(outcome.result.unwrap(), Dispatch::Done);

        let sessions = ledger.calendar(&view).await.unwrap();
        let booking = sessions
            .iter()
            .find(|s| s.session_type() == SessionType::MemberGroupClass)
            .unwrap();
        assert_eq!(booking.status(), Some(BookingStatus::Attended));
    }

    #[tokio::test]
    async fn test_cancel_after_mark_is_rejected() {
        let (store, ledger) = ledger();
        let view = mount(Viewer::admin());
        ledger.calendar(&view).await.unwrap();

        let mark = Command::MarkClassAttendance {
            booking_id: BookingId(1),
            status: BookingStatus::Attended,
        };
        assert_eq!(ledger.dispatch(view.viewer(), mark).await.unwrap(), Dispatch::Done);
        let err = ledger
            .dispatch(view.viewer(), Command::CancelClassBooking(BookingId(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, MutationError::IllegalTransition(_)));
        assert_eq!(
            store.snapshot().class_bookings[0].status,
            BookingStatus::Attended
        );
    }

    #[tokio::test]
    async fn test_member_can_not_mark_attendance() {
        let (store, ledger) = ledger();
        let member = Viewer::new(1, Role::Member);
        ledger
            .load(DayRange::days(Local::now().into(), 7), &member)
            .await
            .unwrap();
        let err = ledger
            .dispatch(&member, Command::MarkAllAttended(SessionId(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, MutationError::Forbidden(Rule::MarkAttendance)));
        assert_eq!(
            store.snapshot().class_bookings[0].status,
            BookingStatus::Booked
        );
    }

    #[tokio::test]
    async fn test_edits_are_not_executed() {
        let (_, ledger) = ledger();
        for command in [
            Command::EditClassSession(SessionId(1)),
            Command::CancelClassSession(SessionId(1)),
            Command::EditClassBooking(BookingId(1)),
            Command::EditPtBooking(BookingId(1)),
        ] {
            let dispatch = ledger.dispatch(&Viewer::admin(), command).await.unwrap();
            assert_eq!(dispatch, Dispatch::OpenEditor(command));
        }
    }

    #[tokio::test]
    async fn test_cancel_then_reload_drops_booking() {
        let (_, ledger) = ledger();
        let view = mount(Viewer::admin());
        ledger.calendar(&view).await.unwrap();
        let dispatch = ledger
            .dispatch(view.viewer(), Command::CancelClassBooking(BookingId(1)))
            .await
            .unwrap();
        assert_eq!(dispatch, Dispatch::Done);

        let sessions = ledger.calendar(&view).await.unwrap();
        assert!(sessions
            .iter()
            .all(|s| s.session_type() != SessionType::MemberGroupClass));
    }
}
