use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use log::{debug, error, info};
use model::{
    booking::{PtBookingDraft, PtBookingUpdate, ScheduleUpdate},
    errors::TransitionError,
    ids::{BookingId, SessionId},
    raw::ClassType,
    rights::Rule,
    status::BookingStatus,
};
use storage::backend::ScheduleBackend;
use strum::Display;
use thiserror::Error;

use super::cache::{Collection, SessionCache};

/// Which collection a booking id belongs to. Class and PT booking ids are
/// separate id spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BookingSource {
    Class,
    Pt,
}

impl BookingSource {
    fn collection(&self) -> Collection {
        match self {
            BookingSource::Class => Collection::ClassBookings,
            BookingSource::Pt => Collection::PtBookings,
        }
    }
}

#[derive(Clone)]
pub struct Bookings {
    backend: Arc<dyn ScheduleBackend>,
    cache: Arc<SessionCache>,
}

impl Bookings {
    pub(crate) fn new(backend: Arc<dyn ScheduleBackend>, cache: Arc<SessionCache>) -> Self {
        Bookings { backend, cache }
    }

    /// Status of the last fetched record.
    pub fn current_status(
        &self,
        source: BookingSource,
        id: BookingId,
    ) -> Result<BookingStatus, MutationError> {
        let status = match source {
            BookingSource::Class => self.cache.class_booking(id).map(|b| b.status),
            BookingSource::Pt => self.cache.pt_booking(id).map(|b| b.status),
        };
        status.ok_or(MutationError::BookingNotFound(id))
    }

    fn check_transition(
        &self,
        source: BookingSource,
        id: BookingId,
        to: BookingStatus,
    ) -> Result<(), MutationError> {
        let from = self.current_status(source, id)?;
        if let Err(err) = from.transition(to) {
            error!("{} booking {}: {}", source, id, err);
            return Err(err.into());
        }
        Ok(())
    }

    fn touched(&self, source: BookingSource) {
        self.cache.invalidate(source.collection());
        self.cache.invalidate(Collection::ClassSchedule);
    }

    fn committed(&self, source: BookingSource, id: BookingId, status: BookingStatus) {
        match source {
            BookingSource::Class => self.cache.record_class_status(id, status),
            BookingSource::Pt => self.cache.record_pt_status(id, status),
        }
        self.touched(source);
    }

    pub async fn mark_attended(
        &self,
        source: BookingSource,
        id: BookingId,
    ) -> Result<(), MutationError> {
        self.set_attendance(source, id, BookingStatus::Attended).await
    }

    pub async fn mark_no_show(
        &self,
        source: BookingSource,
        id: BookingId,
    ) -> Result<(), MutationError> {
        self.set_attendance(source, id, BookingStatus::NoShow).await
    }

    /// Accepts only `ATTENDED` and `NO_SHOW`; cancelling goes through
    /// [`Bookings::cancel_booking`].
    pub async fn set_attendance(
        &self,
        source: BookingSource,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<(), MutationError> {
        if !matches!(status, BookingStatus::Attended | BookingStatus::NoShow) {
            return Err(MutationError::NotAttendanceMark(status));
        }
        self.check_transition(source, id, status)?;
        match source {
            BookingSource::Class => self.backend.update_attendance_status(id, status).await?,
            BookingSource::Pt => {
                self.backend
                    .update_pt_booking(id, PtBookingUpdate::status(status))
                    .await?
            }
        }
        info!("{} booking {} marked {}", source, id, status);
        self.committed(source, id, status);
        Ok(())
    }

    pub async fn cancel_booking(
        &self,
        source: BookingSource,
        id: BookingId,
    ) -> Result<(), MutationError> {
        self.check_transition(source, id, BookingStatus::Cancelled)?;
        match source {
            BookingSource::Class => {
                self.backend
                    .update_attendance_status(id, BookingStatus::Cancelled)
                    .await?
            }
            BookingSource::Pt => self.backend.cancel_pt_booking(id).await?,
        }
        info!("{} booking {} cancelled", source, id);
        self.committed(source, id, BookingStatus::Cancelled);
        Ok(())
    }

    /// One collaborator call for the whole class. Either every `BOOKED`
    /// child moves to `ATTENDED` or nothing does. Only group classes
    /// qualify; schedule-backed PT slots are marked per booking.
    pub async fn mark_all_attended(&self, session: SessionId) -> Result<u32, MutationError> {
        let Some(raw) = self.cache.class_session(session) else {
            return Err(MutationError::SessionNotFound(session));
        };
        if raw.class_type() != ClassType::Group {
            error!("Session {} is a {:?} class, not marking all", session, raw.class_type());
            return Err(MutationError::NotGroupClass(session));
        }
        let changed = self.backend.mark_all_attended(session).await?;
        info!("Session {}: {} bookings marked attended", session, changed);
        let cached = self.cache.record_session_attended(session);
        debug!("Session {}: {} cached bookings updated", session, cached);
        self.cache.invalidate(Collection::ClassBookings);
        self.cache.invalidate(Collection::ClassSchedule);
        Ok(changed)
    }

    /// Moves a class slot. PT bookings linked to it move with it, so every
    /// collection is stale afterwards.
    pub async fn update_class_schedule_session(
        &self,
        session: SessionId,
        start_at: DateTime<Local>,
        duration_min: u32,
    ) -> Result<(), MutationError> {
        if self.cache.class_session(session).is_none() {
            return Err(MutationError::SessionNotFound(session));
        }
        let update = ScheduleUpdate {
            start_time: start_at.with_timezone(&Utc),
            duration: duration_min,
        };
        self.backend
            .update_class_schedule_session(session, update)
            .await?;
        info!("Session {} moved to {}", session, start_at);
        self.cache.invalidate_all();
        Ok(())
    }

    pub async fn create_pt_booking(&self, draft: PtBookingDraft) -> Result<BookingId, MutationError> {
        let linked = draft.class_schedule_session_id.is_some();
        let id = self.backend.create_pt_booking(draft.into()).await?;
        info!("PT booking {} created", id);
        self.cache.invalidate(Collection::PtBookings);
        if linked {
            self.cache.invalidate(Collection::ClassSchedule);
        }
        Ok(id)
    }

    pub async fn update_pt_booking(
        &self,
        id: BookingId,
        update: PtBookingUpdate,
    ) -> Result<(), MutationError> {
        let current = self.current_status(BookingSource::Pt, id)?;
        if !current.can_be_edited() {
            error!("PT booking {} is {} and can not be edited", id, current);
            return Err(MutationError::NotEditable(id, current));
        }
        let status = update.status;
        if let Some(status) = status {
            current.transition(status)?;
        }
        self.backend.update_pt_booking(id, update).await?;
        info!("PT booking {} updated", id);
        match status {
            Some(status) => self.committed(BookingSource::Pt, id, status),
            None => self.touched(BookingSource::Pt),
        }
        Ok(())
    }

    pub async fn cancel_pt_booking(&self, id: BookingId) -> Result<(), MutationError> {
        self.cancel_booking(BookingSource::Pt, id).await
    }
}

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("Booking not found:{0}")]
    BookingNotFound(BookingId),
    #[error("Session not found:{0}")]
    SessionNotFound(SessionId),
    #[error("Illegal transition:{0}")]
    IllegalTransition(#[from] TransitionError),
    #[error("Booking {0} is {1} and can not be edited")]
    NotEditable(BookingId, BookingStatus),
    #[error("Not a group class:{0}")]
    NotGroupClass(SessionId),
    #[error("Not an attendance mark:{0}")]
    NotAttendanceMark(BookingStatus),
    #[error("Missing rule:{0:?}")]
    Forbidden(Rule),
    #[error("Common error:{0}")]
    Common(#[from] eyre::Error),
}
