use async_trait::async_trait;
use eyre::Result;
use model::{
    booking::{PtBookingPayload, PtBookingUpdate, ScheduleUpdate},
    ids::{BookingId, CoachId, DayRange, SessionId},
    raw::{RawCoachSession, RawMemberBooking, RawPtBooking},
    status::BookingStatus,
};
use serde::{Deserialize, Serialize};

/// Relations the class-schedule fetch joins onto each session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relations {
    pub schedule: bool,
    pub coach: bool,
}

impl Relations {
    pub fn all() -> Self {
        Relations {
            schedule: true,
            coach: true,
        }
    }
}

impl Default for Relations {
    fn default() -> Self {
        Relations::all()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassSessionPage {
    pub data: Vec<RawCoachSession>,
}

/// Persistence collaborator of the scheduling engine. Records are opaque to
/// it: the engine never writes a `CalendarSession` back, only the mutations
/// below.
#[async_trait]
pub trait ScheduleBackend: Send + Sync {
    async fn fetch_class_sessions(
        &self,
        range: DayRange,
        coach: Option<CoachId>,
        relations: Relations,
    ) -> Result<ClassSessionPage>;

    async fn fetch_class_bookings(&self, range: DayRange) -> Result<Vec<RawMemberBooking>>;

    /// `coach` selects the coach-scoped variant used for trainers.
    async fn fetch_pt_bookings(
        &self,
        range: DayRange,
        coach: Option<CoachId>,
    ) -> Result<Vec<RawPtBooking>>;

    async fn update_attendance_status(&self, id: BookingId, status: BookingStatus) -> Result<()>;

    /// Moves every `BOOKED` booking of the session to `ATTENDED`. Returns the
    /// number of bookings changed.
    async fn mark_all_attended(&self, session: SessionId) -> Result<u32>;

    async fn create_pt_booking(&self, data: PtBookingPayload) -> Result<BookingId>;

    async fn update_pt_booking(&self, id: BookingId, data: PtBookingUpdate) -> Result<()>;

    async fn cancel_pt_booking(&self, id: BookingId) -> Result<()>;

    async fn update_class_schedule_session(
        &self,
        id: SessionId,
        update: ScheduleUpdate,
    ) -> Result<()>;
}
