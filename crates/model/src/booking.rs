use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ids::{CoachId, CustomerId, PackageId, SessionId},
    slot::Slot,
    status::BookingStatus,
};

/// Time fields of a PT booking. The wall-clock pair and the ISO instants are
/// always written together so they cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtSlot {
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl From<Slot> for PtSlot {
    fn from(slot: Slot) -> Self {
        PtSlot {
            booking_date: slot.local_date(),
            booking_time: slot.local_time(),
            start_time: slot.start_utc(),
            end_time: slot.end_utc(),
            duration_minutes: slot.duration_min(),
        }
    }
}

impl PtSlot {
    pub fn at(start_at: DateTime<Local>, duration_minutes: u32) -> Self {
        PtSlot::from(Slot::new(start_at.with_timezone(&Utc), duration_minutes))
    }
}

/// What the booking form submits for a new PT booking.
#[derive(Debug, Clone, PartialEq)]
pub struct PtBookingDraft {
    pub coach_id: CoachId,
    pub customer_id: CustomerId,
    pub package_id: Option<PackageId>,
    pub start_at: DateTime<Local>,
    pub duration_minutes: u32,
    pub class_schedule_session_id: Option<SessionId>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtBookingPayload {
    pub coach_id: CoachId,
    pub customer_id: CustomerId,
    #[serde(default)]
    pub package_id: Option<PackageId>,
    #[serde(flatten)]
    pub slot: PtSlot,
    pub status: BookingStatus,
    #[serde(default)]
    pub class_schedule_session_id: Option<SessionId>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<PtBookingDraft> for PtBookingPayload {
    fn from(draft: PtBookingDraft) -> Self {
        PtBookingPayload {
            coach_id: draft.coach_id,
            customer_id: draft.customer_id,
            package_id: draft.package_id,
            slot: PtSlot::at(draft.start_at, draft.duration_minutes),
            status: BookingStatus::Booked,
            class_schedule_session_id: draft.class_schedule_session_id,
            notes: draft.notes,
        }
    }
}

/// Partial update of a PT booking; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtBookingUpdate {
    #[serde(default)]
    pub coach_id: Option<CoachId>,
    #[serde(default)]
    pub slot: Option<PtSlot>,
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PtBookingUpdate {
    pub fn status(status: BookingStatus) -> Self {
        PtBookingUpdate {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn reschedule(start_at: DateTime<Local>, duration_minutes: u32) -> Self {
        PtBookingUpdate {
            slot: Some(PtSlot::at(start_at, duration_minutes)),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdate {
    pub start_time: DateTime<Utc>,
    /// Minutes.
    pub duration: u32,
}
