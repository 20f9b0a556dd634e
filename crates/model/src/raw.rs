//! Record shapes owned by the data-fetch collaborator. Every linked entity is
//! optional: the collaborator may omit a relation or return a dangling one.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ids::{BookingId, CoachId, CustomerId, PackageId, SessionId},
    slot::Slot,
    status::BookingStatus,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCoach {
    #[serde(default)]
    pub id: Option<CoachId>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCustomer {
    #[serde(default)]
    pub id: Option<CustomerId>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPackage {
    #[serde(default)]
    pub id: Option<PackageId>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassType {
    #[default]
    Group,
    Personal,
}

/// The recurring class definition a schedule slot belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawClassSchedule {
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub class_type: ClassType,
    #[serde(default)]
    pub coach: Option<RawCoach>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// One dated slot of the class schedule, as seen by the coach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCoachSession {
    pub id: SessionId,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Minutes.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub schedule: Option<RawClassSchedule>,
    #[serde(default)]
    pub attendance_count: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RawCoachSession {
    pub fn coach_id(&self) -> Option<CoachId> {
        self.schedule.as_ref()?.coach.as_ref()?.id
    }

    /// A slot without a schedule counts as a group class.
    pub fn class_type(&self) -> ClassType {
        self.schedule
            .as_ref()
            .map(|s| s.class_type)
            .unwrap_or_default()
    }
}

/// A member's booking of a class schedule slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMemberBooking {
    pub id: BookingId,
    pub session_id: SessionId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub customer: Option<RawCustomer>,
    pub status: BookingStatus,
    /// The booked slot, when the fetch joined it.
    #[serde(default)]
    pub session: Option<RawCoachSession>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A personal-training booking. Date and time are local wall-clock values;
/// `start_time` is the derived instant when the collaborator provides one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPtBooking {
    pub id: BookingId,
    #[serde(default)]
    pub coach: Option<RawCoach>,
    #[serde(default)]
    pub customer: Option<RawCustomer>,
    #[serde(default)]
    pub package: Option<RawPackage>,
    #[serde(default)]
    pub booking_date: Option<NaiveDate>,
    #[serde(default)]
    pub booking_time: Option<NaiveTime>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    pub status: BookingStatus,
    #[serde(default)]
    pub class_schedule_session_id: Option<SessionId>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub const DEFAULT_DURATION_MIN: u32 = 60;

impl RawPtBooking {
    pub fn coach_id(&self) -> Option<CoachId> {
        self.coach.as_ref()?.id
    }

    /// Wall-clock date/time wins over the ISO instant: it is what the booking
    /// form edits.
    pub fn slot(&self) -> Option<Slot> {
        let duration = self.duration_minutes.unwrap_or(DEFAULT_DURATION_MIN);
        match (self.booking_date, self.booking_time, self.start_time) {
            (Some(date), Some(time), _) => Slot::from_local(date, time, duration),
            (_, _, Some(start_time)) => Some(Slot::new(start_time, duration)),
            _ => None,
        }
    }
}
