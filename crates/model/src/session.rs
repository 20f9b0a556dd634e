use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{
    ids::{BookingId, CoachId, CustomerId, DayId, SessionId},
    status::BookingStatus,
};

pub const UNKNOWN: &str = "Unknown";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum SessionType {
    CoachGroupClass,
    MemberGroupClass,
    CoachPt,
    MemberPt,
}

impl SessionType {
    pub fn is_group_class(&self) -> bool {
        matches!(
            self,
            SessionType::CoachGroupClass | SessionType::MemberGroupClass
        )
    }

    pub fn is_pt(&self) -> bool {
        matches!(self, SessionType::CoachPt | SessionType::MemberPt)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionType::CoachGroupClass => "Group class",
            SessionType::MemberGroupClass => "Class booking",
            SessionType::CoachPt => "Coach PT",
            SessionType::MemberPt => "Member PT",
        }
    }
}

/// Source-local ids collide across sources; the pair is unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub session_type: SessionType,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachRef {
    pub id: Option<CoachId>,
    pub name: String,
}

impl CoachRef {
    pub fn unknown() -> Self {
        CoachRef {
            id: None,
            name: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: Option<CustomerId>,
    pub first_name: String,
    pub last_name: String,
}

impl CustomerRef {
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (true, true) => UNKNOWN.to_string(),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (false, false) => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// Where a coach-side PT entry comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PtOrigin {
    /// A personal-training slot on the class schedule.
    Schedule {
        session_id: SessionId,
        class_name: String,
        capacity: Option<u32>,
        attendance_count: Option<u32>,
    },
    /// A PT booking seen from the coach's side.
    Booking {
        booking_id: BookingId,
        status: BookingStatus,
        schedule_session_id: Option<SessionId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    CoachGroupClass {
        class_name: String,
        capacity: Option<u32>,
        attendance_count: Option<u32>,
    },
    MemberGroupClass {
        booking_id: BookingId,
        session_id: SessionId,
        class_name: String,
        status: BookingStatus,
    },
    CoachPt {
        origin: PtOrigin,
    },
    MemberPt {
        booking_id: BookingId,
        status: BookingStatus,
        package_name: String,
        booking_date: NaiveDate,
        booking_time: NaiveTime,
        schedule_session_id: Option<SessionId>,
    },
}

/// Unified calendar entry. A projection of collaborator records: rebuilt on
/// every refresh and never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSession {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub session_date: NaiveDate,
    pub session_time: NaiveTime,
    pub title: String,
    pub subtitle: Option<String>,
    pub coach: CoachRef,
    pub customer: Option<CustomerRef>,
    pub notes: Option<String>,
    pub kind: SessionKind,
}

impl CalendarSession {
    pub fn session_type(&self) -> SessionType {
        match self.kind {
            SessionKind::CoachGroupClass { .. } => SessionType::CoachGroupClass,
            SessionKind::MemberGroupClass { .. } => SessionType::MemberGroupClass,
            SessionKind::CoachPt { .. } => SessionType::CoachPt,
            SessionKind::MemberPt { .. } => SessionType::MemberPt,
        }
    }

    pub fn key(&self) -> SessionKey {
        SessionKey {
            session_type: self.session_type(),
            id: self.id,
        }
    }

    pub fn day_id(&self) -> DayId {
        DayId::from_date(self.session_date)
    }

    pub fn start_at(&self) -> DateTime<Local> {
        self.start_time.with_timezone(&Local)
    }

    pub fn status(&self) -> Option<BookingStatus> {
        match &self.kind {
            SessionKind::CoachGroupClass { .. } => None,
            SessionKind::MemberGroupClass { status, .. } | SessionKind::MemberPt { status, .. } => {
                Some(*status)
            }
            SessionKind::CoachPt { origin } => match origin {
                PtOrigin::Schedule { .. } => None,
                PtOrigin::Booking { status, .. } => Some(*status),
            },
        }
    }

    /// Class name for group classes and schedule-backed PT slots.
    pub fn class_name(&self) -> Option<&str> {
        match &self.kind {
            SessionKind::CoachGroupClass { class_name, .. }
            | SessionKind::MemberGroupClass { class_name, .. } => Some(class_name),
            SessionKind::CoachPt {
                origin: PtOrigin::Schedule { class_name, .. },
            } => Some(class_name),
            SessionKind::CoachPt {
                origin: PtOrigin::Booking { .. },
            }
            | SessionKind::MemberPt { .. } => None,
        }
    }

    pub fn customer_name(&self) -> Option<String> {
        self.customer.as_ref().map(CustomerRef::full_name)
    }
}
