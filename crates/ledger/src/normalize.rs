//! Raw collaborator records to [`CalendarSession`].
//!
//! Every normalizer returns `None` when the record has no start time. Such
//! records are dropped silently; missing coaches, customers and packages only
//! degrade the display strings to [`UNKNOWN`].

use log::debug;
use model::{
    raw::{
        ClassType, RawCoach, RawCoachSession, RawCustomer, RawMemberBooking, RawPackage,
        RawPtBooking, DEFAULT_DURATION_MIN,
    },
    session::{CalendarSession, CoachRef, CustomerRef, PtOrigin, SessionKind, UNKNOWN},
    slot::Slot,
    status::BookingStatus,
};

pub fn coach_ref(raw: Option<&RawCoach>) -> CoachRef {
    let Some(raw) = raw else {
        return CoachRef::unknown();
    };
    let name = join_name(raw.first_name.as_deref(), raw.last_name.as_deref());
    CoachRef {
        id: raw.id,
        name: name.unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

pub fn customer_ref(raw: Option<&RawCustomer>) -> Option<CustomerRef> {
    let raw = raw?;
    Some(CustomerRef {
        id: raw.id,
        first_name: raw.first_name.clone().unwrap_or_default(),
        last_name: raw.last_name.clone().unwrap_or_default(),
    })
}

fn join_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn package_name(raw: Option<&RawPackage>) -> String {
    raw.and_then(|p| p.name.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn class_name(raw: &RawCoachSession) -> String {
    raw.schedule
        .as_ref()
        .and_then(|s| s.class_name.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn session_slot(raw: &RawCoachSession) -> Option<Slot> {
    let start = raw.start_time?;
    // Whole minutes only; an end under a minute past start falls back.
    let duration = raw
        .end_time
        .and_then(|end| u32::try_from((end - start).num_minutes()).ok())
        .filter(|minutes| *minutes > 0)
        .or(raw.duration)
        .unwrap_or(DEFAULT_DURATION_MIN);
    Some(Slot::new(start, duration))
}

/// A class-schedule slot as the coach sees it. Slots of personal-training
/// classes become schedule-backed coach PT entries.
pub fn normalize_coach_session(raw: &RawCoachSession) -> Option<CalendarSession> {
    let Some(slot) = session_slot(raw) else {
        debug!("Dropping class session {} without start time", raw.id);
        return None;
    };
    let schedule = raw.schedule.as_ref();
    let class_name = class_name(raw);
    let capacity = schedule.and_then(|s| s.capacity);

    let kind = match raw.class_type() {
        ClassType::Group => SessionKind::CoachGroupClass {
            class_name: class_name.clone(),
            capacity,
            attendance_count: raw.attendance_count,
        },
        ClassType::Personal => SessionKind::CoachPt {
            origin: PtOrigin::Schedule {
                session_id: raw.id,
                class_name: class_name.clone(),
                capacity,
                attendance_count: raw.attendance_count,
            },
        },
    };

    Some(CalendarSession {
        id: raw.id.0,
        start_time: slot.start_utc(),
        end_time: slot.end_utc(),
        session_date: slot.local_date(),
        session_time: slot.local_time(),
        title: class_name,
        subtitle: None,
        coach: coach_ref(schedule.and_then(|s| s.coach.as_ref())),
        customer: None,
        notes: raw.notes.clone(),
        kind,
    })
}

/// A member's class booking. Cancelled bookings never reach the calendar.
///
/// Time, class and coach come from the booked slot: the joined one if the
/// fetch provided it, else `parent`.
pub fn normalize_member_booking(
    raw: &RawMemberBooking,
    parent: Option<&RawCoachSession>,
) -> Option<CalendarSession> {
    if raw.status == BookingStatus::Cancelled {
        return None;
    }
    let Some(session) = raw.session.as_ref().or(parent) else {
        debug!(
            "Dropping booking {}: session {} is not loaded",
            raw.id, raw.session_id
        );
        return None;
    };
    let Some(slot) = session_slot(session) else {
        debug!("Dropping booking {} without start time", raw.id);
        return None;
    };

    let class_name = class_name(session);
    let customer = customer_ref(raw.customer.as_ref()).or_else(|| {
        raw.customer_id.map(|id| CustomerRef {
            id: Some(id),
            first_name: String::new(),
            last_name: String::new(),
        })
    });
    let title = customer
        .as_ref()
        .map(CustomerRef::full_name)
        .unwrap_or_else(|| UNKNOWN.to_string());

    Some(CalendarSession {
        id: raw.id.0,
        start_time: slot.start_utc(),
        end_time: slot.end_utc(),
        session_date: slot.local_date(),
        session_time: slot.local_time(),
        title,
        subtitle: Some(class_name.clone()),
        coach: coach_ref(session.schedule.as_ref().and_then(|s| s.coach.as_ref())),
        customer,
        notes: raw.notes.clone(),
        kind: SessionKind::MemberGroupClass {
            booking_id: raw.id,
            session_id: raw.session_id,
            class_name,
            status: raw.status,
        },
    })
}

struct PtFields {
    slot: Slot,
    coach: CoachRef,
    customer: Option<CustomerRef>,
    customer_name: String,
}

fn pt_fields(raw: &RawPtBooking) -> Option<PtFields> {
    if raw.status == BookingStatus::Cancelled {
        return None;
    }
    let Some(slot) = raw.slot() else {
        debug!("Dropping pt booking {} without start time", raw.id);
        return None;
    };
    let customer = customer_ref(raw.customer.as_ref());
    let customer_name = customer
        .as_ref()
        .map(CustomerRef::full_name)
        .unwrap_or_else(|| UNKNOWN.to_string());
    Some(PtFields {
        slot,
        coach: coach_ref(raw.coach.as_ref()),
        customer,
        customer_name,
    })
}

/// A PT booking from the coach's side.
pub fn normalize_coach_pt(raw: &RawPtBooking) -> Option<CalendarSession> {
    let PtFields {
        slot,
        coach,
        customer,
        customer_name,
    } = pt_fields(raw)?;

    Some(CalendarSession {
        id: raw.id.0,
        start_time: slot.start_utc(),
        end_time: slot.end_utc(),
        session_date: slot.local_date(),
        session_time: slot.local_time(),
        title: customer_name,
        subtitle: Some(coach.name.clone()),
        coach,
        customer,
        notes: raw.notes.clone(),
        kind: SessionKind::CoachPt {
            origin: PtOrigin::Booking {
                booking_id: raw.id,
                status: raw.status,
                schedule_session_id: raw.class_schedule_session_id,
            },
        },
    })
}

/// A PT booking from the member's side. Keeps the wall-clock date and time
/// next to the derived instants so the booking form can round-trip them.
pub fn normalize_member_pt(raw: &RawPtBooking) -> Option<CalendarSession> {
    let PtFields {
        slot,
        coach,
        customer,
        customer_name,
    } = pt_fields(raw)?;
    let booking_date = raw.booking_date.unwrap_or_else(|| slot.local_date());
    let booking_time = raw.booking_time.unwrap_or_else(|| slot.local_time());

    Some(CalendarSession {
        id: raw.id.0,
        start_time: slot.start_utc(),
        end_time: slot.end_utc(),
        session_date: booking_date,
        session_time: booking_time,
        title: customer_name,
        subtitle: Some(coach.name.clone()),
        coach,
        customer,
        notes: raw.notes.clone(),
        kind: SessionKind::MemberPt {
            booking_id: raw.id,
            status: raw.status,
            package_name: package_name(raw.package.as_ref()),
            booking_date,
            booking_time,
            schedule_session_id: raw.class_schedule_session_id,
        },
    })
}
