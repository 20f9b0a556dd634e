use std::collections::HashMap;

use chrono::NaiveDate;
use model::{
    filter::FilterState,
    ids::{CoachId, SessionId},
    raw::{RawCoachSession, RawMemberBooking, RawPtBooking},
    rights::Viewer,
    session::CalendarSession,
};

use crate::normalize::{
    normalize_coach_pt, normalize_coach_session, normalize_member_booking, normalize_member_pt,
};

/// Sessions shown inline in one calendar-grid cell.
pub const INLINE_LIMIT: usize = 2;

/// Raw records of one refresh, as returned by the collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sources {
    pub class_sessions: Vec<RawCoachSession>,
    pub class_bookings: Vec<RawMemberBooking>,
    pub pt_bookings: Vec<RawPtBooking>,
}

impl Sources {
    /// Every coach referenced by any source, for building coach filters.
    pub fn coaches(&self) -> Vec<CoachId> {
        let mut coaches: Vec<CoachId> = self
            .class_sessions
            .iter()
            .filter_map(RawCoachSession::coach_id)
            .chain(self.pt_bookings.iter().filter_map(RawPtBooking::coach_id))
            .collect();
        coaches.sort();
        coaches.dedup();
        coaches
    }
}

/// All four normalizations, unfiltered and unsorted.
pub fn normalize_all(sources: &Sources) -> Vec<CalendarSession> {
    let parents: HashMap<SessionId, &RawCoachSession> = sources
        .class_sessions
        .iter()
        .map(|session| (session.id, session))
        .collect();

    let coach_classes = sources
        .class_sessions
        .iter()
        .filter_map(normalize_coach_session);
    let member_classes = sources.class_bookings.iter().filter_map(|booking| {
        normalize_member_booking(booking, parents.get(&booking.session_id).copied())
    });
    let coach_pt = sources.pt_bookings.iter().filter_map(normalize_coach_pt);
    let member_pt = sources.pt_bookings.iter().filter_map(normalize_member_pt);

    coach_classes
        .chain(member_classes)
        .chain(coach_pt)
        .chain(member_pt)
        .collect()
}

/// Case-insensitive substring match. Group classes match on class name, PT
/// entries on the customer's full name (class name for schedule-backed PT
/// slots, which have no customer).
pub fn matches_search(session: &CalendarSession, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let haystack = if session.session_type().is_group_class() {
        session.class_name().map(str::to_string)
    } else {
        session
            .customer_name()
            .or_else(|| session.class_name().map(str::to_string))
    };
    haystack
        .map(|text| text.to_lowercase().contains(&query))
        .unwrap_or(false)
}

fn is_visible(session: &CalendarSession, filters: &FilterState, viewer: &Viewer) -> bool {
    if let Some(scope) = viewer.scoped_coach() {
        if session.coach.id != Some(scope) {
            return false;
        }
    }
    if !filters.is_type_enabled(session.session_type()) {
        return false;
    }
    if viewer.scoped_coach().is_none() {
        if let Some(coach) = session.coach.id {
            if !filters.is_coach_enabled(coach) {
                return false;
            }
        }
    }
    matches_search(session, filters.search_query())
}

/// Normalizes, scopes, filters and sorts the sources. Pure: identical inputs
/// give identical ordered output.
pub fn aggregate(sources: &Sources, filters: &FilterState, viewer: &Viewer) -> Vec<CalendarSession> {
    let mut sessions: Vec<CalendarSession> = normalize_all(sources)
        .into_iter()
        .filter(|session| is_visible(session, filters, viewer))
        .collect();
    sessions.sort_by_key(|session| (session.start_time, session.key()));
    sessions
}

pub fn sessions_on(sessions: &[CalendarSession], date: NaiveDate) -> Vec<&CalendarSession> {
    sessions
        .iter()
        .filter(|session| session.session_date == date)
        .collect()
}

/// One calendar-grid cell. The cap is a display contract only: `total`
/// always counts every match.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    pub inline: Vec<&'a CalendarSession>,
    pub total: usize,
}

impl DayCell<'_> {
    pub fn overflow(&self) -> usize {
        self.total.saturating_sub(self.inline.len())
    }

    pub fn overflow_label(&self) -> Option<String> {
        match self.overflow() {
            0 => None,
            n => Some(format!("+{} more", n)),
        }
    }
}

pub fn day_cell(sessions: &[CalendarSession], date: NaiveDate) -> DayCell<'_> {
    let on_day = sessions_on(sessions, date);
    let total = on_day.len();
    DayCell {
        date,
        inline: on_day.into_iter().take(INLINE_LIMIT).collect(),
        total,
    }
}
