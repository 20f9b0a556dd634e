//! Which actions a viewer may take on a calendar session. Every view asks
//! here; none re-derives the rules.

use chrono::{DateTime, Local, NaiveDate};
use model::{
    rights::{Rule, Viewer},
    session::{CalendarSession, PtOrigin, SessionKind},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionVisibility {
    pub can_edit: bool,
    pub can_cancel: bool,
    pub can_mark_attendance: bool,
    pub can_mark_all_attended: bool,
}

impl ActionVisibility {
    pub fn none() -> Self {
        ActionVisibility::default()
    }
}

/// Date-only comparison in local time: a session today counts as past.
pub fn is_today_or_past(session_date: NaiveDate, now: DateTime<Local>) -> bool {
    session_date <= now.date_naive()
}

pub fn compute_action_visibility(
    session: &CalendarSession,
    viewer: &Viewer,
    now: DateTime<Local>,
) -> ActionVisibility {
    let attendance = viewer.has_rule(Rule::MarkAttendance);
    let schedule_locked = is_today_or_past(session.session_date, now);

    match &session.kind {
        SessionKind::MemberGroupClass { status, .. } | SessionKind::MemberPt { status, .. } => {
            ActionVisibility {
                can_edit: status.can_be_edited(),
                can_cancel: status.can_be_edited() && status.can_be_canceled(),
                can_mark_attendance: attendance && status.can_mark_attendance(),
                can_mark_all_attended: false,
            }
        }
        // The literal gate is "starts in the future", even though marking a
        // class that has not happened yet looks backwards. Kept as is.
        SessionKind::CoachGroupClass { .. } => ActionVisibility {
            can_edit: !schedule_locked,
            can_cancel: !schedule_locked,
            can_mark_attendance: attendance,
            can_mark_all_attended: attendance && session.start_time > now,
        },
        SessionKind::CoachPt { origin } => match origin {
            PtOrigin::Schedule { .. } => ActionVisibility {
                can_edit: !schedule_locked,
                can_cancel: !schedule_locked,
                can_mark_attendance: false,
                can_mark_all_attended: false,
            },
            PtOrigin::Booking { status, .. } => ActionVisibility {
                can_edit: !schedule_locked,
                can_cancel: !schedule_locked && status.can_be_canceled(),
                can_mark_attendance: attendance && status.can_mark_attendance(),
                can_mark_all_attended: false,
            },
        },
    }
}
