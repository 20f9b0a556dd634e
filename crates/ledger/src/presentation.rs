use chrono::{DateTime, Local};
use model::{
    ids::{BookingId, SessionId},
    rights::Viewer,
    session::{CalendarSession, PtOrigin, SessionKind},
    status::BookingStatus,
};
use serde::{Deserialize, Serialize};

use crate::policy::{compute_action_visibility, ActionVisibility};

/// What an action button does. The same verb targets different entities per
/// session type: editing a class slot is not editing a booking of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    EditClassSession(SessionId),
    CancelClassSession(SessionId),
    EditClassBooking(BookingId),
    CancelClassBooking(BookingId),
    EditPtBooking(BookingId),
    CancelPtBooking(BookingId),
    MarkClassAttendance {
        booking_id: BookingId,
        status: BookingStatus,
    },
    MarkPtAttendance {
        booking_id: BookingId,
        status: BookingStatus,
    },
    MarkAllAttended(SessionId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub label: &'static str,
    pub command: Command,
}

impl Command {
    pub fn button(self, label: &'static str) -> Action {
        Action {
            label,
            command: self,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub title: String,
    pub subtitle: Option<String>,
    pub meta: Vec<String>,
    pub actions: Vec<Action>,
    pub status: Option<BookingStatus>,
}

fn enrolled(attendance_count: Option<u32>, capacity: Option<u32>) -> String {
    let attended = attendance_count.unwrap_or(0);
    match capacity {
        Some(capacity) => format!("{}/{} enrolled", attended, capacity),
        None => format!("{} enrolled", attended),
    }
}

fn attendance_buttons(
    booking_id: BookingId,
    make: fn(BookingId, BookingStatus) -> Command,
) -> [Action; 2] {
    [
        make(booking_id, BookingStatus::Attended).button("Attended"),
        make(booking_id, BookingStatus::NoShow).button("No-show"),
    ]
}

fn class_attendance(booking_id: BookingId, status: BookingStatus) -> Command {
    Command::MarkClassAttendance { booking_id, status }
}

fn pt_attendance(booking_id: BookingId, status: BookingStatus) -> Command {
    Command::MarkPtAttendance { booking_id, status }
}

/// Builds the grid/list tuple for a session whose visibility is already
/// computed.
pub fn to_presentation(session: &CalendarSession, visibility: ActionVisibility) -> Presentation {
    let coach = session.coach.name.clone();
    let customer = session
        .customer_name()
        .unwrap_or_else(|| session.title.clone());
    let mut actions = Vec::new();

    let (title, subtitle, meta) = match &session.kind {
        SessionKind::CoachGroupClass {
            class_name,
            capacity,
            attendance_count,
        } => {
            let session_id = SessionId(session.id);
            if visibility.can_edit {
                actions.push(Command::EditClassSession(session_id).button("Edit"));
            }
            if visibility.can_cancel {
                actions.push(Command::CancelClassSession(session_id).button("Cancel"));
            }
            if visibility.can_mark_all_attended {
                actions.push(Command::MarkAllAttended(session_id).button("Mark all attended"));
            }
            (
                class_name.clone(),
                None,
                vec![coach, enrolled(*attendance_count, *capacity)],
            )
        }
        SessionKind::MemberGroupClass {
            booking_id,
            class_name,
            ..
        } => {
            if visibility.can_edit {
                actions.push(Command::EditClassBooking(*booking_id).button("Edit"));
            }
            if visibility.can_cancel {
                actions.push(Command::CancelClassBooking(*booking_id).button("Cancel"));
            }
            if visibility.can_mark_attendance {
                actions.extend(attendance_buttons(*booking_id, class_attendance));
            }
            (customer, Some(class_name.clone()), vec![coach])
        }
        SessionKind::CoachPt {
            origin:
                PtOrigin::Schedule {
                    session_id,
                    class_name,
                    capacity,
                    attendance_count,
                },
        } => {
            if visibility.can_edit {
                actions.push(Command::EditClassSession(*session_id).button("Edit"));
            }
            if visibility.can_cancel {
                actions.push(Command::CancelClassSession(*session_id).button("Cancel"));
            }
            (
                class_name.clone(),
                None,
                vec![coach, enrolled(*attendance_count, *capacity)],
            )
        }
        SessionKind::CoachPt {
            origin: PtOrigin::Booking { booking_id, .. },
        }
        | SessionKind::MemberPt { booking_id, .. } => {
            if visibility.can_edit {
                actions.push(Command::EditPtBooking(*booking_id).button("Edit"));
            }
            if visibility.can_cancel {
                actions.push(Command::CancelPtBooking(*booking_id).button("Cancel"));
            }
            if visibility.can_mark_attendance {
                actions.extend(attendance_buttons(*booking_id, pt_attendance));
            }
            (customer, Some(coach), vec![])
        }
    };

    Presentation {
        title,
        subtitle,
        meta,
        actions,
        status: session.status(),
    }
}

/// Policy and presentation in one step, so grid and list cannot disagree.
pub fn present(session: &CalendarSession, viewer: &Viewer, now: DateTime<Local>) -> Presentation {
    to_presentation(session, compute_action_visibility(session, viewer, now))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveTime, Utc};
    use model::{
        ids::{CoachId, CustomerId},
        session::{CoachRef, CustomerRef},
    };

    use super::*;

    fn session(kind: SessionKind) -> CalendarSession {
        let start = Utc::now() + Duration::days(2);
        CalendarSession {
            id: 9,
            start_time: start,
            end_time: start + Duration::hours(1),
            session_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            session_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            title: "ignored".to_string(),
            subtitle: None,
            coach: CoachRef {
                id: Some(CoachId(7)),
                name: "Ann Lee".to_string(),
            },
            customer: Some(CustomerRef {
                id: Some(CustomerId(1)),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
            }),
            notes: None,
            kind,
        }
    }

    fn all() -> ActionVisibility {
        ActionVisibility {
            can_edit: true,
            can_cancel: true,
            can_mark_attendance: true,
            can_mark_all_attended: true,
        }
    }

    fn commands(presentation: &Presentation) -> Vec<Command> {
        presentation.actions.iter().map(|a| a.command).collect()
    }

    #[test]
    fn test_coach_group_class() {
        let session = session(SessionKind::CoachGroupClass {
            class_name: "Yoga".to_string(),
            capacity: Some(12),
            attendance_count: Some(4),
        });
        let presentation = to_presentation(&session, all());
        assert_eq!(presentation.title, "Yoga");
        assert_eq!(presentation.subtitle, None);
        assert_eq!(presentation.meta, vec!["Ann Lee", "4/12 enrolled"]);
        assert_eq!(presentation.status, None);
        assert_eq!(
            commands(&presentation),
            vec![
                Command::EditClassSession(SessionId(9)),
                Command::CancelClassSession(SessionId(9)),
                Command::MarkAllAttended(SessionId(9)),
            ]
        );
    }

    #[test]
    fn test_member_group_class_routes_to_booking() {
        let session = session(SessionKind::MemberGroupClass {
            booking_id: BookingId(4),
            session_id: SessionId(9),
            class_name: "Yoga".to_string(),
            status: BookingStatus::Booked,
        });
        let presentation = to_presentation(&session, all());
        assert_eq!(presentation.title, "Jane Doe");
        assert_eq!(presentation.subtitle.as_deref(), Some("Yoga"));
        assert_eq!(presentation.meta, vec!["Ann Lee"]);
        assert_eq!(presentation.status, Some(BookingStatus::Booked));
        assert_eq!(
            commands(&presentation),
            vec![
                Command::EditClassBooking(BookingId(4)),
                Command::CancelClassBooking(BookingId(4)),
                Command::MarkClassAttendance {
                    booking_id: BookingId(4),
                    status: BookingStatus::Attended
                },
                Command::MarkClassAttendance {
                    booking_id: BookingId(4),
                    status: BookingStatus::NoShow
                },
            ]
        );
    }

    #[test]
    fn test_coach_pt_from_schedule() {
        let session = session(SessionKind::CoachPt {
            origin: PtOrigin::Schedule {
                session_id: SessionId(9),
                class_name: "PT slot".to_string(),
                capacity: None,
                attendance_count: Some(1),
            },
        });
        let presentation = to_presentation(&session, all());
        assert_eq!(presentation.title, "PT slot");
        assert_eq!(presentation.subtitle, None);
        assert_eq!(presentation.meta, vec!["Ann Lee", "1 enrolled"]);
        assert_eq!(
            commands(&presentation),
            vec![
                Command::EditClassSession(SessionId(9)),
                Command::CancelClassSession(SessionId(9)),
            ]
        );
    }

    #[test]
    fn test_pt_bookings_route_to_pt_handlers() {
        let coach_side = session(SessionKind::CoachPt {
            origin: PtOrigin::Booking {
                booking_id: BookingId(5),
                status: BookingStatus::Booked,
                schedule_session_id: None,
            },
        });
        let member_side = session(SessionKind::MemberPt {
            booking_id: BookingId(5),
            status: BookingStatus::Booked,
            package_name: "10 pack".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            booking_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            schedule_session_id: None,
        });
        for session in [coach_side, member_side] {
            let presentation = to_presentation(&session, all());
            assert_eq!(presentation.title, "Jane Doe");
            assert_eq!(presentation.subtitle.as_deref(), Some("Ann Lee"));
            assert!(presentation.meta.is_empty());
            assert_eq!(
                commands(&presentation)[..2],
                [
                    Command::EditPtBooking(BookingId(5)),
                    Command::CancelPtBooking(BookingId(5)),
                ]
            );
            assert!(commands(&presentation).contains(&Command::MarkPtAttendance {
                booking_id: BookingId(5),
                status: BookingStatus::NoShow,
            }));
        }
    }

    #[test]
    fn test_hidden_actions_are_not_wired() {
        let session = session(SessionKind::MemberGroupClass {
            booking_id: BookingId(4),
            session_id: SessionId(9),
            class_name: "Yoga".to_string(),
            status: BookingStatus::Attended,
        });
        let presentation = to_presentation(&session, ActionVisibility::none());
        assert!(presentation.actions.is_empty());
        assert_eq!(presentation.status, Some(BookingStatus::Attended));
    }

    #[test]
    fn test_present_uses_policy() {
        let session = session(SessionKind::CoachGroupClass {
            class_name: "Yoga".to_string(),
            capacity: None,
            attendance_count: None,
        });
        let member = Viewer::new(1, model::rights::Role::Member);
        let presentation = present(&session, &member, Local::now());
        assert_eq!(
            commands(&presentation),
            vec![
                Command::EditClassSession(SessionId(9)),
                Command::CancelClassSession(SessionId(9)),
            ]
        );
    }
}
