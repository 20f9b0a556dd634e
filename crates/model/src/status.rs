use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::errors::TransitionError;

/// Booking/attendance status as the collaborators send it: upper-case and
/// case-sensitive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Booked,
    Attended,
    NoShow,
    Cancelled,
}

impl BookingStatus {
    /// `Booked` is the only state with outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Booked)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(self, BookingStatus::Booked) && next.is_terminal()
    }

    pub fn transition(self, next: BookingStatus) -> Result<BookingStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }

    pub fn can_be_canceled(&self) -> bool {
        matches!(self, BookingStatus::Booked)
    }

    pub fn can_be_edited(&self) -> bool {
        !matches!(self, BookingStatus::Attended | BookingStatus::NoShow)
    }

    pub fn can_mark_attendance(&self) -> bool {
        matches!(self, BookingStatus::Booked)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "Booked",
            BookingStatus::Attended => "Attended",
            BookingStatus::NoShow => "No-show",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn test_only_booked_is_open() {
        for status in BookingStatus::iter() {
            assert_eq!(status.is_terminal(), status != BookingStatus::Booked);
        }
    }

    #[test]
    fn test_terminal_states_have_no_exit() {
        for from in BookingStatus::iter().filter(|s| s.is_terminal()) {
            for to in BookingStatus::iter() {
                let err = from.transition(to).unwrap_err();
                assert_eq!(err.from, from);
                assert_eq!(err.to, to);
            }
        }
    }

    #[test]
    fn test_booked_transitions() {
        assert_eq!(
            BookingStatus::Booked.transition(BookingStatus::Attended),
            Ok(BookingStatus::Attended)
        );
        assert_eq!(
            BookingStatus::Booked.transition(BookingStatus::NoShow),
            Ok(BookingStatus::NoShow)
        );
        assert_eq!(
            BookingStatus::Booked.transition(BookingStatus::Cancelled),
            Ok(BookingStatus::Cancelled)
        );
        assert!(BookingStatus::Booked
            .transition(BookingStatus::Booked)
            .is_err());
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::NoShow).unwrap(),
            "\"NO_SHOW\""
        );
        assert_eq!(
            serde_json::from_str::<BookingStatus>("\"CANCELLED\"").unwrap(),
            BookingStatus::Cancelled
        );
        assert!(serde_json::from_str::<BookingStatus>("\"booked\"").is_err());
        assert_eq!(
            BookingStatus::from_str("ATTENDED").unwrap(),
            BookingStatus::Attended
        );
        assert_eq!(BookingStatus::NoShow.to_string(), "NO_SHOW");
    }

    #[test]
    fn test_edit_and_cancel_gates() {
        assert!(BookingStatus::Booked.can_be_edited());
        assert!(!BookingStatus::Attended.can_be_edited());
        assert!(!BookingStatus::NoShow.can_be_edited());
        assert!(BookingStatus::Booked.can_be_canceled());
        assert!(!BookingStatus::Attended.can_be_canceled());
    }
}
