use thiserror::Error;

use crate::status::BookingStatus;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Illegal status transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: BookingStatus,
    pub to: BookingStatus,
}
