pub mod bookings;
pub mod cache;
