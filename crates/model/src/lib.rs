pub mod booking;
pub mod errors;
pub mod filter;
pub mod ids;
pub mod raw;
pub mod rights;
pub mod session;
pub mod slot;
pub mod status;
