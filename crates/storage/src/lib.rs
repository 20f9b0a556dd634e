pub mod backend;
pub mod memory;

pub use backend::{ClassSessionPage, Relations, ScheduleBackend};
pub use memory::{Fixture, MemoryStore};
