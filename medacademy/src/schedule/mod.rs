//! Academic schedules: admin-curated JSON, validated before any write.
//!
//! Schedules arrive as raw JSON pasted by an admin. The payload is checked
//! field by field before anything touches the database, so a malformed
//! document is rejected with the specific missing field and no partial write
//! ever occurs.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ScheduleError, ScheduleResult};
pub use manager::ScheduleManager;
pub use models::{AcademicSchedule, ScheduleEntry, parse_schedule};
