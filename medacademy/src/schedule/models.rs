//! Schedule data models and payload validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{ScheduleError, ScheduleResult};

/// Top-level fields every schedule document must carry
const REQUIRED_FIELDS: [&str; 5] = ["semester", "academic_year", "level", "group", "schedule"];

/// Fields every schedule entry must carry
const REQUIRED_ENTRY_FIELDS: [&str; 6] =
    ["day", "time", "course_name", "course_code", "location", "staff"];

/// Academic schedule document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicSchedule {
    pub semester: String,
    pub academic_year: String,
    pub level: String,
    pub group: String,
    pub schedule: Vec<ScheduleEntry>,
}

/// One timetable slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub day: String,
    pub time: String,
    pub course_name: String,
    pub course_code: String,
    pub location: String,
    pub staff: Vec<String>,
}

/// Validate and parse an admin-supplied schedule payload.
///
/// Required fields are checked explicitly before deserialization so the
/// rejection names the exact missing field rather than a serde path.
///
/// # Errors
///
/// * `ScheduleError::MissingField` - Top-level field absent
/// * `ScheduleError::MissingEntryField` - Entry field absent
/// * `ScheduleError::Malformed` - Fields present but structurally invalid
pub fn parse_schedule(value: &Value) -> ScheduleResult<AcademicSchedule> {
    for field in REQUIRED_FIELDS {
        if value.get(field).is_none() {
            return Err(ScheduleError::MissingField(field));
        }
    }

    let entries = value["schedule"]
        .as_array()
        .ok_or_else(|| ScheduleError::Malformed("\"schedule\" must be an array".to_string()))?;

    for (index, entry) in entries.iter().enumerate() {
        for field in REQUIRED_ENTRY_FIELDS {
            if entry.get(field).is_none() {
                return Err(ScheduleError::MissingEntryField { index, field });
            }
        }
    }

    serde_json::from_value(value.clone()).map_err(|e| ScheduleError::Malformed(e.to_string()))
}
