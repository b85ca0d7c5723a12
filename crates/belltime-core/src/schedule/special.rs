//! Date-pinned overrides of the weekly pattern.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{validate_lessons, Lesson};
use crate::error::ValidationError;

/// A full override of the regular timetable for one date.
///
/// Carries its own lesson list; timing parameters (first lesson start,
/// durations) come from the referenced base schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialSchedule {
    #[serde(default)]
    pub id: u64,
    /// The date this override applies to. At most one special schedule
    /// may exist per date; the catalog enforces this.
    pub special_date: NaiveDate,
    pub base_schedule_id: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl SpecialSchedule {
    pub fn new(id: u64, special_date: NaiveDate, base_schedule_id: u64) -> Self {
        Self {
            id,
            special_date,
            base_schedule_id,
            description: String::new(),
            lessons: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_lessons(&self.lessons)
    }
}

/// A holiday entry for one date.
///
/// Presence with `working_day == false` means no bell timeline exists
/// for that date, regardless of any regular or special schedule. With
/// `working_day == true` the holiday is informational only and does not
/// suppress school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidaySchedule {
    #[serde(default)]
    pub id: u64,
    pub holiday_date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub working_day: bool,
}

impl HolidaySchedule {
    pub fn new(id: u64, holiday_date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            id,
            holiday_date,
            description: description.into(),
            working_day: false,
        }
    }
}
