//! Domain model for the school timetable.
//!
//! A [`Schedule`] is a weekly bell pattern: a day of week, the first
//! lesson's start time, shared lesson/break durations, and the owned
//! [`Lesson`] and [`Break`] children. [`SpecialSchedule`] and
//! [`HolidaySchedule`] pin date-specific overrides on top of the weekly
//! pattern; precedence between them is the resolver's job, not the
//! entities'.
//!
//! Durations are stored as whole minutes and converted to
//! [`chrono::Duration`] in exactly one place ([`minutes`]).

mod lesson;
mod special;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub use lesson::{Break, Lesson};
pub use special::{HolidaySchedule, SpecialSchedule};

/// Bounds on the schedule-level lesson duration, in minutes.
pub const LESSON_DURATION_MIN: u32 = 15;
pub const LESSON_DURATION_MAX: u32 = 90;

/// Bounds on the schedule-level break duration, in minutes.
pub const BREAK_DURATION_MIN: u32 = 5;
pub const BREAK_DURATION_MAX: u32 = 30;

/// The single minutes-to-`Duration` conversion point.
pub(crate) fn minutes(min: u32) -> Duration {
    Duration::minutes(i64::from(min))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    #[default]
    Regular,
    Special,
}

/// A weekly bell schedule.
///
/// Owns its lessons and breaks exclusively; deleting a schedule deletes
/// them with it. Lesson start times are never stored -- they are derived
/// from `first_lesson_start` and the configured durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub id: u64,
    pub day_of_week: Weekday,
    #[serde(default)]
    pub schedule_type: ScheduleType,
    /// Duration of a lesson in minutes. Applies to every lesson that
    /// does not carry its own override.
    #[serde(default = "default_lesson_duration")]
    pub lesson_duration_min: u32,
    /// Duration of a break in minutes.
    #[serde(default = "default_break_duration")]
    pub break_duration_min: u32,
    /// Start time of the first lesson.
    #[serde(default = "default_first_lesson_start")]
    pub first_lesson_start: NaiveTime,
    #[serde(default = "default_true")]
    pub active: bool,
    /// When set, pins this schedule to one calendar date, overriding
    /// day-of-week matching for that date.
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub breaks: Vec<Break>,
    /// Last administrative write. The resolver uses this as the
    /// deterministic tie-break when duplicate active schedules exist
    /// for the same day of week.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_lesson_duration() -> u32 {
    45
}
fn default_break_duration() -> u32 {
    10
}
fn default_first_lesson_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap()
}
fn default_true() -> bool {
    true
}

impl Schedule {
    /// Create a regular weekly schedule with default timing.
    pub fn new(id: u64, day_of_week: Weekday) -> Self {
        Self {
            id,
            day_of_week,
            schedule_type: ScheduleType::Regular,
            lesson_duration_min: default_lesson_duration(),
            break_duration_min: default_break_duration(),
            first_lesson_start: default_first_lesson_start(),
            active: true,
            effective_date: None,
            lessons: Vec::new(),
            breaks: Vec::new(),
            updated_at: None,
        }
    }

    /// Check duration bounds and well-formed children.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lesson_duration_min < LESSON_DURATION_MIN
            || self.lesson_duration_min > LESSON_DURATION_MAX
        {
            return Err(ValidationError::LessonDurationOutOfBounds {
                actual: self.lesson_duration_min,
                min: LESSON_DURATION_MIN,
                max: LESSON_DURATION_MAX,
            });
        }
        if self.break_duration_min < BREAK_DURATION_MIN
            || self.break_duration_min > BREAK_DURATION_MAX
        {
            return Err(ValidationError::BreakDurationOutOfBounds {
                actual: self.break_duration_min,
                min: BREAK_DURATION_MIN,
                max: BREAK_DURATION_MAX,
            });
        }
        validate_lessons(&self.lessons)?;
        for brk in &self.breaks {
            brk.validate()?;
        }
        Ok(())
    }

    /// Effective duration of one lesson, honoring a per-lesson override.
    pub fn lesson_duration_for(&self, lesson: &Lesson) -> u32 {
        lesson.duration_min.unwrap_or(self.lesson_duration_min)
    }

    /// Derived start time of the lesson with the given order number
    /// under the simplified single-duration model:
    /// `first_lesson_start + (order_number - 1) * lesson_duration`.
    ///
    /// The timeline projector computes interleaved starts (breaks shift
    /// later lessons); this is the display-level shortcut the two must
    /// agree on when no breaks exist.
    pub fn lesson_start(&self, order_number: u32) -> NaiveTime {
        let before = order_number.saturating_sub(1) * self.lesson_duration_min;
        self.first_lesson_start + minutes(before)
    }

    /// Lessons sorted by order number ascending.
    pub fn lessons_in_order(&self) -> Vec<&Lesson> {
        let mut out: Vec<&Lesson> = self.lessons.iter().collect();
        out.sort_by_key(|l| l.order_number);
        out
    }
}

/// Shared lesson-list validation, used by both [`Schedule`] and
/// [`SpecialSchedule`].
pub(crate) fn validate_lessons(lessons: &[Lesson]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for lesson in lessons {
        lesson.validate()?;
        if !seen.insert(lesson.order_number) {
            return Err(ValidationError::DuplicateOrderNumber(lesson.order_number));
        }
    }
    Ok(())
}
