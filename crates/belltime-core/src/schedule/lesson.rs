//! Lesson and break children of a schedule.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::minutes;
use crate::error::ValidationError;

/// A lesson within a schedule.
///
/// Start time is derived by the projector, never stored. `duration_min`
/// overrides the owning schedule's lesson duration for this lesson only;
/// when absent the schedule-level duration applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(default)]
    pub id: u64,
    /// Position within the owning schedule, starting at 1. Projection
    /// expects order numbers to be dense; gaps are a data-quality risk
    /// the projector reports rather than repairs.
    pub order_number: u32,
    pub subject: String,
    #[serde(default)]
    pub duration_min: Option<u32>,
}

impl Lesson {
    pub fn new(id: u64, order_number: u32, subject: impl Into<String>) -> Self {
        Self {
            id,
            order_number,
            subject: subject.into(),
            duration_min: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.order_number < 1 {
            return Err(ValidationError::InvalidOrderNumber);
        }
        if self.subject.trim().is_empty() {
            return Err(ValidationError::BlankSubject {
                order_number: self.order_number,
            });
        }
        Ok(())
    }
}

/// A break within a schedule.
///
/// Unlike lessons, a break carries its own explicit start time; only its
/// end is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Break {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub start_time: NaiveTime,
    pub duration_min: u32,
}

impl Break {
    pub fn new(id: u64, name: impl Into<String>, start_time: NaiveTime, duration_min: u32) -> Self {
        Self {
            id,
            name: name.into(),
            start_time,
            duration_min,
        }
    }

    /// Derived end: `start_time + duration`.
    pub fn end_time(&self) -> NaiveTime {
        self.start_time + minutes(self.duration_min)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.duration_min < super::BREAK_DURATION_MIN
            || self.duration_min > super::BREAK_DURATION_MAX
        {
            return Err(ValidationError::BreakDurationOutOfBounds {
                actual: self.duration_min,
                min: super::BREAK_DURATION_MIN,
                max: super::BREAK_DURATION_MAX,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_subject_rejected() {
        let lesson = Lesson::new(1, 1, "   ");
        assert_eq!(
            lesson.validate(),
            Err(ValidationError::BlankSubject { order_number: 1 })
        );
    }

    #[test]
    fn zero_order_number_rejected() {
        let lesson = Lesson::new(1, 0, "Math");
        assert_eq!(lesson.validate(), Err(ValidationError::InvalidOrderNumber));
    }

    #[test]
    fn break_end_time_derived() {
        let brk = Break::new(1, "Lunch", NaiveTime::from_hms_opt(11, 30, 0).unwrap(), 20);
        assert_eq!(brk.end_time(), NaiveTime::from_hms_opt(11, 50, 0).unwrap());
    }

    #[test]
    fn break_duration_bounds() {
        let start = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert!(Break::new(1, "Short", start, 5).validate().is_ok());
        assert!(Break::new(1, "Long", start, 30).validate().is_ok());
        assert!(Break::new(1, "Too short", start, 4).validate().is_err());
        assert!(Break::new(1, "Too long", start, 31).validate().is_err());
    }
}
