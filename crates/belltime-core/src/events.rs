//! Outcome events for external consumers.
//!
//! The engine's library surface returns typed values; this enum is the
//! flat, serializable rendering of those outcomes that a front end (the
//! CLI, a notifier) can emit as JSON lines.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::bell::FiredCall;
use crate::projector::CallType;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A bell call fired.
    CallFired {
        date: NaiveDate,
        call_time: NaiveTime,
        call_type: CallType,
        lesson_id: Option<u64>,
        break_id: Option<u64>,
        at: DateTime<Utc>,
    },
    /// Resolution ended in a non-working holiday.
    NoSchool {
        date: NaiveDate,
        description: String,
    },
    /// Resolution found no schedule configured for the date.
    ScheduleMissing { date: NaiveDate },
}

impl From<&FiredCall> for Event {
    fn from(fired: &FiredCall) -> Self {
        Event::CallFired {
            date: fired.date,
            call_time: fired.call.call_time,
            call_type: fired.call.call_type,
            lesson_id: fired.call.source.lesson_id(),
            break_id: fired.call.source.break_id(),
            at: fired.fired_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{CallEvent, CallSource};

    #[test]
    fn fired_call_maps_to_event() {
        let fired = FiredCall {
            date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            call: CallEvent {
                call_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                call_type: CallType::LessonStart,
                source: CallSource::Lesson(11),
            },
            fired_at: Utc::now(),
        };
        match Event::from(&fired) {
            Event::CallFired {
                lesson_id,
                break_id,
                call_type,
                ..
            } => {
                assert_eq!(lesson_id, Some(11));
                assert_eq!(break_id, None);
                assert_eq!(call_type, CallType::LessonStart);
            }
            other => panic!("expected CallFired, got {other:?}"),
        }
    }
}
