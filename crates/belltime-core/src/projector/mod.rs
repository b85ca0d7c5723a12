//! Timeline projection: a resolved schedule becomes an ordered sequence
//! of lesson/break intervals with absolute times, plus the call events
//! the bell loop fires.
//!
//! Projection is a pure function of its inputs. Projecting the same
//! resolved schedule twice yields identical ordered slot and call lists,
//! which the bell trigger loop relies on when it re-derives the
//! projection every tick.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ScheduleCatalog;
use crate::error::{Result, ValidationError};
use crate::resolver::{Resolution, ResolvedSchedule, ScheduleResolver};
use crate::schedule::minutes;

/// Projection tuning. The preliminary-call lead is a configuration
/// constant, never a per-schedule field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Minutes before a lesson's start at which the preliminary call
    /// rings. Zero disables preliminary calls.
    #[serde(default = "default_preliminary_lead")]
    pub preliminary_lead_min: u32,
}

fn default_preliminary_lead() -> u32 {
    2
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            preliminary_lead_min: default_preliminary_lead(),
        }
    }
}

/// Kind of bell call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    PreliminaryCall,
    LessonStart,
    BreakStart,
}

/// What a call belongs to. Exactly one of a lesson or a break, enforced
/// at the type level; [`CallSource::from_refs`] is the checked entry
/// point for data arriving as a nullable reference pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallSource {
    Lesson(u64),
    Break(u64),
}

impl CallSource {
    /// Build a source from a `(lesson_id, break_id)` pair as a persisted
    /// row would carry it. Fails unless exactly one side is present.
    pub fn from_refs(
        lesson_id: Option<u64>,
        break_id: Option<u64>,
    ) -> Result<Self, ValidationError> {
        match (lesson_id, break_id) {
            (Some(id), None) => Ok(CallSource::Lesson(id)),
            (None, Some(id)) => Ok(CallSource::Break(id)),
            _ => Err(ValidationError::AmbiguousCallReference),
        }
    }

    pub fn lesson_id(&self) -> Option<u64> {
        match self {
            CallSource::Lesson(id) => Some(*id),
            CallSource::Break(_) => None,
        }
    }

    pub fn break_id(&self) -> Option<u64> {
        match self {
            CallSource::Lesson(_) => None,
            CallSource::Break(id) => Some(*id),
        }
    }

    fn id(&self) -> u64 {
        match self {
            CallSource::Lesson(id) | CallSource::Break(id) => *id,
        }
    }
}

/// A concrete bell-ringing moment. Call times are minute-granular by
/// construction: they derive from minute-granular schedule data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEvent {
    pub call_time: NaiveTime,
    pub call_type: CallType,
    pub source: CallSource,
}

/// One interval on the projected timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineSlot {
    Lesson {
        lesson_id: u64,
        order_number: u32,
        subject: String,
        start: NaiveTime,
        end: NaiveTime,
    },
    Break {
        break_id: u64,
        name: String,
        start: NaiveTime,
        end: NaiveTime,
    },
}

impl TimelineSlot {
    pub fn start(&self) -> NaiveTime {
        match self {
            TimelineSlot::Lesson { start, .. } | TimelineSlot::Break { start, .. } => *start,
        }
    }

    pub fn end(&self) -> NaiveTime {
        match self {
            TimelineSlot::Lesson { end, .. } | TimelineSlot::Break { end, .. } => *end,
        }
    }

    fn source(&self) -> CallSource {
        match self {
            TimelineSlot::Lesson { lesson_id, .. } => CallSource::Lesson(*lesson_id),
            TimelineSlot::Break { break_id, .. } => CallSource::Break(*break_id),
        }
    }
}

/// Soft inconsistency reports attached to a projection. Break placement
/// is author-controlled, so a misplaced break is reported, not repaired.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ProjectionWarning {
    /// A break's explicit start does not align with the end of the
    /// preceding lesson.
    #[error("break {break_id} starts at {actual} but the preceding slot ends at {expected}")]
    MisalignedBreak {
        break_id: u64,
        expected: NaiveTime,
        actual: NaiveTime,
    },
    /// A break's explicit start falls inside a lesson.
    #[error("break {break_id} at {start} overlaps a lesson")]
    OverlappingBreak { break_id: u64, start: NaiveTime },
    /// Lesson order numbers are not dense from 1.
    #[error("lesson order numbers are not contiguous: expected {expected}, found {actual}")]
    NonContiguousOrder { expected: u32, actual: u32 },
}

/// The projected timeline for one date: ordered slots, the derived call
/// events, and any soft warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub date: NaiveDate,
    pub slots: Vec<TimelineSlot>,
    pub calls: Vec<CallEvent>,
    pub warnings: Vec<ProjectionWarning>,
}

impl Timeline {
    /// Calls of one type, in timeline order.
    pub fn calls_by_type(&self, call_type: CallType) -> Vec<&CallEvent> {
        self.calls
            .iter()
            .filter(|c| c.call_type == call_type)
            .collect()
    }

    /// Calls whose time falls within `[from, to]`, both ends inclusive.
    pub fn calls_in_window(&self, from: NaiveTime, to: NaiveTime) -> Vec<&CallEvent> {
        self.calls
            .iter()
            .filter(|c| c.call_time >= from && c.call_time <= to)
            .collect()
    }

    /// Whether the referenced lesson or break still exists on this
    /// timeline. The bell loop checks this before firing.
    pub fn has_slot_for(&self, source: &CallSource) -> bool {
        self.slots.iter().any(|s| s.source() == *source)
    }
}

/// Project a resolved schedule into its ordered timeline.
///
/// Lessons are placed in order-number order starting at the schedule's
/// `first_lesson_start`; each break occupies its explicit start time and
/// shifts every later lesson by its duration. Per-lesson duration
/// overrides apply to that lesson only.
pub fn project(resolved: &ResolvedSchedule, config: &ProjectionConfig) -> Timeline {
    let schedule = &resolved.schedule;
    let mut warnings = Vec::new();
    let mut slots = Vec::new();
    let mut calls = Vec::new();

    let mut lessons: Vec<_> = resolved.lessons.iter().collect();
    lessons.sort_by_key(|l| l.order_number);
    let mut breaks: Vec<_> = resolved.breaks.iter().collect();
    breaks.sort_by_key(|b| (b.start_time, b.id));
    let mut next_break = breaks.into_iter().peekable();

    let mut cursor = schedule.first_lesson_start;
    let mut expected_order = 1u32;

    for lesson in lessons {
        if lesson.order_number != expected_order {
            warnings.push(ProjectionWarning::NonContiguousOrder {
                expected: expected_order,
                actual: lesson.order_number,
            });
        }
        expected_order = lesson.order_number + 1;

        // Place every break scheduled before this lesson would start.
        while let Some(brk) = next_break.peek() {
            if brk.start_time > cursor {
                break;
            }
            let brk = match next_break.next() {
                Some(b) => b,
                None => break,
            };
            if brk.start_time < cursor {
                warnings.push(ProjectionWarning::MisalignedBreak {
                    break_id: brk.id,
                    expected: cursor,
                    actual: brk.start_time,
                });
            }
            slots.push(TimelineSlot::Break {
                break_id: brk.id,
                name: brk.name.clone(),
                start: brk.start_time,
                end: brk.end_time(),
            });
            calls.push(CallEvent {
                call_time: brk.start_time,
                call_type: CallType::BreakStart,
                source: CallSource::Break(brk.id),
            });
            cursor = cursor.max(brk.end_time());
        }

        let duration = minutes(schedule.lesson_duration_for(lesson));
        let start = cursor;
        let end = start + duration;
        slots.push(TimelineSlot::Lesson {
            lesson_id: lesson.id,
            order_number: lesson.order_number,
            subject: lesson.subject.clone(),
            start,
            end,
        });
        if let Some(preliminary) = preliminary_time(start, config.preliminary_lead_min) {
            calls.push(CallEvent {
                call_time: preliminary,
                call_type: CallType::PreliminaryCall,
                source: CallSource::Lesson(lesson.id),
            });
        }
        calls.push(CallEvent {
            call_time: start,
            call_type: CallType::LessonStart,
            source: CallSource::Lesson(lesson.id),
        });
        cursor = end;
    }

    // Trailing breaks after the last lesson keep their explicit start.
    for brk in next_break {
        if brk.start_time < cursor {
            warnings.push(ProjectionWarning::OverlappingBreak {
                break_id: brk.id,
                start: brk.start_time,
            });
        } else if brk.start_time > cursor {
            warnings.push(ProjectionWarning::MisalignedBreak {
                break_id: brk.id,
                expected: cursor,
                actual: brk.start_time,
            });
        }
        slots.push(TimelineSlot::Break {
            break_id: brk.id,
            name: brk.name.clone(),
            start: brk.start_time,
            end: brk.end_time(),
        });
        calls.push(CallEvent {
            call_time: brk.start_time,
            call_type: CallType::BreakStart,
            source: CallSource::Break(brk.id),
        });
        cursor = cursor.max(brk.end_time());
    }

    // Total order: time, then call type rank, then source id. Generation
    // order is already deterministic; the sort pins the contract down.
    calls.sort_by_key(|c| (c.call_time, c.call_type, c.source.id()));

    Timeline {
        date: resolved.date,
        slots,
        calls,
        warnings,
    }
}

/// Preliminary call time, or `None` when the lead would cross midnight.
fn preliminary_time(start: NaiveTime, lead_min: u32) -> Option<NaiveTime> {
    if lead_min == 0 {
        return None;
    }
    let lead = minutes(lead_min);
    if start.signed_duration_since(NaiveTime::MIN) < lead {
        return None;
    }
    Some(start - lead)
}

/// A date's projected outcome, for calendar display and the bell loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DayTimetable {
    /// Non-working holiday: no timeline, no calls.
    NoSchoolDay { date: NaiveDate, description: String },
    /// No schedule configured for this date.
    NotFound { date: NaiveDate },
    Timeline(Timeline),
}

/// Resolve `date` and project it in one step.
pub fn resolve_and_project<C: ScheduleCatalog>(
    resolver: &ScheduleResolver<C>,
    config: &ProjectionConfig,
    date: NaiveDate,
) -> Result<DayTimetable> {
    Ok(match resolver.resolve(date)? {
        Resolution::NoSchoolDay { date, description } => {
            DayTimetable::NoSchoolDay { date, description }
        }
        Resolution::NotFound => DayTimetable::NotFound { date },
        Resolution::Resolved(resolved) => DayTimetable::Timeline(project(&resolved, config)),
    })
}

/// Project every date in `[start, end]` inclusive, for range reporting.
pub fn resolve_and_project_range<C: ScheduleCatalog>(
    resolver: &ScheduleResolver<C>,
    config: &ProjectionConfig,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DayTimetable>> {
    let mut out = Vec::new();
    let mut date = start;
    while date <= end {
        out.push(resolve_and_project(resolver, config, date)?);
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolvedSource;
    use crate::schedule::{Break, Lesson, Schedule};
    use chrono::Weekday;
    use proptest::prelude::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn resolved(schedule: Schedule) -> ResolvedSchedule {
        ResolvedSchedule {
            date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            lessons: schedule.lessons.clone(),
            breaks: schedule.breaks.clone(),
            schedule,
            source: ResolvedSource::Regular,
        }
    }

    fn three_lesson_monday() -> Schedule {
        let mut s = Schedule::new(1, Weekday::Mon);
        s.lessons.push(Lesson::new(11, 1, "Math"));
        s.lessons.push(Lesson::new(12, 2, "Science"));
        s.lessons.push(Lesson::new(13, 3, "Art"));
        s
    }

    #[test]
    fn lesson_starts_without_breaks() {
        let timeline = project(&resolved(three_lesson_monday()), &ProjectionConfig::default());
        let starts: Vec<_> = timeline
            .calls_by_type(CallType::LessonStart)
            .iter()
            .map(|c| c.call_time)
            .collect();
        assert_eq!(starts, vec![time(8, 0), time(8, 45), time(9, 30)]);
    }

    #[test]
    fn breaks_shift_later_lessons() {
        let mut s = three_lesson_monday();
        // Break aligned with the end of lesson 1 (08:45), 10 minutes.
        s.breaks.push(Break::new(21, "Morning break", time(8, 45), 10));
        let timeline = project(&resolved(s), &ProjectionConfig::default());

        let starts: Vec<_> = timeline
            .calls_by_type(CallType::LessonStart)
            .iter()
            .map(|c| c.call_time)
            .collect();
        assert_eq!(starts, vec![time(8, 0), time(8, 55), time(9, 40)]);
        assert!(timeline.warnings.is_empty());

        let break_calls = timeline.calls_by_type(CallType::BreakStart);
        assert_eq!(break_calls.len(), 1);
        assert_eq!(break_calls[0].call_time, time(8, 45));
    }

    #[test]
    fn misaligned_break_warns_but_projects() {
        let mut s = three_lesson_monday();
        // Lesson 1 ends at 08:45; this break claims 08:40.
        s.breaks.push(Break::new(21, "Early break", time(8, 40), 10));
        let timeline = project(&resolved(s), &ProjectionConfig::default());

        assert_eq!(timeline.warnings.len(), 1);
        assert!(matches!(
            timeline.warnings[0],
            ProjectionWarning::MisalignedBreak { break_id: 21, .. }
        ));
        // Best-effort timeline still contains all slots.
        assert_eq!(timeline.slots.len(), 4);
    }

    #[test]
    fn preliminary_calls_lead_each_lesson() {
        let config = ProjectionConfig {
            preliminary_lead_min: 2,
        };
        let timeline = project(&resolved(three_lesson_monday()), &config);
        let prelims: Vec<_> = timeline
            .calls_by_type(CallType::PreliminaryCall)
            .iter()
            .map(|c| c.call_time)
            .collect();
        assert_eq!(prelims, vec![time(7, 58), time(8, 43), time(9, 28)]);
    }

    #[test]
    fn zero_lead_disables_preliminary_calls() {
        let config = ProjectionConfig {
            preliminary_lead_min: 0,
        };
        let timeline = project(&resolved(three_lesson_monday()), &config);
        assert!(timeline.calls_by_type(CallType::PreliminaryCall).is_empty());
    }

    #[test]
    fn preliminary_call_never_wraps_midnight() {
        let mut s = three_lesson_monday();
        s.first_lesson_start = time(0, 1);
        let config = ProjectionConfig {
            preliminary_lead_min: 2,
        };
        let timeline = project(&resolved(s), &config);
        // First lesson's preliminary would land before midnight; dropped.
        assert_eq!(timeline.calls_by_type(CallType::PreliminaryCall).len(), 2);
    }

    #[test]
    fn per_lesson_duration_override() {
        let mut s = three_lesson_monday();
        s.lessons[0].duration_min = Some(30);
        let timeline = project(&resolved(s), &ProjectionConfig::default());
        let starts: Vec<_> = timeline
            .calls_by_type(CallType::LessonStart)
            .iter()
            .map(|c| c.call_time)
            .collect();
        assert_eq!(starts, vec![time(8, 0), time(8, 30), time(9, 15)]);
    }

    #[test]
    fn order_gap_reported() {
        let mut s = Schedule::new(1, Weekday::Mon);
        s.lessons.push(Lesson::new(11, 1, "Math"));
        s.lessons.push(Lesson::new(13, 3, "Art"));
        let timeline = project(&resolved(s), &ProjectionConfig::default());
        assert!(timeline.warnings.iter().any(|w| matches!(
            w,
            ProjectionWarning::NonContiguousOrder {
                expected: 2,
                actual: 3
            }
        )));
    }

    #[test]
    fn projection_is_idempotent() {
        let mut s = three_lesson_monday();
        s.breaks.push(Break::new(21, "Break", time(8, 45), 10));
        let r = resolved(s);
        let config = ProjectionConfig::default();
        assert_eq!(project(&r, &config), project(&r, &config));
    }

    #[test]
    fn calls_are_chronological() {
        let mut s = three_lesson_monday();
        s.breaks.push(Break::new(21, "Break", time(8, 45), 10));
        let timeline = project(&resolved(s), &ProjectionConfig::default());
        assert!(timeline
            .calls
            .windows(2)
            .all(|w| w[0].call_time <= w[1].call_time));
    }

    #[test]
    fn call_source_from_refs_mutual_exclusion() {
        assert!(CallSource::from_refs(Some(1), None).is_ok());
        assert!(CallSource::from_refs(None, Some(2)).is_ok());
        assert_eq!(
            CallSource::from_refs(Some(1), Some(2)),
            Err(ValidationError::AmbiguousCallReference)
        );
        assert_eq!(
            CallSource::from_refs(None, None),
            Err(ValidationError::AmbiguousCallReference)
        );
    }

    #[test]
    fn window_query_is_inclusive() {
        let timeline = project(&resolved(three_lesson_monday()), &ProjectionConfig::default());
        let hits = timeline.calls_in_window(time(8, 0), time(8, 45));
        assert!(hits.iter().any(|c| c.call_time == time(8, 0)));
        assert!(hits.iter().any(|c| c.call_time == time(8, 45)));
    }

    proptest! {
        /// Lesson starts under the single-duration model match the
        /// entity-level shortcut for any in-bounds duration.
        #[test]
        fn derived_starts_match_entity_shortcut(
            duration in 15u32..=90,
            count in 1usize..=8,
        ) {
            let mut s = Schedule::new(1, Weekday::Mon);
            s.lesson_duration_min = duration;
            for i in 1..=count as u32 {
                s.lessons.push(Lesson::new(u64::from(i), i, format!("L{i}")));
            }
            let timeline = project(&resolved(s.clone()), &ProjectionConfig::default());
            let starts: Vec<_> = timeline
                .calls_by_type(CallType::LessonStart)
                .iter()
                .map(|c| c.call_time)
                .collect();
            for (idx, start) in starts.iter().enumerate() {
                prop_assert_eq!(*start, s.lesson_start(idx as u32 + 1));
            }
        }

        /// Projection of shuffled lesson input is order-insensitive.
        #[test]
        fn projection_ignores_input_order(seed in 0u64..1000) {
            let mut s = three_lesson_monday();
            // Rotate the lesson list by the seed.
            let rot = (seed % 3) as usize;
            s.lessons.rotate_left(rot);
            let base = project(&resolved(three_lesson_monday()), &ProjectionConfig::default());
            let rotated = project(&resolved(s), &ProjectionConfig::default());
            prop_assert_eq!(base.calls, rotated.calls);
        }
    }
}
