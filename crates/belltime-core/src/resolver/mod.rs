//! Schedule resolution: one authoritative schedule per date.
//!
//! Precedence, first match wins:
//!
//! 1. Holiday with `working_day == false` -> [`Resolution::NoSchoolDay`].
//! 2. Holiday with `working_day == true` -> fall through.
//! 3. Special schedule for the date (own lessons, base schedule timing).
//! 4. Schedule pinned to the date via `effective_date`.
//! 5. Active schedule matching the day of week, else [`Resolution::NotFound`].
//!
//! A schedule that fails domain validation at resolve time is logged as
//! a data-integrity warning and skipped in favor of the next-lower
//! precedence match; resolution itself never aborts on bad data.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::ScheduleCatalog;
use crate::error::Result;
use crate::schedule::{Break, Lesson, Schedule};

/// Where the resolved schedule came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedSource {
    /// Weekly day-of-week match.
    Regular,
    /// Schedule pinned to this exact date via `effective_date`.
    DatedOverride,
    /// Special schedule override.
    Special { description: String },
}

/// The single schedule chosen as authoritative for one date, flattened
/// to what projection needs: timing basis plus effective lesson and
/// break lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSchedule {
    pub date: NaiveDate,
    /// Timing basis: `first_lesson_start` and the durations. For a
    /// special schedule this is the referenced base schedule.
    pub schedule: Schedule,
    pub lessons: Vec<Lesson>,
    pub breaks: Vec<Break>,
    pub source: ResolvedSource,
}

/// Outcome of resolving a date. `NoSchoolDay` and `NotFound` are
/// expected terminal outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// Non-working holiday: no timeline exists, no calls fire.
    NoSchoolDay { date: NaiveDate, description: String },
    /// No schedule configured for this date.
    NotFound,
    Resolved(ResolvedSchedule),
}

/// Applies the precedence rules over a read-only catalog.
pub struct ScheduleResolver<C> {
    catalog: C,
}

impl<C: ScheduleCatalog> ScheduleResolver<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Resolve the authoritative schedule for `date`.
    pub fn resolve(&self, date: NaiveDate) -> Result<Resolution> {
        if let Some(holiday) = self.catalog.holiday_for_date(date)? {
            if !holiday.working_day {
                debug!(%date, description = %holiday.description, "non-working holiday");
                return Ok(Resolution::NoSchoolDay {
                    date,
                    description: holiday.description,
                });
            }
            debug!(%date, "working-day holiday, school not suppressed");
        }

        if let Some(special) = self.catalog.special_schedule_for_date(date)? {
            match self.resolve_special(date, &special)? {
                Some(resolved) => return Ok(Resolution::Resolved(resolved)),
                None => {} // Warned inside; fall through to lower precedence.
            }
        }

        if let Some(schedule) = self.catalog.schedule_for_effective_date(date)? {
            if let Err(err) = schedule.validate() {
                warn!(%date, schedule_id = schedule.id, %err, "dated schedule invalid, skipping");
            } else {
                return Ok(Resolution::Resolved(ResolvedSchedule {
                    date,
                    lessons: schedule.lessons.clone(),
                    breaks: schedule.breaks.clone(),
                    schedule,
                    source: ResolvedSource::DatedOverride,
                }));
            }
        }

        let mut candidates = self.catalog.active_schedules_for_day(date.weekday())?;
        candidates.retain(|s| match s.validate() {
            Ok(()) => true,
            Err(err) => {
                warn!(%date, schedule_id = s.id, %err, "weekly schedule invalid, skipping");
                false
            }
        });
        if candidates.len() > 1 {
            warn!(
                %date,
                day = ?date.weekday(),
                count = candidates.len(),
                "multiple active schedules for day of week, picking most recently updated"
            );
        }
        // Deterministic tie-break: latest updated_at, then highest id so
        // two runs over the same data always agree.
        candidates.sort_by_key(|s| (s.updated_at, s.id));
        let schedule = match candidates.pop() {
            Some(schedule) => schedule,
            None => {
                debug!(%date, "no schedule configured");
                return Ok(Resolution::NotFound);
            }
        };

        Ok(Resolution::Resolved(ResolvedSchedule {
            date,
            lessons: schedule.lessons.clone(),
            breaks: schedule.breaks.clone(),
            schedule,
            source: ResolvedSource::Regular,
        }))
    }

    /// Build a resolved schedule from a special override, or `None` (with
    /// a warning logged) when its base schedule is missing or invalid.
    fn resolve_special(
        &self,
        date: NaiveDate,
        special: &crate::schedule::SpecialSchedule,
    ) -> Result<Option<ResolvedSchedule>> {
        if let Err(err) = special.validate() {
            warn!(%date, special_id = special.id, %err, "special schedule invalid, skipping");
            return Ok(None);
        }
        let base = match self.catalog.schedule_by_id(special.base_schedule_id)? {
            Some(base) => base,
            None => {
                warn!(
                    %date,
                    special_id = special.id,
                    base_schedule_id = special.base_schedule_id,
                    "special schedule references missing base schedule, skipping"
                );
                return Ok(None);
            }
        };
        if let Err(err) = base.validate() {
            warn!(%date, schedule_id = base.id, %err, "base schedule invalid, skipping special");
            return Ok(None);
        }
        Ok(Some(ResolvedSchedule {
            date,
            lessons: special.lessons.clone(),
            breaks: base.breaks.clone(),
            schedule: base,
            source: ResolvedSource::Special {
                description: special.description.clone(),
            },
        }))
    }
}
