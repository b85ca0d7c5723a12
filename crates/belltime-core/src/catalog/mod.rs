//! Read-only schedule catalog abstraction.
//!
//! The resolver depends on this trait, never on a concrete store; the
//! entities themselves carry no data-access capability. Implementations
//! must provide snapshot-read semantics within a single resolution call:
//! every method returns owned copies taken from one consistent view.
//!
//! [`InMemoryCatalog`] is the bundled implementation, populated from a
//! timetable document or programmatically in tests. Administrative
//! create/update/delete flows live outside the core; the insert methods
//! here only enforce the invariants the resolver consumes (unique
//! special/holiday dates).

use std::collections::HashMap;

use chrono::{NaiveDate, Weekday};

use crate::error::{CatalogError, ValidationError};
use crate::schedule::{HolidaySchedule, Schedule, SpecialSchedule};

/// Lookup surface consumed by the schedule resolver.
///
/// Day-of-week lookup returns every active match rather than at most
/// one: duplicate active schedules for a day are a data-integrity
/// violation the catalog should prevent, but the resolver must observe
/// all of them to tie-break deterministically instead of crashing.
pub trait ScheduleCatalog: Send + Sync {
    /// All active schedules for the given day of week, in no particular order.
    fn active_schedules_for_day(&self, day: Weekday) -> Result<Vec<Schedule>, CatalogError>;

    /// The schedule pinned to the given date via `effective_date`, if any.
    fn schedule_for_effective_date(&self, date: NaiveDate)
        -> Result<Option<Schedule>, CatalogError>;

    /// The special schedule for the given date, if any.
    fn special_schedule_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<SpecialSchedule>, CatalogError>;

    /// The holiday entry for the given date, if any.
    fn holiday_for_date(&self, date: NaiveDate) -> Result<Option<HolidaySchedule>, CatalogError>;

    /// Lookup by schedule id, used to resolve a special schedule's base.
    fn schedule_by_id(&self, id: u64) -> Result<Option<Schedule>, CatalogError>;
}

/// In-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    schedules: HashMap<u64, Schedule>,
    specials: HashMap<NaiveDate, SpecialSchedule>,
    holidays: HashMap<NaiveDate, HolidaySchedule>,
    next_id: u64,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            schedules: HashMap::new(),
            specials: HashMap::new(),
            holidays: HashMap::new(),
            next_id: 1,
        }
    }

    fn assign_id(&mut self, requested: u64) -> u64 {
        let id = if requested == 0 { self.next_id } else { requested };
        self.next_id = self.next_id.max(id + 1);
        id
    }

    /// Insert a schedule, assigning an id when the given one is zero.
    /// Child lessons and breaks with zero ids get ids as well.
    ///
    /// Deliberately does not reject a second active schedule for the
    /// same day of week: that violation originates in the administrative
    /// layer, and the resolver is specified to survive it.
    pub fn insert_schedule(&mut self, mut schedule: Schedule) -> u64 {
        let id = self.assign_id(schedule.id);
        schedule.id = id;
        for lesson in &mut schedule.lessons {
            lesson.id = self.assign_id(lesson.id);
        }
        for brk in &mut schedule.breaks {
            brk.id = self.assign_id(brk.id);
        }
        self.schedules.insert(id, schedule);
        id
    }

    /// Insert a special schedule. Fails on a duplicate date or a dangling
    /// base schedule reference.
    pub fn insert_special(&mut self, mut special: SpecialSchedule) -> Result<u64, ValidationError> {
        if self.specials.contains_key(&special.special_date) {
            return Err(ValidationError::DuplicateSpecialDate(special.special_date));
        }
        if !self.schedules.contains_key(&special.base_schedule_id) {
            return Err(ValidationError::UnknownBaseSchedule {
                date: special.special_date,
                schedule_id: special.base_schedule_id,
            });
        }
        let id = self.assign_id(special.id);
        special.id = id;
        for lesson in &mut special.lessons {
            lesson.id = self.assign_id(lesson.id);
        }
        self.specials.insert(special.special_date, special);
        Ok(id)
    }

    /// Insert a holiday entry. Fails on a duplicate date.
    pub fn insert_holiday(&mut self, mut holiday: HolidaySchedule) -> Result<u64, ValidationError> {
        if self.holidays.contains_key(&holiday.holiday_date) {
            return Err(ValidationError::DuplicateHolidayDate(holiday.holiday_date));
        }
        let id = self.assign_id(holiday.id);
        holiday.id = id;
        self.holidays.insert(holiday.holiday_date, holiday);
        Ok(id)
    }

    pub fn schedules(&self) -> impl Iterator<Item = &Schedule> {
        self.schedules.values()
    }
}

impl ScheduleCatalog for InMemoryCatalog {
    fn active_schedules_for_day(&self, day: Weekday) -> Result<Vec<Schedule>, CatalogError> {
        Ok(self
            .schedules
            .values()
            .filter(|s| s.active && s.day_of_week == day && s.effective_date.is_none())
            .cloned()
            .collect())
    }

    fn schedule_for_effective_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<Schedule>, CatalogError> {
        Ok(self
            .schedules
            .values()
            .find(|s| s.effective_date == Some(date))
            .cloned())
    }

    fn special_schedule_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<SpecialSchedule>, CatalogError> {
        Ok(self.specials.get(&date).cloned())
    }

    fn holiday_for_date(&self, date: NaiveDate) -> Result<Option<HolidaySchedule>, CatalogError> {
        Ok(self.holidays.get(&date).cloned())
    }

    fn schedule_by_id(&self, id: u64) -> Result<Option<Schedule>, CatalogError> {
        Ok(self.schedules.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Lesson;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn insert_assigns_ids() {
        let mut catalog = InMemoryCatalog::new();
        let mut schedule = Schedule::new(0, Weekday::Mon);
        schedule.lessons.push(Lesson::new(0, 1, "Math"));
        let id = catalog.insert_schedule(schedule);
        assert!(id > 0);
        let stored = catalog.schedule_by_id(id).unwrap().unwrap();
        assert!(stored.lessons[0].id > 0);
        assert_ne!(stored.lessons[0].id, id);
    }

    #[test]
    fn duplicate_special_date_rejected() {
        let mut catalog = InMemoryCatalog::new();
        let base = catalog.insert_schedule(Schedule::new(0, Weekday::Tue));
        let d = date(2026, 9, 1);
        catalog
            .insert_special(SpecialSchedule::new(0, d, base))
            .unwrap();
        assert_eq!(
            catalog.insert_special(SpecialSchedule::new(0, d, base)),
            Err(ValidationError::DuplicateSpecialDate(d))
        );
    }

    #[test]
    fn dangling_base_schedule_rejected() {
        let mut catalog = InMemoryCatalog::new();
        let d = date(2026, 9, 1);
        assert!(matches!(
            catalog.insert_special(SpecialSchedule::new(0, d, 99)),
            Err(ValidationError::UnknownBaseSchedule { schedule_id: 99, .. })
        ));
    }

    #[test]
    fn duplicate_holiday_date_rejected() {
        let mut catalog = InMemoryCatalog::new();
        let d = date(2026, 12, 25);
        catalog
            .insert_holiday(HolidaySchedule::new(0, d, "Christmas"))
            .unwrap();
        assert!(catalog
            .insert_holiday(HolidaySchedule::new(0, d, "Again"))
            .is_err());
    }

    #[test]
    fn dated_schedule_excluded_from_weekday_lookup() {
        let mut catalog = InMemoryCatalog::new();
        let mut dated = Schedule::new(0, Weekday::Mon);
        dated.effective_date = Some(date(2026, 9, 7));
        catalog.insert_schedule(dated);
        catalog.insert_schedule(Schedule::new(0, Weekday::Mon));

        let matches = catalog.active_schedules_for_day(Weekday::Mon).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].effective_date.is_none());
    }
}
