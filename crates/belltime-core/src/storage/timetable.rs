//! Declarative timetable document.
//!
//! A TOML file holding the data an administrative store would: weekly
//! schedules, special schedules, and holidays. Loading validates every
//! entry against the domain invariants and builds an
//! [`InMemoryCatalog`] the resolver can run against.
//!
//! ```toml
//! [[schedules]]
//! day_of_week = "Mon"
//! first_lesson_start = "08:00:00"
//!
//! [[schedules.lessons]]
//! order_number = 1
//! subject = "Math"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::InMemoryCatalog;
use crate::error::{ConfigError, ValidationError};
use crate::schedule::{HolidaySchedule, Schedule, SpecialSchedule};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub special_schedules: Vec<SpecialSchedule>,
    #[serde(default)]
    pub holidays: Vec<HolidaySchedule>,
}

impl Timetable {
    /// Load a timetable document from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|err| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::ParseFailed(err.to_string()))
    }

    /// Check every entry against the domain invariants.
    ///
    /// Duplicate active schedules for one day of week are logged as a
    /// warning rather than rejected: the resolver is specified to
    /// tie-break on them deterministically.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for schedule in &self.schedules {
            schedule.validate()?;
        }
        let mut special_dates = std::collections::HashSet::new();
        for special in &self.special_schedules {
            special.validate()?;
            if !special_dates.insert(special.special_date) {
                return Err(ValidationError::DuplicateSpecialDate(special.special_date));
            }
        }
        let mut holiday_dates = std::collections::HashSet::new();
        for holiday in &self.holidays {
            if !holiday_dates.insert(holiday.holiday_date) {
                return Err(ValidationError::DuplicateHolidayDate(holiday.holiday_date));
            }
        }

        let mut day_counts = std::collections::HashMap::new();
        for schedule in self
            .schedules
            .iter()
            .filter(|s| s.active && s.effective_date.is_none())
        {
            *day_counts.entry(schedule.day_of_week).or_insert(0u32) += 1;
        }
        for (day, count) in day_counts {
            if count > 1 {
                warn!(?day, count, "multiple active schedules for one day of week");
            }
        }
        Ok(())
    }

    /// Validate and build a catalog from this document.
    ///
    /// Special schedules reference base schedules by the `id` values
    /// used inside the document; the catalog keeps those ids.
    pub fn into_catalog(self) -> Result<InMemoryCatalog, ValidationError> {
        self.validate()?;
        let mut catalog = InMemoryCatalog::new();
        for schedule in self.schedules {
            catalog.insert_schedule(schedule);
        }
        for special in self.special_schedules {
            catalog.insert_special(special)?;
        }
        for holiday in self.holidays {
            catalog.insert_holiday(holiday)?;
        }
        Ok(catalog)
    }
}
