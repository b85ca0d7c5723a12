//! Core error types for belltime-core.
//!
//! "No schedule configured" and "no-school holiday" are expected
//! resolution outcomes, not errors -- they live on
//! [`Resolution`](crate::resolver::Resolution), and callers branch on
//! them. The types here cover genuine faults: unreachable catalogs,
//! malformed configuration, and domain invariant violations.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Core error type for belltime-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Catalog-related errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Notification sink failures reported by a bell trigger callback
    #[error("Notification sink error: {0}")]
    Sink(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors raised by a [`ScheduleCatalog`](crate::catalog::ScheduleCatalog)
/// implementation.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The backing store could not be reached. Transient by contract:
    /// the bell trigger loop logs this and retries on its next tick.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// A lookup failed in a way that is not "no row matched"
    #[error("Catalog query failed: {0}")]
    QueryFailed(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load a configuration or timetable file
    #[error("Failed to load {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse TOML content
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Domain invariant violations.
///
/// The administrative layer rejects these at write time; when the
/// resolver encounters one at read time it logs a warning and skips the
/// offending schedule instead of propagating the error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Lesson duration outside the 15-90 minute bound
    #[error("Lesson duration must be between {min} and {max} minutes, got {actual}")]
    LessonDurationOutOfBounds { actual: u32, min: u32, max: u32 },

    /// Break duration outside the 5-30 minute bound
    #[error("Break duration must be between {min} and {max} minutes, got {actual}")]
    BreakDurationOutOfBounds { actual: u32, min: u32, max: u32 },

    /// Lesson order numbers start at 1
    #[error("Lesson order number must be at least 1")]
    InvalidOrderNumber,

    /// Order numbers are unique within their owning schedule
    #[error("Duplicate lesson order number {0} within schedule")]
    DuplicateOrderNumber(u32),

    /// Lesson subject must not be blank
    #[error("Lesson {order_number} has a blank subject")]
    BlankSubject { order_number: u32 },

    /// A call references exactly one of a lesson or a break
    #[error("A call must reference exactly one of a lesson or a break")]
    AmbiguousCallReference,

    /// At most one special schedule per date
    #[error("Duplicate special schedule for date {0}")]
    DuplicateSpecialDate(NaiveDate),

    /// At most one holiday entry per date
    #[error("Duplicate holiday for date {0}")]
    DuplicateHolidayDate(NaiveDate),

    /// A special schedule references a base schedule the catalog does not hold
    #[error("Special schedule for {date} references unknown schedule {schedule_id}")]
    UnknownBaseSchedule { date: NaiveDate, schedule_id: u64 },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
