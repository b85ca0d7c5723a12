//! # Belltime Core Library
//!
//! This library implements the schedule resolution and temporal
//! projection engine for a school bell timetable, plus the periodic
//! trigger loop that rings the bells. It is a library-level interface:
//! persistence, HTTP, and audio playback are external collaborators
//! behind small traits.
//!
//! ## Architecture
//!
//! - **Schedule Catalog**: read-only lookup abstraction over the
//!   timetable data, with an in-memory implementation
//! - **Schedule Resolver**: picks the single authoritative schedule for
//!   a date (holiday > special > dated > weekly precedence)
//! - **Timeline Projector**: turns a resolved schedule into ordered
//!   lesson/break slots with absolute times and derived call events
//! - **Bell Trigger Loop**: polls wall-clock time against the projected
//!   calls with a tolerance window and fires each occurrence exactly once
//! - **Storage**: TOML-based configuration and timetable documents
//!
//! ## Key Components
//!
//! - [`ScheduleResolver`]: precedence rules over a [`ScheduleCatalog`]
//! - [`project`] / [`resolve_and_project`]: timeline derivation
//! - [`BellLoop`]: the fixed-interval trigger with dedup state
//! - [`Timetable`] / [`Config`]: file-backed data and tuning

pub mod bell;
pub mod catalog;
pub mod error;
pub mod events;
pub mod projector;
pub mod resolver;
pub mod schedule;
pub mod storage;

pub use bell::{BellLoop, BellLoopConfig, CallSink, FiredCall};
pub use catalog::{InMemoryCatalog, ScheduleCatalog};
pub use error::{CatalogError, ConfigError, CoreError, Result, ValidationError};
pub use events::Event;
pub use projector::{
    project, resolve_and_project, resolve_and_project_range, CallEvent, CallSource, CallType,
    DayTimetable, ProjectionConfig, ProjectionWarning, Timeline, TimelineSlot,
};
pub use resolver::{Resolution, ResolvedSchedule, ResolvedSource, ScheduleResolver};
pub use schedule::{
    Break, HolidaySchedule, Lesson, Schedule, ScheduleType, SpecialSchedule,
};
pub use storage::{Config, Timetable};
