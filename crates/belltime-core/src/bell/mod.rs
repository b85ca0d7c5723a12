//! Bell trigger loop.
//!
//! A single periodic task: on each tick it reads the wall clock,
//! re-derives today's timeline, and fires every call event inside the
//! tolerance window that has not already fired for this occurrence.
//! Ticks never overlap -- the next interval tick is not awaited until
//! the previous tick's logic has completed -- and no failure inside one
//! tick prevents the next from being scheduled.
//!
//! The clock-independent logic lives in [`BellLoop::tick`], which takes
//! `now` as a parameter so the window and dedup behavior are testable
//! without a runtime.

use std::collections::HashSet;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::catalog::ScheduleCatalog;
use crate::error::Result;
use crate::projector::{resolve_and_project, CallEvent, DayTimetable, ProjectionConfig};
use crate::resolver::ScheduleResolver;

/// Trigger-loop tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BellLoopConfig {
    /// Seconds between ticks.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    /// Half-width of the tolerance window around "now". A call at time
    /// T fires on a tick whose clock reading lies in `[T - Δ, T + Δ]`.
    #[serde(default = "default_tolerance")]
    pub tolerance_secs: u32,
}

fn default_tick_interval() -> u64 {
    60
}
fn default_tolerance() -> u32 {
    30
}

impl Default for BellLoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            tolerance_secs: default_tolerance(),
        }
    }
}

/// A call event the loop decided to fire, handed to the sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredCall {
    pub date: NaiveDate,
    pub call: CallEvent,
    pub fired_at: chrono::DateTime<Utc>,
}

/// External notification sink -- the audio/notify mechanism lives
/// behind this trait, outside the core.
pub trait CallSink: Send + Sync {
    /// Invoked exactly once per call occurrence. Errors are logged and
    /// never abort the tick.
    fn on_call_fired(&self, fired: &FiredCall) -> Result<()>;
}

impl<T: CallSink + ?Sized> CallSink for std::sync::Arc<T> {
    fn on_call_fired(&self, fired: &FiredCall) -> Result<()> {
        (**self).on_call_fired(fired)
    }
}

/// Identity of one call occurrence within a date. The same time-of-day
/// recurs every day, so the ledger holding these is cleared when the
/// date rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct OccurrenceKey {
    call_time: NaiveTime,
    call: CallEvent,
}

impl OccurrenceKey {
    fn of(call: &CallEvent) -> Self {
        // Call times are minute-granular by construction; truncating
        // here keeps the key stable even if a source ever carries
        // seconds.
        let call_time = call
            .call_time
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(call.call_time);
        Self { call_time, call: *call }
    }
}

/// Already-fired state for the current date.
#[derive(Debug, Default)]
struct FiredLedger {
    date: Option<NaiveDate>,
    keys: HashSet<OccurrenceKey>,
}

impl FiredLedger {
    /// Clear the ledger when the date changes.
    fn roll_to(&mut self, date: NaiveDate) {
        if self.date != Some(date) {
            self.date = Some(date);
            self.keys.clear();
        }
    }

    /// Mark an occurrence fired; returns false when it already was.
    fn mark(&mut self, key: OccurrenceKey) -> bool {
        self.keys.insert(key)
    }
}

/// The periodic bell trigger.
pub struct BellLoop<C, S> {
    resolver: ScheduleResolver<C>,
    projection: ProjectionConfig,
    config: BellLoopConfig,
    sink: S,
    fired: FiredLedger,
}

impl<C: ScheduleCatalog, S: CallSink> BellLoop<C, S> {
    pub fn new(
        resolver: ScheduleResolver<C>,
        projection: ProjectionConfig,
        config: BellLoopConfig,
        sink: S,
    ) -> Self {
        Self {
            resolver,
            projection,
            config,
            sink,
            fired: FiredLedger::default(),
        }
    }

    /// One tick of the trigger loop at the given clock reading.
    ///
    /// Returns the number of calls fired. Never fails: resolution and
    /// sink faults are logged and absorbed so the loop's recurrence is
    /// unconditional.
    pub fn tick(&mut self, now: NaiveDateTime) -> usize {
        let date = now.date();
        self.fired.roll_to(date);
        debug!(%now, "bell tick");

        let timetable = match resolve_and_project(&self.resolver, &self.projection, date) {
            Ok(t) => t,
            Err(err) => {
                warn!(%date, %err, "timeline derivation failed, skipping tick");
                return 0;
            }
        };
        let timeline = match timetable {
            DayTimetable::Timeline(timeline) => timeline,
            DayTimetable::NoSchoolDay { description, .. } => {
                debug!(%date, %description, "no-school day, nothing to ring");
                return 0;
            }
            DayTimetable::NotFound { .. } => {
                debug!(%date, "no schedule configured, nothing to ring");
                return 0;
            }
        };

        let (from, to) = self.window(now.time());
        let mut fired_count = 0;
        for call in timeline.calls_in_window(from, to) {
            if !self.fired.mark(OccurrenceKey::of(call)) {
                continue; // Already fired for this occurrence.
            }
            if !timeline.has_slot_for(&call.source) {
                warn!(?call, "call references missing lesson/break, skipping");
                continue;
            }
            let fired = FiredCall {
                date,
                call: *call,
                fired_at: Utc::now(),
            };
            info!(time = %call.call_time, call_type = ?call.call_type, "ringing bell");
            if let Err(err) = self.sink.on_call_fired(&fired) {
                warn!(%err, time = %call.call_time, "notification sink failed");
            }
            fired_count += 1;
        }
        fired_count
    }

    /// Tolerance window `[now - Δ, now + Δ]`, clamped to the day so the
    /// bounds never wrap across midnight.
    fn window(&self, now: NaiveTime) -> (NaiveTime, NaiveTime) {
        let tolerance = Duration::seconds(i64::from(self.config.tolerance_secs));
        let since_midnight = now.signed_duration_since(NaiveTime::MIN);
        let day_end = Duration::seconds(86_399);
        let from = NaiveTime::MIN + (since_midnight - tolerance).max(Duration::zero());
        let to = NaiveTime::MIN + (since_midnight + tolerance).min(day_end);
        (from, to)
    }

    /// Drive the loop on the configured fixed interval until the process
    /// shuts down. The single awaiting task guarantees no tick overlap;
    /// `MissedTickBehavior::Delay` keeps a slow tick from causing a
    /// burst of catch-up ticks.
    pub async fn run(mut self) {
        let period = std::time::Duration::from_secs(self.config.tick_interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = self.config.tick_interval_secs, "bell loop started");
        loop {
            ticker.tick().await;
            self.tick(Local::now().naive_local());
        }
    }
}
