use std::path::PathBuf;

use belltime_core::{
    BellLoop, CallSink, Config, Event, FiredCall, Result as CoreResult, ScheduleResolver,
    Timetable,
};
use clap::Args;

/// Emits each fired call as a JSON line on stdout.
struct StdoutSink;

impl CallSink for StdoutSink {
    fn on_call_fired(&self, fired: &FiredCall) -> CoreResult<()> {
        let line = serde_json::to_string(&Event::from(fired))?;
        println!("{line}");
        Ok(())
    }
}

#[derive(Args)]
pub struct RingArgs {
    /// Timetable document (TOML)
    pub timetable: PathBuf,
    /// Config file overriding `~/.config/belltime/config.toml`
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: RingArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(),
    };
    let catalog = Timetable::load(&args.timetable)?.into_catalog()?;
    let resolver = ScheduleResolver::new(catalog);
    let bell = BellLoop::new(resolver, config.projection, config.bell, StdoutSink);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(bell.run());
    Ok(())
}
