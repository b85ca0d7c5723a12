use std::path::PathBuf;

use belltime_core::Timetable;
use clap::Args;

#[derive(Args)]
pub struct ValidateArgs {
    /// Timetable document (TOML)
    pub timetable: PathBuf,
}

pub fn run(args: ValidateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let timetable = Timetable::load(&args.timetable)?;
    // Catalog construction also checks cross-references (special
    // schedules pointing at missing base schedules).
    timetable.clone().into_catalog()?;
    println!(
        "ok: {} schedules, {} special schedules, {} holidays",
        timetable.schedules.len(),
        timetable.special_schedules.len(),
        timetable.holidays.len()
    );
    Ok(())
}
