use std::path::PathBuf;

use belltime_core::{
    resolve_and_project, resolve_and_project_range, Config, ScheduleResolver, Timetable,
};
use chrono::NaiveDate;
use clap::Args;

#[derive(Args)]
pub struct TimelineArgs {
    /// Timetable document (TOML)
    pub timetable: PathBuf,
    /// Date to project (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Project every day up to this date inclusive
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Config file overriding `~/.config/belltime/config.toml`
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: TimelineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(),
    };
    let catalog = Timetable::load(&args.timetable)?.into_catalog()?;
    let resolver = ScheduleResolver::new(catalog);

    match args.end {
        Some(end) => {
            let days = resolve_and_project_range(&resolver, &config.projection, date, end)?;
            println!("{}", serde_json::to_string_pretty(&days)?);
        }
        None => {
            let day = resolve_and_project(&resolver, &config.projection, date)?;
            println!("{}", serde_json::to_string_pretty(&day)?);
        }
    }
    Ok(())
}
