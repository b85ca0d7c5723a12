use std::path::PathBuf;

use belltime_core::{ScheduleResolver, Timetable};
use chrono::NaiveDate;
use clap::Args;

#[derive(Args)]
pub struct ResolveArgs {
    /// Timetable document (TOML)
    pub timetable: PathBuf,
    /// Date to resolve (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub fn run(args: ResolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let catalog = Timetable::load(&args.timetable)?.into_catalog()?;
    let resolver = ScheduleResolver::new(catalog);
    let resolution = resolver.resolve(date)?;
    println!("{}", serde_json::to_string_pretty(&resolution)?);
    Ok(())
}
