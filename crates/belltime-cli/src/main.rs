use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "belltime-cli", version, about = "Belltime CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the authoritative schedule for a date
    Resolve(commands::resolve::ResolveArgs),
    /// Project a day (or range) into slots and call events
    Timeline(commands::timeline::TimelineArgs),
    /// Validate a timetable document
    Validate(commands::validate::ValidateArgs),
    /// Run the bell trigger loop
    Ring(commands::ring::RingArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Timeline(args) => commands::timeline::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Ring(args) => commands::ring::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
