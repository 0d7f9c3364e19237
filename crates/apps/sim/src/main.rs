use std::fs;
use std::path::PathBuf;

use clap::Parser;
use diorama::{Command, DioramaConfig, HeadlessDiorama};
use scene::Season;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs the four-seasons diorama headless and prints a snapshot")]
struct Args {
    /// JSON config file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting season (spring, summer, autumn, winter)
    #[arg(long)]
    season: Option<Season>,

    /// Start at night
    #[arg(long)]
    night: bool,

    /// Seconds of simulated time to run after the script
    #[arg(long, default_value_t = 1.0)]
    seconds: f64,

    /// Frame step in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// JSON array of input commands replayed before the run
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => DioramaConfig::from_json(&fs::read_to_string(path)?)?,
        None => DioramaConfig::default(),
    };
    if let Some(season) = args.season {
        config.season = season;
    }
    config.night |= args.night;

    let mut d = HeadlessDiorama::headless(config)?;
    if let Some(path) = &args.script {
        let script = Command::script_from_json(&fs::read_to_string(path)?)?;
        info!(commands = script.len(), "replaying script");
        for command in &script {
            command.apply(&mut d)?;
        }
    }
    Command::Wait {
        seconds: args.seconds,
        dt_s: args.dt,
    }
    .apply(&mut d)?;

    println!("{}", serde_json::to_string_pretty(&d.snapshot())?);
    Ok(())
}
