use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use marble_race::{GameServer, RaceConfig, RaceResult};

#[derive(Parser)]
#[command(name = "marble-race", about = "Run a headless marble race and print the standings")]
struct Args {
    /// JSON race config; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of marbles
    #[arg(short, long)]
    marbles: Option<u32>,

    /// Number of checkpoints, the finish line included
    #[arg(long)]
    checkpoints: Option<usize>,

    /// Track length
    #[arg(short, long)]
    length: Option<f32>,

    /// RNG seed for a reproducible race
    #[arg(short, long)]
    seed: Option<u64>,

    /// Simulation step in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    step: f32,

    /// Give up after this many ticks
    #[arg(long, default_value_t = 60 * 60 * 10)]
    max_ticks: u64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RaceConfig::load(path)
            .with_context(|| format!("loading race config from {}", path.display()))?,
        None => RaceConfig::default(),
    };
    if let Some(marbles) = args.marbles {
        config.marble_count = marbles;
    }
    if let Some(checkpoints) = args.checkpoints {
        config.checkpoint_count = checkpoints;
    }
    if let Some(length) = args.length {
        config.track_length = length;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut server = GameServer::new();
    server.init_race(config).context("setting up race")?;
    server.start_race()?;

    let results = server.run_to_completion(args.step, args.max_ticks)?;

    if let Some(winner) = server.race().and_then(|race| race.winner()) {
        log::info!("Winner: {}", winner.name);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_table(&results);
    }

    Ok(())
}

fn print_table(results: &[RaceResult]) {
    println!("{:>3}  {:<12} {:>9}", "Pos", "Marble", "Time");
    for result in results {
        println!(
            "{:>3}  {:<12} {:>8.2}s",
            result.position, result.marble_name, result.finish_time
        );
    }
}
