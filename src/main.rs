//! Tilt Maze entry point
//!
//! Runs a headless session driven by a simulated tilt sensor, then prints
//! the final maze and the leaderboard.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use tilt_maze::Settings;
use tilt_maze::persistence::FileStore;
use tilt_maze::platform::{Runtime, SimulatedTilt};
use tilt_maze::sim::{GameSession, SessionEvent};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless tilt maze session", long_about = None)]
struct Args {
    /// Settings file (JSON); defaults are used when missing
    #[arg(long, value_name = "FILE", default_value = "settings.json")]
    settings: PathBuf,

    /// Highscore file, one `name,score` record per line
    #[arg(long, value_name = "FILE", default_value = "highscores.txt")]
    scores: PathBuf,

    #[arg(short, long, default_value = "Player")]
    player: String,

    /// Wall-clock length of the run
    #[arg(long, value_name = "SECONDS", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    seconds: u64,

    /// Maze seed, overriding the settings file
    #[arg(long)]
    seed: Option<u64>,

    /// Countdown tick length, overriding the settings file
    #[arg(long, value_name = "MILLIS", value_parser = clap::value_parser!(u64).range(1..=60_000))]
    tick_ms: Option<u64>,

    /// Interval between simulated tilt readings
    #[arg(long, value_name = "MILLIS", default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..=1_000))]
    tilt_ms: u64,

    /// Merge a batch of remote `name,score` records before playing
    #[arg(long, value_name = "FILE")]
    merge: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    write_settings: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("Tilt Maze (headless) starting...");

    let mut settings = Settings::load(&args.settings);
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(tick_ms) = args.tick_ms {
        settings.tick_interval_ms = tick_ms;
    }
    if args.write_settings {
        settings
            .save(&args.settings)
            .with_context(|| format!("saving settings to {}", args.settings.display()))?;
    }

    let mut store = FileStore::open(&args.scores)?;
    log::info!("Highscores in {}", store.path().display());
    if let Some(path) = &args.merge {
        let batch = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let report = store.merge_batch(&batch)?;
        log::info!(
            "Merged {}: {} changed, {} unchanged, {} rejected",
            path.display(),
            report.changed,
            report.unchanged,
            report.rejected.len()
        );
    }

    let config = settings.session_config();
    log::info!("Seed {}", config.seed);
    let session = GameSession::new(args.player.as_str(), store, config)
        .with_context(|| format!("invalid player name {:?}", args.player))?;
    let tilt = SimulatedTilt::new(Duration::from_millis(args.tilt_ms), 1.0, config.seed);
    let runtime = Runtime::start(session, Box::new(tilt), settings.tick_interval());

    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        let event = match runtime.events().recv_timeout(left) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        match event {
            SessionEvent::GoalReached { score } => println!("Goal! score {}", score),
            SessionEvent::FellInHole => println!("Fell into a hole"),
            SessionEvent::NewHighscore { highscore } => println!("New highscore: {}", highscore),
            SessionEvent::RoundExpired { score } => println!("Time's up at score {}", score),
            SessionEvent::Paused | SessionEvent::Resumed | SessionEvent::Restarted => {}
        }
    }

    let session = runtime.shutdown()?;
    println!("\n{}", session.grid());
    println!(
        "{}: score {} (tier {}), highscore {}",
        session.player(),
        session.score(),
        session.difficulty_tier(),
        session.highscore()
    );
    println!("\nLeaderboard");
    for line in session.store().roster().leaderboard_lines() {
        println!("  {}", line);
    }
    Ok(())
}
