//! Astro Drift - headless runner
//!
//! Runs the world loop in real time with a simple autopilot at the controls
//! and records the final score on the leaderboard.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use astro_drift::platform::{FrameSink, forward_frames, spawn_world};
use astro_drift::sim::{EntityKind, Frame, HeldInput, ScreenBounds, World};
use astro_drift::highscores::HighScoreEntry;
use astro_drift::{HighScores, Ruleset, Settings, normalize_degrees};

#[derive(Parser, Debug)]
#[command(name = "astro-drift")]
#[command(about = "Headless asteroid-field shooter driven by a fixed-rate world loop")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play one round with the autopilot
    Run {
        #[arg(long, default_value_t = 1080)]
        width: i32,
        #[arg(long, default_value_t = 1920)]
        height: i32,
        /// World seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many seconds even if the craft survives
        #[arg(long, default_value_t = 30)]
        seconds: u64,
        /// `classic` or `corrected`; overrides the settings file
        #[arg(long)]
        ruleset: Option<Ruleset>,
        /// Settings JSON file
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Break shot obstacles into smaller pieces
        #[arg(long)]
        split: bool,
        /// High score JSON file
        #[arg(long, default_value = "highscores.json")]
        scores: PathBuf,
        /// Print every frame to stdout as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Print the leaderboard of every ruleset played so far
    Scores {
        #[arg(long, default_value = "highscores.json")]
        scores: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Commands::Run {
            width,
            height,
            seed,
            seconds,
            ruleset,
            settings,
            split,
            scores,
            json,
        } => {
            let mut config = match settings {
                Some(path) => Settings::load(&path)?,
                None => Settings::default(),
            };
            if let Some(preset) = ruleset {
                config.apply_preset(preset);
            }
            if split {
                config.split_obstacles = true;
            }
            let bounds = ScreenBounds::new(width, height)?;
            let seed = seed.unwrap_or_else(now_ms);
            run(seed, bounds, config, Duration::from_secs(seconds), &scores, json).await
        }
        Commands::Scores { scores } => print_scores(&scores),
    }
}

async fn run(
    seed: u64,
    bounds: ScreenBounds,
    settings: Settings,
    limit: Duration,
    scores_path: &Path,
    json: bool,
) -> Result<()> {
    log::info!(
        "Starting run: seed {seed}, {}x{}, ruleset {}",
        bounds.width(),
        bounds.height(),
        settings.ruleset.as_str()
    );
    let turn_rate = settings.tuning.player_turn_rate;
    let ruleset = settings.ruleset;
    let handle = spawn_world(World::new(seed, bounds, settings))?;

    let frames = handle.subscribe_frames();
    let sink = tokio::spawn(async move {
        let mut sink = if json {
            Sink::Json(std::io::stdout())
        } else {
            Sink::Count(0)
        };
        forward_frames(frames, &mut sink).await;
        sink
    });

    handle.start().await?;

    let mut frames = handle.subscribe_frames();
    let deadline = tokio::time::sleep(limit);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => {
                log::info!("Time limit reached");
                break;
            }
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = frames.borrow_and_update().clone();
                if !frame.player_alive {
                    break;
                }
                handle.send_input(autopilot(&frame, turn_rate)).await?;
            }
        }
    }

    let world = handle.join().await?;
    let sink = sink.await.context("frame sink task failed")?;
    if let Sink::Count(count) = sink {
        log::debug!("{count} frames published");
    }

    let outcome = if world.is_over() { "destroyed" } else { "survived" };
    eprintln!(
        "Craft {outcome} after {} ticks with score {}",
        world.time_ticks, world.score
    );

    let mut board = HighScores::load(scores_path)?;
    let best = board.top_score(ruleset);
    let entry = HighScoreEntry {
        score: world.score,
        ticks: world.time_ticks,
        seed,
        timestamp_ms: now_ms(),
    };
    match board.add_score(ruleset, entry) {
        Some(rank) => {
            board.save(scores_path)?;
            eprintln!("New {} high score, rank #{rank}", ruleset.as_str());
        }
        None => eprintln!("Score did not make the {} leaderboard", ruleset.as_str()),
    }
    if let Some(best) = best.filter(|best| *best > world.score) {
        eprintln!("Best {} score so far: {best}", ruleset.as_str());
    }
    Ok(())
}

fn print_scores(path: &Path) -> Result<()> {
    let board = HighScores::load(path)?;
    if board.is_empty() {
        println!("No high scores yet");
        return Ok(());
    }
    for ruleset in board.rulesets() {
        println!("{}:", ruleset.as_str());
        for (i, entry) in board.board(ruleset).iter().enumerate() {
            println!(
                "{:>2}. {:>6}  ({} ticks, seed {})",
                i + 1,
                entry.score,
                entry.ticks,
                entry.seed
            );
        }
    }
    Ok(())
}

/// Where published frames end up
enum Sink {
    Json(std::io::Stdout),
    Count(u64),
}

impl FrameSink for Sink {
    fn draw(&mut self, frame: &Frame) {
        match self {
            Sink::Json(out) => match serde_json::to_string(frame) {
                Ok(line) => {
                    if let Err(e) = writeln!(out, "{line}") {
                        log::warn!("Failed to write frame: {e}");
                    }
                }
                Err(e) => log::warn!("Failed to encode frame {}: {e}", frame.tick),
            },
            Sink::Count(count) => *count += 1,
        }
    }
}

/// Turn toward the nearest obstacle and shoot once roughly lined up
fn autopilot(frame: &Frame, turn_rate: f32) -> HeldInput {
    let Some(ship) = frame.player() else {
        return HeldInput::default();
    };

    let nearest = frame
        .sprites
        .iter()
        .filter(|s| s.kind == EntityKind::Obstacle)
        .min_by_key(|s| {
            let dx = i64::from(s.x - ship.x);
            let dy = i64::from(s.y - ship.y);
            dx * dx + dy * dy
        });
    let Some(target) = nearest else {
        return HeldInput::default();
    };

    // Screen y grows down, headings grow counter-clockwise
    let dx = (target.x - ship.x) as f32;
    let dy = (ship.y - target.y) as f32;
    let bearing = normalize_degrees(dy.atan2(dx).to_degrees());
    let error = normalize_degrees(bearing - ship.rotation + 180.0) - 180.0;

    HeldInput {
        thrust: false,
        rotate_left: error > turn_rate / 2.0,
        rotate_right: error < -turn_rate / 2.0,
        fire: error.abs() < 15.0,
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
