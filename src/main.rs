//! ASCII Zoo entry point
//!
//! Loads a scenario (or the built-in sample) and runs it headless, logging
//! deaths and sound cues until nothing is left to chase. Entering a line on
//! stdin stops the run early; `--max-ticks` bounds unattended runs.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;

use asciizoo::audio::LogAudio;
use asciizoo::{FramePacer, Scenario, SimConfig, StopHandle};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario JSON file (defaults to the built-in sample)
    scenario: Option<PathBuf>,

    /// Settings JSON file overriding the scenario's settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for random placement
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Stop after this many ticks
    #[arg(short = 'n', long)]
    max_ticks: Option<u64>,

    /// Ticks per second (0 runs as fast as possible)
    #[arg(long)]
    fps: Option<u32>,

    /// Don't log sound cues
    #[arg(long)]
    mute: bool,

    /// Print a JSON snapshot of every animal at the end
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path).with_context(|| format!("loading scenario {}", path.display()))?,
        None => {
            log::info!("No scenario given, running the sample");
            Scenario::sample()
        }
    };
    if let Some(path) = &args.config {
        scenario.config = SimConfig::load(path).with_context(|| format!("loading settings {}", path.display()))?;
    }
    if let Some(fps) = args.fps {
        scenario.config.fps = fps;
    }

    let mut engine = scenario.build(args.seed).context("building scenario")?;
    let mut audio = LogAudio::new();
    audio.set_muted(args.mute);
    engine.set_audio(Box::new(audio));

    let stop = StopHandle::new();
    watch_stdin(stop.clone());
    let mut pacer = FramePacer::new(engine.config.fps);
    let outcome = engine.run(&stop, &mut pacer, args.max_ticks)?;

    println!("{}", outcome.headline());
    for survivor in &outcome.survivors {
        println!("  {survivor}");
    }
    if args.dump {
        println!("{}", serde_json::to_string_pretty(&engine.snapshots())?);
    }
    Ok(())
}

/// Stop the run once a line is entered. A closed stdin never stops it.
fn watch_stdin(stop: StopHandle) {
    thread::spawn(move || {
        let mut line = String::new();
        if matches!(io::stdin().lock().read_line(&mut line), Ok(n) if n > 0) {
            log::info!("Stop requested");
            stop.stop();
        }
    });
}
