//! Engine: owns one simulation and drives it tick by tick
//!
//! Each [`Engine`] carries its own audio sink and cue queue, so several
//! simulations can coexist in one process.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::audio::{AudioSink, CueQueue, NullAudio, SoundCue};
use crate::error::Result;
use crate::settings::SimConfig;
use crate::sim::{AnimalSnapshot, SimState, TickReport, tick};

/// External request to stop the run loop after the current tick
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Paces ticks to a target rate by sleeping out the rest of each frame
#[derive(Debug)]
pub struct FramePacer {
    frame: Option<Duration>,
    last: Option<Instant>,
}

impl FramePacer {
    /// `fps == 0` never sleeps
    pub fn new(fps: u32) -> Self {
        Self {
            frame: (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64)),
            last: None,
        }
    }

    pub fn unpaced() -> Self {
        Self::new(0)
    }

    /// Block until the current frame is over
    pub fn wait(&mut self) {
        let Some(frame) = self.frame else {
            return;
        };
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < frame {
                thread::sleep(frame - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub ticks: u64,
    /// Whether the run ended because nothing was left to chase
    pub completed: bool,
    /// Labels of the animals still alive at the end
    pub survivors: Vec<String>,
}

impl Outcome {
    /// Summary line for the end screen
    pub fn headline(&self) -> String {
        match self.survivors.len() {
            0 => "All errors were killed during the simulation.".to_string(),
            1 => "Simulation complete. The prevailing error is:".to_string(),
            _ => "Simulation complete. The prevailing errors are:".to_string(),
        }
    }
}

/// A simulation with its config and audio output
pub struct Engine {
    pub state: SimState,
    pub config: SimConfig,
    cues: CueQueue,
    audio: Box<dyn AudioSink>,
}

impl Engine {
    pub fn new(config: SimConfig) -> Self {
        Self {
            state: SimState::new(config.arena),
            config,
            cues: CueQueue::new(),
            audio: Box::new(NullAudio),
        }
    }

    pub fn set_audio(&mut self, audio: Box<dyn AudioSink>) {
        self.audio = audio;
    }

    /// Run one tick and play the cues it raised
    pub fn step(&mut self) -> Result<(TickReport, Vec<SoundCue>)> {
        let report = tick(&mut self.state, &self.config, &mut self.cues)?;
        let played = self.cues.flush(&mut *self.audio);
        Ok((report, played))
    }

    /// Tick until stopped, completed, or `max_ticks` is reached.
    ///
    /// Errors from a tick end the run immediately.
    pub fn run(&mut self, stop: &StopHandle, pacer: &mut FramePacer, max_ticks: Option<u64>) -> Result<Outcome> {
        let start = self.state.time_ticks;
        let mut completed = false;
        log::info!("Starting run with {} animals", self.state.animals().len());

        while !stop.is_stopped() {
            if max_ticks.is_some_and(|max| self.state.time_ticks - start >= max) {
                log::info!("Tick limit reached");
                break;
            }
            pacer.wait();
            let (report, _) = self.step()?;
            if report.completed {
                completed = true;
                break;
            }
        }

        let outcome = Outcome {
            ticks: self.state.time_ticks - start,
            completed,
            survivors: self.survivors(),
        };
        log::info!("Run finished after {} ticks (completed: {})", outcome.ticks, outcome.completed);
        Ok(outcome)
    }

    /// Labels of live animals
    pub fn survivors(&self) -> Vec<String> {
        self.state.live().filter_map(|a| a.label.clone()).collect()
    }

    pub fn snapshots(&self) -> Vec<AnimalSnapshot> {
        self.state.snapshots(self.config.death_frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use std::sync::Mutex;

    /// Sink that shares what it played with the test
    struct SharedAudio(Arc<Mutex<Vec<SoundCue>>>);

    impl AudioSink for SharedAudio {
        fn play(&mut self, cue: SoundCue) {
            if let Ok(mut played) = self.0.lock() {
                played.push(cue);
            }
        }
    }

    fn duel() -> Engine {
        let mut engine = Engine::new(SimConfig::default());
        let a = {
            let a = engine.state.spawn("a").unwrap();
            a.set_max_health(2.0);
            a.label = Some("E501 in a.py line 1".into());
            a.put(200.0, 300.0);
            a.id
        };
        let b = {
            let b = engine.state.spawn("b").unwrap();
            b.set_max_health(2.0);
            b.label = Some("W291 in b.py line 9".into());
            b.put(400.0, 300.0);
            b.id
        };
        engine.state.add_prey(a, &[b]).unwrap();
        engine.state.add_prey(b, &[a]).unwrap();
        engine
    }

    #[test]
    fn test_empty_engine_completes_immediately() {
        let mut engine = Engine::new(SimConfig::default());
        let outcome = engine
            .run(&StopHandle::new(), &mut FramePacer::unpaced(), Some(10))
            .unwrap();
        assert!(outcome.completed);
        assert_eq!(outcome.ticks, 1);
        assert!(outcome.survivors.is_empty());
        assert_eq!(outcome.headline(), "All errors were killed during the simulation.");
    }

    #[test]
    fn test_stop_handle_halts_before_first_tick() {
        let mut engine = duel();
        let stop = StopHandle::new();
        stop.stop();
        let outcome = engine.run(&stop, &mut FramePacer::unpaced(), None).unwrap();
        assert_eq!(outcome.ticks, 0);
        assert!(!outcome.completed);
    }

    #[test]
    fn test_stop_handle_from_another_thread() {
        let mut engine = duel();
        let stop = StopHandle::new();
        let remote = stop.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.stop();
        });
        // Paced slowly enough that the duel cannot finish first
        let outcome = engine.run(&stop, &mut FramePacer::new(10), None).unwrap();
        stopper.join().unwrap();
        assert!(!outcome.completed);
        assert!(outcome.ticks >= 1);
    }

    #[test]
    fn test_tick_limit() {
        let mut engine = duel();
        let outcome = engine
            .run(&StopHandle::new(), &mut FramePacer::unpaced(), Some(3))
            .unwrap();
        assert_eq!(outcome.ticks, 3);
        assert!(!outcome.completed);
        assert_eq!(outcome.survivors.len(), 2);
        assert_eq!(outcome.headline(), "Simulation complete. The prevailing errors are:");
    }

    #[test]
    fn test_duel_plays_coalesced_cues() {
        let played = Arc::new(Mutex::new(Vec::new()));
        let mut engine = duel();
        engine.set_audio(Box::new(SharedAudio(played.clone())));

        let outcome = engine
            .run(&StopHandle::new(), &mut FramePacer::unpaced(), Some(2_000))
            .unwrap();
        assert!(outcome.completed);

        let played = played.lock().unwrap();
        assert!(played.contains(&SoundCue::Collision));
        assert!(played.contains(&SoundCue::Death));
    }

    #[test]
    fn test_step_flushes_once_per_tick() {
        let mut engine = duel();
        engine.set_audio(Box::new(RecordingAudio::default()));
        // Overlap so the first tick bites both ways
        engine.state.get_mut(crate::sim::AnimalId(2)).unwrap().put(205.0, 300.0);
        let (_, played) = engine.step().unwrap();
        assert_eq!(played, vec![SoundCue::Collision]);

        // They close in again and finish each other off: both cues, once each
        let (report, played) = engine.step().unwrap();
        assert_eq!(played, vec![SoundCue::Death, SoundCue::Collision]);
        assert!(report.completed);
    }

    #[test]
    fn test_pacer_sleeps_between_frames() {
        let mut pacer = FramePacer::new(100);
        let start = Instant::now();
        for _ in 0..3 {
            pacer.wait();
        }
        assert!(start.elapsed() >= Duration::from_millis(19));
    }
}
