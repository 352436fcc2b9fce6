//! Sound cues
//!
//! The simulation never plays audio itself. It queues discrete cues during a
//! tick and the engine hands them to an [`AudioSink`] once the tick is done.

use serde::{Deserialize, Serialize};

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// An animal started dying
    Death,
    /// A hunter hit its prey
    Collision,
}

impl SoundCue {
    pub const ALL: [SoundCue; 2] = [SoundCue::Death, SoundCue::Collision];
}

/// Cues raised during one tick, at most one of each kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueQueue {
    death: bool,
    collision: bool,
}

impl CueQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cue: SoundCue) {
        match cue {
            SoundCue::Death => self.death = true,
            SoundCue::Collision => self.collision = true,
        }
    }

    pub fn contains(&self, cue: SoundCue) -> bool {
        match cue {
            SoundCue::Death => self.death,
            SoundCue::Collision => self.collision,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.death && !self.collision
    }

    /// Take the queued cues, leaving the queue empty
    pub fn drain(&mut self) -> Vec<SoundCue> {
        let cues = SoundCue::ALL.into_iter().filter(|c| self.contains(*c)).collect();
        *self = Self::default();
        cues
    }

    /// Play every queued cue once, then clear
    pub fn flush(&mut self, sink: &mut dyn AudioSink) -> Vec<SoundCue> {
        let cues = self.drain();
        for cue in &cues {
            sink.play(*cue);
        }
        cues
    }
}

/// Something that can play sound cues
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Drops every cue
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Reports cues through the log, for headless runs
#[derive(Debug)]
pub struct LogAudio {
    muted: bool,
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl LogAudio {
    pub fn new() -> Self {
        Self { muted: false }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        if self.muted {
            return;
        }
        match cue {
            SoundCue::Death => log::info!("♪ death scream"),
            SoundCue::Collision => log::info!("♪ punch"),
        }
    }
}

/// Records cues in order; handy for tests and replays
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<SoundCue>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue) {
        self.played.push(cue);
    }
}
