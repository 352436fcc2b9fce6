//! Simulation settings
//!
//! Loaded from JSON; any field left out keeps its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;
use crate::sim::Arena;

/// Tunable simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed step handed to every tick
    pub time_step: f64,
    /// Target ticks per second for the run loop (0 = unpaced)
    pub fps: u32,
    pub arena: Arena,
    /// Length of the death animation in frames
    pub death_frames: u32,
    /// Speed a dying animal is launched away at
    pub exit_speed: f64,
    /// Mass walls collide with
    pub wall_mass: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_step: TIME_STEP,
            fps: FPS,
            arena: Arena::default(),
            death_frames: DEATH_FRAMES,
            exit_speed: EXIT_SPEED,
            wall_mass: WALL_MASS,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_json(&fs::read_to_string(path)?)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
