//! ASCII Zoo - predator/prey physics for a 2D animal arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (animals, walls, collisions, targeting, tick)
//! - `engine`: Fixed-step run loop, frame pacing and stop signal
//! - `audio`: Discrete sound cues emitted by the simulation
//! - `settings`: Data-driven simulation constants
//! - `scenario`: Building a population from a scenario description

pub mod audio;
pub mod engine;
pub mod error;
pub mod scenario;
pub mod settings;
pub mod sim;

pub use engine::{Engine, FramePacer, Outcome, StopHandle};
pub use error::{Result, SimError};
pub use scenario::{AnimalSpec, Placement, Scenario};
pub use settings::SimConfig;

use glam::{DMat2, DVec2};

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (not wall-clock derived)
    pub const TIME_STEP: f64 = 0.3;
    /// Target frame rate of the run loop
    pub const FPS: u32 = 30;

    /// Arena dimensions
    pub const ARENA_WIDTH: f64 = 600.0;
    pub const ARENA_HEIGHT: f64 = 600.0;
    /// Wall insets, leaving room for the text overlay
    pub const MARGIN_TOP: f64 = 35.0;
    pub const MARGIN_LEFT: f64 = 30.0;
    pub const MARGIN_BOTTOM: f64 = 4.0;
    pub const MARGIN_RIGHT: f64 = 30.0;

    /// Walls are immovable bodies of this mass
    pub const WALL_MASS: f64 = 1e15;

    /// Number of frames the death animation lasts
    pub const DEATH_FRAMES: u32 = 20;
    /// Speed a dying animal is launched away at
    pub const EXIT_SPEED: f64 = 200.0;

    /// Animal defaults
    pub const DEFAULT_MAX_HEALTH: f64 = 10.0;
    pub const DEFAULT_MAX_SPEED: f64 = 50.0;
    pub const DEFAULT_MASS: f64 = 1.0;
    pub const DEFAULT_EXERTION: f64 = 20.0;
    pub const DEFAULT_DAMAGE: f64 = 1.0;
    pub const DEFAULT_WIDTH: f64 = 10.0;
    pub const DEFAULT_HEIGHT: f64 = 14.0;

    /// Named speeds accepted by the `speed` override
    pub const SPEED_SLOW: f64 = 25.0;
    pub const SPEED_MEDIUM: f64 = 50.0;
    pub const SPEED_FAST: f64 = 100.0;
}

/// Unit vector along `v`, or `DegenerateDirection` when `v` has zero length
#[inline]
pub fn try_normalize(v: DVec2) -> Result<DVec2> {
    let len = v.length();
    if len == 0.0 || !len.is_finite() {
        return Err(SimError::DegenerateDirection);
    }
    Ok(v / len)
}

/// Rotation taking world space into the frame whose x-axis is `axis`.
///
/// Applying the result to `axis` yields `(|axis|, 0)`. The inverse
/// (`.transpose()`, since the matrix is orthonormal) maps back to world space.
pub fn frame_rotation(axis: DVec2) -> Result<DMat2> {
    if axis.length_squared() == 0.0 {
        return Err(SimError::DegenerateDirection);
    }
    let phi = axis.y.atan2(axis.x);
    Ok(DMat2::from_angle(-phi))
}

/// Snap `p` to the nearest integer grid point lying in `direction`.
///
/// Each component rounds up when the direction component is positive and
/// down otherwise.
#[inline]
pub fn snap_to_grid_in_direction(p: DVec2, direction: DVec2) -> DVec2 {
    let snap = |v: f64, d: f64| if d > 0.0 { v.ceil() } else { v.floor() };
    DVec2::new(snap(p.x, direction.x), snap(p.y, direction.y))
}
