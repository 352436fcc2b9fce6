//! Animal entity: kinematics, forces, health and lifecycle
//!
//! Animals never own each other. Predator/prey relations are sets of
//! [`AnimalId`]s that the tick prunes against the live population.

use std::collections::BTreeSet;
use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::try_normalize;

/// Stable identity of an animal within one simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnimalId(pub u32);

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    /// Participates in collisions and targeting
    Alive,
    /// Playing the death animation; still moves but interacts with nothing
    Dying,
    /// Dropped from the simulation
    Removed,
}

/// How a renderer should draw the animal, derived from death animation progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualTransform {
    pub scale: f64,
    pub rotation_degrees: f64,
    /// 0-255
    pub alpha: f64,
}

/// A mobile circular agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    pub id: AnimalId,
    pub name: String,
    pub shape: String,
    pub color: String,
    /// External finding this animal stands for, reported if it survives
    pub label: Option<String>,

    pub pos: DVec2,
    vel: DVec2,
    pub mass: f64,
    width: f64,
    height: f64,
    /// Collision extent, `min(width, height)`
    pub radius: f64,

    /// Above this speed the brake force kicks in
    pub max_speed: f64,
    pub propulsion_magnitude: f64,
    pub brake_magnitude: f64,
    pub propulsion_force: DVec2,
    pub brake_force: DVec2,

    max_health: f64,
    health: f64,
    /// Damage dealt to prey on contact
    pub damage: f64,

    prey: BTreeSet<AnimalId>,
    pub(crate) focus: Option<AnimalId>,

    phase: Phase,
    death_frames: u32,
    /// Direction pointing away from the last body this animal collided with
    pub last_impact: Option<DVec2>,
}

impl Animal {
    pub fn new(id: AnimalId, name: impl Into<String>) -> Self {
        let width = DEFAULT_WIDTH;
        let height = DEFAULT_HEIGHT;
        Self {
            id,
            name: name.into(),
            shape: ".".to_string(),
            color: "white".to_string(),
            label: None,
            pos: DVec2::ZERO,
            vel: DVec2::ZERO,
            mass: DEFAULT_MASS,
            width,
            height,
            radius: width.min(height),
            max_speed: DEFAULT_MAX_SPEED,
            propulsion_magnitude: DEFAULT_EXERTION,
            brake_magnitude: DEFAULT_EXERTION,
            propulsion_force: DVec2::ZERO,
            brake_force: DVec2::ZERO,
            max_health: DEFAULT_MAX_HEALTH,
            health: DEFAULT_MAX_HEALTH,
            damage: DEFAULT_DAMAGE,
            prey: BTreeSet::new(),
            focus: None,
            phase: Phase::Alive,
            death_frames: 0,
            last_impact: None,
        }
    }

    /// Set the visual bounds; the collision radius follows them
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.radius = self.width.min(self.height);
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Reset health to a new maximum (full health)
    /// Resets health to full. Negative values are treated as zero.
    pub fn set_max_health(&mut self, max_health: f64) {
        self.max_health = max_health.max(0.0);
        self.health = self.max_health;
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Reduce health, never below zero. Phase changes are the tick's business.
    pub fn apply_damage(&mut self, amount: f64) {
        self.health = (self.health - amount).max(0.0);
    }

    // === Relations ===

    /// Add animals this one wants to eat
    pub fn add_prey<I>(&mut self, prey: I) -> Result<()>
    where
        I: IntoIterator<Item = AnimalId>,
    {
        for id in prey {
            if id == self.id {
                return Err(SimError::InvalidRelation { animal: self.id });
            }
            self.prey.insert(id);
        }
        Ok(())
    }

    /// Replace the whole prey set
    pub fn set_prey(&mut self, prey: BTreeSet<AnimalId>) -> Result<()> {
        if prey.contains(&self.id) {
            return Err(SimError::InvalidRelation { animal: self.id });
        }
        self.prey = prey;
        Ok(())
    }

    pub fn wants_to_eat(&self, other: AnimalId) -> bool {
        self.prey.contains(&other)
    }

    pub fn prey(&self) -> &BTreeSet<AnimalId> {
        &self.prey
    }

    /// Keep only prey present in `live`
    pub fn retain_prey(&mut self, live: &BTreeSet<AnimalId>) {
        self.prey.retain(|id| live.contains(id));
    }

    pub fn focus(&self) -> Option<AnimalId> {
        self.focus
    }

    // === Kinematics ===

    pub fn velocity(&self) -> DVec2 {
        self.vel
    }

    pub fn speed(&self) -> f64 {
        self.vel.length()
    }

    /// Store a new velocity, braking only if the previous one was over the cap
    pub fn set_velocity(&mut self, velocity: DVec2) {
        let speed = self.speed();
        self.brake_force = if speed > self.max_speed {
            -self.vel / speed * self.brake_magnitude
        } else {
            DVec2::ZERO
        };
        self.vel = velocity;
    }

    /// Forward Euler step
    pub fn integrate(&mut self, dt: f64) {
        let acceleration = (self.propulsion_force + self.brake_force) / self.mass;
        self.set_velocity(self.vel + acceleration * dt);
        self.pos += self.vel * dt;
    }

    pub fn put(&mut self, x: f64, y: f64) {
        self.pos = DVec2::new(x, y);
    }

    /// Place at a percentage of the arena size
    pub fn put_relative(&mut self, x_percent: f64, y_percent: f64, width: f64, height: f64) -> Result<()> {
        for p in [x_percent, y_percent] {
            if !(0.0..=100.0).contains(&p) {
                return Err(SimError::InvalidPlacement(p));
            }
        }
        self.put(width * x_percent / 100.0, height * y_percent / 100.0);
        Ok(())
    }

    pub fn vector_to(&self, other: &Animal) -> DVec2 {
        other.pos - self.pos
    }

    pub fn distance_to(&self, other: &Animal) -> f64 {
        self.vector_to(other).length()
    }

    pub fn normalized_vector_to(&self, other: &Animal) -> Result<DVec2> {
        try_normalize(self.vector_to(other))
    }

    /// True once the bounding box no longer touches the area grown by half a box
    pub fn is_off_bounds(&self, area_width: f64, area_height: f64) -> bool {
        self.pos.x < -self.width
            || self.pos.y < -self.height
            || self.pos.x > area_width + self.width
            || self.pos.y > area_height + self.height
    }

    // === Lifecycle ===

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_alive(&self) -> bool {
        self.phase == Phase::Alive
    }

    /// Alive -> Dying, launching the animal away at `exit_speed`.
    ///
    /// Direction is the current heading; a motionless animal falls back to
    /// the direction away from its last impact, then to straight up.
    pub(crate) fn begin_dying(&mut self, exit_speed: f64) {
        if self.phase != Phase::Alive {
            return;
        }
        let heading = try_normalize(self.vel)
            .ok()
            .or(self.last_impact)
            .unwrap_or(DVec2::NEG_Y);
        self.set_velocity(heading * exit_speed);
        self.propulsion_force = DVec2::ZERO;
        self.phase = Phase::Dying;
    }

    pub(crate) fn mark_removed(&mut self) {
        self.phase = Phase::Removed;
        self.focus = None;
        self.prey.clear();
    }

    /// Advance the death animation by one frame (no-op unless dying)
    pub fn advance_animation(&mut self) {
        if self.phase == Phase::Dying {
            self.death_frames += 1;
        }
    }

    pub fn death_frames(&self) -> u32 {
        self.death_frames
    }

    pub fn death_animation_finished(&self, total_frames: u32) -> bool {
        self.death_frames > total_frames
    }

    /// Scale and rotation grow with animation progress; opacity fades to zero
    pub fn visual_transform(&self, total_frames: u32) -> VisualTransform {
        let frames = self.death_frames as f64;
        let total = total_frames.max(1) as f64;
        VisualTransform {
            scale: frames / 10.0 + 1.0,
            rotation_degrees: frames * 10.0,
            alpha: (256.0 - frames / total * 256.0).clamp(0.0, 255.0),
        }
    }

    pub fn snapshot(&self, total_frames: u32) -> AnimalSnapshot {
        AnimalSnapshot {
            id: self.id,
            name: self.name.clone(),
            shape: self.shape.clone(),
            color: self.color.clone(),
            pos: self.pos,
            vel: self.vel,
            health: self.health,
            max_health: self.max_health,
            phase: self.phase,
            focus: self.focus,
            transform: self.visual_transform(total_frames),
        }
    }
}

/// Read-only view handed to renderers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalSnapshot {
    pub id: AnimalId,
    pub name: String,
    pub shape: String,
    pub color: String,
    pub pos: DVec2,
    pub vel: DVec2,
    pub health: f64,
    pub max_health: f64,
    pub phase: Phase,
    pub focus: Option<AnimalId>,
    pub transform: VisualTransform,
}
