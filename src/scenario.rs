//! Scenario descriptions
//!
//! A scenario lists the animals to create, where to put them and who eats
//! whom. Building one validates every name before the simulation starts, so
//! configuration mistakes surface here rather than mid-run.

use std::fs;
use std::path::Path;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::engine::Engine;
use crate::error::{Result, SimError};
use crate::settings::SimConfig;
use crate::sim::{AnimalId, Arena};

/// Where an animal starts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Placement {
    /// Arena coordinates
    Absolute { x: f64, y: f64 },
    /// Percentages (0-100) of the arena size
    Relative { x: f64, y: f64 },
    /// Anywhere inside the walls, from the run seed
    #[default]
    Random,
}

impl Placement {
    fn resolve(&self, arena: &Arena, rng: &mut Pcg32) -> Result<DVec2> {
        match *self {
            Placement::Absolute { x, y } => Ok(DVec2::new(x, y)),
            Placement::Relative { x, y } => {
                for p in [x, y] {
                    if !(0.0..=100.0).contains(&p) {
                        return Err(SimError::InvalidPlacement(p));
                    }
                }
                Ok(DVec2::new(arena.width * x / 100.0, arena.height * y / 100.0))
            }
            Placement::Random => {
                let m = &arena.margins;
                let x_max = (arena.width - m.right).max(m.left + 1.0);
                let y_max = (arena.height - m.bottom).max(m.top + 1.0);
                Ok(DVec2::new(
                    rng.random_range(m.left..x_max),
                    rng.random_range(m.top..y_max),
                ))
            }
        }
    }
}

/// One animal in a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimalSpec {
    pub name: String,
    pub shape: String,
    pub color: String,
    pub max_health: f64,
    pub max_speed: f64,
    pub mass: f64,
    pub width: f64,
    pub height: f64,
    /// Propulsion and brake magnitude
    pub exertion: f64,
    /// Damage dealt per bite
    pub damage: f64,
    /// Names of the animals this one eats
    pub eats: Vec<String>,
    pub placement: Placement,
    pub velocity: DVec2,
    /// Finding this animal stands for
    pub label: Option<String>,
}

impl Default for AnimalSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            shape: ".".to_string(),
            color: "white".to_string(),
            max_health: DEFAULT_MAX_HEALTH,
            max_speed: DEFAULT_MAX_SPEED,
            mass: DEFAULT_MASS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            exertion: DEFAULT_EXERTION,
            damage: DEFAULT_DAMAGE,
            eats: Vec::new(),
            placement: Placement::default(),
            velocity: DVec2::ZERO,
            label: None,
        }
    }
}

impl AnimalSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Reject parameters the physics cannot work with
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        let checks = [
            ("mass", positive(self.mass)),
            ("max_health", positive(self.max_health)),
            ("max_speed", non_negative(self.max_speed)),
            ("exertion", non_negative(self.exertion)),
            ("damage", non_negative(self.damage)),
            ("width", non_negative(self.width)),
            ("height", non_negative(self.height)),
            ("velocity", self.velocity.is_finite()),
        ];
        match checks.into_iter().find(|(_, ok)| !ok) {
            Some((field, _)) => Err(SimError::InvalidParameter {
                animal: self.name.clone(),
                field,
            }),
            None => Ok(()),
        }
    }
}

/// A full scenario: settings plus population
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: SimConfig,
    pub animals: Vec<AnimalSpec>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let scenario = Self::from_json(&fs::read_to_string(path)?)?;
        log::info!("Loaded scenario with {} animals from {}", scenario.animals.len(), path.display());
        Ok(scenario)
    }

    /// One heavy hunter against two lighter ones that gang up on it
    pub fn sample() -> Self {
        let big = AnimalSpec {
            shape: "E".into(),
            color: "red".into(),
            mass: 2.0,
            exertion: 40.0,
            max_health: 50.0,
            width: 22.0,
            height: 30.0,
            eats: vec!["w1".into(), "w2".into()],
            placement: Placement::Relative { x: 5.0, y: 5.0 },
            velocity: DVec2::new(0.0, 30.0),
            label: Some("E501 line too long".into()),
            ..AnimalSpec::named("e")
        };
        let small = |name: &str, x: f64, y: f64| AnimalSpec {
            shape: "W".into(),
            color: "orange".into(),
            max_health: 40.0,
            damage: 0.2,
            width: 18.0,
            height: 21.0,
            eats: vec!["e".into()],
            placement: Placement::Relative { x, y },
            velocity: DVec2::new(0.0, -30.0),
            label: Some(format!("W291 trailing whitespace ({name})")),
            ..AnimalSpec::named(name)
        };
        Self {
            config: SimConfig::default(),
            animals: vec![big, small("w1", 95.0, 95.0), small("w2", 90.0, 90.0)],
        }
    }

    /// Create the engine, placing animals and wiring up who eats whom
    pub fn build(&self, seed: u64) -> Result<Engine> {
        let mut engine = Engine::new(self.config.clone());
        let mut rng = Pcg32::seed_from_u64(seed);
        let arena = self.config.arena;

        for spec in &self.animals {
            spec.validate()?;
            let pos = spec.placement.resolve(&arena, &mut rng)?;
            let animal = engine.state.spawn(&spec.name)?;
            animal.shape = spec.shape.clone();
            animal.color = spec.color.clone();
            animal.label = spec.label.clone();
            animal.set_max_health(spec.max_health);
            animal.max_speed = spec.max_speed;
            animal.mass = spec.mass;
            animal.set_size(spec.width, spec.height);
            animal.propulsion_magnitude = spec.exertion;
            animal.brake_magnitude = spec.exertion;
            animal.damage = spec.damage;
            animal.pos = pos;
            animal.set_velocity(spec.velocity);
        }

        for spec in &self.animals {
            let hunter = engine.state.id_of(&spec.name)?;
            let prey = spec
                .eats
                .iter()
                .map(|name| engine.state.id_of(name))
                .collect::<Result<Vec<AnimalId>>>()?;
            engine.state.add_prey(hunter, &prey)?;
        }

        log::info!("Built scenario: {} animals, seed {seed}", self.animals.len());
        Ok(engine)
    }
}
