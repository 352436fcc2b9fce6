//! Simulation state: the population registry
//!
//! Animals are stored in spawn order, which is the iteration order every
//! order-sensitive rule (collision pairing, targeting tie-breaks) relies on.
//! Removed animals are dropped from storage; their ids are never reused.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::animal::{Animal, AnimalId, AnimalSnapshot, Phase};
use super::arena::Arena;
use super::overrides::AttributeOverride;
use crate::error::{Result, SimError};

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    pub arena: Arena,
    /// Live and dying animals in spawn order
    animals: Vec<Animal>,
    names: BTreeMap<String, AnimalId>,
    /// Simulation tick counter
    pub time_ticks: u64,
    next_id: u32,
}

impl SimState {
    pub fn new(arena: Arena) -> Self {
        Self {
            arena,
            animals: Vec::new(),
            names: BTreeMap::new(),
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Create an animal with default parameters at the origin
    pub fn spawn(&mut self, name: &str) -> Result<&mut Animal> {
        if self.names.contains_key(name) {
            return Err(SimError::DuplicateName(name.to_string()));
        }
        let id = AnimalId(self.next_id);
        self.next_id += 1;
        self.names.insert(name.to_string(), id);
        self.animals.push(Animal::new(id, name));
        log::debug!("spawned {name} as {id}");
        let idx = self.animals.len() - 1;
        Ok(&mut self.animals[idx])
    }

    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    pub(crate) fn animals_mut(&mut self) -> &mut [Animal] {
        &mut self.animals
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    pub fn live(&self) -> impl Iterator<Item = &Animal> {
        self.animals.iter().filter(|a| a.is_alive())
    }

    pub fn dying(&self) -> impl Iterator<Item = &Animal> {
        self.animals.iter().filter(|a| a.phase() == Phase::Dying)
    }

    pub fn live_ids(&self) -> BTreeSet<AnimalId> {
        self.live().map(|a| a.id).collect()
    }

    pub fn index_of(&self, id: AnimalId) -> Option<usize> {
        self.animals.iter().position(|a| a.id == id)
    }

    pub fn get(&self, id: AnimalId) -> Option<&Animal> {
        self.animals.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: AnimalId) -> Option<&mut Animal> {
        self.animals.iter_mut().find(|a| a.id == id)
    }

    pub fn id_of(&self, name: &str) -> Result<AnimalId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownAnimal(name.to_string()))
    }

    /// Lifecycle phase of any id ever spawned here
    pub fn phase(&self, id: AnimalId) -> Option<Phase> {
        match self.get(id) {
            Some(animal) => Some(animal.phase()),
            None if id.0 >= 1 && id.0 < self.next_id => Some(Phase::Removed),
            None => None,
        }
    }

    /// Two distinct animals borrowed mutably at once
    pub fn pair_mut(&mut self, a: AnimalId, b: AnimalId) -> Option<(&mut Animal, &mut Animal)> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        if i == j {
            return None;
        }
        if i < j {
            let (left, right) = self.animals.split_at_mut(j);
            Some((&mut left[i], &mut right[0]))
        } else {
            let (left, right) = self.animals.split_at_mut(i);
            Some((&mut right[0], &mut left[j]))
        }
    }

    /// Make `hunter` want to eat each of `prey`
    pub fn add_prey(&mut self, hunter: AnimalId, prey: &[AnimalId]) -> Result<()> {
        if let Some(missing) = prey.iter().find(|id| self.get(**id).is_none()) {
            return Err(SimError::UnknownAnimal(missing.to_string()));
        }
        let animal = self
            .get_mut(hunter)
            .ok_or_else(|| SimError::UnknownAnimal(hunter.to_string()))?;
        animal.add_prey(prey.iter().copied())
    }

    /// Apply a typed attribute override to one animal
    pub fn apply_override(&mut self, id: AnimalId, change: &AttributeOverride) -> Result<()> {
        let prey = match change {
            AttributeOverride::Eats(names) => Some(
                names
                    .iter()
                    .map(|name| self.id_of(name))
                    .collect::<Result<BTreeSet<_>>>()?,
            ),
            _ => None,
        };

        let animal = self
            .get_mut(id)
            .ok_or_else(|| SimError::UnknownAnimal(id.to_string()))?;
        match change {
            AttributeOverride::Speed(speed) => animal.max_speed = *speed,
            AttributeOverride::Color(color) => animal.color = color.clone(),
            AttributeOverride::Shape(shape) => animal.shape = shape.clone(),
            AttributeOverride::Eats(_) => animal.set_prey(prey.unwrap_or_default())?,
        }
        log::debug!("{} override {} applied to {id}", animal.name, change.attribute());
        Ok(())
    }

    /// Apply an override given by attribute name, e.g. from a console command
    pub fn apply_named_override(&mut self, name: &str, attribute: &str, value: &str) -> Result<()> {
        let id = self.id_of(name)?;
        let change = AttributeOverride::parse(attribute, value)?;
        self.apply_override(id, &change)
    }

    /// Drop an animal from the simulation
    pub(crate) fn remove(&mut self, id: AnimalId) -> Option<Animal> {
        let idx = self.index_of(id)?;
        let mut animal = self.animals.remove(idx);
        animal.mark_removed();
        self.names.remove(&animal.name);
        Some(animal)
    }

    pub fn snapshots(&self, death_frames: u32) -> Vec<AnimalSnapshot> {
        self.animals.iter().map(|a| a.snapshot(death_frames)).collect()
    }
}

impl Default for SimState {
    fn default() -> Self {
        Self::new(Arena::default())
    }
}
