//! Predator/prey targeting
//!
//! Each tick an animal drops prey that are no longer alive, picks the
//! nearest remaining prey as its focus, and sets its propulsion force to
//! chase it (or flee, when the focus is a hunter).

use std::collections::BTreeSet;

use glam::DVec2;

use super::animal::{Animal, AnimalId};
use crate::error::{Result, SimError};

/// Nearest live prey, ties going to the earlier animal in `population`
pub fn select_focus(animal: &Animal, population: &[Animal]) -> Option<AnimalId> {
    let mut best: Option<(f64, AnimalId)> = None;
    for other in population {
        if other.id == animal.id || !other.is_alive() || !animal.wants_to_eat(other.id) {
            continue;
        }
        let d = animal.distance_to(other);
        if best.is_none_or(|(best_d, _)| d < best_d) {
            best = Some((d, other.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Propulsion force for `animal` given its focus
pub fn focus_force(animal: &Animal, focus: Option<&Animal>) -> Result<DVec2> {
    let Some(focus) = focus else {
        return Ok(DVec2::ZERO);
    };

    let sign = if animal.wants_to_eat(focus.id) {
        1.0
    } else if focus.wants_to_eat(animal.id) {
        -1.0
    } else {
        return Err(SimError::InvalidFocusRelation {
            animal: animal.id,
            focus: focus.id,
        });
    };

    // No usable direction (co-located or too close to resolve): skip this tick
    match animal.normalized_vector_to(focus) {
        Ok(direction) => Ok(direction * sign * animal.propulsion_magnitude),
        Err(SimError::DegenerateDirection) => Ok(DVec2::ZERO),
        Err(e) => Err(e),
    }
}
