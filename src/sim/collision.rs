//! Collision detection and response
//!
//! Animal-animal contacts are resolved as 1-D elastic collisions along the
//! line joining the centers. Walls are the same collision against a body
//! so heavy it never moves.

use glam::DVec2;

use super::animal::{Animal, AnimalId};
use super::arena::{Arena, Wall};
use crate::error::Result;
use crate::{frame_rotation, snap_to_grid_in_direction};

/// Two animals whose circles overlap this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub first: AnimalId,
    pub second: AnimalId,
}

impl Contact {
    pub fn involves(&self, id: AnimalId) -> bool {
        self.first == id || self.second == id
    }
}

/// Circle-circle overlap test
#[inline]
pub fn circles_overlap(a: &Animal, b: &Animal) -> bool {
    a.distance_to(b) < a.radius + b.radius
}

/// Greedy pairwise matching of overlapping animals.
///
/// Takes animals in the given order; each one claims the first remaining
/// animal it overlaps and both are then out of play for this tick. An animal
/// is in at most one contact, so three-way pile-ups only resolve one pair.
/// The outcome depends on input order.
pub fn find_contacts<'a, I>(animals: I) -> Vec<Contact>
where
    I: IntoIterator<Item = &'a Animal>,
{
    let mut remaining: Vec<&Animal> = animals.into_iter().collect();
    let mut contacts = Vec::new();

    while !remaining.is_empty() {
        let animal = remaining.remove(0);
        if let Some(idx) = remaining.iter().position(|other| circles_overlap(animal, other)) {
            let other = remaining.remove(idx);
            contacts.push(Contact {
                first: animal.id,
                second: other.id,
            });
        }
    }

    contacts
}

/// Every animal that has breached a wall, with the first wall breached
pub fn find_wall_contacts<'a, I>(animals: I, arena: &Arena) -> Vec<(AnimalId, Wall)>
where
    I: IntoIterator<Item = &'a Animal>,
{
    animals
        .into_iter()
        .filter_map(|animal| arena.collided_wall(animal).map(|wall| (animal.id, wall)))
        .collect()
}

/// Elastic collision of two masses along `axis`.
///
/// Velocities are rotated so the x-axis lies along `axis`, the closed-form
/// 1-D elastic collision is applied to the x components, y components are
/// left alone, and the results are rotated back.
pub fn collide(axis: DVec2, v1: DVec2, v2: DVec2, m1: f64, m2: f64) -> Result<(DVec2, DVec2)> {
    let rotation = frame_rotation(axis)?;
    let v1 = rotation * v1;
    let v2 = rotation * v2;

    let total = m1 + m2;
    let u1x = ((m1 - m2) * v1.x + 2.0 * m2 * v2.x) / total;
    let u2x = (2.0 * m1 * v1.x + (m2 - m1) * v2.x) / total;

    let inverse = rotation.transpose();
    Ok((
        inverse * DVec2::new(u1x, v1.y),
        inverse * DVec2::new(u2x, v2.y),
    ))
}

/// Bounce two animals off each other, pushing them apart if they overlap.
///
/// Returns false without touching either animal when there is no
/// collision axis between them (co-located or too close to resolve).
pub fn resolve_animal_collision(a: &mut Animal, b: &mut Animal) -> bool {
    let distance = a.distance_to(b);
    let Ok(center_to_center) = a.normalized_vector_to(b) else {
        log::debug!("{} and {} are co-located, letting them pass through", a.id, b.id);
        return false;
    };

    let Ok((ua, ub)) = collide(center_to_center, a.velocity(), b.velocity(), a.mass, b.mass) else {
        return false;
    };

    let min_distance = a.radius + b.radius;
    if distance < min_distance {
        let too_close_by = (min_distance - distance).ceil();
        let pa = a.pos - center_to_center * too_close_by / 2.0;
        let pb = b.pos + center_to_center * too_close_by / 2.0;
        a.pos = snap_to_grid_in_direction(pa, -center_to_center);
        b.pos = snap_to_grid_in_direction(pb, center_to_center);
    }

    a.set_velocity(ua);
    b.set_velocity(ub);
    a.last_impact = Some(-center_to_center);
    b.last_impact = Some(center_to_center);
    true
}

/// Bounce an animal off an immovable wall of mass `wall_mass`.
///
/// A breaching animal is first moved back inside along the wall normal.
pub fn resolve_wall_collision(animal: &mut Animal, wall: &Wall, wall_mass: f64) {
    let distance = wall.signed_distance(animal);
    if distance < 0.0 {
        let pos = animal.pos + wall.normal * distance.abs().ceil();
        animal.pos = snap_to_grid_in_direction(pos, wall.normal);
    }

    match collide(wall.normal, animal.velocity(), DVec2::ZERO, animal.mass, wall_mass) {
        Ok((velocity, _)) => animal.set_velocity(velocity),
        Err(e) => log::warn!("wall {:?} has no usable normal: {e}", wall.side),
    }
    animal.last_impact = Some(wall.normal);
}
