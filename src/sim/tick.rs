//! Fixed timestep simulation tick
//!
//! Advances the whole population by one step, in a fixed order:
//! animal collisions, wall collisions, deaths, removals, then targeting and
//! integration. The step size is whatever the caller passes in config, never
//! wall-clock time, so a run is reproducible from its inputs.

use serde::{Deserialize, Serialize};

use super::animal::AnimalId;
use super::arena::WallSide;
use super::collision::{find_contacts, find_wall_contacts, resolve_animal_collision, resolve_wall_collision};
use super::state::SimState;
use super::targeting::retarget;
use crate::audio::{CueQueue, SoundCue};
use crate::error::Result;
use crate::settings::SimConfig;

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Two animals bumped into each other
    Collision {
        first: AnimalId,
        second: AnimalId,
        /// Whether either of them took damage
        injured: bool,
    },
    WallBounce { animal: AnimalId, side: WallSide },
    /// Health reached zero; the death animation starts
    Died(AnimalId),
    /// Dropped from the simulation
    Removed(AnimalId),
}

/// Outcome of one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub events: Vec<SimEvent>,
    /// Nothing is left that chases or flees anything
    pub completed: bool,
}

/// Advance the simulation by one fixed timestep
pub fn tick(state: &mut SimState, config: &SimConfig, cues: &mut CueQueue) -> Result<TickReport> {
    let mut events = Vec::new();

    // Animal-animal collisions, at most one per animal
    let contacts = find_contacts(state.live());
    for contact in contacts {
        let Some((a, b)) = state.pair_mut(contact.first, contact.second) else {
            continue;
        };
        resolve_animal_collision(a, b);

        let a_bites = a.wants_to_eat(b.id);
        let b_bites = b.wants_to_eat(a.id);
        if a_bites {
            b.apply_damage(a.damage);
        }
        if b_bites {
            a.apply_damage(b.damage);
        }
        let injured = a_bites || b_bites;
        if injured {
            cues.push(SoundCue::Collision);
        }
        log::debug!("collision {} <-> {} (injured: {injured})", a.id, b.id);
        events.push(SimEvent::Collision {
            first: contact.first,
            second: contact.second,
            injured,
        });
    }

    // Wall collisions
    let wall_contacts = find_wall_contacts(state.live(), &state.arena);
    for (id, wall) in wall_contacts {
        if let Some(animal) = state.get_mut(id) {
            resolve_wall_collision(animal, &wall, config.wall_mass);
            events.push(SimEvent::WallBounce {
                animal: id,
                side: wall.side,
            });
        }
    }

    // Deaths
    for animal in state.animals_mut() {
        if animal.is_alive() && animal.is_dead() {
            animal.begin_dying(config.exit_speed);
            cues.push(SoundCue::Death);
            log::info!("{} ({}) died", animal.name, animal.id);
            events.push(SimEvent::Died(animal.id));
        }
    }

    // Removals
    let (width, height) = (state.arena.width, state.arena.height);
    let finished: Vec<AnimalId> = state
        .dying()
        .filter(|a| a.death_animation_finished(config.death_frames) || a.is_off_bounds(width, height))
        .map(|a| a.id)
        .collect();
    for id in finished {
        if let Some(animal) = state.remove(id) {
            log::debug!("{} ({id}) removed", animal.name);
            events.push(SimEvent::Removed(id));
        }
    }

    // Targeting and integration, one animal at a time in population order
    let live = state.live_ids();
    let animals = state.animals_mut();
    for idx in 0..animals.len() {
        retarget(animals, idx, &live)?;
        let animal = &mut animals[idx];
        animal.integrate(config.time_step);
        animal.advance_animation();
    }

    state.time_ticks += 1;

    let completed = is_complete(state);
    Ok(TickReport { events, completed })
}

/// True when the population is empty or no animal has a focus
pub fn is_complete(state: &SimState) -> bool {
    state.is_empty() || state.animals().iter().all(|a| a.focus().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Arena, Margins, Phase};
    use glam::DVec2;

    fn config() -> SimConfig {
        SimConfig::default()
    }

    /// Hunter at (200, 300), prey at `prey_x`; hunter eats prey only
    fn hunter_and_prey(prey_x: f64) -> (SimState, AnimalId, AnimalId) {
        let mut state = SimState::default();
        let hunter = {
            let a = state.spawn("hunter").unwrap();
            a.set_size(10.0, 10.0);
            a.put(200.0, 300.0);
            a.id
        };
        let prey = {
            let a = state.spawn("prey").unwrap();
            a.set_size(10.0, 10.0);
            a.set_max_health(2.0);
            a.put(prey_x, 300.0);
            a.id
        };
        state.add_prey(hunter, &[prey]).unwrap();
        (state, hunter, prey)
    }

    #[test]
    fn test_hunter_chases_prey() {
        let (mut state, hunter, prey) = hunter_and_prey(400.0);
        let mut cues = CueQueue::new();
        let report = tick(&mut state, &config(), &mut cues).unwrap();

        assert!(!report.completed);
        assert_eq!(state.get(hunter).unwrap().focus(), Some(prey));
        assert!(state.get(hunter).unwrap().velocity().x > 0.0);
        // Prey does not consider hunters when picking a focus
        assert_eq!(state.get(prey).unwrap().focus(), None);
        assert!(cues.is_empty());
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_unresolvable_focus_direction_skips_targeting() {
        let arena = Arena {
            margins: Margins {
                top: 0.0,
                left: 0.0,
                bottom: 0.0,
                right: 0.0,
            },
            ..Arena::default()
        };
        let mut state = SimState::new(arena);
        let hunter = {
            let a = state.spawn("hunter").unwrap();
            a.set_size(0.0, 0.0);
            a.id
        };
        let prey = {
            let a = state.spawn("prey").unwrap();
            a.set_size(0.0, 0.0);
            a.put(1e-200, 0.0);
            a.id
        };
        state.add_prey(hunter, &[prey]).unwrap();

        let report = tick(&mut state, &config(), &mut CueQueue::new()).unwrap();
        assert!(!report.completed);
        let hunter = state.get(hunter).unwrap();
        assert_eq!(hunter.focus(), Some(prey));
        assert_eq!(hunter.propulsion_force, DVec2::ZERO);
        assert_eq!(hunter.pos, DVec2::ZERO);
    }

    #[test]
    fn test_dies_on_tick_health_reaches_zero() {
        let (mut state, hunter, prey) = hunter_and_prey(205.0);
        let mut cues = CueQueue::new();

        let report = tick(&mut state, &config(), &mut cues).unwrap();
        assert!(report.events.iter().any(|e| matches!(e, SimEvent::Collision { injured: true, .. })));
        assert!(cues.contains(SoundCue::Collision));
        assert!(!cues.contains(SoundCue::Death));
        assert_eq!(state.get(prey).unwrap().health(), 1.0);
        assert_eq!(state.phase(prey), Some(Phase::Alive));
        cues.drain();

        // Put them back on top of each other for the second bite
        let hunter_pos = state.get(hunter).unwrap().pos;
        state.get_mut(prey).unwrap().pos = hunter_pos + DVec2::new(5.0, 0.0);

        let report = tick(&mut state, &config(), &mut cues).unwrap();
        assert_eq!(state.get(prey).unwrap().health(), 0.0);
        assert_eq!(state.phase(prey), Some(Phase::Dying));
        assert!(report.events.contains(&SimEvent::Died(prey)));
        assert!(cues.contains(SoundCue::Death));
        assert!((state.get(prey).unwrap().velocity().length() - config().exit_speed).abs() < 1.0);
    }

    #[test]
    fn test_no_damage_without_relation() {
        let mut state = SimState::default();
        for (name, x) in [("a", 200.0), ("b", 205.0)] {
            let a = state.spawn(name).unwrap();
            a.put(x, 300.0);
        }
        let mut cues = CueQueue::new();
        let report = tick(&mut state, &config(), &mut cues).unwrap();
        assert!(report.events.iter().any(|e| matches!(e, SimEvent::Collision { injured: false, .. })));
        assert!(cues.is_empty());
        assert!(state.animals().iter().all(|a| a.health() == a.max_health()));
        assert!(report.completed);
    }

    #[test]
    fn test_dead_prey_pruned_within_one_tick() {
        let (mut state, hunter, prey) = hunter_and_prey(400.0);
        state.get_mut(prey).unwrap().apply_damage(10.0);

        let mut cues = CueQueue::new();
        let report = tick(&mut state, &config(), &mut cues).unwrap();

        let h = state.get(hunter).unwrap();
        assert!(!h.wants_to_eat(prey));
        assert_eq!(h.focus(), None);
        assert!(report.completed);
    }

    #[test]
    fn test_lifecycle_is_monotonic_and_removed_stays_removed() {
        let (mut state, _hunter, prey) = hunter_and_prey(400.0);
        state.get_mut(prey).unwrap().apply_damage(10.0);

        let config = config();
        let mut cues = CueQueue::new();
        let mut last = Phase::Alive;
        let mut removed_at = None;
        for n in 0..60 {
            let report = tick(&mut state, &config, &mut cues).unwrap();
            cues.drain();
            let phase = state.phase(prey).unwrap();
            assert!(phase >= last, "phase went backwards at tick {n}");
            last = phase;
            if report.events.contains(&SimEvent::Removed(prey)) {
                assert!(removed_at.is_none());
                removed_at = Some(n);
            }
            if phase == Phase::Removed {
                assert!(state.animals().iter().all(|a| a.id != prey));
            }
        }
        assert_eq!(last, Phase::Removed);
        assert!(removed_at.is_some());
    }

    #[test]
    fn test_dying_animals_skip_collisions() {
        let mut state = SimState::default();
        let a = {
            let a = state.spawn("a").unwrap();
            a.put(200.0, 300.0);
            a.apply_damage(100.0);
            a.id
        };
        state.spawn("b").unwrap().put(205.0, 300.0);
        let mut cues = CueQueue::new();
        // First tick: a is alive with zero health, so it still collides then dies
        tick(&mut state, &config(), &mut cues).unwrap();
        assert_eq!(state.phase(a), Some(Phase::Dying));

        let b = state.id_of("b").unwrap();
        let b_pos = state.get(b).unwrap().pos;
        state.get_mut(a).unwrap().pos = b_pos;
        let report = tick(&mut state, &config(), &mut cues).unwrap();
        assert!(!report.events.iter().any(|e| matches!(e, SimEvent::Collision { .. })));
    }

    #[test]
    fn test_off_bounds_dying_animal_removed() {
        let (mut state, _hunter, prey) = hunter_and_prey(400.0);
        state.get_mut(prey).unwrap().apply_damage(10.0);
        let mut cues = CueQueue::new();
        tick(&mut state, &config(), &mut cues).unwrap();
        assert_eq!(state.phase(prey), Some(Phase::Dying));

        state.get_mut(prey).unwrap().put(-500.0, -500.0);
        let report = tick(&mut state, &config(), &mut cues).unwrap();
        assert!(report.events.contains(&SimEvent::Removed(prey)));
        assert_eq!(state.phase(prey), Some(Phase::Removed));
    }

    #[test]
    fn test_wall_bounce() {
        let mut state = SimState::default();
        let id = {
            let a = state.spawn("a").unwrap();
            a.put(300.0, 10.0);
            a.set_velocity(DVec2::new(0.0, -10.0));
            a.id
        };
        let mut cues = CueQueue::new();
        let report = tick(&mut state, &config(), &mut cues).unwrap();
        assert!(report.events.contains(&SimEvent::WallBounce {
            animal: id,
            side: WallSide::Top
        }));
        assert!(state.get(id).unwrap().velocity().y > 0.0);
    }

    #[test]
    fn test_empty_population_is_complete() {
        let mut state = SimState::default();
        let mut cues = CueQueue::new();
        assert!(tick(&mut state, &config(), &mut cues).unwrap().completed);
        assert!(is_complete(&state));
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let (mut state, hunter, prey) = hunter_and_prey(350.0);
            state.get_mut(prey).unwrap().set_velocity(DVec2::new(3.0, -7.0));
            let mut cues = CueQueue::new();
            for _ in 0..50 {
                tick(&mut state, &config(), &mut cues).unwrap();
            }
            let phases: Vec<_> = [hunter, prey].iter().map(|id| state.phase(*id)).collect();
            let positions: Vec<_> = state.animals().iter().map(|a| a.pos).collect();
            (phases, positions)
        };
        assert_eq!(run(), run());
    }
}
