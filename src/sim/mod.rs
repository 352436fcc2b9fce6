//! Deterministic simulation module
//!
//! All physics and interaction logic lives here. This module must be pure and
//! deterministic:
//! - Fixed timestep only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod animal;
pub mod arena;
pub mod collision;
pub mod overrides;
pub mod state;
pub mod targeting;
pub mod tick;

pub use animal::{Animal, AnimalId, AnimalSnapshot, Phase, VisualTransform};
pub use arena::{Arena, Margins, Wall, WallSide};
pub use collision::{Contact, collide, find_contacts, find_wall_contacts, resolve_animal_collision, resolve_wall_collision};
pub use overrides::AttributeOverride;
pub use state::SimState;
pub use targeting::{focus_force, retarget, select_focus};
pub use tick::{SimEvent, TickReport, is_complete, tick};
