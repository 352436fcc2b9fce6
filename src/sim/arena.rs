//! Rectangular arena bounded by four half-plane walls
//!
//! Each wall is a line `normal · p = offset` with the normal pointing into
//! the arena, so the signed distance is positive inside and negative once
//! the wall has been breached.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::animal::Animal;
use crate::consts::*;

/// Which side of the arena a wall bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    Top,
    Left,
    Bottom,
    Right,
}

/// An immovable boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub side: WallSide,
    /// Unit normal pointing into the arena
    pub normal: DVec2,
    pub offset: f64,
}

impl Wall {
    /// Signed distance of a point; negative means outside
    #[inline]
    pub fn signed_distance_at(&self, p: DVec2) -> f64 {
        self.normal.dot(p) - self.offset
    }

    /// Signed distance of an animal, tested at `pos + (radius, radius)`
    #[inline]
    pub fn signed_distance(&self, animal: &Animal) -> f64 {
        self.signed_distance_at(animal.pos + DVec2::splat(animal.radius))
    }
}

/// Distance of each wall from the matching arena edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: MARGIN_TOP,
            left: MARGIN_LEFT,
            bottom: MARGIN_BOTTOM,
            right: MARGIN_RIGHT,
        }
    }
}

/// Arena dimensions and walls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            margins: Margins::default(),
        }
    }
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margins: Margins::default(),
        }
    }

    /// Walls in test order: top, left, bottom, right
    pub fn walls(&self) -> [Wall; 4] {
        let m = &self.margins;
        [
            Wall {
                side: WallSide::Top,
                normal: DVec2::Y,
                offset: m.top,
            },
            Wall {
                side: WallSide::Left,
                normal: DVec2::X,
                offset: m.left,
            },
            Wall {
                side: WallSide::Bottom,
                normal: DVec2::NEG_Y,
                offset: -(self.height - m.bottom),
            },
            Wall {
                side: WallSide::Right,
                normal: DVec2::NEG_X,
                offset: -(self.width - m.right),
            },
        ]
    }

    pub fn wall(&self, side: WallSide) -> Wall {
        let walls = self.walls();
        match side {
            WallSide::Top => walls[0],
            WallSide::Left => walls[1],
            WallSide::Bottom => walls[2],
            WallSide::Right => walls[3],
        }
    }

    /// First breached wall in test order. Corners report only one wall.
    pub fn collided_wall(&self, animal: &Animal) -> Option<Wall> {
        self.walls()
            .into_iter()
            .find(|wall| wall.signed_distance(animal) < 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::AnimalId;

    fn animal_at(x: f64, y: f64) -> Animal {
        let mut a = Animal::new(AnimalId(1), "a");
        a.set_size(10.0, 10.0);
        a.put(x, y);
        a
    }

    #[test]
    fn test_wall_equations() {
        let arena = Arena::new(600.0, 400.0);
        let top = arena.wall(WallSide::Top);
        let bottom = arena.wall(WallSide::Bottom);
        let right = arena.wall(WallSide::Right);

        assert_eq!(top.signed_distance_at(DVec2::new(0.0, 35.0)), 0.0);
        assert_eq!(bottom.signed_distance_at(DVec2::new(0.0, 396.0)), 0.0);
        assert_eq!(right.signed_distance_at(DVec2::new(570.0, 0.0)), 0.0);
        assert!(bottom.signed_distance_at(DVec2::new(0.0, 100.0)) > 0.0);
        assert!(right.signed_distance_at(DVec2::new(590.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_signed_distance_uses_radius_offset() {
        let arena = Arena::default();
        let left = arena.wall(WallSide::Left);
        let a = animal_at(25.0, 300.0);
        // Tested at x = 25 + 10
        assert_eq!(left.signed_distance(&a), 5.0);
    }

    #[test]
    fn test_collided_wall_inside() {
        let arena = Arena::default();
        assert!(arena.collided_wall(&animal_at(300.0, 300.0)).is_none());
    }

    #[test]
    fn test_collided_wall_corner_tie_break() {
        let arena = Arena::default();
        // Breaches both top and left; top is tested first
        let wall = arena.collided_wall(&animal_at(0.0, 0.0)).unwrap();
        assert_eq!(wall.side, WallSide::Top);

        let wall = arena.collided_wall(&animal_at(300.0, 590.0)).unwrap();
        assert_eq!(wall.side, WallSide::Bottom);
    }
}
