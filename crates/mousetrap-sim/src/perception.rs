//! Perception queries used by the agents' condition leaves.

use mousetrap_types::Vec2;

use crate::world::{Cheese, World};

/// A view cone: `range` units deep, `angle_deg` degrees wide in total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOfView {
    pub range: f32,
    pub angle_deg: f32,
}

impl FieldOfView {
    pub fn new(range: f32, angle_deg: f32) -> Self {
        Self { range, angle_deg }
    }

    /// `true` when `target` is within range, inside the cone around
    /// `forward`, and not hidden behind an obstacle.
    pub fn can_see(&self, eye: Vec2, forward: Vec2, target: Vec2, world: &World) -> bool {
        let to_target = target.sub(eye);
        if to_target.length() > self.range {
            return false;
        }
        if forward.angle_between_deg(to_target) >= self.angle_deg / 2.0 {
            return false;
        }
        world.line_of_sight(eye, target)
    }
}

/// `true` when `a` and `b` are at most `reach` apart.
pub fn within_reach(a: Vec2, b: Vec2, reach: f32) -> bool {
    a.distance(b) <= reach
}

/// The nearest uncollected cheese, if nothing blocks the view of it.
///
/// Only the nearest cheese is considered: a visible cheese further away does
/// not count while the nearest one is hidden.
pub fn nearest_visible_cheese(eye: Vec2, world: &World) -> Option<&Cheese> {
    world
        .nearest_cheese(eye)
        .filter(|c| world.line_of_sight(eye, c.position))
}
