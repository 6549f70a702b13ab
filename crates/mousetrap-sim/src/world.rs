//! The arena: bounds, circular obstacles and cheese.

use mousetrap_types::{ActionError, Vec2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::WorldConfig;

/// A circular obstacle that blocks line of sight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: Vec2,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// `true` when the segment `from → to` passes through this obstacle.
    pub fn blocks(&self, from: Vec2, to: Vec2) -> bool {
        let d = to.sub(from);
        let len_sq = d.dot(d);
        let t = if len_sq <= f32::EPSILON {
            0.0
        } else {
            (self.center.sub(from).dot(d) / len_sq).clamp(0.0, 1.0)
        };
        let closest = from.add(d.scale(t));
        closest.distance(self.center) < self.radius
    }
}

/// A piece of cheese the mouse can collect exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cheese {
    pub id: usize,
    pub position: Vec2,
    pub collected: bool,
}

/// Static geometry plus the cheese still lying around.
#[derive(Debug, Clone)]
pub struct World {
    half_extent: f32,
    obstacles: Vec<Obstacle>,
    cheeses: Vec<Cheese>,
}

impl World {
    pub fn new(
        half_extent: f32,
        obstacles: Vec<Obstacle>,
        cheese_positions: impl IntoIterator<Item = Vec2>,
    ) -> Self {
        let cheeses = cheese_positions
            .into_iter()
            .enumerate()
            .map(|(id, position)| Cheese {
                id,
                position,
                collected: false,
            })
            .collect();
        Self {
            half_extent,
            obstacles,
            cheeses,
        }
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(
            config.half_extent,
            config.obstacles.clone(),
            config.cheeses.iter().copied(),
        )
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    pub fn cheese(&self, id: usize) -> Option<&Cheese> {
        self.cheeses.get(id)
    }

    /// `true` when `p` is a finite point inside the arena.
    pub fn contains(&self, p: Vec2) -> bool {
        p.is_finite() && p.x.abs() <= self.half_extent && p.y.abs() <= self.half_extent
    }

    /// `true` when no obstacle stands between `from` and `to`.
    pub fn line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        !self.obstacles.iter().any(|o| o.blocks(from, to))
    }

    /// The uncollected cheese closest to `from`.  Ties keep the lower id.
    pub fn nearest_cheese(&self, from: Vec2) -> Option<&Cheese> {
        self.cheeses
            .iter()
            .filter(|c| !c.collected)
            .min_by(|a, b| from.distance(a.position).total_cmp(&from.distance(b.position)))
    }

    /// Mark cheese `id` as collected.
    ///
    /// # Errors
    ///
    /// [`ActionError::AlreadyCollected`] when it was collected before, and
    /// [`ActionError::NoTarget`] when no cheese has that id.
    pub fn collect_cheese(&mut self, id: usize) -> Result<(), ActionError> {
        let cheese = self
            .cheeses
            .get_mut(id)
            .ok_or_else(|| ActionError::NoTarget(format!("no cheese with id {id}")))?;
        if cheese.collected {
            return Err(ActionError::AlreadyCollected(id));
        }
        cheese.collected = true;
        info!(cheese = id, position = %cheese.position, "cheese collected");
        Ok(())
    }

    pub fn remaining_cheese(&self) -> usize {
        self.cheeses.iter().filter(|c| !c.collected).count()
    }
}
