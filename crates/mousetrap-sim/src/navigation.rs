//! [`NavAgent`] – straight-line movement toward a destination.
//!
//! Movement orders only set the destination and speed; [`NavAgent::step`]
//! integrates the motion once per host frame.

use mousetrap_types::{ActionError, Vec2};

use crate::world::World;

#[derive(Debug, Clone)]
pub struct NavAgent {
    position: Vec2,
    /// Unit heading; updated whenever the agent moves.
    forward: Vec2,
    destination: Option<Vec2>,
    speed: f32,
    stopping_distance: f32,
    is_stopped: bool,
}

impl NavAgent {
    pub fn new(position: Vec2, stopping_distance: f32) -> Self {
        Self {
            position,
            forward: Vec2::new(1.0, 0.0),
            destination: None,
            speed: 0.0,
            stopping_distance,
            is_stopped: true,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn forward(&self) -> Vec2 {
        self.forward
    }

    pub fn destination(&self) -> Option<Vec2> {
        self.destination
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    pub fn is_stopped(&self) -> bool {
        self.is_stopped
    }

    /// Point the agent at `destination`.
    ///
    /// # Errors
    ///
    /// [`ActionError::Navigation`] when the destination is not a finite point
    /// inside `world`.
    pub fn set_destination(&mut self, destination: Vec2, world: &World) -> Result<(), ActionError> {
        if !world.contains(destination) {
            return Err(ActionError::Navigation {
                x: destination.x,
                y: destination.y,
                reason: "outside world bounds".to_string(),
            });
        }
        self.destination = Some(destination);
        Ok(())
    }

    /// Distance left to the destination; zero without one.
    pub fn remaining_distance(&self) -> f32 {
        self.destination
            .map(|d| self.position.distance(d))
            .unwrap_or(0.0)
    }

    pub fn has_arrived(&self) -> bool {
        self.remaining_distance() <= self.stopping_distance
    }

    /// Release the brakes and travel at `speed`.
    pub fn move_at(&mut self, speed: f32) {
        self.is_stopped = false;
        self.speed = speed;
    }

    pub fn stop(&mut self) {
        self.is_stopped = true;
        self.speed = 0.0;
    }

    /// Advance `dt` seconds toward the destination without overshooting it.
    pub fn step(&mut self, dt: f32) {
        if self.is_stopped || dt <= 0.0 {
            return;
        }
        let Some(destination) = self.destination else {
            return;
        };
        let remaining = self.position.distance(destination);
        if remaining <= self.stopping_distance {
            return;
        }
        let direction = destination.sub(self.position).normalized();
        let travel = (self.speed * dt).min(remaining);
        self.position = self.position.add(direction.scale(travel));
        self.forward = direction;
    }
}
