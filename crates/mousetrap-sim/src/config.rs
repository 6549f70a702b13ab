//! Simulation parameters.
//!
//! Every field has a default, so an empty TOML table is a valid
//! configuration.  Call [`SimulationConfig::validate`] before building a
//! [`Simulation`][crate::simulation::Simulation]; `Simulation::new` does this
//! for you.

use mousetrap_types::{ConfigError, Vec2};
use serde::{Deserialize, Serialize};

use crate::world::Obstacle;

/// Top-level simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds between two ticks of each agent's behavior tree.
    pub tick_interval: f64,
    /// Fixed frame length used by headless runs, in seconds.
    pub frame_delta: f64,
    /// Seed of the random source used by wandering and escaping.
    pub seed: u64,
    pub world: WorldConfig,
    pub cat: CatConfig,
    pub mouse: MouseConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: 0.5,
            frame_delta: 1.0 / 60.0,
            seed: 7,
            world: WorldConfig::default(),
            cat: CatConfig::default(),
            mouse: MouseConfig::default(),
        }
    }
}

/// Arena layout: a square of side `2 * half_extent` centred on the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub half_extent: f32,
    pub cheeses: Vec<Vec2>,
    pub obstacles: Vec<Obstacle>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            half_extent: 20.0,
            cheeses: vec![
                Vec2::new(-15.0, 12.0),
                Vec2::new(14.0, -14.0),
                Vec2::new(-4.0, -16.0),
            ],
            obstacles: vec![
                Obstacle::new(Vec2::new(0.0, 5.0), 2.0),
                Obstacle::new(Vec2::new(-8.0, -6.0), 1.5),
                Obstacle::new(Vec2::new(9.0, -4.0), 2.5),
            ],
        }
    }
}

/// The hunter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatConfig {
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub view_range: f32,
    /// Full opening angle of the view cone, in degrees.
    pub view_angle: f32,
    pub attack_range: f32,
    pub stopping_distance: f32,
    pub spawn: Vec2,
    pub waypoints: Vec<Vec2>,
}

impl Default for CatConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 5.0,
            chase_speed: 8.0,
            view_range: 15.0,
            view_angle: 90.0,
            attack_range: 1.0,
            stopping_distance: 0.5,
            spawn: Vec2::new(10.0, 10.0),
            waypoints: vec![
                Vec2::new(10.0, 10.0),
                Vec2::new(-10.0, 10.0),
                Vec2::new(-10.0, -10.0),
                Vec2::new(10.0, -10.0),
            ],
        }
    }
}

/// The cheese thief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseConfig {
    pub speed: f32,
    /// The mouse flees while the cat is at most this far away.
    pub safe_distance: f32,
    pub escape_radius: f32,
    pub wander_radius: f32,
    pub stopping_distance: f32,
    pub spawn: Vec2,
    /// Centre of the area the mouse runs to when fleeing.
    pub escape_center: Vec2,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            speed: 6.0,
            safe_distance: 10.0,
            escape_radius: 10.0,
            wander_radius: 10.0,
            stopping_distance: 0.5,
            spawn: Vec2::new(-12.0, -2.0),
            escape_center: Vec2::zero(),
        }
    }
}

impl SimulationConfig {
    /// Check every numeric parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tick_interval.is_finite() || self.tick_interval < 0.0 {
            return Err(ConfigError::InvalidTickInterval(self.tick_interval));
        }
        if !self.frame_delta.is_finite() || self.frame_delta <= 0.0 {
            return Err(invalid("frame_delta", "must be a positive number of seconds"));
        }

        let w = &self.world;
        positive("world.half_extent", w.half_extent)?;
        for (i, obstacle) in w.obstacles.iter().enumerate() {
            positive(&format!("world.obstacles[{i}].radius"), obstacle.radius)?;
        }
        for (i, cheese) in w.cheeses.iter().enumerate() {
            inside(&format!("world.cheeses[{i}]"), *cheese, w.half_extent)?;
        }

        let c = &self.cat;
        positive("cat.patrol_speed", c.patrol_speed)?;
        positive("cat.chase_speed", c.chase_speed)?;
        positive("cat.view_range", c.view_range)?;
        positive("cat.attack_range", c.attack_range)?;
        non_negative("cat.stopping_distance", c.stopping_distance)?;
        if !(c.view_angle > 0.0 && c.view_angle <= 360.0) {
            return Err(invalid("cat.view_angle", "must be in (0, 360] degrees"));
        }
        inside("cat.spawn", c.spawn, w.half_extent)?;
        for (i, waypoint) in c.waypoints.iter().enumerate() {
            inside(&format!("cat.waypoints[{i}]"), *waypoint, w.half_extent)?;
        }

        let m = &self.mouse;
        positive("mouse.speed", m.speed)?;
        non_negative("mouse.safe_distance", m.safe_distance)?;
        non_negative("mouse.escape_radius", m.escape_radius)?;
        non_negative("mouse.wander_radius", m.wander_radius)?;
        non_negative("mouse.stopping_distance", m.stopping_distance)?;
        inside("mouse.spawn", m.spawn, w.half_extent)?;
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be positive (got {value})")))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be zero or positive (got {value})")))
    }
}

fn inside(field: &str, p: Vec2, half_extent: f32) -> Result<(), ConfigError> {
    if p.is_finite() && p.x.abs() <= half_extent && p.y.abs() <= half_extent {
        Ok(())
    } else {
        Err(invalid(field, &format!("{p} lies outside the world")))
    }
}
