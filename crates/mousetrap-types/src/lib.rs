//! `mousetrap-types` – shared vocabulary for the Mousetrap workspace.
//!
//! Holds the plain-data types that every other crate speaks: the planar
//! [`Vec2`] used by the simulation, the [`ActionError`] that behavior-tree
//! effects report, and the [`ConfigError`] raised while building drivers and
//! loading configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Vec2
// ─────────────────────────────────────────────────────────────────────────────

/// A point or direction on the simulation plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// Create a new vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Self) -> f32 {
        other.sub(self).length()
    }

    /// Unit vector in the same direction.  The zero vector stays zero.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::zero()
        } else {
            self.scale(1.0 / len)
        }
    }

    /// Unsigned angle between two directions, in degrees (`0..=180`).
    ///
    /// Returns `0.0` when either vector is (nearly) zero.
    pub fn angle_between_deg(self, other: Self) -> f32 {
        let denom = self.length() * other.length();
        if denom <= f32::EPSILON {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Clamp both components into `[-half_extent, half_extent]`.
    pub fn clamp_to(self, half_extent: f32) -> Self {
        Self::new(
            self.x.clamp(-half_extent, half_extent),
            self.y.clamp(-half_extent, half_extent),
        )
    }

    /// `true` when both components are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failure reported by the effect wrapped in a behavior-tree action.
///
/// An action converts any of these into `NodeState::Failure`; they never
/// escape a tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("no target available: {0}")]
    NoTarget(String),

    #[error("navigation rejected destination ({x:.2}, {y:.2}): {reason}")]
    Navigation { x: f32, y: f32, reason: String },

    #[error("cheese {0} was already collected")]
    AlreadyCollected(usize),

    #[error("shared state unavailable: {0}")]
    StateUnavailable(String),

    #[error("{0}")]
    Failed(String),
}

/// Errors raised while validating, loading or saving configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("tick interval must be a finite, non-negative number of seconds (got {0})")]
    InvalidTickInterval(f64),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("config I/O failed at {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),
}
