//! [`Scene`] – the mutable state both agents' leaves close over.
//!
//! Leaves receive the scene as a [`SharedScene`] and lock it only for the
//! duration of one predicate or effect.  The host must not hold the lock
//! while it drives the trees.

use std::sync::{Arc, Mutex, MutexGuard};

use mousetrap_runtime::BehaviorNode;
use mousetrap_types::ActionError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::warn;

use crate::cat::Cat;
use crate::config::SimulationConfig;
use crate::mouse::Mouse;
use crate::world::World;

pub type SharedScene = Arc<Mutex<Scene>>;

/// How a run ended, if it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ongoing,
    MouseCaught,
    AllCheeseCollected,
}

pub struct Scene {
    pub world: World,
    pub cat: Cat,
    pub mouse: Mouse,
    pub rng: StdRng,
    pub mouse_caught: bool,
    /// Simulated seconds advanced so far.
    pub elapsed: f64,
}

impl Scene {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            world: World::from_config(&config.world),
            cat: Cat::from_config(&config.cat),
            mouse: Mouse::from_config(&config.mouse),
            rng: StdRng::seed_from_u64(config.seed),
            mouse_caught: false,
            elapsed: 0.0,
        }
    }

    pub fn into_shared(self) -> SharedScene {
        Arc::new(Mutex::new(self))
    }

    /// Move both agents along their current orders by `dt` seconds.
    ///
    /// Negative or non-finite frame times are ignored.
    pub fn advance(&mut self, dt: f64) {
        if !dt.is_finite() || dt < 0.0 {
            return;
        }
        self.cat.nav.step(dt as f32);
        if !self.mouse_caught {
            self.mouse.nav.step(dt as f32);
        }
        self.elapsed += dt;
    }

    pub fn outcome(&self) -> Outcome {
        if self.mouse_caught {
            Outcome::MouseCaught
        } else if self.world.remaining_cheese() == 0 {
            Outcome::AllCheeseCollected
        } else {
            Outcome::Ongoing
        }
    }
}

/// Lock the scene for one leaf evaluation.
pub fn lock_scene(scene: &SharedScene) -> Result<MutexGuard<'_, Scene>, ActionError> {
    scene
        .lock()
        .map_err(|_| ActionError::StateUnavailable("scene lock poisoned".to_string()))
}

/// Build a condition leaf over the shared scene.
///
/// A poisoned scene reads as `false`.
pub(crate) fn condition(
    scene: &SharedScene,
    name: &'static str,
    check: fn(&mut Scene) -> bool,
) -> BehaviorNode {
    let scene = Arc::clone(scene);
    BehaviorNode::condition(name, move || match lock_scene(&scene) {
        Ok(mut s) => check(&mut s),
        Err(e) => {
            warn!(condition = name, error = %e, "condition evaluated as false");
            false
        }
    })
}

/// Build an action leaf over the shared scene.
pub(crate) fn action(
    scene: &SharedScene,
    name: &'static str,
    effect: fn(&mut Scene) -> Result<(), ActionError>,
) -> BehaviorNode {
    let scene = Arc::clone(scene);
    BehaviorNode::action(name, move || {
        let mut s = lock_scene(&scene)?;
        effect(&mut s)
    })
}
