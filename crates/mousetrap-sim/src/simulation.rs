//! [`Simulation`] – the host loop that owns both agents' tree drivers.
//!
//! Each frame the cat's tree and then the mouse's tree are offered the frame
//! time; afterwards the scene integrates movement.  Once the mouse is caught
//! or every cheese is gone both drivers are stopped and further frames are
//! ignored.

use std::sync::PoisonError;

use mousetrap_runtime::TreeDriver;
use mousetrap_types::{ConfigError, Vec2};
use serde::Serialize;
use tracing::info;

use crate::cat::{self, CatMode};
use crate::config::SimulationConfig;
use crate::mouse::{self, MouseMode};
use crate::scene::{Outcome, Scene, SharedScene};

/// Summary of a run, suitable for printing or JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub outcome: Outcome,
    pub frames: u64,
    pub simulated_seconds: f64,
    pub cat_ticks: u64,
    pub mouse_ticks: u64,
    pub cheese_collected: usize,
    pub cheese_remaining: usize,
    pub cat_position: Vec2,
    pub cat_mode: CatMode,
    pub mouse_position: Vec2,
    pub mouse_mode: MouseMode,
}

pub struct Simulation {
    scene: SharedScene,
    cat_driver: TreeDriver,
    mouse_driver: TreeDriver,
    frame_delta: f64,
    frames: u64,
    outcome: Outcome,
}

impl Simulation {
    /// Validate `config`, build the scene and start both trees.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let scene = Scene::from_config(&config).into_shared();

        let mut cat_driver = TreeDriver::new(config.tick_interval)?;
        cat_driver.start(cat::build_tree(&scene));
        let mut mouse_driver = TreeDriver::new(config.tick_interval)?;
        mouse_driver.start(mouse::build_tree(&scene));

        info!(
            tick_interval = config.tick_interval,
            seed = config.seed,
            cheese = config.world.cheeses.len(),
            "simulation ready"
        );

        Ok(Self {
            scene,
            cat_driver,
            mouse_driver,
            frame_delta: config.frame_delta,
            frames: 0,
            outcome: Outcome::Ongoing,
        })
    }

    pub fn frame_delta(&self) -> f64 {
        self.frame_delta
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Run one host frame of `delta_time` seconds.
    pub fn frame(&mut self, delta_time: f64) -> Outcome {
        if self.outcome != Outcome::Ongoing {
            return self.outcome;
        }

        // Leaves lock the scene themselves; it must be free here.
        self.cat_driver.on_frame(delta_time);
        self.mouse_driver.on_frame(delta_time);

        let outcome = {
            let mut scene = self.scene.lock().unwrap_or_else(PoisonError::into_inner);
            let outcome = scene.outcome();
            if outcome == Outcome::Ongoing {
                scene.advance(delta_time);
            }
            outcome
        };
        self.frames += 1;

        if outcome != Outcome::Ongoing {
            self.stop();
            self.outcome = outcome;
            info!(?outcome, frames = self.frames, "simulation finished");
        }
        outcome
    }

    /// Step at the configured fixed frame length until the run ends or
    /// `max_frames` frames have elapsed.
    pub fn run_headless(&mut self, max_frames: u64) -> RunReport {
        while self.frames < max_frames && self.frame(self.frame_delta) == Outcome::Ongoing {}
        self.report()
    }

    /// Stop both trees; the scene is left as it is.
    pub fn stop(&mut self) {
        self.cat_driver.stop();
        self.mouse_driver.stop();
    }

    pub fn report(&self) -> RunReport {
        let scene = self.scene.lock().unwrap_or_else(PoisonError::into_inner);
        RunReport {
            outcome: self.outcome,
            frames: self.frames,
            simulated_seconds: scene.elapsed,
            cat_ticks: self.cat_driver.tick_count(),
            mouse_ticks: self.mouse_driver.tick_count(),
            cheese_collected: scene.mouse.cheese_collected,
            cheese_remaining: scene.world.remaining_cheese(),
            cat_position: scene.cat.nav.position(),
            cat_mode: scene.cat.mode,
            mouse_position: scene.mouse.nav.position(),
            mouse_mode: scene.mouse.mode,
        }
    }
}
