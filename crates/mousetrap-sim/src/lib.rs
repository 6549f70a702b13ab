//! `mousetrap-sim` – a cat-and-mouse chase driven by behavior trees.
//!
//! A cat patrols a square arena and hunts a mouse that, in turn, steals the
//! cheese scattered around it.  Both agents are controlled by a
//! [`BehaviorNode`][mousetrap_runtime::BehaviorNode] tree ticked by its own
//! [`TreeDriver`][mousetrap_runtime::TreeDriver].
//!
//! # Modules
//!
//! - [`config`] – [`SimulationConfig`]: every tunable, TOML-friendly.
//! - [`world`] – the arena, its obstacles and cheese.
//! - [`perception`] – view cones, reach and line-of-sight queries.
//! - [`navigation`] – [`NavAgent`][navigation::NavAgent]: straight-line
//!   movement integrated once per frame.
//! - [`scene`] – [`Scene`], the state shared by both trees' leaves.
//! - [`cat`] / [`mouse`] – the agents and their tree builders.
//! - [`simulation`] – [`Simulation`], the frame loop and its [`RunReport`].

pub mod cat;
pub mod config;
pub mod mouse;
pub mod navigation;
pub mod perception;
pub mod scene;
pub mod simulation;
pub mod world;

pub use cat::CatMode;
pub use config::{CatConfig, MouseConfig, SimulationConfig, WorldConfig};
pub use mouse::MouseMode;
pub use scene::{Outcome, Scene, SharedScene};
pub use simulation::{RunReport, Simulation};
