//! The mouse: runs from the cat, otherwise hunts down cheese and wanders
//! when none is in sight.
//!
//! ```text
//! Sequence
//! ├── Condition  mouse_is_free
//! └── Fallback
//!     ├── Sequence
//!     │   ├── Condition  cat_nearby
//!     │   └── Action     escape_from_cat
//!     ├── Sequence
//!     │   ├── Condition  cheese_in_reach
//!     │   └── Action     collect_cheese
//!     ├── Sequence
//!     │   ├── Condition  has_cheese_target
//!     │   └── Action     approach_cheese
//!     ├── Sequence
//!     │   ├── Condition  cheese_in_sight
//!     │   └── Action     pick_cheese_target
//!     └── Action         wander
//! ```
//!
//! A caught mouse fails the whole tree and does nothing.

use std::f32::consts::TAU;

use mousetrap_runtime::BehaviorNode;
use mousetrap_types::{ActionError, Vec2};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::config::MouseConfig;
use crate::navigation::NavAgent;
use crate::perception::{nearest_visible_cheese, within_reach};
use crate::scene::{Scene, SharedScene, action, condition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseMode {
    Wandering,
    Seeking,
    Fleeing,
}

#[derive(Debug, Clone)]
pub struct Mouse {
    pub nav: NavAgent,
    pub speed: f32,
    pub safe_distance: f32,
    pub escape_center: Vec2,
    pub escape_radius: f32,
    pub wander_radius: f32,
    /// Id of the cheese the mouse is heading for.
    pub target_cheese: Option<usize>,
    pub cheese_collected: usize,
    pub mode: MouseMode,
}

impl Mouse {
    pub fn from_config(config: &MouseConfig) -> Self {
        Self {
            nav: NavAgent::new(config.spawn, config.stopping_distance),
            speed: config.speed,
            safe_distance: config.safe_distance,
            escape_center: config.escape_center,
            escape_radius: config.escape_radius,
            wander_radius: config.wander_radius,
            target_cheese: None,
            cheese_collected: 0,
            mode: MouseMode::Wandering,
        }
    }

    /// Switch mode; returns `true` when the mode actually changed.
    fn set_mode(&mut self, mode: MouseMode) -> bool {
        if self.mode == mode {
            return false;
        }
        debug!(from = ?self.mode, to = ?mode, "mouse changed mode");
        self.mode = mode;
        true
    }
}

/// Build the mouse's behavior tree over `scene`.
pub fn build_tree(scene: &SharedScene) -> BehaviorNode {
    BehaviorNode::sequence(vec![
        condition(scene, "mouse_is_free", mouse_is_free),
        behaviors(scene),
    ])
}

fn behaviors(scene: &SharedScene) -> BehaviorNode {
    BehaviorNode::fallback(vec![
        BehaviorNode::sequence(vec![
            condition(scene, "cat_nearby", cat_nearby),
            action(scene, "escape_from_cat", escape_from_cat),
        ]),
        BehaviorNode::sequence(vec![
            condition(scene, "cheese_in_reach", cheese_in_reach),
            action(scene, "collect_cheese", collect_cheese),
        ]),
        BehaviorNode::sequence(vec![
            condition(scene, "has_cheese_target", has_cheese_target),
            action(scene, "approach_cheese", approach_cheese),
        ]),
        BehaviorNode::sequence(vec![
            condition(scene, "cheese_in_sight", cheese_in_sight),
            action(scene, "pick_cheese_target", pick_cheese_target),
        ]),
        action(scene, "wander", wander),
    ])
}

/// A uniformly distributed point in the disc of `radius` around `center`.
fn random_point(rng: &mut impl Rng, center: Vec2, radius: f32) -> Vec2 {
    let angle = rng.gen_range(0.0..TAU);
    let distance = radius * rng.r#gen::<f32>().sqrt();
    center.add(Vec2::new(angle.cos(), angle.sin()).scale(distance))
}

fn mouse_is_free(s: &mut Scene) -> bool {
    !s.mouse_caught
}

fn cat_nearby(s: &mut Scene) -> bool {
    within_reach(s.mouse.nav.position(), s.cat.nav.position(), s.mouse.safe_distance)
}

/// Picks a fresh hiding spot whenever the previous one has been reached.
fn escape_from_cat(s: &mut Scene) -> Result<(), ActionError> {
    let started = s.mouse.set_mode(MouseMode::Fleeing);
    s.mouse.nav.move_at(s.mouse.speed);
    if started || s.mouse.nav.has_arrived() {
        let spot = random_point(&mut s.rng, s.mouse.escape_center, s.mouse.escape_radius)
            .clamp_to(s.world.half_extent());
        s.mouse.nav.set_destination(spot, &s.world)?;
    }
    Ok(())
}

fn cheese_in_reach(s: &mut Scene) -> bool {
    let Some(cheese) = s.mouse.target_cheese.and_then(|id| s.world.cheese(id)) else {
        return false;
    };
    !cheese.collected
        && within_reach(
            s.mouse.nav.position(),
            cheese.position,
            s.mouse.nav.stopping_distance(),
        )
}

fn collect_cheese(s: &mut Scene) -> Result<(), ActionError> {
    let id = s
        .mouse
        .target_cheese
        .take()
        .ok_or_else(|| ActionError::NoTarget("mouse has no cheese target".to_string()))?;
    s.world.collect_cheese(id)?;
    s.mouse.cheese_collected += 1;
    Ok(())
}

fn has_cheese_target(s: &mut Scene) -> bool {
    s.mouse
        .target_cheese
        .and_then(|id| s.world.cheese(id))
        .is_some_and(|c| !c.collected)
}

fn approach_cheese(s: &mut Scene) -> Result<(), ActionError> {
    let target = s
        .mouse
        .target_cheese
        .and_then(|id| s.world.cheese(id))
        .map(|c| c.position)
        .ok_or_else(|| ActionError::NoTarget("cheese target vanished".to_string()))?;
    s.mouse.set_mode(MouseMode::Seeking);
    s.mouse.nav.move_at(s.mouse.speed);
    s.mouse.nav.set_destination(target, &s.world)
}

fn cheese_in_sight(s: &mut Scene) -> bool {
    nearest_visible_cheese(s.mouse.nav.position(), &s.world).is_some()
}

fn pick_cheese_target(s: &mut Scene) -> Result<(), ActionError> {
    let (id, position) = nearest_visible_cheese(s.mouse.nav.position(), &s.world)
        .map(|c| (c.id, c.position))
        .ok_or_else(|| ActionError::NoTarget("no cheese in sight".to_string()))?;
    debug!(cheese = id, "mouse spotted cheese");
    s.mouse.target_cheese = Some(id);
    s.mouse.set_mode(MouseMode::Seeking);
    s.mouse.nav.move_at(s.mouse.speed);
    s.mouse.nav.set_destination(position, &s.world)
}

/// Picks a random nearby spot whenever the previous one has been reached.
fn wander(s: &mut Scene) -> Result<(), ActionError> {
    let started = s.mouse.set_mode(MouseMode::Wandering);
    s.mouse.nav.move_at(s.mouse.speed);
    if started || s.mouse.nav.destination().is_none() || s.mouse.nav.has_arrived() {
        let spot = random_point(&mut s.rng, s.mouse.nav.position(), s.mouse.wander_radius)
            .clamp_to(s.world.half_extent());
        s.mouse.nav.set_destination(spot, &s.world)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::scene::lock_scene;
    use mousetrap_runtime::NodeState;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Open arena, cat parked far away in a corner.
    fn config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.obstacles.clear();
        config.world.cheeses = vec![Vec2::new(3.0, 0.0)];
        config.cat.spawn = Vec2::new(18.0, 18.0);
        config.cat.waypoints = vec![Vec2::new(18.0, 18.0)];
        config.mouse.spawn = Vec2::zero();
        config
    }

    #[test]
    fn random_point_stays_in_disc() {
        let mut rng = StdRng::seed_from_u64(1);
        let center = Vec2::new(2.0, -3.0);
        for _ in 0..200 {
            assert!(random_point(&mut rng, center, 4.0).distance(center) <= 4.0 + 1e-4);
        }
        assert_eq!(random_point(&mut rng, center, 0.0), center);
    }

    #[test]
    fn flees_when_cat_is_close() {
        let mut cfg = config();
        cfg.cat.spawn = Vec2::new(5.0, 5.0);
        let scene = Scene::from_config(&cfg).into_shared();
        assert_eq!(build_tree(&scene).tick(), NodeState::Success);

        let s = lock_scene(&scene).unwrap();
        assert_eq!(s.mouse.mode, MouseMode::Fleeing);
        let spot = s.mouse.nav.destination().expect("escape destination");
        assert!(spot.distance(Vec2::zero()) <= 10.0 + 1e-4);
        assert!(!s.mouse.nav.is_stopped());
    }

    #[test]
    fn spots_approaches_and_collects_cheese() {
        let scene = Scene::from_config(&config()).into_shared();
        let tree = build_tree(&scene);

        // First tick: cheese seen, targeted and headed for.
        assert_eq!(tree.tick(), NodeState::Success);
        {
            let mut s = lock_scene(&scene).unwrap();
            assert_eq!(s.mouse.target_cheese, Some(0));
            assert_eq!(s.mouse.mode, MouseMode::Seeking);
            assert_eq!(s.mouse.nav.destination(), Some(Vec2::new(3.0, 0.0)));
            s.advance(1.0);
        }

        // Second tick: in reach, so it is collected.
        assert_eq!(tree.tick(), NodeState::Success);
        let s = lock_scene(&scene).unwrap();
        assert_eq!(s.mouse.cheese_collected, 1);
        assert!(s.mouse.target_cheese.is_none());
        assert_eq!(s.world.remaining_cheese(), 0);
    }

    #[test]
    fn wanders_when_no_cheese_is_visible() {
        let mut cfg = config();
        cfg.world.cheeses.clear();
        let scene = Scene::from_config(&cfg).into_shared();
        assert_eq!(build_tree(&scene).tick(), NodeState::Success);

        let s = lock_scene(&scene).unwrap();
        assert_eq!(s.mouse.mode, MouseMode::Wandering);
        let spot = s.mouse.nav.destination().expect("wander destination");
        assert!(spot.distance(Vec2::zero()) <= 10.0 + 1e-4);
    }

    #[test]
    fn wander_keeps_destination_until_reached() {
        let mut cfg = config();
        cfg.world.cheeses.clear();
        cfg.mouse.stopping_distance = 0.0;
        let scene = Scene::from_config(&cfg).into_shared();
        let tree = build_tree(&scene);
        tree.tick();
        let first = lock_scene(&scene).unwrap().mouse.nav.destination();
        tree.tick();
        let second = lock_scene(&scene).unwrap().mouse.nav.destination();
        assert_eq!(first, second);
    }

    #[test]
    fn caught_mouse_stays_put() {
        let mut cfg = config();
        cfg.cat.spawn = Vec2::new(0.5, 0.0);
        cfg.world.cheeses = vec![Vec2::new(0.3, 0.0)];
        let scene = Scene::from_config(&cfg).into_shared();
        {
            let mut s = lock_scene(&scene).unwrap();
            s.mouse.target_cheese = Some(0);
            s.mouse_caught = true;
            s.mouse.nav.stop();
        }
        assert_eq!(build_tree(&scene).tick(), NodeState::Failure);

        let s = lock_scene(&scene).unwrap();
        assert_eq!(s.mouse.mode, MouseMode::Wandering);
        assert!(s.mouse.nav.is_stopped());
        assert_eq!(s.mouse.cheese_collected, 0);
        assert_eq!(s.world.remaining_cheese(), 1);
    }

    #[test]
    fn collecting_a_stolen_cheese_fails() {
        let scene = Scene::from_config(&config()).into_shared();
        {
            let mut s = lock_scene(&scene).unwrap();
            s.mouse.target_cheese = Some(0);
            s.world.collect_cheese(0).unwrap();
        }
        let mut s = lock_scene(&scene).unwrap();
        assert_eq!(collect_cheese(&mut s), Err(ActionError::AlreadyCollected(0)));
        assert!(s.mouse.target_cheese.is_none());
    }
}
