//! The cat: patrols its waypoints, chases the mouse on sight, and catches it
//! once it is within striking distance.
//!
//! ```text
//! Fallback
//! ├── Sequence
//! │   ├── Condition  mouse_in_attack_range
//! │   └── Action     catch_mouse
//! ├── Sequence
//! │   ├── Condition  mouse_spotted
//! │   └── Action     chase_mouse
//! └── Action         patrol
//! ```

use mousetrap_runtime::BehaviorNode;
use mousetrap_types::{ActionError, Vec2};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::CatConfig;
use crate::navigation::NavAgent;
use crate::perception::{FieldOfView, within_reach};
use crate::scene::{Scene, SharedScene, action, condition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatMode {
    Patrolling,
    Chasing,
    Caught,
}

#[derive(Debug, Clone)]
pub struct Cat {
    pub nav: NavAgent,
    pub fov: FieldOfView,
    pub waypoints: Vec<Vec2>,
    pub waypoint_index: usize,
    pub attack_range: f32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    /// Where the mouse was last seen.
    pub mouse_last_known: Option<Vec2>,
    pub mode: CatMode,
}

impl Cat {
    pub fn from_config(config: &CatConfig) -> Self {
        Self {
            nav: NavAgent::new(config.spawn, config.stopping_distance),
            fov: FieldOfView::new(config.view_range, config.view_angle),
            waypoints: config.waypoints.clone(),
            waypoint_index: 0,
            attack_range: config.attack_range,
            patrol_speed: config.patrol_speed,
            chase_speed: config.chase_speed,
            mouse_last_known: None,
            mode: CatMode::Patrolling,
        }
    }

    fn set_mode(&mut self, mode: CatMode) {
        if self.mode != mode {
            debug!(from = ?self.mode, to = ?mode, "cat changed mode");
            self.mode = mode;
        }
    }
}

/// Build the cat's behavior tree over `scene`.
pub fn build_tree(scene: &SharedScene) -> BehaviorNode {
    BehaviorNode::fallback(vec![
        BehaviorNode::sequence(vec![
            condition(scene, "mouse_in_attack_range", mouse_in_attack_range),
            action(scene, "catch_mouse", catch_mouse),
        ]),
        BehaviorNode::sequence(vec![
            condition(scene, "mouse_spotted", mouse_spotted),
            action(scene, "chase_mouse", chase_mouse),
        ]),
        action(scene, "patrol", patrol),
    ])
}

fn mouse_in_attack_range(s: &mut Scene) -> bool {
    within_reach(s.cat.nav.position(), s.mouse.nav.position(), s.cat.attack_range)
}

fn catch_mouse(s: &mut Scene) -> Result<(), ActionError> {
    s.cat.nav.stop();
    s.cat.set_mode(CatMode::Caught);
    if !s.mouse_caught {
        s.mouse_caught = true;
        s.mouse.nav.stop();
        info!(position = %s.mouse.nav.position(), "cat caught the mouse");
    }
    Ok(())
}

/// Records the mouse's position whenever it is in view.
fn mouse_spotted(s: &mut Scene) -> bool {
    let mouse = s.mouse.nav.position();
    let seen = s
        .cat
        .fov
        .can_see(s.cat.nav.position(), s.cat.nav.forward(), mouse, &s.world);
    if seen {
        s.cat.mouse_last_known = Some(mouse);
    }
    seen
}

fn chase_mouse(s: &mut Scene) -> Result<(), ActionError> {
    let target = s
        .cat
        .mouse_last_known
        .ok_or_else(|| ActionError::NoTarget("mouse position unknown".to_string()))?;
    s.cat.set_mode(CatMode::Chasing);
    s.cat.nav.move_at(s.cat.chase_speed);
    s.cat.nav.set_destination(target, &s.world)
}

/// Walks the waypoint loop, moving on to the next waypoint on arrival.
fn patrol(s: &mut Scene) -> Result<(), ActionError> {
    if s.cat.waypoints.is_empty() {
        return Err(ActionError::NoTarget("cat has no waypoints".to_string()));
    }
    s.cat.set_mode(CatMode::Patrolling);
    s.cat.nav.move_at(s.cat.patrol_speed);

    let cat = &mut s.cat;
    cat.nav.set_destination(cat.waypoints[cat.waypoint_index], &s.world)?;
    if cat.nav.has_arrived() {
        cat.waypoint_index = (cat.waypoint_index + 1) % cat.waypoints.len();
        cat.nav.set_destination(cat.waypoints[cat.waypoint_index], &s.world)?;
    }
    Ok(())
}
