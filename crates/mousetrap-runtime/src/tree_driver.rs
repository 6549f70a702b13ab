//! [`TreeDriver`] – fixed-cadence owner of a behavior tree.
//!
//! The host calls [`TreeDriver::on_frame`] once per frame with the frame's
//! elapsed time.  The driver accumulates that time and ticks the root at most
//! once per `tick_interval` seconds, no matter how often frames arrive.  The
//! root's result is counted and logged, never acted upon: everything a tick
//! achieves happens through the effects of its actions.
//!
//! # Lifecycle
//!
//! | Call                   | Effect                                                        |
//! |------------------------|---------------------------------------------------------------|
//! | [`start`][TreeDriver::start]   | Assign a root and begin ticking.  The timer is kept.  |
//! | [`resume`][TreeDriver::resume] | Begin ticking the current root, if any.               |
//! | [`stop`][TreeDriver::stop]     | Stop ticking.  Root and timer are kept.               |
//!
//! Because neither `start` nor `stop` clears the accumulated timer, the first
//! tick after a restart can arrive sooner than a full interval.
//!
//! # Example
//!
//! ```rust
//! use mousetrap_runtime::{BehaviorNode, TreeDriver};
//!
//! let mut driver = TreeDriver::new(0.5).unwrap();
//! driver.start(BehaviorNode::action("patrol", || Ok(())));
//!
//! driver.on_frame(0.2);
//! driver.on_frame(0.2);
//! assert_eq!(driver.tick_count(), 0);
//! driver.on_frame(0.2);
//! assert_eq!(driver.tick_count(), 1);
//! ```

use mousetrap_types::ConfigError;
use tracing::{debug, trace};

use crate::behavior_tree::{BehaviorNode, NodeState};

/// Drives one behavior tree at a fixed tick interval.
#[derive(Debug)]
pub struct TreeDriver {
    root: Option<BehaviorNode>,
    is_running: bool,
    /// Minimum number of seconds between two root ticks.
    tick_interval: f64,
    /// Seconds accumulated since the last root tick.
    timer: f64,
    ticks: u64,
    last_state: Option<NodeState>,
}

impl TreeDriver {
    /// Create a stopped driver without a root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTickInterval`] when `tick_interval` is
    /// negative, NaN or infinite.
    pub fn new(tick_interval: f64) -> Result<Self, ConfigError> {
        if !tick_interval.is_finite() || tick_interval < 0.0 {
            return Err(ConfigError::InvalidTickInterval(tick_interval));
        }
        Ok(Self {
            root: None,
            is_running: false,
            tick_interval,
            timer: 0.0,
            ticks: 0,
            last_state: None,
        })
    }

    /// Create a stopped driver that already holds `root`.
    pub fn with_root(tick_interval: f64, root: BehaviorNode) -> Result<Self, ConfigError> {
        let mut driver = Self::new(tick_interval)?;
        driver.root = Some(root);
        Ok(driver)
    }

    /// Assign `root` and start ticking it.  Any previous root is dropped.
    pub fn start(&mut self, root: BehaviorNode) {
        if self.root.replace(root).is_some() {
            debug!("behavior tree root replaced");
        }
        self.is_running = true;
        debug!(timer = self.timer, "behavior tree started");
    }

    /// Start ticking the root that is already assigned.
    pub fn resume(&mut self) {
        self.is_running = true;
        debug!(has_root = self.root.is_some(), timer = self.timer, "behavior tree resumed");
    }

    /// Stop ticking.  An effect that is already executing is not interrupted.
    pub fn stop(&mut self) {
        self.is_running = false;
        debug!(ticks = self.ticks, "behavior tree stopped");
    }

    /// Advance the driver by one host frame of `delta_time` seconds.
    ///
    /// Ticks the root once when the accumulated time reaches the tick
    /// interval, then resets the accumulator.  Negative or non-finite frame
    /// times are ignored.
    pub fn on_frame(&mut self, delta_time: f64) {
        if !self.is_running {
            return;
        }
        let Some(root) = self.root.as_ref() else {
            return;
        };
        if !delta_time.is_finite() || delta_time < 0.0 {
            debug!(delta_time, "ignoring invalid frame time");
            return;
        }

        self.timer += delta_time;
        if self.timer >= self.tick_interval {
            let state = root.tick();
            self.timer = 0.0;
            self.ticks += 1;
            self.last_state = Some(state);
            trace!(tick = self.ticks, %state, "behavior tree ticked");
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    pub fn tick_interval(&self) -> f64 {
        self.tick_interval
    }

    /// Seconds accumulated toward the next tick.
    pub fn elapsed(&self) -> f64 {
        self.timer
    }

    /// Number of root ticks performed since construction.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// State returned by the most recent root tick.
    pub fn last_state(&self) -> Option<NodeState> {
        self.last_state
    }
}
