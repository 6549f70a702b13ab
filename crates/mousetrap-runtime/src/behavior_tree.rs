//! Behavior Tree Engine.
//!
//! A tree of [`BehaviorNode`]s is evaluated synchronously by
//! [`BehaviorNode::tick`]: one call walks the tree to completion and yields a
//! single [`NodeState`].  Leaves wrap closures supplied by the host, so the
//! tree itself never knows what a predicate inspects or what an effect does.
//!
//! # Node types
//!
//! | Node type     | Description                                                      |
//! |---------------|------------------------------------------------------------------|
//! | [`Sequence`]  | Ticks children left-to-right; stops on the first non-success.   |
//! | [`Fallback`]  | Ticks children left-to-right; stops on the first non-failure.   |
//! | [`Condition`] | Evaluates a predicate: `true` → success, `false` → failure.     |
//! | [`Action`]    | Runs an effect; a failing effect becomes a failure, never a panic. |
//!
//! [`Sequence`]: BehaviorNode::Sequence
//! [`Fallback`]: BehaviorNode::Fallback
//! [`Condition`]: BehaviorNode::Condition
//! [`Action`]: BehaviorNode::Action
//!
//! # Example
//!
//! ```rust
//! use mousetrap_runtime::behavior_tree::{BehaviorNode, NodeState};
//!
//! let tree = BehaviorNode::fallback(vec![
//!     BehaviorNode::sequence(vec![
//!         BehaviorNode::condition("target_visible", || false),
//!         BehaviorNode::action("chase", || Ok(())),
//!     ]),
//!     BehaviorNode::action("patrol", || Ok(())),
//! ]);
//!
//! assert_eq!(tree.tick(), NodeState::Success);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use mousetrap_types::ActionError;
use tracing::{trace, warn};

// ─────────────────────────────────────────────────────────────────────────────
// NodeState
// ─────────────────────────────────────────────────────────────────────────────

/// The result of ticking a node once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// The node's work is still in flight and must be ticked again later.
    Running,
    /// The node completed its task successfully.
    Success,
    /// The node's predicate was false or its effect reported an error.
    Failure,
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeState::Running => write!(f, "running"),
            NodeState::Success => write!(f, "success"),
            NodeState::Failure => write!(f, "failure"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Leaf payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Predicate wrapped by a [`BehaviorNode::Condition`].
pub type Predicate = Box<dyn Fn() -> bool + Send + Sync>;

/// Effect wrapped by a [`BehaviorNode::Action`].
pub type Effect = Box<dyn Fn() -> Result<(), ActionError> + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// BehaviorNode
// ─────────────────────────────────────────────────────────────────────────────

/// A node in a behavior tree.
///
/// Build trees with [`BehaviorNode::sequence`], [`BehaviorNode::fallback`],
/// [`BehaviorNode::condition`] and [`BehaviorNode::action`], then call
/// [`BehaviorNode::tick`].  The shape of a tree is fixed once built.
pub enum BehaviorNode {
    /// Composite: AND over its children.  Empty → [`NodeState::Success`].
    Sequence(Vec<BehaviorNode>),
    /// Composite: OR over its children, in priority order.
    /// Empty → [`NodeState::Failure`].
    Fallback(Vec<BehaviorNode>),
    /// Leaf: maps its predicate onto success/failure.  Never running.
    Condition { name: String, predicate: Predicate },
    /// Leaf: runs its effect.  `running` is set only while the effect is
    /// executing; a tick that arrives during that window gets
    /// [`NodeState::Running`] and does not start the effect again.
    Action {
        name: String,
        effect: Effect,
        running: AtomicBool,
    },
}

impl BehaviorNode {
    /// Construct a [`BehaviorNode::Sequence`] composite.
    pub fn sequence(children: Vec<BehaviorNode>) -> Self {
        BehaviorNode::Sequence(children)
    }

    /// Construct a [`BehaviorNode::Fallback`] composite.
    pub fn fallback(children: Vec<BehaviorNode>) -> Self {
        BehaviorNode::Fallback(children)
    }

    /// Construct a [`BehaviorNode::Condition`] leaf.
    ///
    /// `predicate` is called exactly once per tick that reaches this node.
    /// It must not fail: collaborators that can fail map the failure to
    /// `false` themselves.
    pub fn condition(
        name: impl Into<String>,
        predicate: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Self {
        BehaviorNode::Condition {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Construct a [`BehaviorNode::Action`] leaf.
    pub fn action(
        name: impl Into<String>,
        effect: impl Fn() -> Result<(), ActionError> + Send + Sync + 'static,
    ) -> Self {
        BehaviorNode::Action {
            name: name.into(),
            effect: Box::new(effect),
            running: AtomicBool::new(false),
        }
    }

    /// Tick this node once, evaluating its subtree to completion.
    pub fn tick(&self) -> NodeState {
        match self {
            BehaviorNode::Sequence(children) => {
                for child in children {
                    match child.tick() {
                        NodeState::Success => continue,
                        other => return other,
                    }
                }
                NodeState::Success
            }

            BehaviorNode::Fallback(children) => {
                for child in children {
                    match child.tick() {
                        NodeState::Failure => continue,
                        other => return other,
                    }
                }
                NodeState::Failure
            }

            BehaviorNode::Condition { predicate, .. } => {
                if predicate() {
                    NodeState::Success
                } else {
                    NodeState::Failure
                }
            }

            BehaviorNode::Action {
                name,
                effect,
                running,
            } => tick_action(name, effect, running),
        }
    }

    /// Return the name of this node if it is a leaf.
    ///
    /// Composite nodes return `None`.
    pub fn name(&self) -> Option<&str> {
        match self {
            BehaviorNode::Condition { name, .. } | BehaviorNode::Action { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Children of a composite; leaves have none.
    pub fn children(&self) -> &[BehaviorNode] {
        match self {
            BehaviorNode::Sequence(children) | BehaviorNode::Fallback(children) => children,
            _ => &[],
        }
    }

    /// `true` while an action's effect is executing.
    pub fn is_in_flight(&self) -> bool {
        match self {
            BehaviorNode::Action { running, .. } => running.load(Ordering::Acquire),
            _ => false,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            BehaviorNode::Sequence(_) => "Sequence",
            BehaviorNode::Fallback(_) => "Fallback",
            BehaviorNode::Condition { .. } => "Condition",
            BehaviorNode::Action { .. } => "Action",
        }
    }
}

impl std::fmt::Debug for BehaviorNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BehaviorNode::Sequence(children) | BehaviorNode::Fallback(children) => {
                f.debug_tuple(self.kind()).field(children).finish()
            }
            BehaviorNode::Condition { name, .. } => {
                f.debug_struct("Condition").field("name", name).finish()
            }
            BehaviorNode::Action { name, running, .. } => f
                .debug_struct("Action")
                .field("name", name)
                .field("running", &running.load(Ordering::Acquire))
                .finish(),
        }
    }
}

/// Clears an action's `running` flag when the effect returns or unwinds.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn tick_action(name: &str, effect: &Effect, running: &AtomicBool) -> NodeState {
    if running.swap(true, Ordering::AcqRel) {
        trace!(action = name, "tick reached an action whose effect is still executing");
        return NodeState::Running;
    }
    let _in_flight = InFlight(running);

    match effect() {
        Ok(()) => NodeState::Success,
        Err(e) => {
            warn!(action = name, error = %e, "action failed");
            NodeState::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex, Weak};

    const STATES: [NodeState; 3] = [NodeState::Success, NodeState::Failure, NodeState::Running];

    /// A child that returns `state` and counts how often it is reached.
    ///
    /// Running is produced by an action that is already in flight, which is
    /// exactly what the engine reports for such a child.
    fn stub(state: NodeState, hits: &Arc<AtomicUsize>) -> BehaviorNode {
        let hits = Arc::clone(hits);
        match state {
            NodeState::Success => BehaviorNode::condition("ok", move || {
                hits.fetch_add(1, Ordering::SeqCst);
                true
            }),
            NodeState::Failure => BehaviorNode::condition("fail", move || {
                hits.fetch_add(1, Ordering::SeqCst);
                false
            }),
            NodeState::Running => BehaviorNode::Action {
                name: "busy".to_string(),
                effect: Box::new(|| Ok(())),
                running: AtomicBool::new(true),
            },
        }
    }

    fn combinations(len: usize) -> Vec<Vec<NodeState>> {
        let mut out = vec![vec![]];
        for _ in 0..len {
            out = out
                .into_iter()
                .flat_map(|prefix| {
                    STATES.iter().map(move |s| {
                        let mut next = prefix.clone();
                        next.push(*s);
                        next
                    })
                })
                .collect();
        }
        out
    }

    #[test]
    fn condition_maps_predicate() {
        assert_eq!(BehaviorNode::condition("t", || true).tick(), NodeState::Success);
        assert_eq!(BehaviorNode::condition("f", || false).tick(), NodeState::Failure);
    }

    #[test]
    fn action_maps_effect_result() {
        let ok = BehaviorNode::action("ok", || Ok(()));
        let fail = BehaviorNode::action("fail", || Err(ActionError::Failed("boom".into())));
        assert_eq!(ok.tick(), NodeState::Success);
        assert_eq!(fail.tick(), NodeState::Failure);
    }

    #[test]
    fn sequence_truth_table() {
        for len in 2..=3 {
            for states in combinations(len) {
                let hits = Arc::new(AtomicUsize::new(0));
                let tree = BehaviorNode::sequence(states.iter().map(|s| stub(*s, &hits)).collect());
                let expected = states
                    .iter()
                    .copied()
                    .find(|s| *s != NodeState::Success)
                    .unwrap_or(NodeState::Success);
                assert_eq!(tree.tick(), expected, "sequence over {states:?}");
            }
        }
    }

    #[test]
    fn fallback_truth_table() {
        for len in 2..=3 {
            for states in combinations(len) {
                let hits = Arc::new(AtomicUsize::new(0));
                let tree = BehaviorNode::fallback(states.iter().map(|s| stub(*s, &hits)).collect());
                let expected = states
                    .iter()
                    .copied()
                    .find(|s| *s != NodeState::Failure)
                    .unwrap_or(NodeState::Failure);
                assert_eq!(tree.tick(), expected, "fallback over {states:?}");
            }
        }
    }

    #[test]
    fn sequence_empty_succeeds() {
        assert_eq!(BehaviorNode::sequence(vec![]).tick(), NodeState::Success);
    }

    #[test]
    fn fallback_empty_fails() {
        assert_eq!(BehaviorNode::fallback(vec![]).tick(), NodeState::Failure);
    }

    #[test]
    fn sequence_short_circuits_after_failure() {
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        let tree = BehaviorNode::sequence(vec![
            stub(NodeState::Success, &before),
            stub(NodeState::Failure, &before),
            stub(NodeState::Success, &after),
            stub(NodeState::Failure, &after),
        ]);
        assert_eq!(tree.tick(), NodeState::Failure);
        assert_eq!(before.load(Ordering::SeqCst), 2);
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sequence_short_circuits_on_running() {
        let hits = Arc::new(AtomicUsize::new(0));
        let tree = BehaviorNode::sequence(vec![
            stub(NodeState::Running, &hits),
            stub(NodeState::Success, &hits),
        ]);
        assert_eq!(tree.tick(), NodeState::Running);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fallback_short_circuits_after_success() {
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        let tree = BehaviorNode::fallback(vec![
            stub(NodeState::Failure, &before),
            stub(NodeState::Success, &before),
            stub(NodeState::Failure, &after),
        ]);
        assert_eq!(tree.tick(), NodeState::Success);
        assert_eq!(before.load(Ordering::SeqCst), 2);
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fallback_short_circuits_on_running() {
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        let tree = BehaviorNode::fallback(vec![
            stub(NodeState::Failure, &before),
            stub(NodeState::Running, &before),
            stub(NodeState::Success, &after),
            stub(NodeState::Failure, &after),
        ]);
        assert_eq!(tree.tick(), NodeState::Running);
        assert_eq!(before.load(Ordering::SeqCst), 1);
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn nested_sequence_in_fallback() {
        // fallback([seq([ok, fail]), seq([ok, ok])]) -> Success
        let hits = Arc::new(AtomicUsize::new(0));
        let tree = BehaviorNode::fallback(vec![
            BehaviorNode::sequence(vec![
                stub(NodeState::Success, &hits),
                stub(NodeState::Failure, &hits),
            ]),
            BehaviorNode::sequence(vec![
                stub(NodeState::Success, &hits),
                stub(NodeState::Success, &hits),
            ]),
        ]);
        assert_eq!(tree.tick(), NodeState::Success);
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn reentrant_tick_returns_running_without_second_invocation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = Arc::new(Mutex::new(None));

        let node = Arc::new_cyclic(|me: &Weak<BehaviorNode>| {
            let me = me.clone();
            let calls = Arc::clone(&calls);
            let inner = Arc::clone(&inner);
            BehaviorNode::action("recurse", move || {
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(node) = me.upgrade() {
                    *inner.lock().unwrap() = Some(node.tick());
                }
                Ok(())
            })
        });

        assert_eq!(node.tick(), NodeState::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*inner.lock().unwrap(), Some(NodeState::Running));
        assert!(!node.is_in_flight());
    }

    #[test]
    fn failing_action_is_not_left_running() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let node = BehaviorNode::action("always_fails", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ActionError::NoTarget("nothing here".into()))
        });

        assert_eq!(node.tick(), NodeState::Failure);
        assert!(!node.is_in_flight());
        assert_eq!(node.tick(), NodeState::Failure);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panicking_effect_clears_running_flag() {
        let armed = Arc::new(AtomicBool::new(true));
        let trigger = Arc::clone(&armed);
        let node = BehaviorNode::action("explodes_once", move || {
            if trigger.swap(false, Ordering::SeqCst) {
                panic!("collaborator defect");
            }
            Ok(())
        });

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| node.tick()));
        assert!(outcome.is_err());
        assert!(!node.is_in_flight());
        assert_eq!(node.tick(), NodeState::Success);
    }

    #[test]
    fn leaf_name_is_accessible() {
        let node = BehaviorNode::action("my_action", || Ok(()));
        assert_eq!(node.name(), Some("my_action"));
        assert_eq!(BehaviorNode::condition("seen", || true).name(), Some("seen"));
    }

    #[test]
    fn composite_name_is_none() {
        assert_eq!(BehaviorNode::sequence(vec![]).name(), None);
        assert_eq!(BehaviorNode::fallback(vec![]).name(), None);
    }

    #[test]
    fn debug_lists_leaf_names() {
        let tree = BehaviorNode::fallback(vec![
            BehaviorNode::condition("seen", || true),
            BehaviorNode::action("patrol", || Ok(())),
        ]);
        let debug = format!("{tree:?}");
        assert!(debug.starts_with("Fallback"));
        assert!(debug.contains("seen"));
        assert!(debug.contains("patrol"));
        assert_eq!(tree.children().len(), 2);
    }

    #[test]
    fn trees_can_move_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BehaviorNode>();

        let tree = BehaviorNode::sequence(vec![BehaviorNode::condition("t", || true)]);
        let state = std::thread::spawn(move || tree.tick()).join().unwrap();
        assert_eq!(state, NodeState::Success);
    }
}
