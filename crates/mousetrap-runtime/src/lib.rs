//! `mousetrap-runtime` – the behavior-tree execution engine.
//!
//! # Modules
//!
//! - [`behavior_tree`] – [`BehaviorNode`][behavior_tree::BehaviorNode]:
//!   a tagged union of [`Sequence`][behavior_tree::BehaviorNode::Sequence],
//!   [`Fallback`][behavior_tree::BehaviorNode::Fallback],
//!   [`Condition`][behavior_tree::BehaviorNode::Condition] and
//!   [`Action`][behavior_tree::BehaviorNode::Action] nodes, evaluated
//!   synchronously into a [`NodeState`][behavior_tree::NodeState].
//! - [`tree_driver`] – [`TreeDriver`][tree_driver::TreeDriver]:
//!   owns a root node and ticks it at a fixed interval from the host's
//!   per-frame callback, with start/stop/replace lifecycle.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   installs the global `tracing` subscriber, with optional OTLP span export.
//!
//! Everything a tree inspects or changes lives behind the closures given to
//! its leaves; this crate never touches the world directly.

pub mod behavior_tree;
pub mod telemetry;
pub mod tree_driver;

pub use behavior_tree::{BehaviorNode, Effect, NodeState, Predicate};
pub use telemetry::{LogFormat, TelemetryConfig, TracerProviderGuard, init_tracing};
pub use tree_driver::TreeDriver;

// Leaf effects report this error type; re-exported so tree builders do not
// need a direct dependency on mousetrap-types.
pub use mousetrap_types::ActionError;
