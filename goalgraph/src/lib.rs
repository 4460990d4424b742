// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Goalgraph: an interactive view over a hierarchy of goals.
//!
//! The owner of the data supplies flat node and link arrays through
//! [`Props`]. The [`Engine`] builds a tree from them, lays it out in one of
//! four [`LayoutMode`]s, turns pointer and key input into edits, and reports
//! each edit through [`GoalGraphHost`] callbacks. It never mutates the
//! owner's arrays; it keeps an optimistic copy instead and reconciles the
//! owner's next snapshot against it.
//!
//! - Identical snapshots are skipped by fingerprint, so a host that renders
//!   every frame costs nothing while the graph is still.
//! - The echo of a local edit is recognized, and a snapshot from before the
//!   edit is ignored for a short window, so edits never bounce.
//! - Snapshots that touch the node under an active drag or edit are held
//!   until the session ends.
//!
//! Drawing is left to a [`SceneRenderer`]: [`Engine::scene`] returns nodes
//! with decoration [`NodeFlags`], curved edges, and the editor and menu
//! overlays, all in world space plus a world-to-screen transform.
//!
//! ## Crates
//!
//! - [`goalgraph_model`]: node types, the tree builder, fingerprints.
//! - [`goalgraph_layout`]: radial, tree and force layouts.
//! - [`goalgraph_interaction`]: hit testing and the gesture state machine.
//! - [`goalgraph_sync`]: echo suppression between local edits and the owner.
//!
//! ## Example
//!
//! ```
//! use goalgraph::{Engine, EngineConfig, HostCall, PointerEvent, Props, links_from_parents, GoalNode, GoalId};
//! use kurbo::Size;
//!
//! let nodes = vec![
//!     GoalNode::root("r", "Learn Rust"),
//!     GoalNode::sub("a", "r", "Read the book"),
//! ];
//! let props = Props::new(nodes.clone(), links_from_parents(&nodes), Size::new(800.0, 600.0));
//!
//! let mut host: Vec<HostCall> = Vec::new();
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.set_props(&props, 0, &mut host);
//!
//! let a = engine.position(&GoalId::from("a")).unwrap();
//! engine.pointer_down(PointerEvent::primary(a, 100), &mut host);
//! engine.pointer_up(PointerEvent::primary(a, 110), &mut host);
//! assert_eq!(host, [HostCall::NodeClick(GoalId::from("a"))]);
//! ```
//!
//! ## Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for configuration and model types.

mod engine;
mod host;
mod props;
mod scene;
mod viewport;

pub use engine::{Engine, Update, ViewSignal};
pub use host::{GoalGraphHost, HostCall};
pub use props::{EngineConfig, Props};
pub use scene::{EditOverlay, NodeFlags, Scene, SceneEdge, SceneNode, SceneRenderer};
pub use viewport::Viewport;

pub use goalgraph_interaction::{
    ContextMenu, InteractionConfig, Key, MenuAction, PointerButton, PointerEvent, PointerKind,
};
pub use goalgraph_layout::{ForceConfig, LayoutConfig};
pub use goalgraph_model::{
    GoalId, GoalKind, GoalLink, GoalNode, GoalStatus, LayoutMode, NodeUpdate, links_from_parents,
};
pub use goalgraph_sync::SyncConfig;

pub use goalgraph_interaction;
pub use goalgraph_layout;
pub use goalgraph_model;
pub use goalgraph_sync;
