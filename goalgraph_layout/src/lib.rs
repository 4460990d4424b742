// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Goalgraph Layout: 2-D positions for a [`GoalTree`].
//!
//! Three modes are pure functions of the tree, the viewport size and a
//! [`LayoutConfig`]:
//!
//! - radial: root at the center, each generation on a ring, angular shares
//!   equal for small families and leaf-weighted for large ones;
//! - vertical tree: root at the top, nodes centred over their leaves;
//! - horizontal tree: the same, growing rightward.
//!
//! The fourth mode is a [`Simulation`] the host steps once per frame.
//! [`compute_positions`] covers all four; for [`LayoutMode::Force`] it
//! returns the positions after a cold warm-up burst.
//!
//! Only visible nodes are placed. Descendants of a collapsed node are absent
//! from the result.
//!
//! ```
//! use goalgraph_layout::{LayoutConfig, compute_positions};
//! use goalgraph_model::{GoalId, GoalNode, GoalTree, LayoutMode, links_from_parents};
//! use kurbo::{Point, Size};
//!
//! let nodes = vec![GoalNode::root("r", "Root"), GoalNode::sub("a", "r", "A")];
//! let tree = GoalTree::build(&nodes, &links_from_parents(&nodes)).unwrap();
//! let pos = compute_positions(&tree, LayoutMode::Radial, Size::new(800.0, 600.0), &LayoutConfig::default());
//! assert_eq!(pos[&GoalId::from("r")], Point::new(400.0, 300.0));
//! ```
//!
//! ## Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for the configuration types.

mod config;
mod force;
mod radial;
mod tree_layout;

pub use config::{ForceConfig, LayoutConfig};
pub use force::{Simulation, Start};
pub use radial::{Sector, Spacing, allocate_sectors, radial_positions, ring_radius, spacing_for};
pub use tree_layout::{Orientation, tree_positions};

use goalgraph_model::{GoalId, GoalTree, LayoutMode};
use kurbo::{Point, Size};

/// World-space position of each placed node.
pub type Positions = hashbrown::HashMap<GoalId, Point>;

/// Visual radius of a node at `depth` with the default configuration.
pub fn node_radius(depth: usize) -> f64 {
    match depth {
        0 => 65.0,
        1 => 45.0,
        _ => 35.0,
    }
}

/// Positions for every visible node of `tree` under `mode`.
pub fn compute_positions(
    tree: &GoalTree,
    mode: LayoutMode,
    size: Size,
    config: &LayoutConfig,
) -> Positions {
    let positions = match mode {
        LayoutMode::Radial => radial_positions(tree, size, config),
        LayoutMode::VerticalTree => tree_positions(tree, Orientation::Vertical, size, config),
        LayoutMode::HorizontalTree => tree_positions(tree, Orientation::Horizontal, size, config),
        LayoutMode::Force => {
            let mut sim = Simulation::new(tree, size, config, None);
            sim.warm_up();
            sim.positions()
        }
    };
    tracing::debug!(mode = mode.as_str(), placed = positions.len(), "layout computed");
    positions
}
