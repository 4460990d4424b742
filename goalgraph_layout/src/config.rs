// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout constants, grouped so hosts can tune or deserialize them.

use core::f64::consts::FRAC_PI_2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometry of the deterministic layouts plus the force simulation settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct LayoutConfig {
    /// Visual radius of the root node.
    pub root_radius: f64,
    /// Visual radius of depth-1 nodes.
    pub branch_radius: f64,
    /// Visual radius of nodes at depth 2 and below.
    pub leaf_radius: f64,

    /// Smallest ring radius around any parent.
    pub radial_min_ring: f64,
    /// Base ring radius for depth 0; grows by `radial_ring_step` per level.
    pub radial_base_ring: f64,
    /// Ring growth per depth level.
    pub radial_ring_step: f64,
    /// Minimum arc length between siblings on a ring.
    pub radial_sibling_arc: f64,
    /// Parents with at most this many visible children space them equally;
    /// above it, shares are weighted by subtree leaf count.
    pub equal_spacing_max_children: usize,
    /// Angle of the root's first child, in radians (screen space, y down).
    pub start_angle: f64,

    /// Distance between depth levels in the vertical tree.
    pub vertical_level_spacing: f64,
    /// Horizontal room per leaf in the vertical tree.
    pub vertical_leaf_spacing: f64,
    /// Distance between depth levels in the horizontal tree.
    pub horizontal_level_spacing: f64,
    /// Vertical room per leaf in the horizontal tree.
    pub horizontal_leaf_spacing: f64,
    /// Minimum share of the viewport a tree layout spreads across.
    pub tree_fill: f64,
    /// Offset of the root from the top (vertical) or left (horizontal) edge.
    pub tree_margin: f64,

    /// Force-directed settings.
    pub force: ForceConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            root_radius: 65.0,
            branch_radius: 45.0,
            leaf_radius: 35.0,
            radial_min_ring: 180.0,
            radial_base_ring: 220.0,
            radial_ring_step: 140.0,
            radial_sibling_arc: 100.0,
            equal_spacing_max_children: 8,
            start_angle: -FRAC_PI_2,
            vertical_level_spacing: 150.0,
            vertical_leaf_spacing: 120.0,
            horizontal_level_spacing: 200.0,
            horizontal_leaf_spacing: 100.0,
            tree_fill: 0.8,
            tree_margin: 100.0,
            force: ForceConfig::default(),
        }
    }
}

impl LayoutConfig {
    /// Visual radius for a node at `depth`.
    pub fn radius_for_depth(&self, depth: usize) -> f64 {
        match depth {
            0 => self.root_radius,
            1 => self.branch_radius,
            _ => self.leaf_radius,
        }
    }
}

/// Force-directed simulation settings.
///
/// The alpha schedule follows the usual cooling model: alpha starts at `1.0`
/// (or `resume_alpha` when warm-starting), moves toward `alpha_target` by
/// `alpha_decay` each tick, and the simulation settles below `alpha_min`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ForceConfig {
    /// Rest length of links from the root to depth-1 nodes.
    pub link_distance_root: f64,
    /// Rest length of deeper links.
    pub link_distance: f64,
    /// Link stiffness.
    pub link_strength: f64,
    /// Many-body strength of the root (negative repels).
    pub charge_root: f64,
    /// Many-body strength of other nodes.
    pub charge: f64,
    /// Distances below this are clamped in the many-body force.
    pub charge_distance_min: f64,
    /// Extra exclusion radius added to the visual radius for collisions.
    pub collision_padding: f64,
    /// Collision stiffness.
    pub collision_strength: f64,
    /// Target distance from the center for depth-1 nodes.
    pub radial_depth1: f64,
    /// Base of the target distance for nodes at depth 2 and below.
    pub radial_base: f64,
    /// Target distance added per level of depth, from depth 2 on.
    pub radial_step: f64,
    /// Strength of the pull toward the depth ring.
    pub radial_strength: f64,
    /// Strength of the global centering shift.
    pub center_strength: f64,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f64,
    /// Settling threshold.
    pub alpha_min: f64,
    /// Cooling rate per tick.
    pub alpha_decay: f64,
    /// Alpha the simulation cools toward.
    pub alpha_target: f64,
    /// Starting alpha when resuming from cached positions.
    pub resume_alpha: f64,
    /// Synchronous ticks when starting without cached positions.
    pub warm_up_cold: usize,
    /// Synchronous ticks when resuming from cached positions.
    pub warm_up_warm: usize,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            link_distance_root: 220.0,
            link_distance: 120.0,
            link_strength: 1.0,
            charge_root: -2000.0,
            charge: -800.0,
            charge_distance_min: 1.0,
            collision_padding: 30.0,
            collision_strength: 1.0,
            radial_depth1: 220.0,
            radial_base: 360.0,
            radial_step: 140.0,
            radial_strength: 0.3,
            center_strength: 0.05,
            velocity_decay: 0.65,
            alpha_min: 0.001,
            // 1 - alpha_min^(1/300): settle in roughly 300 ticks.
            alpha_decay: 0.0228,
            alpha_target: 0.0,
            resume_alpha: 0.3,
            warm_up_cold: 80,
            warm_up_warm: 10,
        }
    }
}

impl ForceConfig {
    /// Target distance from the center for a node at `depth`.
    pub fn radial_target(&self, depth: usize) -> f64 {
        match depth {
            0 => 0.0,
            1 => self.radial_depth1,
            d => self.radial_base + d as f64 * self.radial_step,
        }
    }

    /// Rest length of a link whose child sits at `child_depth`.
    pub fn link_distance_for(&self, child_depth: usize) -> f64 {
        if child_depth <= 1 {
            self.link_distance_root
        } else {
            self.link_distance
        }
    }

    /// Many-body strength for a node at `depth`.
    pub fn charge_for(&self, depth: usize) -> f64 {
        if depth == 0 { self.charge_root } else { self.charge }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radial_targets_by_depth() {
        let c = ForceConfig::default();
        assert_eq!(c.radial_target(0), 0.0);
        assert_eq!(c.radial_target(1), 220.0);
        assert_eq!(c.radial_target(2), 640.0);
        assert_eq!(c.radial_target(3), 780.0);
    }
}
