// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer-facing snapshot of the engine.

use goalgraph_interaction::ContextMenu;
use goalgraph_model::{GoalId, GoalStatus};
use kurbo::{Affine, BezPath, Point, Size, Vec2};

bitflags::bitflags! {
    /// Per-node decoration flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// The root goal.
        const ROOT        = 0b0000_0001;
        /// Selected.
        const SELECTED    = 0b0000_0010;
        /// The inline editor is open on it.
        const EDITING     = 0b0000_0100;
        /// Highlighted as the drop target of a drag.
        const DROP_TARGET = 0b0000_1000;
        /// Following the pointer.
        const DRAGGING    = 0b0001_0000;
        /// An async host operation is in flight.
        const LOADING     = 0b0010_0000;
        /// Collapsed; descendants are hidden.
        const COLLAPSED   = 0b0100_0000;
        /// Held in place in the force layout.
        const PINNED      = 0b1000_0000;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A node as drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    /// Goal id.
    pub id: GoalId,
    /// Label.
    pub label: String,
    /// Status, for the ring color.
    pub status: GoalStatus,
    /// Completion percentage.
    pub progress: u8,
    /// Tree depth.
    pub depth: usize,
    /// Center in world space.
    pub center: Point,
    /// Radius in world space.
    pub radius: f64,
    /// Decorations.
    pub flags: NodeFlags,
    /// Illustration.
    pub image_url: Option<String>,
    /// Number of nodes hidden below a collapsed node.
    pub hidden_descendants: usize,
}

/// A parent-child connector.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
    /// Parent.
    pub source: GoalId,
    /// Child.
    pub target: GoalId,
    /// Quadratic curve from parent center to child center.
    pub path: BezPath,
}

impl SceneEdge {
    /// A gently bent edge between two centers.
    ///
    /// The control point sits `curvature * length` to the side of the midpoint.
    pub fn curved(source: GoalId, target: GoalId, from: Point, to: Point, curvature: f64) -> Self {
        let d = to - from;
        let normal = Vec2::new(-d.y, d.x);
        let control = from.midpoint(to) + normal * curvature;
        let mut path = BezPath::new();
        path.move_to(from);
        path.quad_to(control, to);
        Self {
            source,
            target,
            path,
        }
    }
}

/// The inline editor overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct EditOverlay {
    /// Node being edited.
    pub node: GoalId,
    /// Top-center of the editor in world space.
    pub anchor: Point,
    /// Current buffer.
    pub text: String,
}

/// Everything needed to draw one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Visible nodes in pre-order; later nodes draw on top.
    pub nodes: Vec<SceneNode>,
    /// Edges between visible nodes.
    pub edges: Vec<SceneEdge>,
    /// Open inline editor.
    pub edit: Option<EditOverlay>,
    /// Open context menu.
    pub menu: Option<ContextMenu>,
    /// World-to-screen transform.
    pub transform: Affine,
    /// Viewport size.
    pub size: Size,
}

impl Scene {
    /// The drawn node for `id`.
    pub fn node(&self, id: &GoalId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Whether nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A drawing backend.
pub trait SceneRenderer {
    /// Draw a complete frame.
    fn render(&mut self, scene: &Scene);
}
