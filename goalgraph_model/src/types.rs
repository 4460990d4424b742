// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the goal hierarchy: identifiers, nodes, links and partial updates.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identifier of a goal node.
///
/// Identifiers are minted by the external owner; the engine only compares,
/// hashes and clones them.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct GoalId(String);

impl GoalId {
    /// Create an identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GoalId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for GoalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for GoalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether a node is the single root of the hierarchy or a sub-goal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GoalKind {
    /// The root goal. Exactly one per tree; it has no parent.
    Root,
    /// Any other goal.
    #[default]
    Sub,
}

/// Progress state of a goal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GoalStatus {
    /// Not done yet.
    #[default]
    Pending,
    /// Done.
    Completed,
    /// Blocked.
    Stuck,
}

impl GoalStatus {
    /// The next status in the `Pending -> Completed -> Stuck -> Pending` rotation.
    #[must_use]
    pub const fn cycled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Stuck,
            Self::Stuck => Self::Pending,
        }
    }

    /// Stable lowercase name, used in fingerprints.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Stuck => "stuck",
        }
    }
}

/// A node in the goal hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GoalNode {
    /// Unique identifier.
    pub id: GoalId,
    /// Display label.
    pub text: String,
    /// Root or sub-goal.
    pub kind: GoalKind,
    /// Progress state.
    pub status: GoalStatus,
    /// Completion percentage, `0..=100`.
    pub progress: u8,
    /// Parent node; `None` only for the root.
    pub parent_id: Option<GoalId>,
    /// Optional illustrative image reference.
    pub image_url: Option<String>,
    /// When set, descendants are left out of the rendered scene (never out of the data).
    pub collapsed: bool,
}

impl GoalNode {
    /// A root node with the given id and label.
    pub fn root(id: impl Into<GoalId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind: GoalKind::Root,
            status: GoalStatus::Pending,
            progress: 0,
            parent_id: None,
            image_url: None,
            collapsed: false,
        }
    }

    /// A sub-goal attached to `parent`.
    pub fn sub(
        id: impl Into<GoalId>,
        parent: impl Into<GoalId>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind: GoalKind::Sub,
            status: GoalStatus::Pending,
            progress: 0,
            parent_id: Some(parent.into()),
            image_url: None,
            collapsed: false,
        }
    }

    /// Builder-style status setter.
    #[must_use]
    pub fn with_status(mut self, status: GoalStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder-style progress setter; values above 100 are clamped.
    #[must_use]
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    /// Builder-style collapsed setter.
    #[must_use]
    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    /// Builder-style image setter.
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Whether this is the root goal.
    pub fn is_root(&self) -> bool {
        self.kind == GoalKind::Root
    }
}

/// A directed `parent -> child` edge mirroring [`GoalNode::parent_id`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GoalLink {
    /// Parent id.
    pub source: GoalId,
    /// Child id.
    pub target: GoalId,
}

impl GoalLink {
    /// Create a link from `source` to `target`.
    pub fn new(source: impl Into<GoalId>, target: impl Into<GoalId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Derive the link list from the nodes' parent ids, in node order.
pub fn links_from_parents(nodes: &[GoalNode]) -> Vec<GoalLink> {
    nodes
        .iter()
        .filter_map(|n| {
            n.parent_id
                .as_ref()
                .map(|p| GoalLink::new(p.clone(), n.id.clone()))
        })
        .collect()
}

/// A partial update of a node's mutable fields.
///
/// `None` leaves a field unchanged. For `image_url`, `Some(None)` clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeUpdate {
    /// New label.
    pub text: Option<String>,
    /// New status.
    pub status: Option<GoalStatus>,
    /// New progress.
    pub progress: Option<u8>,
    /// New collapsed flag.
    pub collapsed: Option<bool>,
    /// New image reference.
    pub image_url: Option<Option<String>>,
}

impl NodeUpdate {
    /// Update only the label.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Update only the status.
    pub fn status(status: GoalStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Update only the collapsed flag.
    pub fn collapsed(collapsed: bool) -> Self {
        Self {
            collapsed: Some(collapsed),
            ..Self::default()
        }
    }

    /// True if no field would change.
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.status.is_none()
            && self.progress.is_none()
            && self.collapsed.is_none()
            && self.image_url.is_none()
    }

    /// Apply the update in place.
    pub fn apply_to(&self, node: &mut GoalNode) {
        if let Some(text) = &self.text {
            node.text.clone_from(text);
        }
        if let Some(status) = self.status {
            node.status = status;
        }
        if let Some(progress) = self.progress {
            node.progress = progress.min(100);
        }
        if let Some(collapsed) = self.collapsed {
            node.collapsed = collapsed;
        }
        if let Some(image_url) = &self.image_url {
            node.image_url.clone_from(image_url);
        }
    }
}

/// Positioning strategy for the goal graph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LayoutMode {
    /// Concentric rings around a centered root.
    #[default]
    Radial,
    /// Top-down tree, root at the top.
    VerticalTree,
    /// Left-to-right tree, root on the left.
    HorizontalTree,
    /// Physics simulation.
    Force,
}

impl LayoutMode {
    /// All modes, in menu order.
    pub const ALL: [Self; 4] = [
        Self::Radial,
        Self::VerticalTree,
        Self::HorizontalTree,
        Self::Force,
    ];

    /// True for the modes whose positions are a pure function of the tree and viewport size.
    pub const fn is_deterministic(self) -> bool {
        !matches!(self, Self::Force)
    }

    /// Stable lowercase name, used in fingerprints.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Radial => "radial",
            Self::VerticalTree => "vertical",
            Self::HorizontalTree => "horizontal",
            Self::Force => "force",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_cycles_through_all_three() {
        let s = GoalStatus::Pending;
        assert_eq!(s.cycled(), GoalStatus::Completed);
        assert_eq!(s.cycled().cycled(), GoalStatus::Stuck);
        assert_eq!(s.cycled().cycled().cycled(), GoalStatus::Pending);
    }

    #[test]
    fn links_mirror_parent_ids() {
        let nodes = vec![
            GoalNode::root("r", "Root"),
            GoalNode::sub("a", "r", "A"),
            GoalNode::sub("b", "a", "B"),
        ];
        let links = links_from_parents(&nodes);
        assert_eq!(
            links,
            vec![GoalLink::new("r", "a"), GoalLink::new("a", "b")],
            "root has no incoming link; every sub node has exactly one"
        );
    }

    #[test]
    fn update_applies_only_present_fields() {
        let mut node = GoalNode::sub("a", "r", "Old").with_progress(40);
        NodeUpdate {
            status: Some(GoalStatus::Stuck),
            progress: Some(250),
            image_url: Some(Some("img.png".into())),
            ..NodeUpdate::default()
        }
        .apply_to(&mut node);
        assert_eq!(node.text, "Old");
        assert_eq!(node.status, GoalStatus::Stuck);
        assert_eq!(node.progress, 100, "progress is clamped");
        assert_eq!(node.image_url.as_deref(), Some("img.png"));
        assert!(NodeUpdate::default().is_empty());
    }
}
