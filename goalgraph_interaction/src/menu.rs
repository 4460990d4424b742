// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node context menu.

use goalgraph_model::GoalId;
use kurbo::Point;

/// An entry in the context menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    /// Open the inline editor.
    Edit,
    /// Add a node under this node's parent.
    AddSibling,
    /// Add a node under this node.
    AddChild,
    /// Delete this node and its subtree.
    Delete,
    /// Rotate the status Pending, Completed, Stuck.
    CycleStatus,
    /// Show or hide this node's children.
    ToggleCollapse,
    /// Hand the node to the host's task system.
    ConvertToTask,
    /// Ask the host to generate an image for the node.
    GenerateImage,
}

impl MenuAction {
    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::AddSibling => "Add sibling",
            Self::AddChild => "Add child",
            Self::Delete => "Delete",
            Self::CycleStatus => "Cycle status",
            Self::ToggleCollapse => "Collapse / expand",
            Self::ConvertToTask => "Convert to task",
            Self::GenerateImage => "Generate image",
        }
    }
}

/// An open context menu.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextMenu {
    /// Node the menu acts on.
    pub node: GoalId,
    /// Where the gesture happened, in world space.
    pub anchor: Point,
    /// Offered entries, in display order.
    pub actions: Vec<MenuAction>,
}

impl ContextMenu {
    /// Menu for `node`.
    ///
    /// The root has no siblings and cannot be deleted, so those entries are
    /// left out; collapse is only offered for nodes with children.
    pub fn for_node(node: GoalId, anchor: Point, is_root: bool, has_children: bool) -> Self {
        let mut actions = vec![MenuAction::Edit];
        if !is_root {
            actions.push(MenuAction::AddSibling);
        }
        actions.push(MenuAction::AddChild);
        if !is_root {
            actions.push(MenuAction::Delete);
        }
        actions.push(MenuAction::CycleStatus);
        if has_children {
            actions.push(MenuAction::ToggleCollapse);
        }
        actions.extend([MenuAction::ConvertToTask, MenuAction::GenerateImage]);
        Self {
            node,
            anchor,
            actions,
        }
    }

    /// Whether `action` is on offer.
    pub fn offers(&self, action: MenuAction) -> bool {
        self.actions.contains(&action)
    }
}
