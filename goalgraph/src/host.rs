// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The callback boundary to the owner of the node and link arrays.

use goalgraph_model::{GoalId, GoalNode, NodeUpdate};

/// Receives every change the engine wants made to the goal graph.
///
/// The engine never edits the owner's arrays. It reports intent here and
/// waits for the owner to send updated arrays back through
/// [`Engine::set_props`](crate::Engine::set_props).
pub trait GoalGraphHost {
    /// A node was clicked (and selected).
    fn on_node_click(&mut self, node: &GoalNode);

    /// Apply `update` to node `id`.
    fn on_update_node(&mut self, id: &GoalId, update: &NodeUpdate);

    /// Delete node `id` and its subtree.
    fn on_delete_node(&mut self, id: &GoalId);

    /// Move `child` under `new_parent`. The move has been checked for cycles.
    fn on_reparent_node(&mut self, child: &GoalId, new_parent: &GoalId);

    /// Create a node under `parent`. The owner assigns the id.
    fn on_add_sub_node(&mut self, parent: &GoalId, initial_text: Option<&str>);

    /// Hand node `id` to a task system.
    fn on_convert_node_to_task(&mut self, id: &GoalId) {
        let _ = id;
    }

    /// Generate an image for node `id`.
    fn on_generate_image(&mut self, id: &GoalId) {
        let _ = id;
    }

    /// The selection was cleared by clicking empty canvas.
    fn on_selection_cleared(&mut self) {}
}

/// A recorded host callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCall {
    /// [`GoalGraphHost::on_node_click`].
    NodeClick(GoalId),
    /// [`GoalGraphHost::on_update_node`].
    UpdateNode(GoalId, NodeUpdate),
    /// [`GoalGraphHost::on_delete_node`].
    DeleteNode(GoalId),
    /// [`GoalGraphHost::on_reparent_node`].
    ReparentNode(GoalId, GoalId),
    /// [`GoalGraphHost::on_add_sub_node`].
    AddSubNode(GoalId, Option<String>),
    /// [`GoalGraphHost::on_convert_node_to_task`].
    ConvertToTask(GoalId),
    /// [`GoalGraphHost::on_generate_image`].
    GenerateImage(GoalId),
    /// [`GoalGraphHost::on_selection_cleared`].
    SelectionCleared,
}

/// Records every callback, for tests and scripted demos.
impl GoalGraphHost for Vec<HostCall> {
    fn on_node_click(&mut self, node: &GoalNode) {
        self.push(HostCall::NodeClick(node.id.clone()));
    }

    fn on_update_node(&mut self, id: &GoalId, update: &NodeUpdate) {
        self.push(HostCall::UpdateNode(id.clone(), update.clone()));
    }

    fn on_delete_node(&mut self, id: &GoalId) {
        self.push(HostCall::DeleteNode(id.clone()));
    }

    fn on_reparent_node(&mut self, child: &GoalId, new_parent: &GoalId) {
        self.push(HostCall::ReparentNode(child.clone(), new_parent.clone()));
    }

    fn on_add_sub_node(&mut self, parent: &GoalId, initial_text: Option<&str>) {
        self.push(HostCall::AddSubNode(parent.clone(), initial_text.map(str::to_owned)));
    }

    fn on_convert_node_to_task(&mut self, id: &GoalId) {
        self.push(HostCall::ConvertToTask(id.clone()));
    }

    fn on_generate_image(&mut self, id: &GoalId) {
        self.push(HostCall::GenerateImage(id.clone()));
    }

    fn on_selection_cleared(&mut self) {
        self.push(HostCall::SelectionCleared);
    }
}
