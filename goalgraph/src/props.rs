// Copyright 2026 the Goalgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine inputs and configuration.

use goalgraph_interaction::InteractionConfig;
use goalgraph_layout::LayoutConfig;
use goalgraph_model::{GoalId, GoalLink, GoalNode, LayoutMode};
use goalgraph_sync::SyncConfig;
use hashbrown::HashSet;
use kurbo::Size;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything the owner supplies on each render.
#[derive(Clone, Debug, Default)]
pub struct Props {
    /// Node collection.
    pub nodes: Vec<GoalNode>,
    /// Link collection.
    pub links: Vec<GoalLink>,
    /// Selected node.
    pub selected: Option<GoalId>,
    /// Node whose inline editor should be open.
    pub editing: Option<GoalId>,
    /// Viewport size.
    pub size: Size,
    /// Forces a layout mode; `None` lets the engine manage it.
    pub layout_mode: Option<LayoutMode>,
    /// Nodes with an async operation in flight.
    pub loading: HashSet<GoalId>,
}

impl Props {
    /// Props for `nodes` and `links` in a viewport of `size`.
    pub fn new(nodes: Vec<GoalNode>, links: Vec<GoalLink>, size: Size) -> Self {
        Self {
            nodes,
            links,
            size,
            ..Self::default()
        }
    }

    /// Set the selection.
    pub fn with_selected(mut self, id: impl Into<GoalId>) -> Self {
        self.selected = Some(id.into());
        self
    }

    /// Request the inline editor for a node.
    pub fn with_editing(mut self, id: impl Into<GoalId>) -> Self {
        self.editing = Some(id.into());
        self
    }

    /// Force a layout mode.
    pub fn with_layout_mode(mut self, mode: LayoutMode) -> Self {
        self.layout_mode = Some(mode);
        self
    }

    /// Mark a node as loading.
    pub fn with_loading(mut self, id: impl Into<GoalId>) -> Self {
        self.loading.insert(id.into());
        self
    }
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct EngineConfig {
    /// Layout geometry and force settings.
    pub layout: LayoutConfig,
    /// Gesture thresholds.
    pub interaction: InteractionConfig,
    /// Echo suppression.
    pub sync: SyncConfig,
    /// Smallest viewport zoom.
    pub min_zoom: f64,
    /// Largest viewport zoom.
    pub max_zoom: f64,
    /// Sideways bend of edges as a fraction of their length.
    pub edge_curvature: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            interaction: InteractionConfig::default(),
            sync: SyncConfig::default(),
            min_zoom: 0.1,
            max_zoom: 4.0,
            edge_curvature: 0.15,
        }
    }
}
